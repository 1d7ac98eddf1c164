//! The interface to the parser and name resolver, which run before this crate.

use std::path::PathBuf;

/// A module after parsing and name resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedModule {
    /// Dotted full name, e.g. `contracts.voting`.
    pub fullname: String,
    pub path: PathBuf,
}

/// The module graph, in dependency order.
#[derive(Clone, Debug, Default)]
pub struct ParseResult {
    pub ordered_modules: Vec<ParsedModule>,
}

impl ParseResult {
    pub fn new(ordered_modules: Vec<ParsedModule>) -> Self {
        ParseResult { ordered_modules }
    }
}

/// How an argument was passed at a call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// `f(x)`
    Positional,
    /// `f(name=x)`
    Named,
    /// `f(*xs)`
    Star,
    /// `f(**kwargs)`
    DoubleStar,
}
