//! The semantic front end of the quill compiler.
//!
//! Source expressions arrive as [eb::NodeBuilder]s, are checked against their
//! [types::SemanticType]s and are lowered into [awst::Expression] nodes. The [abi] module
//! computes the ARC4 layout of composite values, and [context::CompileContext] holds the state of
//! a single compilation run.

pub mod abi;
pub mod awst;
pub mod context;
pub mod eb;
pub mod options;
pub mod parse;
pub mod types;
pub mod unit;
pub mod wtypes;

pub use context::{CompileContext, SourceMeta};
pub use options::{CompileOptions, OptimizationLevel};
pub use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
    warning::{CompileWarning, Warning},
};
pub use quill_types::SourceLocation;
