//! State shared by everything that runs during a single compilation.

use crate::{options::CompileOptions, parse::ParseResult, types::TypeRegistry};

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use quill_error::{
    error::CompileError,
    handler::Handler,
    warning::{CompileWarning, Warning},
};
use quill_types::SourceLocation;

/// The source text a diagnostic points at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceMeta {
    pub location: Option<String>,
    pub code: Option<Vec<String>>,
}

static EMPTY_SOURCE_META: SourceMeta = SourceMeta {
    location: None,
    code: None,
};

/// Loads the lines of a source file. `None` means the file could not be read.
pub trait ReadSource {
    fn read_source(&self, path: &Path) -> Option<Arc<[String]>>;
}

impl<F> ReadSource for F
where
    F: Fn(&Path) -> Option<Vec<String>>,
{
    fn read_source(&self, path: &Path) -> Option<Arc<[String]>> {
        self(path).map(Into::into)
    }
}

/// Reads source files from disk, keeping every file it has read.
#[derive(Debug, Default)]
pub struct FileSourceReader {
    cache: RefCell<HashMap<PathBuf, Option<Arc<[String]>>>>,
}

impl ReadSource for FileSourceReader {
    fn read_source(&self, path: &Path) -> Option<Arc<[String]>> {
        if let Some(lines) = self.cache.borrow().get(path) {
            return lines.clone();
        }
        let lines = match fs::read_to_string(path) {
            Ok(text) => Some(text.lines().map(str::to_string).collect::<Arc<[_]>>()),
            Err(err) => {
                tracing::debug!("could not read {}: {err}", path.display());
                None
            }
        };
        self.cache
            .borrow_mut()
            .insert(path.to_path_buf(), lines.clone());
        lines
    }
}

pub struct CompileContext {
    pub options: CompileOptions,
    pub parse_result: ParseResult,
    pub handler: Handler,
    pub types: TypeRegistry,
    read_source: Box<dyn ReadSource>,
    module_paths: OnceCell<IndexMap<String, PathBuf>>,
}

impl CompileContext {
    /// A context reading sources from disk.
    pub fn new(options: CompileOptions, parse_result: ParseResult) -> Self {
        Self::with_source_reader(options, parse_result, FileSourceReader::default())
    }

    pub fn with_source_reader(
        options: CompileOptions,
        parse_result: ParseResult,
        read_source: impl ReadSource + 'static,
    ) -> Self {
        CompileContext {
            options,
            parse_result,
            handler: Handler::default(),
            types: TypeRegistry::default(),
            read_source: Box::new(read_source),
            module_paths: OnceCell::new(),
        }
    }

    /// Module full names mapped to their paths, in dependency order.
    pub fn module_paths(&self) -> &IndexMap<String, PathBuf> {
        self.module_paths.get_or_init(|| {
            self.parse_result
                .ordered_modules
                .iter()
                .map(|module| (module.fullname.clone(), module.path.clone()))
                .collect()
        })
    }

    /// The source text at `location`.
    ///
    /// A location whose lines are outside of the file yields an empty snippet and a warning.
    pub fn try_get_source(&self, location: Option<&SourceLocation>) -> SourceMeta {
        let Some(location) = location else {
            return EMPTY_SOURCE_META.clone();
        };
        let code = match self.read_source.read_source(location.file()) {
            Some(lines) if !lines.is_empty() => self.slice_source(&lines, location),
            _ => Vec::new(),
        };
        SourceMeta {
            location: Some(location.to_string()),
            code: Some(code),
        }
    }

    fn slice_source(&self, lines: &[String], location: &SourceLocation) -> Vec<String> {
        let start = location.line().saturating_sub(1).min(lines.len());
        let end = location.last_line().min(lines.len());
        let mut code = match location.line() {
            0 => Vec::new(),
            _ if start < end => lines[start..end].to_vec(),
            _ => Vec::new(),
        };
        if code.is_empty() {
            let warning = Warning::CouldNotLocateSource {
                location: location.to_string(),
            };
            tracing::warn!("{warning}");
            self.handler.emit_warn(CompileWarning::new(warning, None));
            return code;
        }

        let single_line = location.line() == location.last_line();
        match (location.column(), location.end_column()) {
            (Some(column), Some(end_column)) if single_line => {
                code[0] = slice_chars(&code[0], column, Some(end_column));
            }
            (column, end_column) => {
                if let Some(column) = column {
                    code[0] = slice_chars(&code[0], column, None);
                }
                if let (Some(end_column), Some(last)) = (end_column, code.last_mut()) {
                    *last = slice_chars(last, 0, Some(end_column));
                }
            }
        }
        code
    }

    /// Formats `error` for a log, followed by the source it points at.
    pub fn render(&self, error: &CompileError) -> String {
        self.render_diagnostic("error", &error.to_string(), error.location())
    }

    pub fn render_warning(&self, warning: &CompileWarning) -> String {
        self.render_diagnostic(
            "warning",
            &warning.to_friendly_warning_string(),
            warning.location.as_ref(),
        )
    }

    fn render_diagnostic(
        &self,
        severity: &str,
        message: &str,
        location: Option<&SourceLocation>,
    ) -> String {
        let source = self.try_get_source(location);
        let mut rendered = match &source.location {
            Some(location) => format!("{location} {severity}: {message}"),
            None => format!("{severity}: {message}"),
        };
        for line in source.code.iter().flatten() {
            let _ = write!(rendered, "\n    {line}");
        }
        rendered
    }
}

/// The characters of `line` in `[start, end)`, clamped to the line.
fn slice_chars(line: &str, start: usize, end: Option<usize>) -> String {
    let chars = line.chars().skip(start);
    match end {
        Some(end) => chars.take(end.saturating_sub(start)).collect(),
        None => chars.collect(),
    }
}
