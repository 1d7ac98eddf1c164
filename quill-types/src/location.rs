use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

/// A region of a source file.
///
/// Lines are one-indexed. Columns are zero-indexed character offsets into their line, and
/// `end_column` is exclusive. Either column may be unknown, in which case the region extends to
/// the start (or end) of the respective line.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    file: Arc<PathBuf>,
    line: usize,
    end_line: Option<usize>,
    column: Option<usize>,
    end_column: Option<usize>,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        SourceLocation {
            file: Arc::new(file.into()),
            line,
            end_line: None,
            column: None,
            end_column: None,
        }
    }

    /// A location spanning the given lines, without column information.
    pub fn lines(file: impl Into<PathBuf>, line: usize, end_line: usize) -> Self {
        Self::new(file, line).with_end_line(end_line)
    }

    pub fn with_end_line(self, end_line: usize) -> Self {
        Self {
            end_line: Some(end_line),
            ..self
        }
    }

    pub fn with_column(self, column: usize) -> Self {
        Self {
            column: Some(column),
            ..self
        }
    }

    pub fn with_end_column(self, end_column: usize) -> Self {
        Self {
            end_column: Some(end_column),
            ..self
        }
    }

    /// A location on a single line, covering `[column, end_column)`.
    pub fn span(file: impl Into<PathBuf>, line: usize, column: usize, end_column: usize) -> Self {
        Self::new(file, line)
            .with_column(column)
            .with_end_column(end_column)
    }

    pub fn file(&self) -> &Path {
        self.file.as_path()
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn end_line(&self) -> Option<usize> {
        self.end_line
    }

    /// The last line of the location, which is `line` for single line locations.
    pub fn last_line(&self) -> usize {
        self.end_line.unwrap_or(self.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn end_column(&self) -> Option<usize> {
        self.end_column
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)?;
        match self.end_line {
            Some(end_line) if end_line != self.line => write!(f, "-{end_line}"),
            _ => Ok(()),
        }
    }
}

/// Anything that can point back at the source it was built from.
pub trait Located {
    fn source_location(&self) -> Option<SourceLocation>;
}

impl Located for SourceLocation {
    fn source_location(&self) -> Option<SourceLocation> {
        Some(self.clone())
    }
}

impl<T: Located> Located for Option<T> {
    fn source_location(&self) -> Option<SourceLocation> {
        self.as_ref().and_then(Located::source_location)
    }
}
