use core::fmt;

use quill_types::{Located, SourceLocation};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompileWarning {
    pub location: Option<SourceLocation>,
    pub warning_content: Warning,
}

impl CompileWarning {
    pub fn new(warning_content: Warning, location: Option<SourceLocation>) -> Self {
        CompileWarning {
            location,
            warning_content,
        }
    }

    pub fn to_friendly_warning_string(&self) -> String {
        self.warning_content.to_string()
    }
}

impl Located for CompileWarning {
    fn source_location(&self) -> Option<SourceLocation> {
        self.location.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    /// The source text of a diagnostic could not be loaded, so it is reported without a snippet.
    CouldNotLocateSource { location: String },
    /// The value of an expression that has no side effects is discarded.
    UnusedValue { type_name: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Warning::*;
        match self {
            CouldNotLocateSource { location } => write!(f, "Could not locate source: {location}"),
            UnusedValue { type_name } => {
                write!(f, "Expression of type {type_name} has no effect")
            }
        }
    }
}
