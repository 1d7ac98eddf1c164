use crate::types::SemanticType;

use std::fmt;

use num_bigint::BigInt;
use quill_types::{Located, SourceLocation};

/// A compile time constant that has not been given a lowered type yet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    pub value: LiteralValue,
    pub source_location: SourceLocation,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Int(BigInt),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
}

impl Literal {
    pub fn new(value: LiteralValue, source_location: SourceLocation) -> Self {
        Literal {
            value,
            source_location,
        }
    }

    pub fn int(value: impl Into<BigInt>, source_location: SourceLocation) -> Self {
        Self::new(LiteralValue::Int(value.into()), source_location)
    }

    pub fn bool(value: bool, source_location: SourceLocation) -> Self {
        Self::new(LiteralValue::Bool(value), source_location)
    }

    pub fn str(value: impl Into<String>, source_location: SourceLocation) -> Self {
        Self::new(LiteralValue::Str(value.into()), source_location)
    }

    pub fn pytype(&self) -> SemanticType {
        match self.value {
            LiteralValue::Int(_) => SemanticType::IntLiteral,
            LiteralValue::Bool(_) => SemanticType::Bool,
            LiteralValue::Bytes(_) => SemanticType::BytesLiteral,
            LiteralValue::Str(_) => SemanticType::StrLiteral,
        }
    }
}

impl Located for Literal {
    fn source_location(&self) -> Option<SourceLocation> {
        Some(self.source_location.clone())
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(value) => write!(f, "{value}"),
            LiteralValue::Bool(true) => write!(f, "True"),
            LiteralValue::Bool(false) => write!(f, "False"),
            LiteralValue::Bytes(value) => write!(f, "b\"{}\"", value.escape_ascii()),
            LiteralValue::Str(value) => write!(f, "{value:?}"),
        }
    }
}
