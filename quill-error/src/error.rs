use crate::formatting::{plural_s, quoted_list};

use num_bigint::BigInt;
use quill_types::{Located, SourceLocation};
use thiserror::Error;

/// The class of a [CompileError], independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value's type does not match the expected ABI layout.
    TypeMismatch,
    /// Call arguments match none of the accepted shapes.
    InvalidArguments,
    /// An index that must be a compile time constant is not one.
    NonConstantIndex,
    /// A constant index lies outside of the indexed value.
    IndexOutOfBounds,
    /// The operation is not defined for the type it is applied to.
    UnsupportedOperation,
    /// A type cannot be formed from the given parameters.
    InvalidType,
    /// A literal does not fit the type it is converted to.
    InvalidLiteral,
    /// An internal consistency check failed.
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompileError {
    #[error("Invalid/unhandled arguments")]
    InvalidArguments { location: SourceLocation },
    #[error("Invalid arg type: expected {expected}, got {found}")]
    InvalidArgType {
        expected: String,
        found: String,
        location: SourceLocation,
    },
    #[error("Expected a value of type {expected}, got {found}")]
    MismatchedType {
        expected: String,
        found: String,
        location: SourceLocation,
    },
    #[error("{type_name} can only be indexed by int constants")]
    NonConstantIndex {
        type_name: String,
        location: SourceLocation,
    },
    #[error("{type_name} can only be indexed by int constants or uint64 values")]
    InvalidIndexType {
        type_name: String,
        location: SourceLocation,
    },
    #[error("Tuple index out of bounds")]
    TupleIndexOutOfBounds {
        index: BigInt,
        count: usize,
        location: SourceLocation,
    },
    #[error("Array index out of bounds: index {index} is not less than the array size of {size}")]
    ArrayIndexOutOfBounds {
        index: BigInt,
        size: u64,
        location: SourceLocation,
    },
    #[error("{operation} is not supported for {type_name}")]
    UnsupportedOperation {
        operation: &'static str,
        type_name: String,
        location: SourceLocation,
    },
    #[error("{type_name} has no attribute \"{name}\"")]
    UnknownMember {
        type_name: String,
        name: String,
        location: SourceLocation,
    },
    #[error("Invalid type for {container} element: {type_name}")]
    InvalidElementType {
        container: &'static str,
        type_name: String,
        location: SourceLocation,
    },
    #[error("Empty tuples are not supported by the ARC4 encoding")]
    EmptyTuple { location: SourceLocation },
    #[error("Bit size must be a multiple of 8 between 8 and 512 inclusive, got {bits}")]
    InvalidBitSize { bits: BigInt, location: SourceLocation },
    #[error("Array size must be a non-negative integer constant, got {size}")]
    InvalidArraySize { size: BigInt, location: SourceLocation },
    #[error(
        "The encoded head of {type_name} is {size} bytes, which exceeds the maximum of {max} bytes"
    )]
    EncodedHeadTooLarge {
        type_name: String,
        size: u64,
        max: u64,
        location: SourceLocation,
    },
    #[error("{value} is not a valid {type_name} value")]
    LiteralOutOfRange {
        value: BigInt,
        type_name: String,
        location: SourceLocation,
    },
    #[error(
        "{type_name} expects {expected} element{}, got {found}",
        plural_s(*expected as usize)
    )]
    ArraySizeMismatch {
        type_name: String,
        expected: u64,
        found: usize,
        location: SourceLocation,
    },
    #[error("Empty arrays require a type annotation")]
    CannotInferElementType { location: SourceLocation },
    #[error("Struct \"{struct_name}\" has no field named \"{field_name}\"")]
    UnknownStructField {
        struct_name: String,
        field_name: String,
        location: SourceLocation,
    },
    #[error("Field \"{field_name}\" of struct \"{struct_name}\" was given more than once")]
    DuplicateStructField {
        struct_name: String,
        field_name: String,
        location: SourceLocation,
    },
    #[error(
        "Struct \"{struct_name}\" is missing value{} for {}",
        plural_s(field_names.len()),
        quoted_list(field_names, 4)
    )]
    MissingStructFields {
        struct_name: String,
        field_names: Vec<String>,
        location: SourceLocation,
    },
    #[error("Type \"{name}\" could not be resolved")]
    UnknownType {
        name: String,
        location: SourceLocation,
    },
    #[error("{type_name} is a type and cannot be used as a value")]
    TypeUsedAsValue {
        type_name: String,
        location: SourceLocation,
    },
    #[error(
        "Internal compiler error: {0}\nPlease file an issue on the repository and include the \
         code that triggered this error."
    )]
    Internal(String, Option<SourceLocation>),
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        use CompileError::*;
        match self {
            InvalidArguments { .. } => ErrorKind::InvalidArguments,
            InvalidArgType { .. } | MismatchedType { .. } => ErrorKind::TypeMismatch,
            NonConstantIndex { .. } | InvalidIndexType { .. } => ErrorKind::NonConstantIndex,
            TupleIndexOutOfBounds { .. } | ArrayIndexOutOfBounds { .. } => {
                ErrorKind::IndexOutOfBounds
            }
            UnsupportedOperation { .. } | UnknownMember { .. } | TypeUsedAsValue { .. } => {
                ErrorKind::UnsupportedOperation
            }
            InvalidElementType { .. }
            | EmptyTuple { .. }
            | InvalidBitSize { .. }
            | InvalidArraySize { .. }
            | EncodedHeadTooLarge { .. }
            | UnknownType { .. } => ErrorKind::InvalidType,
            ArraySizeMismatch { .. }
            | CannotInferElementType { .. }
            | UnknownStructField { .. }
            | DuplicateStructField { .. }
            | MissingStructFields { .. } => ErrorKind::InvalidArguments,
            LiteralOutOfRange { .. } => ErrorKind::InvalidLiteral,
            Internal(..) => ErrorKind::Internal,
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        use CompileError::*;
        match self {
            InvalidArguments { location }
            | InvalidArgType { location, .. }
            | MismatchedType { location, .. }
            | NonConstantIndex { location, .. }
            | InvalidIndexType { location, .. }
            | TupleIndexOutOfBounds { location, .. }
            | ArrayIndexOutOfBounds { location, .. }
            | UnsupportedOperation { location, .. }
            | UnknownMember { location, .. }
            | InvalidElementType { location, .. }
            | EmptyTuple { location }
            | InvalidBitSize { location, .. }
            | InvalidArraySize { location, .. }
            | EncodedHeadTooLarge { location, .. }
            | LiteralOutOfRange { location, .. }
            | ArraySizeMismatch { location, .. }
            | CannotInferElementType { location }
            | UnknownStructField { location, .. }
            | DuplicateStructField { location, .. }
            | MissingStructFields { location, .. }
            | UnknownType { location, .. }
            | TypeUsedAsValue { location, .. } => Some(location),
            Internal(_, location) => location.as_ref(),
        }
    }

    pub fn internal(msg: impl Into<String>, location: impl Located) -> Self {
        CompileError::Internal(msg.into(), location.source_location())
    }
}

impl Located for CompileError {
    fn source_location(&self) -> Option<SourceLocation> {
        self.location().cloned()
    }
}
