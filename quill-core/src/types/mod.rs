//! Semantic types: what the source language says an expression is.

mod registry;

pub use registry::{ParameterisedTypes, TypeRef, TypeRegistry};

use crate::{
    abi,
    wtypes::{Arc4Type, WType},
};

use std::{fmt, sync::Arc};

use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::{
    constants::{ARC4_MODULE, ARC4_NAMED_UINT_BITS, NATIVE_MODULE},
    SourceLocation,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SemanticType {
    None,
    Bool,
    UInt64,
    BigUInt,
    Bytes,
    String,
    IntLiteral,
    StrLiteral,
    BytesLiteral,
    Tuple(TupleType),
    Arc4UIntN(UIntNType),
    Arc4Bool,
    Arc4String,
    Arc4Tuple(TupleType),
    Arc4DynamicArray(ArrayType),
    Arc4StaticArray(StaticArrayType),
    Arc4Struct(StructType),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleType {
    items: Arc<[SemanticType]>,
}

impl TupleType {
    pub(crate) fn new(items: Vec<SemanticType>) -> Self {
        TupleType {
            items: items.into(),
        }
    }

    pub fn items(&self) -> &[SemanticType] {
        &self.items
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UIntNType {
    bits: u16,
}

impl UIntNType {
    pub fn bits(&self) -> u16 {
        self.bits
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayType {
    element: Arc<SemanticType>,
}

impl ArrayType {
    pub fn element(&self) -> &SemanticType {
        &self.element
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StaticArrayType {
    element: Arc<SemanticType>,
    size: u64,
}

impl StaticArrayType {
    pub fn element(&self) -> &SemanticType {
        &self.element
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructType {
    name: Arc<str>,
    fields: Arc<[(String, SemanticType)]>,
}

impl StructType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, SemanticType)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<(usize, &SemanticType)> {
        self.fields
            .iter()
            .find_position(|(field_name, _)| field_name == name)
            .map(|(index, (_, typ))| (index, typ))
    }
}

impl SemanticType {
    /// A `uintN` type, if `bits` is a valid width.
    pub fn arc4_uintn(bits: u16) -> Option<SemanticType> {
        abi::is_valid_bit_size(bits).then_some(SemanticType::Arc4UIntN(UIntNType { bits }))
    }

    /// A native tuple. Native tuples may hold values of any type.
    pub fn tuple(items: Vec<SemanticType>) -> SemanticType {
        SemanticType::Tuple(TupleType::new(items))
    }

    /// Fully qualified name, as shown in diagnostics.
    pub fn name(&self) -> String {
        match self {
            SemanticType::None => "None".to_string(),
            SemanticType::Bool => "bool".to_string(),
            SemanticType::UInt64 => format!("{NATIVE_MODULE}.UInt64"),
            SemanticType::BigUInt => format!("{NATIVE_MODULE}.BigUInt"),
            SemanticType::Bytes => format!("{NATIVE_MODULE}.Bytes"),
            SemanticType::String => format!("{NATIVE_MODULE}.String"),
            SemanticType::IntLiteral => "int".to_string(),
            SemanticType::StrLiteral => "str".to_string(),
            SemanticType::BytesLiteral => "bytes".to_string(),
            SemanticType::Tuple(tuple) => format!("tuple[{}]", join_names(tuple.items())),
            SemanticType::Arc4UIntN(UIntNType { bits }) => {
                if ARC4_NAMED_UINT_BITS.contains(bits) {
                    format!("{ARC4_MODULE}.UInt{bits}")
                } else {
                    format!("{ARC4_MODULE}.UIntN[typing.Literal[{bits}]]")
                }
            }
            SemanticType::Arc4Bool => format!("{ARC4_MODULE}.Bool"),
            SemanticType::Arc4String => format!("{ARC4_MODULE}.String"),
            SemanticType::Arc4Tuple(tuple) => {
                format!("{ARC4_MODULE}.Tuple[{}]", join_names(tuple.items()))
            }
            SemanticType::Arc4DynamicArray(array) => {
                format!("{ARC4_MODULE}.DynamicArray[{}]", array.element.name())
            }
            SemanticType::Arc4StaticArray(array) => format!(
                "{ARC4_MODULE}.StaticArray[{}, typing.Literal[{}]]",
                array.element.name(),
                array.size
            ),
            SemanticType::Arc4Struct(s) => s.name.to_string(),
        }
    }

    /// The generic type this type was parameterised from.
    pub fn generic(&self) -> Option<GenericType> {
        match self {
            SemanticType::Tuple(_) => Some(GenericType::Tuple),
            SemanticType::Arc4Tuple(_) => Some(GenericType::Arc4Tuple),
            SemanticType::Arc4DynamicArray(_) => Some(GenericType::Arc4DynamicArray),
            SemanticType::Arc4StaticArray(_) => Some(GenericType::Arc4StaticArray),
            SemanticType::Arc4UIntN(UIntNType { bits }) if !ARC4_NAMED_UINT_BITS.contains(bits) => {
                Some(GenericType::Arc4UIntN)
            }
            _ => None,
        }
    }

    /// The lowered type of values of this type. Literal types have none.
    pub fn wtype(&self) -> Option<WType> {
        match self {
            SemanticType::None => Some(WType::Void),
            SemanticType::Bool => Some(WType::Bool),
            SemanticType::UInt64 => Some(WType::Uint64),
            SemanticType::BigUInt => Some(WType::Biguint),
            SemanticType::Bytes => Some(WType::Bytes),
            SemanticType::String => Some(WType::String),
            SemanticType::IntLiteral | SemanticType::StrLiteral | SemanticType::BytesLiteral => {
                None
            }
            SemanticType::Tuple(tuple) => tuple
                .items()
                .iter()
                .map(SemanticType::wtype)
                .collect::<Option<Vec<_>>>()
                .map(|types| WType::WTuple { types }),
            _ => self.arc4_type().map(WType::Arc4),
        }
    }

    /// The ARC4 encoding of this type, for ABI encoded types only.
    pub fn arc4_type(&self) -> Option<Arc4Type> {
        let typ = match self {
            SemanticType::Arc4UIntN(UIntNType { bits }) => Arc4Type::UIntN { bits: *bits },
            SemanticType::Arc4Bool => Arc4Type::Bool,
            SemanticType::Arc4String => Arc4Type::String,
            SemanticType::Arc4Tuple(tuple) => Arc4Type::Tuple {
                types: tuple
                    .items()
                    .iter()
                    .map(SemanticType::arc4_type)
                    .collect::<Option<_>>()?,
            },
            SemanticType::Arc4DynamicArray(array) => Arc4Type::DynamicArray {
                element: Box::new(array.element.arc4_type()?),
            },
            SemanticType::Arc4StaticArray(array) => Arc4Type::StaticArray {
                element: Box::new(array.element.arc4_type()?),
                size: array.size,
            },
            SemanticType::Arc4Struct(s) => Arc4Type::Struct {
                name: s.name.to_string(),
                fields: s
                    .fields
                    .iter()
                    .map(|(name, typ)| typ.arc4_type().map(|typ| (name.clone(), typ)))
                    .collect::<Option<_>>()?,
            },
            _ => return None,
        };
        Some(typ)
    }

    pub fn is_arc4(&self) -> bool {
        matches!(
            self,
            SemanticType::Arc4UIntN(_)
                | SemanticType::Arc4Bool
                | SemanticType::Arc4String
                | SemanticType::Arc4Tuple(_)
                | SemanticType::Arc4DynamicArray(_)
                | SemanticType::Arc4StaticArray(_)
                | SemanticType::Arc4Struct(_)
        )
    }

    /// The type an ABI encoded value decodes to.
    pub fn native_type(&self) -> Option<SemanticType> {
        match self {
            SemanticType::Arc4UIntN(UIntNType { bits }) if *bits <= 64 => {
                Some(SemanticType::UInt64)
            }
            SemanticType::Arc4UIntN(_) => Some(SemanticType::BigUInt),
            SemanticType::Arc4Bool => Some(SemanticType::Bool),
            SemanticType::Arc4String => Some(SemanticType::String),
            SemanticType::Arc4Tuple(tuple) => Some(SemanticType::Tuple(tuple.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn join_names(items: &[SemanticType]) -> String {
    items.iter().map(SemanticType::name).join(", ")
}

/// An argument to a [GenericType].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeArg {
    Type(SemanticType),
    /// A `typing.Literal` argument, such as a bit width or an array size.
    Literal(BigInt),
}

/// A type that needs arguments before values of it can exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenericType {
    Tuple,
    Arc4Tuple,
    Arc4DynamicArray,
    Arc4StaticArray,
    Arc4UIntN,
}

impl GenericType {
    pub fn name(&self) -> String {
        match self {
            GenericType::Tuple => "tuple".to_string(),
            GenericType::Arc4Tuple => format!("{ARC4_MODULE}.Tuple"),
            GenericType::Arc4DynamicArray => format!("{ARC4_MODULE}.DynamicArray"),
            GenericType::Arc4StaticArray => format!("{ARC4_MODULE}.StaticArray"),
            GenericType::Arc4UIntN => format!("{ARC4_MODULE}.UIntN"),
        }
    }

    /// Applies `args`, validating that the result is a well formed type.
    pub fn parameterise(
        &self,
        handler: &Handler,
        args: &[TypeArg],
        location: &SourceLocation,
    ) -> Result<SemanticType, ErrorEmitted> {
        let invalid = || {
            handler.emit_err(CompileError::InvalidArguments {
                location: location.clone(),
            })
        };
        match (self, args) {
            (GenericType::Tuple, args) => {
                let items = type_args(args).ok_or_else(invalid)?;
                Ok(SemanticType::tuple(items))
            }
            (GenericType::Arc4Tuple, args) => {
                let items = type_args(args).ok_or_else(invalid)?;
                let wtypes = items
                    .iter()
                    .map(|item| element_wtype(handler, item, "tuple", location))
                    .collect::<Result<Vec<_>, _>>()?;
                abi::make_tuple_wtype(handler, &wtypes, location)?;
                Ok(SemanticType::Arc4Tuple(TupleType::new(items)))
            }
            (GenericType::Arc4DynamicArray, [TypeArg::Type(element)]) => {
                let wtype = element_wtype(handler, element, "array", location)?;
                abi::make_dynamic_array_wtype(handler, &wtype, location)?;
                Ok(SemanticType::Arc4DynamicArray(ArrayType {
                    element: Arc::new(element.clone()),
                }))
            }
            (GenericType::Arc4StaticArray, [TypeArg::Type(element), TypeArg::Literal(size)]) => {
                let Some(size) = size.to_u64() else {
                    return Err(handler.emit_err(CompileError::InvalidArraySize {
                        size: size.clone(),
                        location: location.clone(),
                    }));
                };
                let wtype = element_wtype(handler, element, "array", location)?;
                abi::make_static_array_wtype(handler, &wtype, size, location)?;
                Ok(SemanticType::Arc4StaticArray(StaticArrayType {
                    element: Arc::new(element.clone()),
                    size,
                }))
            }
            (GenericType::Arc4UIntN, [TypeArg::Literal(bits)]) => {
                match abi::make_uintn_wtype(handler, bits, location)? {
                    Arc4Type::UIntN { bits } => Ok(SemanticType::Arc4UIntN(UIntNType { bits })),
                    other => Err(handler.emit_err(CompileError::internal(
                        format!("uintN construction produced {other}"),
                        location.clone(),
                    ))),
                }
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn type_args(args: &[TypeArg]) -> Option<Vec<SemanticType>> {
    args.iter()
        .map(|arg| match arg {
            TypeArg::Type(typ) => Some(typ.clone()),
            TypeArg::Literal(_) => None,
        })
        .collect()
}

fn element_wtype(
    handler: &Handler,
    element: &SemanticType,
    container: &'static str,
    location: &SourceLocation,
) -> Result<WType, ErrorEmitted> {
    element.wtype().ok_or_else(|| {
        handler.emit_err(CompileError::InvalidElementType {
            container,
            type_name: element.name(),
            location: location.clone(),
        })
    })
}

/// Builds a struct type from fields that have already been validated.
pub(crate) fn struct_type(name: &str, fields: Vec<(String, SemanticType)>) -> SemanticType {
    SemanticType::Arc4Struct(StructType {
        name: name.into(),
        fields: fields.into(),
    })
}
