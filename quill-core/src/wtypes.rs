//! Lowered value types.
//!
//! A [WType] is what an AWST node evaluates to at runtime. Native types map directly onto the
//! virtual machine's stack values, while [Arc4Type]s describe byte strings in the ARC4 ABI
//! encoding.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WType {
    Void,
    Bool,
    Uint64,
    Biguint,
    Bytes,
    String,
    /// A native tuple, held as separate stack values.
    WTuple { types: Vec<WType> },
    Arc4(Arc4Type),
}

impl WType {
    pub fn is_arc4(&self) -> bool {
        matches!(self, WType::Arc4(_))
    }

    pub fn as_arc4(&self) -> Option<&Arc4Type> {
        match self {
            WType::Arc4(typ) => Some(typ),
            _ => None,
        }
    }

    pub fn tuple(types: impl IntoIterator<Item = WType>) -> WType {
        WType::WTuple {
            types: types.into_iter().collect(),
        }
    }
}

impl From<Arc4Type> for WType {
    fn from(typ: Arc4Type) -> Self {
        WType::Arc4(typ)
    }
}

impl fmt::Display for WType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WType::Void => write!(f, "void"),
            WType::Bool => write!(f, "bool"),
            WType::Uint64 => write!(f, "uint64"),
            WType::Biguint => write!(f, "biguint"),
            WType::Bytes => write!(f, "bytes"),
            WType::String => write!(f, "string"),
            WType::WTuple { types } => write!(f, "tuple<{}>", types.iter().join(",")),
            WType::Arc4(typ) => typ.fmt(f),
        }
    }
}

/// The lowered form of a value in the ARC4 ABI encoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Arc4Type {
    UIntN {
        bits: u16,
    },
    Bool,
    String,
    DynamicArray {
        element: Box<Arc4Type>,
    },
    StaticArray {
        element: Box<Arc4Type>,
        size: u64,
    },
    Tuple {
        types: Vec<Arc4Type>,
    },
    /// Encoded exactly like a tuple of its field types.
    Struct {
        name: String,
        fields: Vec<(String, Arc4Type)>,
    },
}

impl Arc4Type {
    /// The canonical ABI name, as used in method signatures.
    pub fn arc4_name(&self) -> String {
        match self {
            Arc4Type::UIntN { bits } => format!("uint{bits}"),
            Arc4Type::Bool => "bool".to_string(),
            Arc4Type::String => "string".to_string(),
            Arc4Type::DynamicArray { element } => format!("{}[]", element.arc4_name()),
            Arc4Type::StaticArray { element, size } => {
                format!("{}[{size}]", element.arc4_name())
            }
            Arc4Type::Tuple { types } => {
                format!("({})", types.iter().map(Arc4Type::arc4_name).join(","))
            }
            Arc4Type::Struct { fields, .. } => format!(
                "({})",
                fields.iter().map(|(_, typ)| typ.arc4_name()).join(",")
            ),
        }
    }

    /// Whether the encoded size depends on the value.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Arc4Type::UIntN { .. } | Arc4Type::Bool => false,
            Arc4Type::String | Arc4Type::DynamicArray { .. } => true,
            Arc4Type::StaticArray { element, .. } => element.is_dynamic(),
            Arc4Type::Tuple { types } => types.iter().any(Arc4Type::is_dynamic),
            Arc4Type::Struct { fields, .. } => fields.iter().any(|(_, typ)| typ.is_dynamic()),
        }
    }

    /// The encoded size in bytes, or `None` for dynamic types.
    pub fn static_size(&self) -> Option<u64> {
        crate::abi::static_size(self)
    }

    /// The item types of a tuple or struct.
    pub fn items(&self) -> Option<Vec<&Arc4Type>> {
        match self {
            Arc4Type::Tuple { types } => Some(types.iter().collect()),
            Arc4Type::Struct { fields, .. } => Some(fields.iter().map(|(_, typ)| typ).collect()),
            _ => None,
        }
    }

    /// The native type that decoding a value of this type yields, if there is one.
    pub fn native_wtype(&self) -> Option<WType> {
        match self {
            Arc4Type::UIntN { bits } if *bits <= 64 => Some(WType::Uint64),
            Arc4Type::UIntN { .. } => Some(WType::Biguint),
            Arc4Type::Bool => Some(WType::Bool),
            Arc4Type::String => Some(WType::String),
            Arc4Type::Tuple { types } => Some(WType::tuple(types.iter().cloned().map(WType::Arc4))),
            Arc4Type::DynamicArray { .. }
            | Arc4Type::StaticArray { .. }
            | Arc4Type::Struct { .. } => None,
        }
    }
}

impl fmt::Display for Arc4Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arc4Type::UIntN { bits } => write!(f, "arc4.uint{bits}"),
            Arc4Type::Bool => write!(f, "arc4.bool"),
            Arc4Type::String => write!(f, "arc4.string"),
            Arc4Type::DynamicArray { element } => write!(f, "arc4.dynamic_array<{element}>"),
            Arc4Type::StaticArray { element, size } => {
                write!(f, "arc4.static_array<{element},{size}>")
            }
            Arc4Type::Tuple { types } => write!(f, "arc4.tuple<{}>", types.iter().join(",")),
            Arc4Type::Struct { name, .. } => write!(f, "arc4.struct<{name}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(bits: u16) -> Arc4Type {
        Arc4Type::UIntN { bits }
    }

    #[test]
    fn abi_names() {
        let point = Arc4Type::Struct {
            name: "contract.Point".into(),
            fields: vec![("x".into(), uint(64)), ("flag".into(), Arc4Type::Bool)],
        };
        let nested = Arc4Type::Tuple {
            types: vec![
                Arc4Type::DynamicArray {
                    element: Box::new(uint(8)),
                },
                Arc4Type::StaticArray {
                    element: Box::new(Arc4Type::String),
                    size: 4,
                },
                point,
            ],
        };
        assert_eq!(nested.arc4_name(), "(uint8[],string[4],(uint64,bool))");
    }

    #[test]
    fn dynamic_types() {
        assert!(!uint(256).is_dynamic());
        assert!(Arc4Type::String.is_dynamic());
        assert!(!Arc4Type::StaticArray {
            element: Box::new(Arc4Type::Bool),
            size: 3
        }
        .is_dynamic());
        assert!(Arc4Type::StaticArray {
            element: Box::new(Arc4Type::String),
            size: 3
        }
        .is_dynamic());
        assert!(Arc4Type::Tuple {
            types: vec![uint(8), Arc4Type::String]
        }
        .is_dynamic());
    }

    #[test]
    fn tuple_wtypes_compare_structurally() {
        let a = WType::Arc4(Arc4Type::Tuple {
            types: vec![uint(64), Arc4Type::Bool],
        });
        let b = WType::Arc4(Arc4Type::Tuple {
            types: vec![uint(64), Arc4Type::Bool],
        });
        let c = WType::Arc4(Arc4Type::Tuple {
            types: vec![Arc4Type::Bool, uint(64)],
        });
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "arc4.tuple<arc4.uint64,arc4.bool>");
    }

    #[test]
    fn native_counterparts() {
        assert_eq!(uint(64).native_wtype(), Some(WType::Uint64));
        assert_eq!(uint(72).native_wtype(), Some(WType::Biguint));
        assert_eq!(
            Arc4Type::Tuple {
                types: vec![Arc4Type::Bool]
            }
            .native_wtype(),
            Some(WType::tuple([WType::Arc4(Arc4Type::Bool)]))
        );
        assert_eq!(
            Arc4Type::DynamicArray {
                element: Box::new(Arc4Type::Bool)
            }
            .native_wtype(),
            None
        );
    }
}
