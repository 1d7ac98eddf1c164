//! The ARC4 ABI encoding: validated construction of encoded types and their head layouts.

mod layout;

pub use layout::{static_size, ItemEncoding, ItemLayout, TupleLayout};

use crate::wtypes::{Arc4Type, WType};

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::{
    constants::{ARC4_UINTN_MAX_BITS, ARC4_UINTN_MIN_BITS},
    SourceLocation,
};

/// Validates a `uintN` bit width.
pub fn make_uintn_wtype(
    handler: &Handler,
    bits: &BigInt,
    location: &SourceLocation,
) -> Result<Arc4Type, ErrorEmitted> {
    match bits.to_u16() {
        Some(bits) if is_valid_bit_size(bits) => Ok(Arc4Type::UIntN { bits }),
        _ => Err(handler.emit_err(CompileError::InvalidBitSize {
            bits: bits.clone(),
            location: location.clone(),
        })),
    }
}

pub(crate) fn is_valid_bit_size(bits: u16) -> bool {
    (ARC4_UINTN_MIN_BITS..=ARC4_UINTN_MAX_BITS).contains(&bits) && bits % 8 == 0
}

/// The encoded tuple of `types`, which must all be ARC4 encoded.
pub fn make_tuple_wtype(
    handler: &Handler,
    types: &[WType],
    location: &SourceLocation,
) -> Result<Arc4Type, ErrorEmitted> {
    if types.is_empty() {
        return Err(handler.emit_err(CompileError::EmptyTuple {
            location: location.clone(),
        }));
    }
    let types = types
        .iter()
        .map(|wtype| arc4_item(handler, wtype, "tuple", location))
        .collect::<Result<Vec<_>, _>>()?;
    let typ = Arc4Type::Tuple { types };
    TupleLayout::compute(handler, &typ, location)?;
    Ok(typ)
}

pub fn make_dynamic_array_wtype(
    handler: &Handler,
    element: &WType,
    location: &SourceLocation,
) -> Result<Arc4Type, ErrorEmitted> {
    let element = arc4_item(handler, element, "array", location)?;
    Ok(Arc4Type::DynamicArray {
        element: Box::new(element),
    })
}

pub fn make_static_array_wtype(
    handler: &Handler,
    element: &WType,
    size: u64,
    location: &SourceLocation,
) -> Result<Arc4Type, ErrorEmitted> {
    let element = arc4_item(handler, element, "array", location)?;
    let typ = Arc4Type::StaticArray {
        element: Box::new(element),
        size,
    };
    TupleLayout::compute(handler, &typ, location)?;
    Ok(typ)
}

pub fn make_struct_wtype(
    handler: &Handler,
    name: &str,
    fields: &[(String, WType)],
    location: &SourceLocation,
) -> Result<Arc4Type, ErrorEmitted> {
    if fields.is_empty() {
        return Err(handler.emit_err(CompileError::EmptyTuple {
            location: location.clone(),
        }));
    }
    let fields = fields
        .iter()
        .map(|(field_name, wtype)| {
            arc4_item(handler, wtype, "struct", location).map(|typ| (field_name.clone(), typ))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let typ = Arc4Type::Struct {
        name: name.to_string(),
        fields,
    };
    TupleLayout::compute(handler, &typ, location)?;
    Ok(typ)
}

fn arc4_item(
    handler: &Handler,
    wtype: &WType,
    container: &'static str,
    location: &SourceLocation,
) -> Result<Arc4Type, ErrorEmitted> {
    match wtype {
        WType::Arc4(typ) => Ok(typ.clone()),
        other => Err(handler.emit_err(CompileError::InvalidElementType {
            container,
            type_name: other.to_string(),
            location: location.clone(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 3)
    }

    #[test]
    fn bit_sizes() {
        let handler = Handler::default();
        assert_eq!(
            make_uintn_wtype(&handler, &BigInt::from(256), &loc()),
            Ok(Arc4Type::UIntN { bits: 256 })
        );
        for bad in [0, 7, 12, 520, -8] {
            assert!(make_uintn_wtype(&handler, &BigInt::from(bad), &loc()).is_err());
        }
        assert_eq!(handler.error_count(), 5);
    }

    #[test]
    fn tuple_items_must_be_encoded() {
        let handler = Handler::default();
        let result = make_tuple_wtype(
            &handler,
            &[WType::Arc4(Arc4Type::Bool), WType::Uint64],
            &loc(),
        );
        assert!(result.is_err());
        assert_eq!(
            handler.errors()[0].to_string(),
            "Invalid type for tuple element: uint64"
        );
    }

    #[test]
    fn empty_tuples_are_rejected() {
        let handler = Handler::default();
        assert!(make_tuple_wtype(&handler, &[], &loc()).is_err());
        assert!(matches!(
            handler.errors().as_slice(),
            [CompileError::EmptyTuple { .. }]
        ));
    }

    #[test]
    fn struct_fields_keep_their_order() {
        let handler = Handler::default();
        let typ = make_struct_wtype(
            &handler,
            "contract.Point",
            &[
                ("y".into(), WType::Arc4(Arc4Type::UIntN { bits: 64 })),
                ("x".into(), WType::Arc4(Arc4Type::String)),
            ],
            &loc(),
        )
        .unwrap();
        assert_eq!(typ.arc4_name(), "(uint64,string)");
    }
}
