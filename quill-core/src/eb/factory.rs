//! Maps semantic types to the builders that handle them.

use super::{
    Arc4BoolClassExpressionBuilder, Arc4BoolExpressionBuilder, Arc4StringClassExpressionBuilder,
    Arc4StringExpressionBuilder, Arc4StructClassExpressionBuilder, Arc4StructExpressionBuilder,
    Arc4TupleClassExpressionBuilder, Arc4TupleExpressionBuilder,
    Arc4TupleGenericClassExpressionBuilder, BigUIntExpressionBuilder, BoolExpressionBuilder,
    BytesExpressionBuilder, DynamicArrayClassExpressionBuilder, DynamicArrayExpressionBuilder,
    ExpressionBuilder, StaticArrayClassExpressionBuilder, StaticArrayExpressionBuilder,
    StringExpressionBuilder, TupleExpressionBuilder, UInt64ExpressionBuilder,
    UIntNClassExpressionBuilder, UIntNExpressionBuilder,
};
use crate::{
    awst::{Expression, Literal},
    types::{GenericType, ParameterisedTypes, SemanticType, TypeRef},
};

use std::sync::Arc;

use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::SourceLocation;

/// The instance builder for a value `expr` of type `pytype`.
pub fn builder_for_instance(
    handler: &Handler,
    pytype: &SemanticType,
    expr: Arc<Expression>,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    if pytype.wtype().as_ref() != Some(&expr.wtype) {
        return Err(handler.emit_err(CompileError::internal(
            format!(
                "a value lowered to {} cannot have type {}",
                expr.wtype, pytype
            ),
            expr.source_location.clone(),
        )));
    }
    let eb = match pytype {
        SemanticType::UInt64 => ExpressionBuilder::UInt64(UInt64ExpressionBuilder::new(expr)),
        SemanticType::BigUInt => ExpressionBuilder::BigUInt(BigUIntExpressionBuilder::new(expr)),
        SemanticType::Bool => ExpressionBuilder::Bool(BoolExpressionBuilder::new(expr)),
        SemanticType::Bytes => ExpressionBuilder::Bytes(BytesExpressionBuilder::new(expr)),
        SemanticType::String => ExpressionBuilder::String(StringExpressionBuilder::new(expr)),
        SemanticType::Tuple(typ) => {
            ExpressionBuilder::Tuple(TupleExpressionBuilder::new(expr, typ.clone()))
        }
        SemanticType::Arc4UIntN(typ) => {
            ExpressionBuilder::Arc4UIntN(UIntNExpressionBuilder::new(expr, *typ))
        }
        SemanticType::Arc4Bool => ExpressionBuilder::Arc4Bool(Arc4BoolExpressionBuilder::new(expr)),
        SemanticType::Arc4String => {
            ExpressionBuilder::Arc4String(Arc4StringExpressionBuilder::new(expr))
        }
        SemanticType::Arc4Tuple(typ) => {
            ExpressionBuilder::Arc4Tuple(Arc4TupleExpressionBuilder::new(expr, typ.clone()))
        }
        SemanticType::Arc4DynamicArray(typ) => ExpressionBuilder::Arc4DynamicArray(
            DynamicArrayExpressionBuilder::new(expr, typ.clone()),
        ),
        SemanticType::Arc4StaticArray(typ) => ExpressionBuilder::Arc4StaticArray(
            StaticArrayExpressionBuilder::new(expr, typ.clone()),
        ),
        SemanticType::Arc4Struct(typ) => {
            ExpressionBuilder::Arc4Struct(Arc4StructExpressionBuilder::new(expr, typ.clone()))
        }
        SemanticType::None
        | SemanticType::IntLiteral
        | SemanticType::StrLiteral
        | SemanticType::BytesLiteral => {
            return Err(handler.emit_err(CompileError::UnsupportedOperation {
                operation: "Using a value",
                type_name: pytype.name(),
                location: expr.source_location.clone(),
            }))
        }
    };
    Ok(eb)
}

/// The builder for a variable `name` of type `pytype`.
pub fn builder_for_var(
    handler: &Handler,
    name: &str,
    pytype: &SemanticType,
    location: SourceLocation,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    let Some(wtype) = pytype.wtype() else {
        return Err(handler.emit_err(CompileError::UnsupportedOperation {
            operation: "Declaring a variable",
            type_name: pytype.name(),
            location,
        }));
    };
    builder_for_instance(handler, pytype, Expression::var(name, wtype, location))
}

/// The class builder for a reference to the type `pytype` at `location`.
pub fn builder_for_type(
    handler: &Handler,
    pytype: &SemanticType,
    location: &SourceLocation,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    let location = location.clone();
    let eb = match pytype {
        SemanticType::Arc4UIntN(typ) => ExpressionBuilder::Arc4UIntNClass(
            UIntNClassExpressionBuilder::new(*typ, location),
        ),
        SemanticType::Arc4Bool => {
            ExpressionBuilder::Arc4BoolClass(Arc4BoolClassExpressionBuilder::new(location))
        }
        SemanticType::Arc4String => {
            ExpressionBuilder::Arc4StringClass(Arc4StringClassExpressionBuilder::new(location))
        }
        SemanticType::Arc4Tuple(typ) => ExpressionBuilder::Arc4TupleClass(
            Arc4TupleClassExpressionBuilder::new(typ.clone(), location),
        ),
        SemanticType::Arc4DynamicArray(typ) => ExpressionBuilder::Arc4DynamicArrayClass(
            DynamicArrayClassExpressionBuilder::new(typ.clone(), location),
        ),
        SemanticType::Arc4StaticArray(typ) => ExpressionBuilder::Arc4StaticArrayClass(
            StaticArrayClassExpressionBuilder::new(typ.clone(), location),
        ),
        SemanticType::Arc4Struct(typ) => ExpressionBuilder::Arc4StructClass(
            Arc4StructClassExpressionBuilder::new(typ.clone(), location),
        ),
        _ => {
            return Err(handler.emit_err(CompileError::UnsupportedOperation {
                operation: "Constructing a value",
                type_name: format!("type[{pytype}]"),
                location,
            }))
        }
    };
    Ok(eb)
}

/// The class builder for an unparameterised reference to `generic`. Types inferred by the
/// builder are interned in `types`.
pub fn builder_for_generic(
    handler: &Handler,
    generic: GenericType,
    types: &ParameterisedTypes,
    location: &SourceLocation,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    let location = location.clone();
    let eb = match generic {
        GenericType::Arc4Tuple => ExpressionBuilder::Arc4TupleGenericClass(
            Arc4TupleGenericClassExpressionBuilder::new(types.clone(), location),
        ),
        GenericType::Arc4DynamicArray => ExpressionBuilder::Arc4DynamicArrayClass(
            DynamicArrayClassExpressionBuilder::generic(types.clone(), location),
        ),
        GenericType::Arc4StaticArray => ExpressionBuilder::Arc4StaticArrayClass(
            StaticArrayClassExpressionBuilder::generic(types.clone(), location),
        ),
        // The bit width cannot be inferred from a value.
        GenericType::Tuple | GenericType::Arc4UIntN => {
            return Err(handler.emit_err(CompileError::UnsupportedOperation {
                operation: "Constructing a value",
                type_name: format!("type[{generic}]"),
                location,
            }))
        }
    };
    Ok(eb)
}

pub fn builder_for_type_ref(
    handler: &Handler,
    type_ref: &TypeRef,
    types: &ParameterisedTypes,
    location: &SourceLocation,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    match type_ref {
        TypeRef::Type(pytype) => builder_for_type(handler, pytype, location),
        TypeRef::Generic(generic) => builder_for_generic(handler, *generic, types, location),
    }
}

/// Converts `literal` to a value of type `target` by calling the type's class builder.
pub(crate) fn convert_literal(
    handler: &Handler,
    literal: Literal,
    target: &SemanticType,
) -> Result<Arc<Expression>, ErrorEmitted> {
    let location = literal.source_location.clone();
    builder_for_type(handler, target, &location)?
        .call_positional(handler, vec![literal.into()], location)?
        .rvalue(handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wtypes::WType;

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 30)
    }

    #[test]
    fn instance_builders_follow_the_type() {
        let handler = Handler::default();
        let eb = builder_for_var(&handler, "flag", &SemanticType::Arc4Bool, loc()).unwrap();
        assert!(matches!(eb, ExpressionBuilder::Arc4Bool(_)));
        assert_eq!(eb.pytype(), Some(&SemanticType::Arc4Bool));
    }

    #[test]
    fn mismatched_lowering_is_an_internal_error() {
        let handler = Handler::default();
        let expr = Expression::var("x", WType::Uint64, loc());
        assert!(builder_for_instance(&handler, &SemanticType::Bytes, expr).is_err());
        assert_eq!(
            handler.errors()[0].kind(),
            quill_error::error::ErrorKind::Internal
        );
    }

    #[test]
    fn native_types_have_no_class_builder() {
        let handler = Handler::default();
        assert!(builder_for_type(&handler, &SemanticType::UInt64, &loc()).is_err());
        let types = ParameterisedTypes::default();
        assert!(builder_for_generic(&handler, GenericType::Arc4UIntN, &types, &loc()).is_err());
        assert_eq!(handler.error_count(), 2);
    }

    #[test]
    fn literals_convert_through_class_builders() {
        let handler = Handler::default();
        let uint8 = SemanticType::arc4_uintn(8).unwrap();
        let expr = convert_literal(&handler, Literal::int(7, loc()), &uint8).unwrap();
        assert_eq!(expr.wtype, uint8.wtype().unwrap());
        assert!(convert_literal(&handler, Literal::int(256, loc()), &uint8).is_err());
    }
}
