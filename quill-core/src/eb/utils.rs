use super::{BoolExpressionBuilder, ExpressionBuilder, NodeBuilder};
use crate::{
    awst::{EqualityComparison, Expression, ExpressionKind, LiteralValue, NumericComparison},
    parse::ArgKind,
    types::SemanticType,
    wtypes::WType,
};

use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::SourceLocation;

/// A `bool` builder holding the constant `value`, inverted when `negate` is set.
pub(crate) fn bool_eval_to_constant(
    value: bool,
    location: SourceLocation,
    negate: bool,
) -> ExpressionBuilder {
    let expr = Expression::bool_constant(value != negate, location);
    ExpressionBuilder::Bool(BoolExpressionBuilder::new(expr))
}

pub(crate) fn bool_builder(expr: Arc<Expression>) -> ExpressionBuilder {
    ExpressionBuilder::Bool(BoolExpressionBuilder::new(expr))
}

/// Compares the encoding of `expr` against `empty`, the encoding of its falsy value.
pub(crate) fn compare_with_encoding(
    expr: Arc<Expression>,
    empty: Vec<u8>,
    location: SourceLocation,
    negate: bool,
) -> ExpressionBuilder {
    let rhs = Expression::bytes_constant(empty, expr.wtype.clone(), location.clone());
    bool_builder(Expression::new(
        ExpressionKind::BytesComparison {
            lhs: expr,
            operator: EqualityComparison::from_negate(negate),
            rhs,
        },
        WType::Bool,
        location,
    ))
}

/// Requires every argument to be passed positionally.
pub(crate) fn expect_positional(
    handler: &Handler,
    arg_kinds: &[ArgKind],
    location: &SourceLocation,
) -> Result<(), ErrorEmitted> {
    if arg_kinds.iter().all(|kind| *kind == ArgKind::Positional) {
        Ok(())
    } else {
        Err(invalid_arguments(handler, location))
    }
}

pub(crate) fn invalid_arguments(handler: &Handler, location: &SourceLocation) -> ErrorEmitted {
    handler.emit_err(CompileError::InvalidArguments {
        location: location.clone(),
    })
}

/// The value of an index that has to be an int literal.
pub(crate) fn constant_index(
    handler: &Handler,
    index: &NodeBuilder,
    type_name: &str,
    location: &SourceLocation,
) -> Result<(BigInt, SourceLocation), ErrorEmitted> {
    match index {
        NodeBuilder::Literal(literal) => match &literal.value {
            LiteralValue::Int(value) => Ok((value.clone(), literal.source_location.clone())),
            _ => Err(non_constant_index(handler, type_name, location)),
        },
        NodeBuilder::Builder(_) => Err(non_constant_index(handler, type_name, location)),
    }
}

fn non_constant_index(
    handler: &Handler,
    type_name: &str,
    location: &SourceLocation,
) -> ErrorEmitted {
    handler.emit_err(CompileError::NonConstantIndex {
        type_name: type_name.to_string(),
        location: location.clone(),
    })
}

/// Resolves a literal tuple index, reporting indices outside of `0..count` at the literal.
pub(crate) fn tuple_index(
    handler: &Handler,
    index: &NodeBuilder,
    count: usize,
    type_name: &str,
    location: &SourceLocation,
) -> Result<usize, ErrorEmitted> {
    let (value, literal_location) = constant_index(handler, index, type_name, location)?;
    match value.to_usize() {
        Some(index) if index < count => Ok(index),
        _ => Err(handler.emit_err(CompileError::TupleIndexOutOfBounds {
            index: value,
            count,
            location: literal_location,
        })),
    }
}

/// An index that is either an int literal or a `uint64` value, lowered to a `uint64` expression.
pub(crate) fn uint64_index(
    handler: &Handler,
    index: NodeBuilder,
    type_name: &str,
    location: &SourceLocation,
) -> Result<Arc<Expression>, ErrorEmitted> {
    match index {
        NodeBuilder::Literal(literal) => match &literal.value {
            LiteralValue::Int(value) => {
                let value = literal_to_u64(handler, value, &literal.source_location)?;
                Ok(Expression::uint64_constant(value, literal.source_location))
            }
            _ => Err(invalid_index_type(handler, type_name, location)),
        },
        NodeBuilder::Builder(ExpressionBuilder::UInt64(eb)) => Ok(eb.into_expr()),
        NodeBuilder::Builder(_) => Err(invalid_index_type(handler, type_name, location)),
    }
}

fn invalid_index_type(
    handler: &Handler,
    type_name: &str,
    location: &SourceLocation,
) -> ErrorEmitted {
    handler.emit_err(CompileError::InvalidIndexType {
        type_name: type_name.to_string(),
        location: location.clone(),
    })
}

pub(crate) fn literal_to_u64(
    handler: &Handler,
    value: &BigInt,
    location: &SourceLocation,
) -> Result<u64, ErrorEmitted> {
    value.to_u64().ok_or_else(|| {
        handler.emit_err(CompileError::LiteralOutOfRange {
            value: value.clone(),
            type_name: "algopy.UInt64".to_string(),
            location: location.clone(),
        })
    })
}

/// Checks that `value` fits an unsigned integer of `bits` bits.
pub(crate) fn check_unsigned_range(
    handler: &Handler,
    value: &BigInt,
    bits: u64,
    type_name: String,
    location: &SourceLocation,
) -> Result<(), ErrorEmitted> {
    if value.is_negative() || value.bits() > bits {
        return Err(handler.emit_err(CompileError::LiteralOutOfRange {
            value: value.clone(),
            type_name,
            location: location.clone(),
        }));
    }
    Ok(())
}

pub(crate) fn mismatched_type(
    handler: &Handler,
    expected: &SemanticType,
    found: &NodeBuilder,
    location: &SourceLocation,
) -> ErrorEmitted {
    handler.emit_err(CompileError::MismatchedType {
        expected: expected.name(),
        found: found.type_name(),
        location: location.clone(),
    })
}

/// Narrows `op` to an equality comparison, which is all that `type_name` supports.
pub(crate) fn expect_equality(
    handler: &Handler,
    op: NumericComparison,
    type_name: String,
    location: &SourceLocation,
) -> Result<EqualityComparison, ErrorEmitted> {
    op.as_equality().ok_or_else(|| {
        handler.emit_err(CompileError::UnsupportedOperation {
            operation: "Ordering comparison",
            type_name,
            location: location.clone(),
        })
    })
}

pub(crate) fn bytes_comparison(
    lhs: Arc<Expression>,
    operator: EqualityComparison,
    rhs: Arc<Expression>,
    location: SourceLocation,
) -> ExpressionBuilder {
    bool_builder(Expression::new(
        ExpressionKind::BytesComparison { lhs, operator, rhs },
        WType::Bool,
        location,
    ))
}

pub(crate) fn numeric_comparison(
    lhs: Arc<Expression>,
    operator: NumericComparison,
    rhs: Arc<Expression>,
    location: SourceLocation,
) -> ExpressionBuilder {
    bool_builder(Expression::new(
        ExpressionKind::NumericComparison { lhs, operator, rhs },
        WType::Bool,
        location,
    ))
}

/// The comparison against zero that a numeric value is truthy under.
pub(crate) fn truthy_comparison(negate: bool) -> NumericComparison {
    if negate {
        NumericComparison::Eq
    } else {
        NumericComparison::Ne
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::awst::Literal;

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 9)
    }

    #[test]
    fn constant_bool_eval() {
        let eb = bool_eval_to_constant(true, loc(), true);
        let expr = eb.rvalue(&Handler::default()).unwrap();
        assert_eq!(expr.kind, ExpressionKind::BoolConstant { value: false });
        assert_eq!(expr.wtype, WType::Bool);
    }

    #[test]
    fn tuple_index_bounds() {
        let handler = Handler::default();
        let literal_loc = SourceLocation::span("contract.py", 9, 4, 5);
        let index = NodeBuilder::Literal(Literal::int(-1, literal_loc.clone()));
        assert!(tuple_index(&handler, &index, 2, "tuple", &loc()).is_err());
        let errors = handler.errors();
        assert_eq!(errors[0].to_string(), "Tuple index out of bounds");
        assert_eq!(errors[0].location(), Some(&literal_loc));

        let index = NodeBuilder::Literal(Literal::int(1, literal_loc));
        assert_eq!(tuple_index(&handler, &index, 2, "tuple", &loc()), Ok(1));
    }

    #[test]
    fn unsigned_ranges() {
        let handler = Handler::default();
        let ok = |value: i64, bits| {
            check_unsigned_range(&handler, &value.into(), bits, "uint8".into(), &loc()).is_ok()
        };
        assert!(ok(255, 8));
        assert!(ok(0, 8));
        assert!(!ok(256, 8));
        assert!(!ok(-1, 64));
    }
}
