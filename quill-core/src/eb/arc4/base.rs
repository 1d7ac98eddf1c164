//! Behaviour shared by every ARC4 encoded value.

use crate::{
    awst::{Expression, ExpressionKind, NumericComparison},
    eb::{
        factory::{builder_for_instance, convert_literal},
        utils::{bytes_comparison, expect_equality, mismatched_type},
        BytesExpressionBuilder, ExpressionBuilder, NodeBuilder,
    },
    types::SemanticType,
    wtypes::WType,
};

use std::sync::Arc;

use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::SourceLocation;

/// Resolves `native` and `bytes`, or reports `name` as unknown.
pub(super) fn encoded_member(
    handler: &Handler,
    expr: Arc<Expression>,
    pytype: &SemanticType,
    name: &str,
    location: SourceLocation,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    match (name, pytype.native_type()) {
        ("native", Some(native)) => {
            let Some(wtype) = native.wtype() else {
                return Err(handler.emit_err(CompileError::internal(
                    format!("{native} has no lowered type"),
                    location,
                )));
            };
            let decoded =
                Expression::new(ExpressionKind::Arc4Decode { value: expr }, wtype, location);
            builder_for_instance(handler, &native, decoded)
        }
        ("bytes", _) => Ok(ExpressionBuilder::Bytes(BytesExpressionBuilder::new(
            Expression::new(ExpressionKind::ReinterpretCast { expr }, WType::Bytes, location),
        ))),
        _ => Err(handler.emit_err(CompileError::UnknownMember {
            type_name: pytype.name(),
            name: name.to_string(),
            location,
        })),
    }
}

/// Equality of two values with identical encodings is equality of their bytes.
pub(super) fn compare_encoded(
    handler: &Handler,
    expr: Arc<Expression>,
    pytype: &SemanticType,
    other: NodeBuilder,
    op: NumericComparison,
    location: SourceLocation,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    let operator = expect_equality(handler, op, pytype.name(), &location)?;
    let rhs = match other {
        NodeBuilder::Literal(literal) => convert_literal(handler, literal, pytype)?,
        NodeBuilder::Builder(eb) if eb.value_type() == Some(&expr.wtype) => eb.rvalue(handler)?,
        other => return Err(mismatched_type(handler, pytype, &other, &location)),
    };
    Ok(bytes_comparison(expr, operator, rhs, location))
}

/// Lowers `arg` to a value of type `target`, converting literals.
pub(super) fn expect_value(
    handler: &Handler,
    arg: NodeBuilder,
    target: &SemanticType,
) -> Result<Arc<Expression>, ErrorEmitted> {
    match arg {
        NodeBuilder::Literal(literal) => convert_literal(handler, literal, target),
        NodeBuilder::Builder(eb) if eb.pytype() == Some(target) => eb.rvalue(handler),
        other => Err(handler.emit_err(CompileError::InvalidArgType {
            expected: target.name(),
            found: other.type_name(),
            location: other.source_location(),
        })),
    }
}

/// Encodes `value` as `pytype` and wraps the result in its builder.
pub(super) fn encode(
    handler: &Handler,
    value: Arc<Expression>,
    pytype: &SemanticType,
    location: SourceLocation,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    typed_node(handler, ExpressionKind::Arc4Encode { value }, pytype, location)
}

/// Builds a node of kind `kind` lowered to the encoding of `pytype`.
pub(super) fn typed_node(
    handler: &Handler,
    kind: ExpressionKind,
    pytype: &SemanticType,
    location: SourceLocation,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    let Some(wtype) = pytype.wtype() else {
        return Err(handler.emit_err(CompileError::internal(
            format!("{pytype} has no lowered type"),
            location,
        )));
    };
    builder_for_instance(handler, pytype, Expression::new(kind, wtype, location))
}
