use crate::{
    awst::{
        EqualityComparison, Expression, ExpressionKind, Literal, LiteralValue, NumericComparison,
    },
    eb::{
        utils::{
            bytes_comparison, expect_equality, mismatched_type, numeric_comparison,
            truthy_comparison,
        },
        BoolEvalBuilder, ComparableBuilder, ExpressionBuilder, InstanceBuilder,
        MemberAccessBuilder, NodeBuilder, UInt64ExpressionBuilder,
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

#[derive(Clone, Debug)]
pub struct BytesExpressionBuilder {
    expr: Arc<Expression>,
    pytype: SemanticType,
}

impl BytesExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>) -> Self {
        BytesExpressionBuilder {
            expr,
            pytype: SemanticType::Bytes,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }

    fn length(&self, location: SourceLocation) -> Arc<Expression> {
        Expression::new(
            ExpressionKind::IntrinsicCall {
                op_code: "len".to_string(),
                stack_args: vec![self.expr.clone()],
            },
            WType::Uint64,
            location,
        )
    }
}

impl InstanceBuilder for BytesExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl BoolEvalBuilder for BytesExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let length = self.length(location.clone());
        let zero = Expression::uint64_constant(0, location.clone());
        Ok(numeric_comparison(
            length,
            truthy_comparison(negate),
            zero,
            location,
        ))
    }
}

impl MemberAccessBuilder for BytesExpressionBuilder {
    fn member_access(
        self,
        handler: &Handler,
        name: &str,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        match name {
            "length" => {
                let length = self.length(location);
                Ok(ExpressionBuilder::UInt64(UInt64ExpressionBuilder::new(
                    length,
                )))
            }
            _ => Err(handler.emit_err(CompileError::UnknownMember {
                type_name: self.pytype.name(),
                name: name.to_string(),
                location,
            })),
        }
    }
}

impl ComparableBuilder for BytesExpressionBuilder {
    fn compare(
        self,
        handler: &Handler,
        other: NodeBuilder,
        op: NumericComparison,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let operator = expect_equality(handler, op, self.pytype.name(), &location)?;
        let rhs = match other {
            NodeBuilder::Literal(Literal {
                value: LiteralValue::Bytes(value),
                source_location,
            }) => Expression::bytes_constant(value, WType::Bytes, source_location),
            NodeBuilder::Builder(ExpressionBuilder::Bytes(eb)) => eb.expr,
            other => return Err(mismatched_type(handler, &self.pytype, &other, &location)),
        };
        Ok(bytes_comparison(self.expr, operator, rhs, location))
    }
}

#[derive(Clone, Debug)]
pub struct StringExpressionBuilder {
    expr: Arc<Expression>,
    pytype: SemanticType,
}

impl StringExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>) -> Self {
        StringExpressionBuilder {
            expr,
            pytype: SemanticType::String,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

fn string_constant(value: String, location: SourceLocation) -> Arc<Expression> {
    Expression::new(
        ExpressionKind::StringConstant { value },
        WType::String,
        location,
    )
}

impl InstanceBuilder for StringExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl BoolEvalBuilder for StringExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let empty = string_constant(String::new(), location.clone());
        Ok(bytes_comparison(
            self.expr,
            EqualityComparison::from_negate(negate),
            empty,
            location,
        ))
    }
}

impl ComparableBuilder for StringExpressionBuilder {
    fn compare(
        self,
        handler: &Handler,
        other: NodeBuilder,
        op: NumericComparison,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let operator = expect_equality(handler, op, self.pytype.name(), &location)?;
        let rhs = match other {
            NodeBuilder::Literal(Literal {
                value: LiteralValue::Str(value),
                source_location,
            }) => string_constant(value, source_location),
            NodeBuilder::Builder(ExpressionBuilder::String(eb)) => eb.expr,
            other => return Err(mismatched_type(handler, &self.pytype, &other, &location)),
        };
        Ok(bytes_comparison(self.expr, operator, rhs, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 14)
    }

    #[test]
    fn bytes_are_truthy_when_not_empty() {
        let handler = Handler::default();
        let data = BytesExpressionBuilder::new(Expression::var("data", WType::Bytes, loc()));
        let expr = data
            .bool_eval(&handler, loc(), false)
            .unwrap()
            .rvalue(&handler)
            .unwrap();
        match &expr.kind {
            ExpressionKind::NumericComparison { lhs, operator, .. } => {
                assert_eq!(*operator, NumericComparison::Ne);
                assert!(matches!(
                    &lhs.kind,
                    ExpressionKind::IntrinsicCall { op_code, .. } if op_code == "len"
                ));
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn bytes_length_member() {
        let handler = Handler::default();
        let data = BytesExpressionBuilder::new(Expression::var("data", WType::Bytes, loc()));
        let length = data
            .clone()
            .member_access(&handler, "length", loc())
            .unwrap();
        assert_eq!(length.value_type(), Some(&WType::Uint64));
        assert!(data.member_access(&handler, "size", loc()).is_err());
        assert_eq!(
            handler.errors()[0].to_string(),
            "algopy.Bytes has no attribute \"size\""
        );
    }

    #[test]
    fn string_compares_with_literals() {
        let handler = Handler::default();
        let name = StringExpressionBuilder::new(Expression::var("name", WType::String, loc()));
        let expr = name
            .compare(
                &handler,
                NodeBuilder::Literal(Literal::str("quill", loc())),
                NumericComparison::Ne,
                loc(),
            )
            .unwrap()
            .rvalue(&handler)
            .unwrap();
        match &expr.kind {
            ExpressionKind::BytesComparison { operator, rhs, .. } => {
                assert_eq!(*operator, EqualityComparison::Ne);
                assert_eq!(
                    rhs.kind,
                    ExpressionKind::StringConstant {
                        value: "quill".into()
                    }
                );
            }
            other => panic!("unexpected node {other:?}"),
        }
    }
}
