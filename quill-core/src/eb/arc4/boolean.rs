use super::base::{compare_encoded, encode, encoded_member, typed_node};
use crate::{
    awst::{Expression, ExpressionKind, Literal, LiteralValue, NumericComparison},
    eb::{
        utils::{compare_with_encoding, expect_positional, invalid_arguments},
        BoolEvalBuilder, CallableBuilder, ComparableBuilder, ExpressionBuilder, InstanceBuilder,
        MemberAccessBuilder, NodeBuilder, TypeClassBuilder,
    },
    parse::ArgKind,
    types::{GenericType, SemanticType},
};

use std::sync::Arc;

use quill_error::handler::{ErrorEmitted, Handler};
use quill_types::SourceLocation;

/// The encoding of `False`. `True` sets the most significant bit.
const ENCODED_FALSE: u8 = 0x00;

#[derive(Clone, Debug)]
pub struct Arc4BoolExpressionBuilder {
    expr: Arc<Expression>,
    pytype: SemanticType,
}

impl Arc4BoolExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>) -> Self {
        Arc4BoolExpressionBuilder {
            expr,
            pytype: SemanticType::Arc4Bool,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

impl InstanceBuilder for Arc4BoolExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl BoolEvalBuilder for Arc4BoolExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        Ok(compare_with_encoding(
            self.expr,
            vec![ENCODED_FALSE],
            location,
            negate,
        ))
    }
}

impl MemberAccessBuilder for Arc4BoolExpressionBuilder {
    fn member_access(
        self,
        handler: &Handler,
        name: &str,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        encoded_member(handler, self.expr, &self.pytype, name, location)
    }
}

impl ComparableBuilder for Arc4BoolExpressionBuilder {
    fn compare(
        self,
        handler: &Handler,
        other: NodeBuilder,
        op: NumericComparison,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        compare_encoded(handler, self.expr, &self.pytype, other, op, location)
    }
}

#[derive(Clone, Debug)]
pub struct Arc4BoolClassExpressionBuilder {
    pytype: SemanticType,
    location: SourceLocation,
}

impl Arc4BoolClassExpressionBuilder {
    pub(crate) fn new(location: SourceLocation) -> Self {
        Arc4BoolClassExpressionBuilder {
            pytype: SemanticType::Arc4Bool,
            location,
        }
    }
}

impl TypeClassBuilder for Arc4BoolClassExpressionBuilder {
    fn produces(&self) -> Option<&SemanticType> {
        Some(&self.pytype)
    }

    fn generic(&self) -> Option<GenericType> {
        None
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl CallableBuilder for Arc4BoolClassExpressionBuilder {
    fn call(
        self,
        handler: &Handler,
        args: Vec<NodeBuilder>,
        _arg_types: &[SemanticType],
        arg_kinds: &[ArgKind],
        _arg_names: &[Option<String>],
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        expect_positional(handler, arg_kinds, &location)?;
        let mut args = args.into_iter();
        let value = match (args.next(), args.next()) {
            (None, _) => false,
            (
                Some(NodeBuilder::Literal(Literal {
                    value: LiteralValue::Bool(value),
                    ..
                })),
                None,
            ) => value,
            (Some(NodeBuilder::Builder(ExpressionBuilder::Bool(eb))), None) => {
                return encode(handler, eb.into_expr(), &self.pytype, location);
            }
            _ => return Err(invalid_arguments(handler, &location)),
        };
        typed_node(
            handler,
            ExpressionKind::BoolConstant { value },
            &self.pytype,
            location,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        awst::EqualityComparison,
        wtypes::{Arc4Type, WType},
    };

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 50)
    }

    fn class() -> ExpressionBuilder {
        ExpressionBuilder::Arc4BoolClass(Arc4BoolClassExpressionBuilder::new(loc()))
    }

    #[test]
    fn literal_constructs_a_constant() {
        let handler = Handler::default();
        let eb = class()
            .call_positional(&handler, vec![Literal::bool(true, loc()).into()], loc())
            .unwrap();
        let expr = eb.rvalue(&handler).unwrap();
        assert_eq!(expr.kind, ExpressionKind::BoolConstant { value: true });
        assert_eq!(expr.wtype, WType::Arc4(Arc4Type::Bool));
    }

    #[test]
    fn no_arguments_is_false() {
        let handler = Handler::default();
        let eb = class().call_positional(&handler, vec![], loc()).unwrap();
        assert_eq!(
            eb.rvalue(&handler).unwrap().kind,
            ExpressionKind::BoolConstant { value: false }
        );
    }

    #[test]
    fn truthiness_compares_against_false_encoding() {
        let handler = Handler::default();
        let flag = Arc4BoolExpressionBuilder::new(Expression::var(
            "flag",
            WType::Arc4(Arc4Type::Bool),
            loc(),
        ));
        let expr = flag
            .bool_eval(&handler, loc(), true)
            .unwrap()
            .rvalue(&handler)
            .unwrap();
        match &expr.kind {
            ExpressionKind::BytesComparison { operator, rhs, .. } => {
                assert_eq!(*operator, EqualityComparison::Eq);
                assert_eq!(
                    rhs.kind,
                    ExpressionKind::BytesConstant {
                        value: vec![ENCODED_FALSE]
                    }
                );
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn keyword_arguments_are_rejected() {
        let handler = Handler::default();
        let result = class().call(
            &handler,
            vec![Literal::bool(true, loc()).into()],
            &[SemanticType::Bool],
            &[ArgKind::Named],
            &[Some("value".into())],
            loc(),
        );
        assert!(result.is_err());
        assert_eq!(handler.errors()[0].to_string(), "Invalid/unhandled arguments");
    }
}
