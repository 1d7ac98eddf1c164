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
use quill_types::{constants::ARC4_LENGTH_PREFIX_SIZE, SourceLocation};

#[derive(Clone, Debug)]
pub struct Arc4StringExpressionBuilder {
    expr: Arc<Expression>,
    pytype: SemanticType,
}

impl Arc4StringExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>) -> Self {
        Arc4StringExpressionBuilder {
            expr,
            pytype: SemanticType::Arc4String,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

impl InstanceBuilder for Arc4StringExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl BoolEvalBuilder for Arc4StringExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        // An empty string is just a zero length prefix.
        let empty = vec![0; ARC4_LENGTH_PREFIX_SIZE as usize];
        Ok(compare_with_encoding(self.expr, empty, location, negate))
    }
}

impl MemberAccessBuilder for Arc4StringExpressionBuilder {
    fn member_access(
        self,
        handler: &Handler,
        name: &str,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        encoded_member(handler, self.expr, &self.pytype, name, location)
    }
}

impl ComparableBuilder for Arc4StringExpressionBuilder {
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
pub struct Arc4StringClassExpressionBuilder {
    pytype: SemanticType,
    location: SourceLocation,
}

impl Arc4StringClassExpressionBuilder {
    pub(crate) fn new(location: SourceLocation) -> Self {
        Arc4StringClassExpressionBuilder {
            pytype: SemanticType::Arc4String,
            location,
        }
    }
}

impl TypeClassBuilder for Arc4StringClassExpressionBuilder {
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

impl CallableBuilder for Arc4StringClassExpressionBuilder {
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
            (None, _) => String::new(),
            (
                Some(NodeBuilder::Literal(Literal {
                    value: LiteralValue::Str(value),
                    ..
                })),
                None,
            ) => value,
            (Some(NodeBuilder::Builder(ExpressionBuilder::String(eb))), None) => {
                return encode(handler, eb.into_expr(), &self.pytype, location);
            }
            _ => return Err(invalid_arguments(handler, &location)),
        };
        typed_node(
            handler,
            ExpressionKind::StringConstant { value },
            &self.pytype,
            location,
        )
    }
}
