use crate::{
    awst::{Expression, ExpressionKind},
    eb::{
        factory::builder_for_instance,
        utils::{bool_eval_to_constant, tuple_index},
        BoolEvalBuilder, ExpressionBuilder, IndexableBuilder, InstanceBuilder, NodeBuilder,
    },
    types::{SemanticType, TupleType},
};

use std::sync::Arc;

use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::SourceLocation;

/// A native tuple value.
#[derive(Clone, Debug)]
pub struct TupleExpressionBuilder {
    expr: Arc<Expression>,
    typ: TupleType,
    pytype: SemanticType,
}

impl TupleExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>, typ: TupleType) -> Self {
        TupleExpressionBuilder {
            expr,
            pytype: SemanticType::Tuple(typ.clone()),
            typ,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

impl InstanceBuilder for TupleExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl IndexableBuilder for TupleExpressionBuilder {
    fn index(
        self,
        handler: &Handler,
        index: NodeBuilder,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let items = self.typ.items();
        let index = tuple_index(handler, &index, items.len(), "tuple", &location)?;
        let item_type = &items[index];
        let Some(wtype) = item_type.wtype() else {
            return Err(handler.emit_err(CompileError::internal(
                format!("tuple item of type {item_type} has no lowered type"),
                location,
            )));
        };
        let item = Expression::new(
            ExpressionKind::TupleItemExpression {
                base: self.expr.clone(),
                index,
            },
            wtype,
            location,
        );
        builder_for_instance(handler, item_type, item)
    }
}

impl BoolEvalBuilder for TupleExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let is_empty = self.typ.items().is_empty();
        Ok(bool_eval_to_constant(!is_empty, location, negate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{awst::Literal, wtypes::WType};

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 20)
    }

    fn pair() -> TupleExpressionBuilder {
        let typ = TupleType::new(vec![SemanticType::UInt64, SemanticType::Bytes]);
        let wtype = WType::tuple([WType::Uint64, WType::Bytes]);
        TupleExpressionBuilder::new(Expression::var("pair", wtype, loc()), typ)
    }

    #[test]
    fn items_by_literal_index() {
        let handler = Handler::default();
        let second = pair()
            .index(&handler, Literal::int(1, loc()).into(), loc())
            .unwrap();
        assert_eq!(second.pytype(), Some(&SemanticType::Bytes));
        let expr = second.rvalue(&handler).unwrap();
        assert!(matches!(
            expr.kind,
            ExpressionKind::TupleItemExpression { index: 1, .. }
        ));
    }

    #[test]
    fn non_literal_index_is_rejected() {
        let handler = Handler::default();
        let i = ExpressionBuilder::UInt64(crate::eb::UInt64ExpressionBuilder::new(
            Expression::var("i", WType::Uint64, loc()),
        ));
        assert!(pair().index(&handler, i.into(), loc()).is_err());
        assert_eq!(
            handler.errors()[0].to_string(),
            "tuple can only be indexed by int constants"
        );
    }

    #[test]
    fn non_empty_tuples_are_truthy() {
        let handler = Handler::default();
        let result = pair().bool_eval(&handler, loc(), false).unwrap();
        assert_eq!(
            result.rvalue(&handler).unwrap().kind,
            ExpressionKind::BoolConstant { value: true }
        );
    }
}
