use super::base::{compare_encoded, encode, encoded_member};
use crate::{
    awst::{Expression, ExpressionKind, NumericComparison},
    eb::{
        factory::builder_for_instance,
        utils::{bool_eval_to_constant, expect_positional, invalid_arguments, tuple_index},
        BoolEvalBuilder, CallableBuilder, ComparableBuilder, ExpressionBuilder, IndexableBuilder,
        InstanceBuilder, MemberAccessBuilder, NodeBuilder, TypeClassBuilder,
    },
    parse::ArgKind,
    types::{GenericType, ParameterisedTypes, SemanticType, TupleType, TypeArg},
    wtypes::WType,
};

use std::sync::Arc;

use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::SourceLocation;

/// `arc4.Tuple` without item types, which are taken from the native tuple it is called with.
#[derive(Clone, Debug)]
pub struct Arc4TupleGenericClassExpressionBuilder {
    types: ParameterisedTypes,
    location: SourceLocation,
}

impl Arc4TupleGenericClassExpressionBuilder {
    pub(crate) fn new(types: ParameterisedTypes, location: SourceLocation) -> Self {
        Arc4TupleGenericClassExpressionBuilder { types, location }
    }
}

impl TypeClassBuilder for Arc4TupleGenericClassExpressionBuilder {
    fn produces(&self) -> Option<&SemanticType> {
        None
    }

    fn generic(&self) -> Option<GenericType> {
        Some(GenericType::Arc4Tuple)
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl CallableBuilder for Arc4TupleGenericClassExpressionBuilder {
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
        let [NodeBuilder::Builder(eb)] = args.as_slice() else {
            return Err(invalid_arguments(handler, &location));
        };
        let Some(SemanticType::Tuple(native)) = eb.pytype() else {
            return Err(invalid_arguments(handler, &location));
        };
        let items = native
            .items()
            .iter()
            .cloned()
            .map(TypeArg::Type)
            .collect::<Vec<_>>();
        let typ = self
            .types
            .parameterise(handler, GenericType::Arc4Tuple, &items, &location)?;
        let value = eb.rvalue(handler)?;
        encode(handler, value, &typ, location)
    }
}

/// `arc4.Tuple[...]` with known item types.
#[derive(Clone, Debug)]
pub struct Arc4TupleClassExpressionBuilder {
    typ: TupleType,
    pytype: SemanticType,
    location: SourceLocation,
}

impl Arc4TupleClassExpressionBuilder {
    pub(crate) fn new(typ: TupleType, location: SourceLocation) -> Self {
        Arc4TupleClassExpressionBuilder {
            pytype: SemanticType::Arc4Tuple(typ.clone()),
            typ,
            location,
        }
    }
}

impl TypeClassBuilder for Arc4TupleClassExpressionBuilder {
    fn produces(&self) -> Option<&SemanticType> {
        Some(&self.pytype)
    }

    fn generic(&self) -> Option<GenericType> {
        Some(GenericType::Arc4Tuple)
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl CallableBuilder for Arc4TupleClassExpressionBuilder {
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
        let [NodeBuilder::Builder(eb)] = args.as_slice() else {
            return Err(invalid_arguments(handler, &location));
        };
        let Some(WType::WTuple { types }) = eb.value_type() else {
            return Err(invalid_arguments(handler, &location));
        };
        let expected = self
            .typ
            .items()
            .iter()
            .map(SemanticType::wtype)
            .collect::<Option<Vec<_>>>();
        if expected.as_ref() != Some(types) {
            return Err(handler.emit_err(CompileError::InvalidArgType {
                expected: WType::WTuple {
                    types: expected.unwrap_or_default(),
                }
                .to_string(),
                found: WType::WTuple {
                    types: types.clone(),
                }
                .to_string(),
                location,
            }));
        }
        let value = eb.rvalue(handler)?;
        encode(handler, value, &self.pytype, location)
    }
}

/// A value of an `arc4.Tuple` type.
#[derive(Clone, Debug)]
pub struct Arc4TupleExpressionBuilder {
    expr: Arc<Expression>,
    typ: TupleType,
    pytype: SemanticType,
}

impl Arc4TupleExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>, typ: TupleType) -> Self {
        Arc4TupleExpressionBuilder {
            expr,
            pytype: SemanticType::Arc4Tuple(typ.clone()),
            typ,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

impl InstanceBuilder for Arc4TupleExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl IndexableBuilder for Arc4TupleExpressionBuilder {
    fn index(
        self,
        handler: &Handler,
        index: NodeBuilder,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let items = self.typ.items();
        let index = tuple_index(handler, &index, items.len(), "arc4.Tuple", &location)?;
        let item_type = &items[index];
        let Some(wtype) = item_type.wtype() else {
            return Err(handler.emit_err(CompileError::internal(
                format!("ARC4 tuple item of type {item_type} has no lowered type"),
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

impl BoolEvalBuilder for Arc4TupleExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        // Empty ARC4 tuples cannot be constructed.
        Ok(bool_eval_to_constant(true, location, negate))
    }
}

impl MemberAccessBuilder for Arc4TupleExpressionBuilder {
    fn member_access(
        self,
        handler: &Handler,
        name: &str,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        encoded_member(handler, self.expr, &self.pytype, name, location)
    }
}

impl ComparableBuilder for Arc4TupleExpressionBuilder {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{awst::Literal, eb::factory::builder_for_var, wtypes::Arc4Type};
    use pretty_assertions::assert_eq;

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 70)
    }

    fn uint64() -> SemanticType {
        SemanticType::arc4_uintn(64).unwrap()
    }

    fn native_pair(handler: &Handler) -> ExpressionBuilder {
        let pytype = SemanticType::tuple(vec![uint64(), SemanticType::Arc4Bool]);
        builder_for_var(handler, "pair", &pytype, loc()).unwrap()
    }

    fn generic_class() -> ExpressionBuilder {
        ExpressionBuilder::Arc4TupleGenericClass(Arc4TupleGenericClassExpressionBuilder::new(
            ParameterisedTypes::default(),
            loc(),
        ))
    }

    #[test]
    fn generic_class_infers_item_types() {
        let handler = Handler::default();
        let eb = generic_class()
            .call_positional(&handler, vec![native_pair(&handler).into()], loc())
            .unwrap();
        assert_eq!(
            eb.pytype().map(SemanticType::name),
            Some("algopy.arc4.Tuple[algopy.arc4.UInt64, algopy.arc4.Bool]".to_string())
        );
        assert_eq!(
            eb.value_type(),
            Some(&WType::Arc4(Arc4Type::Tuple {
                types: vec![Arc4Type::UIntN { bits: 64 }, Arc4Type::Bool]
            }))
        );
    }

    #[test]
    fn generic_class_rejects_native_items() {
        let handler = Handler::default();
        let pytype = SemanticType::tuple(vec![SemanticType::UInt64]);
        let arg = builder_for_var(&handler, "t", &pytype, loc()).unwrap();
        assert!(generic_class()
            .call_positional(&handler, vec![arg.into()], loc())
            .is_err());
        assert!(matches!(
            handler.errors().as_slice(),
            [CompileError::InvalidElementType { .. }]
        ));
    }

    #[test]
    fn generic_class_rejects_non_tuples() {
        let handler = Handler::default();
        assert!(generic_class()
            .call_positional(&handler, vec![Literal::int(1, loc()).into()], loc())
            .is_err());
        assert_eq!(handler.errors()[0].to_string(), "Invalid/unhandled arguments");
    }

    #[test]
    fn parameterised_class_checks_item_types() {
        let handler = Handler::default();
        let typ = match GenericType::Arc4Tuple
            .parameterise(&handler, &[TypeArg::Type(uint64())], &loc())
            .unwrap()
        {
            SemanticType::Arc4Tuple(typ) => typ,
            other => panic!("unexpected type {other:?}"),
        };
        let class = ExpressionBuilder::Arc4TupleClass(Arc4TupleClassExpressionBuilder::new(
            typ,
            loc(),
        ));
        let result = class.call_positional(&handler, vec![native_pair(&handler).into()], loc());
        assert!(result.is_err());
        assert_eq!(
            handler.errors()[0].to_string(),
            "Invalid arg type: expected tuple<arc4.uint64>, got tuple<arc4.uint64,arc4.bool>"
        );
    }

    #[test]
    fn native_member_decodes_to_the_native_tuple() {
        let handler = Handler::default();
        let eb = generic_class()
            .call_positional(&handler, vec![native_pair(&handler).into()], loc())
            .unwrap();
        let native = eb.member_access(&handler, "native", loc()).unwrap();
        assert!(matches!(native, ExpressionBuilder::Tuple(_)));
        assert_eq!(
            native.pytype(),
            Some(&SemanticType::tuple(vec![uint64(), SemanticType::Arc4Bool]))
        );
    }
}
