use super::base::{compare_encoded, encoded_member, expect_value, typed_node};
use crate::{
    awst::{Expression, ExpressionKind, LiteralValue, NumericComparison},
    eb::{
        factory::builder_for_instance,
        utils::{
            bool_eval_to_constant, compare_with_encoding, expect_positional, uint64_index,
        },
        BoolEvalBuilder, CallableBuilder, ComparableBuilder, ExpressionBuilder, IndexableBuilder,
        InstanceBuilder, MemberAccessBuilder, NodeBuilder, TypeClassBuilder,
        UInt64ExpressionBuilder,
    },
    parse::ArgKind,
    types::{ArrayType, GenericType, ParameterisedTypes, SemanticType, StaticArrayType, TypeArg},
    wtypes::WType,
};

use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::{constants::ARC4_LENGTH_PREFIX_SIZE, SourceLocation};

/// What an array class constructs: a known array type, or one inferred from the elements and
/// interned in the compilation's parameterised types.
#[derive(Clone, Debug)]
enum ArrayClass<T> {
    Known { typ: T, pytype: SemanticType },
    Generic(ParameterisedTypes),
}

impl<T> ArrayClass<T> {
    fn pytype(&self) -> Option<&SemanticType> {
        match self {
            ArrayClass::Known { pytype, .. } => Some(pytype),
            ArrayClass::Generic(_) => None,
        }
    }
}

fn index_element(
    handler: &Handler,
    base: Arc<Expression>,
    element: &SemanticType,
    index: Arc<Expression>,
    location: SourceLocation,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    let Some(wtype) = element.wtype() else {
        return Err(handler.emit_err(CompileError::internal(
            format!("array element of type {element} has no lowered type"),
            location,
        )));
    };
    let item = Expression::new(
        ExpressionKind::IndexExpression { base, index },
        wtype,
        location,
    );
    builder_for_instance(handler, element, item)
}

fn uint64_builder(expr: Arc<Expression>) -> ExpressionBuilder {
    ExpressionBuilder::UInt64(UInt64ExpressionBuilder::new(expr))
}

/// The element type of an array literal, taken from its first element.
fn infer_element(
    handler: &Handler,
    args: &[NodeBuilder],
    location: &SourceLocation,
) -> Result<SemanticType, ErrorEmitted> {
    match args.first() {
        Some(NodeBuilder::Builder(eb)) => match eb.pytype() {
            Some(pytype) => Ok(pytype.clone()),
            None => Err(handler.emit_err(CompileError::TypeUsedAsValue {
                type_name: eb.type_name(),
                location: eb.source_location(),
            })),
        },
        _ => Err(handler.emit_err(CompileError::CannotInferElementType {
            location: location.clone(),
        })),
    }
}

fn new_array(
    handler: &Handler,
    args: Vec<NodeBuilder>,
    element: &SemanticType,
    pytype: &SemanticType,
    location: SourceLocation,
) -> Result<ExpressionBuilder, ErrorEmitted> {
    let values = args
        .into_iter()
        .map(|arg| expect_value(handler, arg, element))
        .collect::<Result<Vec<_>, _>>()?;
    typed_node(
        handler,
        ExpressionKind::NewArray { values },
        pytype,
        location,
    )
}

/// An `arc4.DynamicArray` value.
#[derive(Clone, Debug)]
pub struct DynamicArrayExpressionBuilder {
    expr: Arc<Expression>,
    typ: ArrayType,
    pytype: SemanticType,
}

impl DynamicArrayExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>, typ: ArrayType) -> Self {
        DynamicArrayExpressionBuilder {
            expr,
            pytype: SemanticType::Arc4DynamicArray(typ.clone()),
            typ,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

impl InstanceBuilder for DynamicArrayExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl IndexableBuilder for DynamicArrayExpressionBuilder {
    fn index(
        self,
        handler: &Handler,
        index: NodeBuilder,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        // Bounds are checked at runtime.
        let index = uint64_index(handler, index, &self.pytype.name(), &location)?;
        index_element(handler, self.expr, self.typ.element(), index, location)
    }
}

impl BoolEvalBuilder for DynamicArrayExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let empty = vec![0; ARC4_LENGTH_PREFIX_SIZE as usize];
        Ok(compare_with_encoding(self.expr, empty, location, negate))
    }
}

impl MemberAccessBuilder for DynamicArrayExpressionBuilder {
    fn member_access(
        self,
        handler: &Handler,
        name: &str,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        match name {
            "length" => Ok(uint64_builder(Expression::new(
                ExpressionKind::ArrayLength { array: self.expr },
                WType::Uint64,
                location,
            ))),
            _ => encoded_member(handler, self.expr, &self.pytype, name, location),
        }
    }
}

impl ComparableBuilder for DynamicArrayExpressionBuilder {
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

/// `arc4.DynamicArray`, with or without a known element type.
#[derive(Clone, Debug)]
pub struct DynamicArrayClassExpressionBuilder {
    class: ArrayClass<ArrayType>,
    location: SourceLocation,
}

impl DynamicArrayClassExpressionBuilder {
    pub(crate) fn new(typ: ArrayType, location: SourceLocation) -> Self {
        let pytype = SemanticType::Arc4DynamicArray(typ.clone());
        DynamicArrayClassExpressionBuilder {
            class: ArrayClass::Known { typ, pytype },
            location,
        }
    }

    pub(crate) fn generic(types: ParameterisedTypes, location: SourceLocation) -> Self {
        DynamicArrayClassExpressionBuilder {
            class: ArrayClass::Generic(types),
            location,
        }
    }
}

impl TypeClassBuilder for DynamicArrayClassExpressionBuilder {
    fn produces(&self) -> Option<&SemanticType> {
        self.class.pytype()
    }

    fn generic(&self) -> Option<GenericType> {
        Some(GenericType::Arc4DynamicArray)
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl CallableBuilder for DynamicArrayClassExpressionBuilder {
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
        let (element, pytype) = match self.class {
            ArrayClass::Known { typ, pytype } => (typ.element().clone(), pytype),
            ArrayClass::Generic(types) => {
                let element = infer_element(handler, &args, &location)?;
                let pytype = types.parameterise(
                    handler,
                    GenericType::Arc4DynamicArray,
                    &[TypeArg::Type(element.clone())],
                    &location,
                )?;
                (element, pytype)
            }
        };
        new_array(handler, args, &element, &pytype, location)
    }
}

/// An `arc4.StaticArray` value.
#[derive(Clone, Debug)]
pub struct StaticArrayExpressionBuilder {
    expr: Arc<Expression>,
    typ: StaticArrayType,
    pytype: SemanticType,
}

impl StaticArrayExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>, typ: StaticArrayType) -> Self {
        StaticArrayExpressionBuilder {
            expr,
            pytype: SemanticType::Arc4StaticArray(typ.clone()),
            typ,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

impl InstanceBuilder for StaticArrayExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl IndexableBuilder for StaticArrayExpressionBuilder {
    fn index(
        self,
        handler: &Handler,
        index: NodeBuilder,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let size = self.typ.size();
        // Literal indices are proven in bounds here, so no runtime check is needed for them.
        if let NodeBuilder::Literal(literal) = &index {
            if let LiteralValue::Int(value) = &literal.value {
                if !value.to_u64().is_some_and(|value| value < size) {
                    return Err(handler.emit_err(CompileError::ArrayIndexOutOfBounds {
                        index: BigInt::clone(value),
                        size,
                        location: literal.source_location.clone(),
                    }));
                }
            }
        }
        let index = uint64_index(handler, index, &self.pytype.name(), &location)?;
        index_element(handler, self.expr, self.typ.element(), index, location)
    }
}

impl BoolEvalBuilder for StaticArrayExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        Ok(bool_eval_to_constant(self.typ.size() > 0, location, negate))
    }
}

impl MemberAccessBuilder for StaticArrayExpressionBuilder {
    fn member_access(
        self,
        handler: &Handler,
        name: &str,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        match name {
            "length" => Ok(uint64_builder(Expression::uint64_constant(
                self.typ.size(),
                location,
            ))),
            _ => encoded_member(handler, self.expr, &self.pytype, name, location),
        }
    }
}

impl ComparableBuilder for StaticArrayExpressionBuilder {
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

/// `arc4.StaticArray`, with or without a known element type and size.
#[derive(Clone, Debug)]
pub struct StaticArrayClassExpressionBuilder {
    class: ArrayClass<StaticArrayType>,
    location: SourceLocation,
}

impl StaticArrayClassExpressionBuilder {
    pub(crate) fn new(typ: StaticArrayType, location: SourceLocation) -> Self {
        let pytype = SemanticType::Arc4StaticArray(typ.clone());
        StaticArrayClassExpressionBuilder {
            class: ArrayClass::Known { typ, pytype },
            location,
        }
    }

    pub(crate) fn generic(types: ParameterisedTypes, location: SourceLocation) -> Self {
        StaticArrayClassExpressionBuilder {
            class: ArrayClass::Generic(types),
            location,
        }
    }
}

impl TypeClassBuilder for StaticArrayClassExpressionBuilder {
    fn produces(&self) -> Option<&SemanticType> {
        self.class.pytype()
    }

    fn generic(&self) -> Option<GenericType> {
        Some(GenericType::Arc4StaticArray)
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl CallableBuilder for StaticArrayClassExpressionBuilder {
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
        let (element, pytype) = match self.class {
            ArrayClass::Known { typ, pytype } => {
                if args.len() as u64 != typ.size() {
                    return Err(handler.emit_err(CompileError::ArraySizeMismatch {
                        type_name: pytype.name(),
                        expected: typ.size(),
                        found: args.len(),
                        location,
                    }));
                }
                (typ.element().clone(), pytype)
            }
            ArrayClass::Generic(types) => {
                let element = infer_element(handler, &args, &location)?;
                let pytype = types.parameterise(
                    handler,
                    GenericType::Arc4StaticArray,
                    &[
                        TypeArg::Type(element.clone()),
                        TypeArg::Literal(args.len().into()),
                    ],
                    &location,
                )?;
                (element, pytype)
            }
        };
        new_array(handler, args, &element, &pytype, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        awst::Literal,
        eb::factory::{builder_for_generic, builder_for_type, builder_for_var},
        wtypes::Arc4Type,
    };

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 80)
    }

    fn uint8() -> SemanticType {
        SemanticType::arc4_uintn(8).unwrap()
    }

    fn static_array(size: i64) -> SemanticType {
        GenericType::Arc4StaticArray
            .parameterise(
                &Handler::default(),
                &[TypeArg::Type(uint8()), TypeArg::Literal(size.into())],
                &loc(),
            )
            .unwrap()
    }

    fn generic_dynamic_array(handler: &Handler) -> Result<ExpressionBuilder, ErrorEmitted> {
        let types = ParameterisedTypes::default();
        builder_for_generic(handler, GenericType::Arc4DynamicArray, &types, &loc())
    }

    fn byte_var(handler: &Handler, name: &str) -> NodeBuilder {
        builder_for_var(handler, name, &uint8(), loc()).unwrap().into()
    }

    #[test]
    fn generic_dynamic_array_infers_from_first_element() {
        let handler = Handler::default();
        let class = generic_dynamic_array(&handler).unwrap();
        let eb = class
            .call_positional(
                &handler,
                vec![byte_var(&handler, "a"), Literal::int(2, loc()).into()],
                loc(),
            )
            .unwrap();
        assert_eq!(
            eb.value_type(),
            Some(&WType::Arc4(Arc4Type::DynamicArray {
                element: Box::new(Arc4Type::UIntN { bits: 8 })
            }))
        );
        let expr = eb.rvalue(&handler).unwrap();
        assert!(matches!(&expr.kind, ExpressionKind::NewArray { values } if values.len() == 2));
    }

    #[test]
    fn empty_generic_array_cannot_be_inferred() {
        let handler = Handler::default();
        let class = generic_dynamic_array(&handler).unwrap();
        assert!(class.call_positional(&handler, vec![], loc()).is_err());
        assert!(matches!(
            handler.errors().as_slice(),
            [CompileError::CannotInferElementType { .. }]
        ));
    }

    #[test]
    fn elements_must_share_the_element_type() {
        let handler = Handler::default();
        let class = generic_dynamic_array(&handler).unwrap();
        let flag = builder_for_var(&handler, "flag", &SemanticType::Arc4Bool, loc()).unwrap();
        assert!(class
            .call_positional(&handler, vec![byte_var(&handler, "a"), flag.into()], loc())
            .is_err());
        assert_eq!(
            handler.errors()[0].to_string(),
            "Invalid arg type: expected algopy.arc4.UInt8, got algopy.arc4.Bool"
        );
    }

    #[test]
    fn static_array_size_must_match() {
        let handler = Handler::default();
        let class = builder_for_type(&handler, &static_array(2), &loc()).unwrap();
        assert!(class
            .call_positional(&handler, vec![byte_var(&handler, "a")], loc())
            .is_err());
        assert!(matches!(
            handler.errors().as_slice(),
            [CompileError::ArraySizeMismatch {
                expected: 2,
                found: 1,
                ..
            }]
        ));
    }

    #[test]
    fn static_array_literal_index_is_bounds_checked() {
        let handler = Handler::default();
        let array = builder_for_var(&handler, "arr", &static_array(3), loc()).unwrap();
        let element = array
            .clone()
            .index(&handler, Literal::int(2, loc()).into(), loc())
            .unwrap();
        assert_eq!(element.pytype(), Some(&uint8()));

        let literal_loc = SourceLocation::span("contract.py", 80, 4, 5);
        assert!(array
            .index(&handler, Literal::int(3, literal_loc.clone()).into(), loc())
            .is_err());
        let errors = handler.errors();
        assert!(matches!(
            errors.as_slice(),
            [CompileError::ArrayIndexOutOfBounds { size: 3, .. }]
        ));
        assert_eq!(errors[0].location(), Some(&literal_loc));
    }

    #[test]
    fn dynamic_array_accepts_uint64_indices() {
        let handler = Handler::default();
        let array = generic_dynamic_array(&handler)
            .unwrap()
            .call_positional(&handler, vec![byte_var(&handler, "a")], loc())
            .unwrap();
        let i = builder_for_var(&handler, "i", &SemanticType::UInt64, loc()).unwrap();
        let element = array.clone().index(&handler, i.into(), loc()).unwrap();
        assert!(matches!(
            element.rvalue(&handler).unwrap().kind,
            ExpressionKind::IndexExpression { .. }
        ));
        let flag = builder_for_var(&handler, "flag", &SemanticType::Bool, loc()).unwrap();
        assert!(array.index(&handler, flag.into(), loc()).is_err());
        assert!(matches!(
            handler.errors().as_slice(),
            [CompileError::InvalidIndexType { .. }]
        ));
    }

    #[test]
    fn lengths() {
        let handler = Handler::default();
        let array = builder_for_var(&handler, "arr", &static_array(3), loc()).unwrap();
        let length = array.member_access(&handler, "length", loc()).unwrap();
        assert_eq!(
            length.rvalue(&handler).unwrap().kind,
            ExpressionKind::IntegerConstant {
                value: 3u32.into()
            }
        );

        let pytype = GenericType::Arc4DynamicArray
            .parameterise(&handler, &[TypeArg::Type(uint8())], &loc())
            .unwrap();
        let array = builder_for_var(&handler, "dyn", &pytype, loc()).unwrap();
        let length = array.member_access(&handler, "length", loc()).unwrap();
        assert!(matches!(
            length.rvalue(&handler).unwrap().kind,
            ExpressionKind::ArrayLength { .. }
        ));
    }
}
