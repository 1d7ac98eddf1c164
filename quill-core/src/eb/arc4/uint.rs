use super::base::{compare_encoded, encode, encoded_member, typed_node};
use crate::{
    awst::{Expression, ExpressionKind, Literal, LiteralValue, NumericComparison},
    eb::{
        utils::{check_unsigned_range, compare_with_encoding, expect_positional, invalid_arguments},
        BoolEvalBuilder, CallableBuilder, ComparableBuilder, ExpressionBuilder, InstanceBuilder,
        MemberAccessBuilder, NodeBuilder, TypeClassBuilder,
    },
    parse::ArgKind,
    types::{GenericType, SemanticType, UIntNType},
    wtypes::WType,
};

use std::sync::Arc;

use num_bigint::BigUint;
use quill_error::handler::{ErrorEmitted, Handler};
use quill_types::{constants::BITS_PER_BYTE, SourceLocation};

/// An `arc4.UIntN` value.
#[derive(Clone, Debug)]
pub struct UIntNExpressionBuilder {
    expr: Arc<Expression>,
    typ: UIntNType,
    pytype: SemanticType,
}

impl UIntNExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>, typ: UIntNType) -> Self {
        UIntNExpressionBuilder {
            expr,
            typ,
            pytype: SemanticType::Arc4UIntN(typ),
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

impl InstanceBuilder for UIntNExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl BoolEvalBuilder for UIntNExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let zero = vec![0; (u64::from(self.typ.bits()) / BITS_PER_BYTE) as usize];
        Ok(compare_with_encoding(self.expr, zero, location, negate))
    }
}

impl MemberAccessBuilder for UIntNExpressionBuilder {
    fn member_access(
        self,
        handler: &Handler,
        name: &str,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        encoded_member(handler, self.expr, &self.pytype, name, location)
    }
}

impl ComparableBuilder for UIntNExpressionBuilder {
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

/// An `arc4.UIntN` class with a known bit width.
#[derive(Clone, Debug)]
pub struct UIntNClassExpressionBuilder {
    typ: UIntNType,
    pytype: SemanticType,
    location: SourceLocation,
}

impl UIntNClassExpressionBuilder {
    pub(crate) fn new(typ: UIntNType, location: SourceLocation) -> Self {
        UIntNClassExpressionBuilder {
            typ,
            pytype: SemanticType::Arc4UIntN(typ),
            location,
        }
    }
}

impl TypeClassBuilder for UIntNClassExpressionBuilder {
    fn produces(&self) -> Option<&SemanticType> {
        Some(&self.pytype)
    }

    fn generic(&self) -> Option<GenericType> {
        self.pytype.generic()
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl CallableBuilder for UIntNClassExpressionBuilder {
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
        match (args.next(), args.next()) {
            (None, _) => typed_node(
                handler,
                ExpressionKind::IntegerConstant {
                    value: BigUint::default(),
                },
                &self.pytype,
                location,
            ),
            (
                Some(NodeBuilder::Literal(Literal {
                    value: LiteralValue::Int(value),
                    source_location,
                })),
                None,
            ) => {
                check_unsigned_range(
                    handler,
                    &value,
                    u64::from(self.typ.bits()),
                    self.pytype.name(),
                    &source_location,
                )?;
                let (_, value) = value.into_parts();
                typed_node(
                    handler,
                    ExpressionKind::IntegerConstant { value },
                    &self.pytype,
                    location,
                )
            }
            (Some(NodeBuilder::Builder(eb)), None)
                if matches!(eb.value_type(), Some(WType::Uint64 | WType::Biguint)) =>
            {
                let value = eb.rvalue(handler)?;
                encode(handler, value, &self.pytype, location)
            }
            _ => Err(invalid_arguments(handler, &location)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{eb::factory::builder_for_var, wtypes::Arc4Type};
    use num_bigint::BigInt;
    use quill_error::error::CompileError;

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 40)
    }

    fn uint8_class() -> ExpressionBuilder {
        let typ = match SemanticType::arc4_uintn(8) {
            Some(SemanticType::Arc4UIntN(typ)) => typ,
            other => panic!("unexpected type {other:?}"),
        };
        ExpressionBuilder::Arc4UIntNClass(UIntNClassExpressionBuilder::new(typ, loc()))
    }

    #[test]
    fn literal_in_range() {
        let handler = Handler::default();
        let eb = uint8_class()
            .call_positional(&handler, vec![Literal::int(255, loc()).into()], loc())
            .unwrap();
        let expr = eb.rvalue(&handler).unwrap();
        assert_eq!(
            expr.kind,
            ExpressionKind::IntegerConstant {
                value: BigUint::from(255u32)
            }
        );
        assert_eq!(expr.wtype, WType::Arc4(Arc4Type::UIntN { bits: 8 }));
    }

    #[test]
    fn literal_out_of_range_is_reported_at_the_literal() {
        let handler = Handler::default();
        let literal_loc = SourceLocation::span("contract.py", 40, 10, 13);
        let literal = Literal::int(256, literal_loc.clone());
        let result = uint8_class().call_positional(&handler, vec![literal.into()], loc());
        assert!(result.is_err());
        let errors = handler.errors();
        assert_eq!(
            errors[0],
            CompileError::LiteralOutOfRange {
                value: BigInt::from(256),
                type_name: "algopy.arc4.UInt8".into(),
                location: literal_loc,
            }
        );
    }

    #[test]
    fn uint64_values_are_encoded() {
        let handler = Handler::default();
        let x = builder_for_var(&handler, "x", &SemanticType::UInt64, loc()).unwrap();
        let eb = uint8_class()
            .call_positional(&handler, vec![x.into()], loc())
            .unwrap();
        assert!(matches!(
            eb.rvalue(&handler).unwrap().kind,
            ExpressionKind::Arc4Encode { .. }
        ));
    }

    #[test]
    fn native_member_decodes() {
        let handler = Handler::default();
        let uint256 = SemanticType::arc4_uintn(256).unwrap();
        let value = builder_for_var(&handler, "v", &uint256, loc()).unwrap();
        let native = value.member_access(&handler, "native", loc()).unwrap();
        assert_eq!(native.pytype(), Some(&SemanticType::BigUInt));
    }

    #[test]
    fn other_arguments_are_invalid() {
        let handler = Handler::default();
        let result = uint8_class().call_positional(
            &handler,
            vec![Literal::str("1", loc()).into()],
            loc(),
        );
        assert!(result.is_err());
        assert_eq!(handler.errors()[0].to_string(), "Invalid/unhandled arguments");
    }
}
