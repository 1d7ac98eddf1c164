use crate::{
    awst::{Expression, ExpressionKind, Literal, LiteralValue, NumericComparison},
    eb::{
        utils::{
            bool_builder, check_unsigned_range, expect_equality, literal_to_u64, mismatched_type,
            numeric_comparison, truthy_comparison,
        },
        BoolEvalBuilder, ComparableBuilder, ExpressionBuilder, InstanceBuilder, NodeBuilder,
    },
    types::SemanticType,
    wtypes::WType,
};

use std::sync::Arc;

use num_bigint::BigUint;
use quill_error::handler::{ErrorEmitted, Handler};
use quill_types::{constants::ARC4_UINTN_MAX_BITS, SourceLocation};

#[derive(Clone, Debug)]
pub struct UInt64ExpressionBuilder {
    expr: Arc<Expression>,
    pytype: SemanticType,
}

impl UInt64ExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>) -> Self {
        UInt64ExpressionBuilder {
            expr,
            pytype: SemanticType::UInt64,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

impl InstanceBuilder for UInt64ExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl BoolEvalBuilder for UInt64ExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let zero = Expression::uint64_constant(0, location.clone());
        Ok(numeric_comparison(
            self.expr,
            truthy_comparison(negate),
            zero,
            location,
        ))
    }
}

impl ComparableBuilder for UInt64ExpressionBuilder {
    fn compare(
        self,
        handler: &Handler,
        other: NodeBuilder,
        op: NumericComparison,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let rhs = match other {
            NodeBuilder::Literal(Literal {
                value: LiteralValue::Int(value),
                source_location,
            }) => {
                let value = literal_to_u64(handler, &value, &source_location)?;
                Expression::uint64_constant(value, source_location)
            }
            NodeBuilder::Builder(ExpressionBuilder::UInt64(eb)) => eb.expr,
            other => return Err(mismatched_type(handler, &self.pytype, &other, &location)),
        };
        Ok(numeric_comparison(self.expr, op, rhs, location))
    }
}

#[derive(Clone, Debug)]
pub struct BigUIntExpressionBuilder {
    expr: Arc<Expression>,
    pytype: SemanticType,
}

impl BigUIntExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>) -> Self {
        BigUIntExpressionBuilder {
            expr,
            pytype: SemanticType::BigUInt,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

fn biguint_constant(value: BigUint, location: SourceLocation) -> Arc<Expression> {
    Expression::new(
        ExpressionKind::IntegerConstant { value },
        WType::Biguint,
        location,
    )
}

impl InstanceBuilder for BigUIntExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl BoolEvalBuilder for BigUIntExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let zero = biguint_constant(BigUint::default(), location.clone());
        Ok(numeric_comparison(
            self.expr,
            truthy_comparison(negate),
            zero,
            location,
        ))
    }
}

impl ComparableBuilder for BigUIntExpressionBuilder {
    fn compare(
        self,
        handler: &Handler,
        other: NodeBuilder,
        op: NumericComparison,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let rhs = match other {
            NodeBuilder::Literal(Literal {
                value: LiteralValue::Int(value),
                source_location,
            }) => {
                check_unsigned_range(
                    handler,
                    &value,
                    u64::from(ARC4_UINTN_MAX_BITS),
                    self.pytype.name(),
                    &source_location,
                )?;
                let (_, magnitude) = value.into_parts();
                biguint_constant(magnitude, source_location)
            }
            NodeBuilder::Builder(ExpressionBuilder::BigUInt(eb)) => eb.expr,
            other => return Err(mismatched_type(handler, &self.pytype, &other, &location)),
        };
        Ok(numeric_comparison(self.expr, op, rhs, location))
    }
}

#[derive(Clone, Debug)]
pub struct BoolExpressionBuilder {
    expr: Arc<Expression>,
    pytype: SemanticType,
}

impl BoolExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>) -> Self {
        BoolExpressionBuilder {
            expr,
            pytype: SemanticType::Bool,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

impl InstanceBuilder for BoolExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl BoolEvalBuilder for BoolExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        if !negate {
            return Ok(ExpressionBuilder::Bool(self));
        }
        Ok(bool_builder(Expression::new(
            ExpressionKind::Not { expr: self.expr },
            WType::Bool,
            location,
        )))
    }
}

impl ComparableBuilder for BoolExpressionBuilder {
    fn compare(
        self,
        handler: &Handler,
        other: NodeBuilder,
        op: NumericComparison,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        expect_equality(handler, op, self.pytype.name(), &location)?;
        let rhs = match other {
            NodeBuilder::Literal(Literal {
                value: LiteralValue::Bool(value),
                source_location,
            }) => Expression::bool_constant(value, source_location),
            NodeBuilder::Builder(ExpressionBuilder::Bool(eb)) => eb.expr,
            other => return Err(mismatched_type(handler, &self.pytype, &other, &location)),
        };
        Ok(numeric_comparison(self.expr, op, rhs, location))
    }
}
