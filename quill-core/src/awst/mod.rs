//! The typed abstract syntax tree (AWST) that expression builders lower into.
//!
//! Nodes are immutable once built and shared through [Arc], so a node may appear as the child of
//! several parents.

mod literal;

pub use literal::{Literal, LiteralValue};

use crate::wtypes::WType;

use std::{fmt, sync::Arc};

use num_bigint::BigUint;
use quill_types::{Located, SourceLocation};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub wtype: WType,
    pub source_location: SourceLocation,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ExpressionKind {
    /// An integer. With an ARC4 `uintN` wtype it is the encoded integer.
    IntegerConstant {
        value: BigUint,
    },
    BoolConstant {
        value: bool,
    },
    BytesConstant {
        value: Vec<u8>,
    },
    StringConstant {
        value: String,
    },
    VarExpression {
        name: String,
    },
    Arc4Encode {
        value: Arc<Expression>,
    },
    Arc4Decode {
        value: Arc<Expression>,
    },
    /// Reinterprets the underlying bytes of `expr` as the node's wtype.
    ReinterpretCast {
        expr: Arc<Expression>,
    },
    TupleItemExpression {
        base: Arc<Expression>,
        index: usize,
    },
    IndexExpression {
        base: Arc<Expression>,
        index: Arc<Expression>,
    },
    FieldExpression {
        base: Arc<Expression>,
        name: String,
    },
    ArrayLength {
        array: Arc<Expression>,
    },
    NewArray {
        values: Vec<Arc<Expression>>,
    },
    NewStruct {
        values: Vec<(String, Arc<Expression>)>,
    },
    NumericComparison {
        lhs: Arc<Expression>,
        operator: NumericComparison,
        rhs: Arc<Expression>,
    },
    BytesComparison {
        lhs: Arc<Expression>,
        operator: EqualityComparison,
        rhs: Arc<Expression>,
    },
    IntrinsicCall {
        op_code: String,
        stack_args: Vec<Arc<Expression>>,
    },
    Not {
        expr: Arc<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, wtype: WType, source_location: SourceLocation) -> Arc<Self> {
        let expr = Arc::new(Expression {
            kind,
            wtype,
            source_location,
        });
        tracing::debug!(
            "lowered {} to {} at {}",
            expr.kind.name(),
            expr.wtype,
            expr.source_location
        );
        expr
    }

    pub fn var(name: impl Into<String>, wtype: WType, location: SourceLocation) -> Arc<Self> {
        Self::new(
            ExpressionKind::VarExpression { name: name.into() },
            wtype,
            location,
        )
    }

    pub fn uint64_constant(value: u64, location: SourceLocation) -> Arc<Self> {
        Self::new(
            ExpressionKind::IntegerConstant {
                value: value.into(),
            },
            WType::Uint64,
            location,
        )
    }

    pub fn bool_constant(value: bool, location: SourceLocation) -> Arc<Self> {
        Self::new(
            ExpressionKind::BoolConstant { value },
            WType::Bool,
            location,
        )
    }

    pub fn bytes_constant(value: Vec<u8>, wtype: WType, location: SourceLocation) -> Arc<Self> {
        Self::new(ExpressionKind::BytesConstant { value }, wtype, location)
    }

    /// Serializes the node and its children for `--output-awst`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Located for Expression {
    fn source_location(&self) -> Option<SourceLocation> {
        Some(self.source_location.clone())
    }
}

impl ExpressionKind {
    pub fn name(&self) -> &'static str {
        use ExpressionKind::*;
        match self {
            IntegerConstant { .. } => "IntegerConstant",
            BoolConstant { .. } => "BoolConstant",
            BytesConstant { .. } => "BytesConstant",
            StringConstant { .. } => "StringConstant",
            VarExpression { .. } => "VarExpression",
            Arc4Encode { .. } => "ARC4Encode",
            Arc4Decode { .. } => "ARC4Decode",
            ReinterpretCast { .. } => "ReinterpretCast",
            TupleItemExpression { .. } => "TupleItemExpression",
            IndexExpression { .. } => "IndexExpression",
            FieldExpression { .. } => "FieldExpression",
            ArrayLength { .. } => "ArrayLength",
            NewArray { .. } => "NewArray",
            NewStruct { .. } => "NewStruct",
            NumericComparison { .. } => "NumericComparisonExpression",
            BytesComparison { .. } => "BytesComparisonExpression",
            IntrinsicCall { .. } => "IntrinsicCall",
            Not { .. } => "Not",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NumericComparison {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl NumericComparison {
    /// The comparison that holds exactly when `self` does not.
    pub fn negate(self) -> Self {
        use NumericComparison::*;
        match self {
            Eq => Ne,
            Ne => Eq,
            Lt => Gte,
            Lte => Gt,
            Gt => Lte,
            Gte => Lt,
        }
    }

    /// Narrows to an equality comparison, which is all that byte strings support.
    pub fn as_equality(self) -> Option<EqualityComparison> {
        match self {
            NumericComparison::Eq => Some(EqualityComparison::Eq),
            NumericComparison::Ne => Some(EqualityComparison::Ne),
            _ => None,
        }
    }
}

impl fmt::Display for NumericComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use NumericComparison::*;
        let op = match self {
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Lte => "<=",
            Gt => ">",
            Gte => ">=",
        };
        write!(f, "{op}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EqualityComparison {
    Eq,
    Ne,
}

impl EqualityComparison {
    pub fn from_negate(negate: bool) -> Self {
        if negate {
            EqualityComparison::Eq
        } else {
            EqualityComparison::Ne
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 2)
    }

    #[test]
    fn nodes_serialize_with_their_children() {
        let x = Expression::var("x", WType::Uint64, loc());
        let cmp = Expression::new(
            ExpressionKind::NumericComparison {
                lhs: x.clone(),
                operator: NumericComparison::Ne,
                rhs: Expression::uint64_constant(0, loc()),
            },
            WType::Bool,
            loc(),
        );
        let json = cmp.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["wtype"], "Bool");
        assert_eq!(
            value["kind"]["NumericComparison"]["lhs"]["kind"]["VarExpression"]["name"],
            "x"
        );
        assert_eq!(
            value["kind"]["NumericComparison"]["operator"],
            serde_json::json!("Ne")
        );
    }

    #[test]
    fn negated_comparisons() {
        for op in [
            NumericComparison::Eq,
            NumericComparison::Lt,
            NumericComparison::Gte,
        ] {
            assert_eq!(op.negate().negate(), op);
            assert_ne!(op.negate(), op);
        }
        assert_eq!(NumericComparison::Lte.to_string(), "<=");
        assert_eq!(NumericComparison::Lt.as_equality(), None);
    }
}
