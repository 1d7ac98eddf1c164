mod numeric;
mod text;
mod tuple;

pub use numeric::{BigUIntExpressionBuilder, BoolExpressionBuilder, UInt64ExpressionBuilder};
pub use text::{BytesExpressionBuilder, StringExpressionBuilder};
pub use tuple::TupleExpressionBuilder;
