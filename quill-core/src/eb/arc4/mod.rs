//! Builders for values in the ARC4 ABI encoding and for the ARC4 classes that construct them.

mod arrays;
mod base;
mod boolean;
mod string;
mod structs;
mod tuple;
mod uint;

pub use arrays::{
    DynamicArrayClassExpressionBuilder, DynamicArrayExpressionBuilder,
    StaticArrayClassExpressionBuilder, StaticArrayExpressionBuilder,
};
pub use boolean::{Arc4BoolClassExpressionBuilder, Arc4BoolExpressionBuilder};
pub use string::{Arc4StringClassExpressionBuilder, Arc4StringExpressionBuilder};
pub use structs::{Arc4StructClassExpressionBuilder, Arc4StructExpressionBuilder};
pub use tuple::{
    Arc4TupleClassExpressionBuilder, Arc4TupleExpressionBuilder,
    Arc4TupleGenericClassExpressionBuilder,
};
pub use uint::{UIntNClassExpressionBuilder, UIntNExpressionBuilder};
