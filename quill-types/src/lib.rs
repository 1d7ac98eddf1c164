pub mod constants;
pub mod location;

pub use location::{Located, SourceLocation};
