//! Expression builders.
//!
//! Every source expression is represented by a builder while it is being checked. Instance
//! builders wrap an AWST [Expression] together with its [SemanticType]; class builders stand for
//! a type reference, which can be called to construct a value. Each builder implements the
//! capability traits it supports, and [ExpressionBuilder] dispatches to them, reporting
//! [CompileError::UnsupportedOperation] for everything else.

mod arc4;
pub mod factory;
mod native;
pub(crate) mod utils;

pub use arc4::{
    Arc4BoolClassExpressionBuilder, Arc4BoolExpressionBuilder, Arc4StringClassExpressionBuilder,
    Arc4StringExpressionBuilder, Arc4StructClassExpressionBuilder, Arc4StructExpressionBuilder,
    Arc4TupleClassExpressionBuilder, Arc4TupleExpressionBuilder,
    Arc4TupleGenericClassExpressionBuilder, DynamicArrayClassExpressionBuilder,
    DynamicArrayExpressionBuilder, StaticArrayClassExpressionBuilder,
    StaticArrayExpressionBuilder, UIntNClassExpressionBuilder, UIntNExpressionBuilder,
};
pub use native::{
    BigUIntExpressionBuilder, BoolExpressionBuilder, BytesExpressionBuilder,
    StringExpressionBuilder, TupleExpressionBuilder, UInt64ExpressionBuilder,
};

use crate::{
    awst::{Expression, Literal, NumericComparison},
    parse::ArgKind,
    types::{GenericType, SemanticType},
    wtypes::WType,
};

use std::sync::Arc;

use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::SourceLocation;

/// A call argument or operand: either an already built expression or a literal that is yet to
/// be given a type.
#[derive(Clone, Debug)]
pub enum NodeBuilder {
    Builder(ExpressionBuilder),
    Literal(Literal),
}

impl NodeBuilder {
    pub fn source_location(&self) -> SourceLocation {
        match self {
            NodeBuilder::Builder(eb) => eb.source_location(),
            NodeBuilder::Literal(literal) => literal.source_location.clone(),
        }
    }

    /// The type of the value this node evaluates to.
    pub fn pytype(&self, handler: &Handler) -> Result<SemanticType, ErrorEmitted> {
        match self {
            NodeBuilder::Literal(literal) => Ok(literal.pytype()),
            NodeBuilder::Builder(eb) => match eb.pytype() {
                Some(pytype) => Ok(pytype.clone()),
                None => Err(handler.emit_err(CompileError::TypeUsedAsValue {
                    type_name: eb.type_name(),
                    location: eb.source_location(),
                })),
            },
        }
    }

    pub fn value_type(&self) -> Option<&WType> {
        match self {
            NodeBuilder::Builder(eb) => eb.value_type(),
            NodeBuilder::Literal(_) => None,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            NodeBuilder::Builder(eb) => eb.type_name(),
            NodeBuilder::Literal(literal) => literal.pytype().name(),
        }
    }
}

impl From<ExpressionBuilder> for NodeBuilder {
    fn from(eb: ExpressionBuilder) -> Self {
        NodeBuilder::Builder(eb)
    }
}

impl From<Literal> for NodeBuilder {
    fn from(literal: Literal) -> Self {
        NodeBuilder::Literal(literal)
    }
}

/// A builder that wraps a value.
pub trait InstanceBuilder {
    fn pytype(&self) -> &SemanticType;
    fn expr(&self) -> &Arc<Expression>;
}

/// A builder that stands for a type.
pub trait TypeClassBuilder {
    /// The type of the values this class constructs, unless it still needs to be inferred from
    /// the call arguments.
    fn produces(&self) -> Option<&SemanticType>;
    fn generic(&self) -> Option<GenericType>;
    fn location(&self) -> &SourceLocation;
}

pub trait CallableBuilder {
    fn call(
        self,
        handler: &Handler,
        args: Vec<NodeBuilder>,
        arg_types: &[SemanticType],
        arg_kinds: &[ArgKind],
        arg_names: &[Option<String>],
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted>;
}

pub trait IndexableBuilder {
    fn index(
        self,
        handler: &Handler,
        index: NodeBuilder,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted>;
}

pub trait BoolEvalBuilder {
    /// Evaluates the value in a boolean context. The result is a `bool` builder, inverted when
    /// `negate` is set.
    fn bool_eval(
        self,
        handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted>;
}

pub trait MemberAccessBuilder {
    fn member_access(
        self,
        handler: &Handler,
        name: &str,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted>;
}

pub trait ComparableBuilder {
    fn compare(
        self,
        handler: &Handler,
        other: NodeBuilder,
        op: NumericComparison,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted>;
}

#[derive(Clone, Debug)]
pub enum ExpressionBuilder {
    UInt64(UInt64ExpressionBuilder),
    BigUInt(BigUIntExpressionBuilder),
    Bool(BoolExpressionBuilder),
    Bytes(BytesExpressionBuilder),
    String(StringExpressionBuilder),
    Tuple(TupleExpressionBuilder),
    Arc4UIntN(UIntNExpressionBuilder),
    Arc4Bool(Arc4BoolExpressionBuilder),
    Arc4String(Arc4StringExpressionBuilder),
    Arc4Tuple(Arc4TupleExpressionBuilder),
    Arc4DynamicArray(DynamicArrayExpressionBuilder),
    Arc4StaticArray(StaticArrayExpressionBuilder),
    Arc4Struct(Arc4StructExpressionBuilder),
    Arc4UIntNClass(UIntNClassExpressionBuilder),
    Arc4BoolClass(Arc4BoolClassExpressionBuilder),
    Arc4StringClass(Arc4StringClassExpressionBuilder),
    Arc4TupleGenericClass(Arc4TupleGenericClassExpressionBuilder),
    Arc4TupleClass(Arc4TupleClassExpressionBuilder),
    Arc4DynamicArrayClass(DynamicArrayClassExpressionBuilder),
    Arc4StaticArrayClass(StaticArrayClassExpressionBuilder),
    Arc4StructClass(Arc4StructClassExpressionBuilder),
}

enum BuilderRef<'a> {
    Instance(&'a dyn InstanceBuilder),
    Class(&'a dyn TypeClassBuilder),
}

impl ExpressionBuilder {
    fn builder_ref(&self) -> BuilderRef<'_> {
        use BuilderRef::{Class, Instance};
        use ExpressionBuilder::*;
        match self {
            UInt64(eb) => Instance(eb),
            BigUInt(eb) => Instance(eb),
            Bool(eb) => Instance(eb),
            Bytes(eb) => Instance(eb),
            String(eb) => Instance(eb),
            Tuple(eb) => Instance(eb),
            Arc4UIntN(eb) => Instance(eb),
            Arc4Bool(eb) => Instance(eb),
            Arc4String(eb) => Instance(eb),
            Arc4Tuple(eb) => Instance(eb),
            Arc4DynamicArray(eb) => Instance(eb),
            Arc4StaticArray(eb) => Instance(eb),
            Arc4Struct(eb) => Instance(eb),
            Arc4UIntNClass(eb) => Class(eb),
            Arc4BoolClass(eb) => Class(eb),
            Arc4StringClass(eb) => Class(eb),
            Arc4TupleGenericClass(eb) => Class(eb),
            Arc4TupleClass(eb) => Class(eb),
            Arc4DynamicArrayClass(eb) => Class(eb),
            Arc4StaticArrayClass(eb) => Class(eb),
            Arc4StructClass(eb) => Class(eb),
        }
    }

    fn as_instance(&self) -> Option<&dyn InstanceBuilder> {
        match self.builder_ref() {
            BuilderRef::Instance(eb) => Some(eb),
            BuilderRef::Class(_) => None,
        }
    }

    /// The type of the wrapped value. Class builders have none.
    pub fn pytype(&self) -> Option<&SemanticType> {
        self.as_instance().map(InstanceBuilder::pytype)
    }

    /// The lowered type of the wrapped value.
    pub fn value_type(&self) -> Option<&WType> {
        self.as_instance().map(|eb| &eb.expr().wtype)
    }

    pub fn source_location(&self) -> SourceLocation {
        match self.builder_ref() {
            BuilderRef::Instance(eb) => eb.expr().source_location.clone(),
            BuilderRef::Class(eb) => eb.location().clone(),
        }
    }

    pub fn type_name(&self) -> String {
        match self.builder_ref() {
            BuilderRef::Instance(eb) => eb.pytype().name(),
            BuilderRef::Class(eb) => {
                let name = eb
                    .produces()
                    .map(SemanticType::name)
                    .or_else(|| eb.generic().map(|generic| generic.name()));
                format!("type[{}]", name.unwrap_or_default())
            }
        }
    }

    /// The expression the builder evaluates to when used as a value.
    pub fn rvalue(&self, handler: &Handler) -> Result<Arc<Expression>, ErrorEmitted> {
        match self.as_instance() {
            Some(eb) => Ok(eb.expr().clone()),
            None => Err(handler.emit_err(CompileError::TypeUsedAsValue {
                type_name: self.type_name(),
                location: self.source_location(),
            })),
        }
    }

    fn unsupported(
        &self,
        handler: &Handler,
        operation: &'static str,
        location: SourceLocation,
    ) -> ErrorEmitted {
        handler.emit_err(CompileError::UnsupportedOperation {
            operation,
            type_name: self.type_name(),
            location,
        })
    }

    pub fn call(
        self,
        handler: &Handler,
        args: Vec<NodeBuilder>,
        arg_types: &[SemanticType],
        arg_kinds: &[ArgKind],
        arg_names: &[Option<String>],
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        use ExpressionBuilder::*;
        if arg_types.len() != args.len()
            || arg_kinds.len() != args.len()
            || arg_names.len() != args.len()
        {
            return Err(handler.emit_err(CompileError::internal(
                "call argument metadata does not match the arguments",
                location,
            )));
        }
        match self {
            Arc4UIntNClass(eb) => eb.call(handler, args, arg_types, arg_kinds, arg_names, location),
            Arc4BoolClass(eb) => eb.call(handler, args, arg_types, arg_kinds, arg_names, location),
            Arc4StringClass(eb) => {
                eb.call(handler, args, arg_types, arg_kinds, arg_names, location)
            }
            Arc4TupleGenericClass(eb) => {
                eb.call(handler, args, arg_types, arg_kinds, arg_names, location)
            }
            Arc4TupleClass(eb) => eb.call(handler, args, arg_types, arg_kinds, arg_names, location),
            Arc4DynamicArrayClass(eb) => {
                eb.call(handler, args, arg_types, arg_kinds, arg_names, location)
            }
            Arc4StaticArrayClass(eb) => {
                eb.call(handler, args, arg_types, arg_kinds, arg_names, location)
            }
            Arc4StructClass(eb) => {
                eb.call(handler, args, arg_types, arg_kinds, arg_names, location)
            }
            other => Err(other.unsupported(handler, "Calling", location)),
        }
    }

    /// Calls the builder with positional arguments only.
    pub fn call_positional(
        self,
        handler: &Handler,
        args: Vec<NodeBuilder>,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let arg_types = args
            .iter()
            .map(|arg| arg.pytype(handler))
            .collect::<Result<Vec<_>, _>>()?;
        let arg_kinds = vec![ArgKind::Positional; args.len()];
        let arg_names = vec![None; args.len()];
        self.call(handler, args, &arg_types, &arg_kinds, &arg_names, location)
    }

    pub fn index(
        self,
        handler: &Handler,
        index: NodeBuilder,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        use ExpressionBuilder::*;
        match self {
            Tuple(eb) => eb.index(handler, index, location),
            Arc4Tuple(eb) => eb.index(handler, index, location),
            Arc4DynamicArray(eb) => eb.index(handler, index, location),
            Arc4StaticArray(eb) => eb.index(handler, index, location),
            other => Err(other.unsupported(handler, "Indexing", location)),
        }
    }

    pub fn bool_eval(
        self,
        handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        use ExpressionBuilder::*;
        match self {
            UInt64(eb) => eb.bool_eval(handler, location, negate),
            BigUInt(eb) => eb.bool_eval(handler, location, negate),
            Bool(eb) => eb.bool_eval(handler, location, negate),
            Bytes(eb) => eb.bool_eval(handler, location, negate),
            String(eb) => eb.bool_eval(handler, location, negate),
            Tuple(eb) => eb.bool_eval(handler, location, negate),
            Arc4UIntN(eb) => eb.bool_eval(handler, location, negate),
            Arc4Bool(eb) => eb.bool_eval(handler, location, negate),
            Arc4String(eb) => eb.bool_eval(handler, location, negate),
            Arc4Tuple(eb) => eb.bool_eval(handler, location, negate),
            Arc4DynamicArray(eb) => eb.bool_eval(handler, location, negate),
            Arc4StaticArray(eb) => eb.bool_eval(handler, location, negate),
            Arc4Struct(eb) => eb.bool_eval(handler, location, negate),
            other => Err(other.unsupported(handler, "Boolean evaluation", location)),
        }
    }

    pub fn member_access(
        self,
        handler: &Handler,
        name: &str,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        use ExpressionBuilder::*;
        match self {
            Bytes(eb) => eb.member_access(handler, name, location),
            Arc4UIntN(eb) => eb.member_access(handler, name, location),
            Arc4Bool(eb) => eb.member_access(handler, name, location),
            Arc4String(eb) => eb.member_access(handler, name, location),
            Arc4Tuple(eb) => eb.member_access(handler, name, location),
            Arc4DynamicArray(eb) => eb.member_access(handler, name, location),
            Arc4StaticArray(eb) => eb.member_access(handler, name, location),
            Arc4Struct(eb) => eb.member_access(handler, name, location),
            other => Err(other.unsupported(handler, "Member access", location)),
        }
    }

    pub fn compare(
        self,
        handler: &Handler,
        other: NodeBuilder,
        op: NumericComparison,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        use ExpressionBuilder::*;
        match self {
            UInt64(eb) => eb.compare(handler, other, op, location),
            BigUInt(eb) => eb.compare(handler, other, op, location),
            Bool(eb) => eb.compare(handler, other, op, location),
            Bytes(eb) => eb.compare(handler, other, op, location),
            String(eb) => eb.compare(handler, other, op, location),
            Arc4UIntN(eb) => eb.compare(handler, other, op, location),
            Arc4Bool(eb) => eb.compare(handler, other, op, location),
            Arc4String(eb) => eb.compare(handler, other, op, location),
            Arc4Tuple(eb) => eb.compare(handler, other, op, location),
            Arc4DynamicArray(eb) => eb.compare(handler, other, op, location),
            Arc4StaticArray(eb) => eb.compare(handler, other, op, location),
            Arc4Struct(eb) => eb.compare(handler, other, op, location),
            this => Err(this.unsupported(handler, "Comparison", location)),
        }
    }
}
