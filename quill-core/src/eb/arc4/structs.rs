use super::base::{compare_encoded, encoded_member, expect_value, typed_node};
use crate::{
    awst::{Expression, ExpressionKind, NumericComparison},
    eb::{
        factory::builder_for_instance,
        utils::{bool_eval_to_constant, invalid_arguments},
        BoolEvalBuilder, CallableBuilder, ComparableBuilder, ExpressionBuilder, InstanceBuilder,
        MemberAccessBuilder, NodeBuilder, TypeClassBuilder,
    },
    parse::ArgKind,
    types::{GenericType, SemanticType, StructType},
};

use std::sync::Arc;

use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::SourceLocation;

/// A value of a user defined `arc4.Struct`.
#[derive(Clone, Debug)]
pub struct Arc4StructExpressionBuilder {
    expr: Arc<Expression>,
    typ: StructType,
    pytype: SemanticType,
}

impl Arc4StructExpressionBuilder {
    pub(crate) fn new(expr: Arc<Expression>, typ: StructType) -> Self {
        Arc4StructExpressionBuilder {
            expr,
            pytype: SemanticType::Arc4Struct(typ.clone()),
            typ,
        }
    }

    pub fn into_expr(self) -> Arc<Expression> {
        self.expr
    }
}

impl InstanceBuilder for Arc4StructExpressionBuilder {
    fn pytype(&self) -> &SemanticType {
        &self.pytype
    }

    fn expr(&self) -> &Arc<Expression> {
        &self.expr
    }
}

impl MemberAccessBuilder for Arc4StructExpressionBuilder {
    fn member_access(
        self,
        handler: &Handler,
        name: &str,
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let Some((_, field_type)) = self.typ.field(name) else {
            return encoded_member(handler, self.expr, &self.pytype, name, location);
        };
        let Some(wtype) = field_type.wtype() else {
            return Err(handler.emit_err(CompileError::internal(
                format!("struct field {name} has no lowered type"),
                location,
            )));
        };
        let field = Expression::new(
            ExpressionKind::FieldExpression {
                base: self.expr.clone(),
                name: name.to_string(),
            },
            wtype,
            location,
        );
        builder_for_instance(handler, field_type, field)
    }
}

impl BoolEvalBuilder for Arc4StructExpressionBuilder {
    fn bool_eval(
        self,
        _handler: &Handler,
        location: SourceLocation,
        negate: bool,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        Ok(bool_eval_to_constant(true, location, negate))
    }
}

impl ComparableBuilder for Arc4StructExpressionBuilder {
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

/// A user defined `arc4.Struct` class. Fields may be passed positionally, by name, or both.
#[derive(Clone, Debug)]
pub struct Arc4StructClassExpressionBuilder {
    typ: StructType,
    pytype: SemanticType,
    location: SourceLocation,
}

impl Arc4StructClassExpressionBuilder {
    pub(crate) fn new(typ: StructType, location: SourceLocation) -> Self {
        Arc4StructClassExpressionBuilder {
            pytype: SemanticType::Arc4Struct(typ.clone()),
            typ,
            location,
        }
    }
}

impl TypeClassBuilder for Arc4StructClassExpressionBuilder {
    fn produces(&self) -> Option<&SemanticType> {
        Some(&self.pytype)
    }

    fn generic(&self) -> Option<GenericType> {
        None
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl CallableBuilder for Arc4StructClassExpressionBuilder {
    fn call(
        self,
        handler: &Handler,
        args: Vec<NodeBuilder>,
        _arg_types: &[SemanticType],
        arg_kinds: &[ArgKind],
        arg_names: &[Option<String>],
        location: SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let fields = self.typ.fields();
        let mut values: Vec<Option<Arc<Expression>>> = vec![None; fields.len()];
        for (position, ((arg, kind), name)) in args
            .into_iter()
            .zip(arg_kinds)
            .zip(arg_names)
            .enumerate()
        {
            let index = match (kind, name) {
                (ArgKind::Positional, _) if position < fields.len() => position,
                (ArgKind::Named, Some(name)) => match self.typ.field(name) {
                    Some((index, _)) => index,
                    None => {
                        return Err(handler.emit_err(CompileError::UnknownStructField {
                            struct_name: self.typ.name().to_string(),
                            field_name: name.clone(),
                            location: arg.source_location(),
                        }))
                    }
                },
                _ => return Err(invalid_arguments(handler, &location)),
            };
            if values[index].is_some() {
                return Err(handler.emit_err(CompileError::DuplicateStructField {
                    struct_name: self.typ.name().to_string(),
                    field_name: fields[index].0.clone(),
                    location: arg.source_location(),
                }));
            }
            values[index] = Some(expect_value(handler, arg, &fields[index].1)?);
        }

        let missing = fields
            .iter()
            .zip(&values)
            .filter(|(_, value)| value.is_none())
            .map(|((name, _), _)| name.clone())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(handler.emit_err(CompileError::MissingStructFields {
                struct_name: self.typ.name().to_string(),
                field_names: missing,
                location,
            }));
        }

        let values = fields
            .iter()
            .zip(values)
            .filter_map(|((name, _), value)| value.map(|value| (name.clone(), value)))
            .collect();
        typed_node(
            handler,
            ExpressionKind::NewStruct { values },
            &self.pytype,
            location,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        awst::Literal,
        eb::factory::{builder_for_type, builder_for_var},
        types::TypeRegistry,
    };

    fn loc() -> SourceLocation {
        SourceLocation::new("contract.py", 90)
    }

    fn point(handler: &Handler) -> SemanticType {
        let mut registry = TypeRegistry::default();
        let uint64 = SemanticType::arc4_uintn(64).unwrap();
        registry
            .register_struct(
                handler,
                "contract.Point",
                vec![("x".to_string(), uint64.clone()), ("y".to_string(), uint64)],
                &loc(),
            )
            .unwrap()
    }

    fn construct(
        handler: &Handler,
        args: Vec<NodeBuilder>,
        names: &[Option<&str>],
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let pytype = point(handler);
        let class = builder_for_type(handler, &pytype, &loc()).unwrap();
        let arg_types = args
            .iter()
            .map(|arg| arg.pytype(handler).unwrap())
            .collect::<Vec<_>>();
        let kinds = names
            .iter()
            .map(|name| match name {
                Some(_) => ArgKind::Named,
                None => ArgKind::Positional,
            })
            .collect::<Vec<_>>();
        let names = names
            .iter()
            .map(|name| name.map(str::to_string))
            .collect::<Vec<_>>();
        class.call(handler, args, &arg_types, &kinds, &names, loc())
    }

    #[test]
    fn positional_and_named_fields() {
        let handler = Handler::default();
        let eb = construct(
            &handler,
            vec![Literal::int(1, loc()).into(), Literal::int(2, loc()).into()],
            &[None, Some("y")],
        )
        .unwrap();
        let expr = eb.rvalue(&handler).unwrap();
        let ExpressionKind::NewStruct { values } = &expr.kind else {
            panic!("expected a struct, got {:?}", expr.kind);
        };
        let names = values.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["x", "y"]);
    }

    #[test]
    fn named_fields_follow_declaration_order() {
        let handler = Handler::default();
        let eb = construct(
            &handler,
            vec![Literal::int(2, loc()).into(), Literal::int(1, loc()).into()],
            &[Some("y"), Some("x")],
        )
        .unwrap();
        let expr = eb.rvalue(&handler).unwrap();
        let ExpressionKind::NewStruct { values } = &expr.kind else {
            panic!("expected a struct, got {:?}", expr.kind);
        };
        assert_eq!(values[0].0, "x");
    }

    #[test]
    fn field_errors() {
        let handler = Handler::default();
        assert!(construct(&handler, vec![Literal::int(1, loc()).into()], &[None]).is_err());
        assert!(construct(
            &handler,
            vec![Literal::int(1, loc()).into(), Literal::int(1, loc()).into()],
            &[None, Some("x")],
        )
        .is_err());
        assert!(construct(&handler, vec![Literal::int(1, loc()).into()], &[Some("z")]).is_err());
        let messages = handler
            .errors()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(messages.len(), 3);
        assert!(matches!(
            handler.errors().as_slice(),
            [
                CompileError::MissingStructFields { .. },
                CompileError::DuplicateStructField { .. },
                CompileError::UnknownStructField { .. },
            ]
        ));
    }

    #[test]
    fn fields_are_typed_members() {
        let handler = Handler::default();
        let pytype = point(&handler);
        let value = builder_for_var(&handler, "p", &pytype, loc()).unwrap();
        let x = value.clone().member_access(&handler, "x", loc()).unwrap();
        assert_eq!(x.pytype(), SemanticType::arc4_uintn(64).as_ref());
        assert!(value.clone().member_access(&handler, "bytes", loc()).is_ok());
        assert!(value.member_access(&handler, "native", loc()).is_err());
    }
}
