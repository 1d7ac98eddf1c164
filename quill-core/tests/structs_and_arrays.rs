use quill_core::{
    abi::TupleLayout,
    awst::{ExpressionKind, Literal},
    eb::{factory::builder_for_var, NodeBuilder},
    parse::ArgKind,
    types::{SemanticType, TypeRegistry},
    CompileError, Handler, SourceLocation,
};
use pretty_assertions::assert_eq;

fn loc() -> SourceLocation {
    SourceLocation::new("voting.py", 30)
}

fn registry_with_vote(handler: &Handler) -> (TypeRegistry, SemanticType) {
    let mut registry = TypeRegistry::default();
    let vote = registry
        .register_struct(
            handler,
            "voting.Vote",
            vec![
                ("voter".to_string(), SemanticType::Arc4String),
                ("approve".to_string(), SemanticType::Arc4Bool),
                ("weight".to_string(), SemanticType::arc4_uintn(32).unwrap()),
            ],
            &loc(),
        )
        .unwrap();
    (registry, vote)
}

#[test]
fn struct_construction_and_field_access() {
    let handler = Handler::default();
    let (registry, vote) = registry_with_vote(&handler);
    let voter = builder_for_var(&handler, "voter", &SemanticType::Arc4String, loc()).unwrap();
    let args: Vec<NodeBuilder> = vec![
        voter.into(),
        Literal::int(10, loc()).into(),
        Literal::bool(true, loc()).into(),
    ];
    let arg_types = args
        .iter()
        .map(|arg| arg.pytype(&handler).unwrap())
        .collect::<Vec<_>>();
    let value = registry
        .class_builder(&handler, "voting.Vote", &loc())
        .unwrap()
        .call(
            &handler,
            args,
            &arg_types,
            &[ArgKind::Positional, ArgKind::Named, ArgKind::Named],
            &[None, Some("weight".to_string()), Some("approve".to_string())],
            loc(),
        )
        .unwrap();
    assert_eq!(value.pytype(), Some(&vote));

    let weight = value.member_access(&handler, "weight", loc()).unwrap();
    assert_eq!(weight.pytype(), SemanticType::arc4_uintn(32).as_ref());
    assert!(!handler.has_errors());
}

#[test]
fn struct_layout_places_the_dynamic_field_behind_an_offset() {
    let handler = Handler::default();
    let (_, vote) = registry_with_vote(&handler);
    let encoding = vote.arc4_type().unwrap();
    let layout = TupleLayout::compute(&handler, &encoding, &loc()).unwrap();
    // voter: 2 byte offset, approve: 1 byte, weight: 4 bytes
    assert_eq!(layout.head_size(), 7);
    assert!(layout.is_dynamic());
}

#[test]
fn missing_fields_are_listed() {
    let handler = Handler::default();
    let (registry, _) = registry_with_vote(&handler);
    let result = registry
        .class_builder(&handler, "voting.Vote", &loc())
        .unwrap()
        .call(
            &handler,
            vec![Literal::bool(false, loc()).into()],
            &[SemanticType::Bool],
            &[ArgKind::Named],
            &[Some("approve".to_string())],
            loc(),
        );
    assert!(result.is_err());
    assert_eq!(
        handler.errors(),
        vec![CompileError::MissingStructFields {
            struct_name: "voting.Vote".to_string(),
            field_names: vec!["voter".to_string(), "weight".to_string()],
            location: loc(),
        }]
    );
}

#[test]
fn static_arrays_of_bytes() {
    let handler = Handler::default();
    let registry = TypeRegistry::default();
    let byte = builder_for_var(
        &handler,
        "b",
        &SemanticType::arc4_uintn(8).unwrap(),
        loc(),
    )
    .unwrap();
    let array = registry
        .class_builder(&handler, "algopy.arc4.StaticArray", &loc())
        .unwrap()
        .call_positional(
            &handler,
            vec![
                byte.into(),
                Literal::int(1, loc()).into(),
                Literal::int(2, loc()).into(),
            ],
            loc(),
        )
        .unwrap();
    assert_eq!(
        array.type_name(),
        "algopy.arc4.StaticArray[algopy.arc4.UInt8, typing.Literal[3]]"
    );
    let last = array
        .clone()
        .index(&handler, Literal::int(2, loc()).into(), loc())
        .unwrap();
    assert!(matches!(
        last.rvalue(&handler).unwrap().kind,
        ExpressionKind::IndexExpression { .. }
    ));
    assert!(array
        .index(&handler, Literal::int(3, loc()).into(), loc())
        .is_err());
    assert_eq!(handler.error_count(), 1);
}
