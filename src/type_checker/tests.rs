use super::{
    descriptor::{Origin, TypeDescriptor},
    resolver::{descriptor_of, resolve_type, Environment},
    type_checker::{check, check_annotation, validate, Outcome},
};
use crate::{
    errors::errors::{CheckError, ResolveError},
    runtime::{
        builtins::typing_globals,
        literal::literal_eval,
        namespace::Namespace,
        types::{BuiltinType, TypeObject},
        value::Value,
    },
};

fn resolve(type_expression: &str) -> Result<TypeDescriptor, ResolveError> {
    let locals = Namespace::new();
    let globals = typing_globals();
    resolve_type(type_expression, &Environment::new(&locals, &globals))
}

fn checks(type_expression: &str, value: &str) -> bool {
    let descriptor = resolve(type_expression).unwrap();
    check(&literal_eval(value).unwrap(), &descriptor).unwrap()
}

#[test]
fn test_resolve_primitives() {
    assert_eq!(
        resolve("int").unwrap(),
        TypeDescriptor::Primitive(BuiltinType::Int.into())
    );
    assert_eq!(
        resolve("None").unwrap(),
        TypeDescriptor::Primitive(BuiltinType::NoneType.into())
    );
    assert_eq!(resolve("list").unwrap(), TypeDescriptor::Unconstrained(Origin::List));
    assert_eq!(resolve("typing.Dict").unwrap(), TypeDescriptor::Unconstrained(Origin::Dict));
    assert_eq!(
        resolve("FrozenSet").unwrap(),
        TypeDescriptor::Primitive(BuiltinType::FrozenSet.into())
    );
}

#[test]
fn test_resolve_generics() {
    let descriptor = resolve("dict[str, List[set['int']]]").unwrap();
    assert_eq!(descriptor.to_string(), "dict[str, list[set[int]]]");

    // arity is the checker's business
    assert!(matches!(
        resolve("dict[int]").unwrap(),
        TypeDescriptor::Generic { origin: Origin::Dict, args } if args.len() == 1
    ));
}

#[test]
fn test_resolve_unresolved() {
    assert_eq!(
        resolve("Missing").unwrap_err(),
        ResolveError::Unresolved {
            name: String::from("Missing")
        }
    );
    assert!(matches!(resolve("list[Missing]"), Err(ResolveError::Unresolved { .. })));
    assert!(matches!(resolve("typing.Nope"), Err(ResolveError::Unresolved { .. })));
    assert!(matches!(resolve("tuple[Missing]"), Err(ResolveError::Unresolved { .. })));
    assert!(matches!(resolve("int | Missing"), Err(ResolveError::Unresolved { .. })));
}

#[test]
fn test_unresolved_wins_over_sibling_errors() {
    for text in [
        "dict[tuple[int], Missing]",
        "dict[int:int, Missing]",
        "list[list[int, str], Missing]",
        "typing.Dict[Optional[int], Missing]",
    ] {
        assert_eq!(
            resolve(text),
            Err(ResolveError::Unresolved {
                name: String::from("Missing")
            }),
            "{}",
            text
        );
    }

    assert!(matches!(resolve("dict[tuple[int], str]"), Err(ResolveError::Unsupported { .. })));
}

#[test]
fn test_resolve_unsupported() {
    for text in [
        "tuple[int, str]",
        "frozenset[int]",
        "typing.Union[int, str]",
        "Optional[int]",
        "int | None",
        "Any",
    ] {
        assert!(
            matches!(resolve(text), Err(ResolveError::Unsupported { .. })),
            "{} resolved",
            text
        );
    }
}

#[test]
fn test_resolve_malformed() {
    for text in ["dict[int:int]", "int[str]", "1", "[int]", "f(x)", "list[", "list[int][str]"] {
        assert!(
            matches!(resolve(text), Err(ResolveError::Malformed { .. })),
            "{} resolved",
            text
        );
    }
}

#[test]
fn test_lookup_order() {
    let shadow = TypeObject::class("Shadow", vec![]);
    let locals = Namespace::new().with("int", Value::Type(shadow.clone()));
    let globals = Namespace::new()
        .with("int", Value::builtin_type(BuiltinType::Str))
        .with("Alias", Value::builtin_type(BuiltinType::Float));
    let env = Environment::new(&locals, &globals);

    assert_eq!(resolve_type("int", &env).unwrap(), TypeDescriptor::Primitive(shadow));
    assert_eq!(
        resolve_type("Alias", &env).unwrap(),
        TypeDescriptor::Primitive(BuiltinType::Float.into())
    );
    assert_eq!(
        resolve_type("bool", &env).unwrap(),
        TypeDescriptor::Primitive(BuiltinType::Bool.into())
    );
}

#[test]
fn test_runtime_alias_binding() {
    let alias = Value::Alias {
        origin: BuiltinType::List.into(),
        args: vec![Value::builtin_type(BuiltinType::Int)],
    };
    let locals = Namespace::new().with("IntList", alias.clone());
    let globals = Namespace::new();

    assert_eq!(
        resolve_type("IntList", &Environment::new(&locals, &globals)).unwrap(),
        descriptor_of(&alias).unwrap()
    );
    assert!(matches!(
        descriptor_of(&Value::str("int")),
        Err(ResolveError::Malformed { .. })
    ));
}

#[test]
fn test_list_scenario() {
    assert!(checks("list[int]", "[1, 2, 3]"));
    assert!(!checks("list[int]", "[1, 'x']"));
    assert!(!checks("list[int]", "(1, 2)"));
    assert!(checks("list[int]", "[]"));
    assert!(checks("list[int]", "[True]"));
}

#[test]
fn test_dict_scenario() {
    assert!(checks("dict[str, int]", "{'a': 1}"));
    assert!(!checks("dict[str, int]", "{1: 2}"));
    assert!(!checks("dict[str, int]", "{'a': 'b'}"));
    assert!(!checks("dict[str, int]", "[('a', 1)]"));
}

#[test]
fn test_nested_scenario() {
    assert!(checks("list[dict[int, set[str]]]", "[{1: {'a'}}]"));
    assert!(!checks("list[dict[int, set[str]]]", "[{1: {1}}]"));
    assert!(checks("list[list[list[int]]]", "[[[1]], [[]], []]"));
    assert!(!checks("list[list[list[int]]]", "[[[1]], [[2.0]]]"));
}

#[test]
fn test_unconstrained_scenario() {
    assert!(checks("dict", "{1: 'b', 'c': 2}"));
    assert!(checks("list", "[1, 'a', None]"));
    assert!(!checks("set", "[1]"));
    assert!(checks("set[int]", "{1, 2}"));
}

#[test]
fn test_frozenset_is_set_like() {
    let value = Value::frozenset(vec![Value::Int(1)]);
    let descriptor = resolve("set[int]").unwrap();
    assert!(check(&value, &descriptor).unwrap());
}

#[test]
fn test_container_subclass_payload() {
    let my_dict = TypeObject::class("Registry", vec![BuiltinType::Dict.into()]);
    let value = Value::instance(
        &my_dict,
        Some(Value::dict(vec![(Value::str("a"), Value::Int(1))])),
    );

    assert!(check(&value, &resolve("dict[str, int]").unwrap()).unwrap());
    assert!(!check(&value, &resolve("list").unwrap()).unwrap());
}

#[test]
fn test_user_class_instances() {
    let base = TypeObject::class("Base", vec![]);
    let derived = TypeObject::class("Derived", vec![base.clone()]);
    let locals = Namespace::new().with("Base", Value::Type(base));
    let globals = Namespace::new();
    let env = Environment::new(&locals, &globals);
    let descriptor = resolve_type("list[Base]", &env).unwrap();

    let good = Value::List(vec![Value::instance(&derived, None)]);
    let bad = Value::List(vec![Value::Int(1)]);
    assert!(check(&good, &descriptor).unwrap());
    assert!(!check(&bad, &descriptor).unwrap());
}

#[test]
fn test_arity_is_malformed() {
    for text in ["dict[int]", "list[int, str]", "set[int, int]", "list[dict[str]]", "list[()]"] {
        let descriptor = resolve(text).unwrap();
        assert!(
            matches!(validate(&descriptor), Err(CheckError::WrongArity { .. })),
            "{} validated",
            text
        );
        // even when there is nothing to iterate over
        assert!(check(&Value::List(vec![]), &descriptor).is_err());
    }
}

#[test]
fn test_wrong_arity_is_never_a_mismatch() {
    let cases = [
        ("list[set[int, int]]", "[{1}]"),
        ("dict[str, list[int, int]]", "{'a': [1]}"),
        ("set[int, int]", "{1, 2}"),
    ];
    for (text, value) in cases {
        let descriptor = resolve(text).unwrap();
        let error = check(&literal_eval(value).unwrap(), &descriptor).unwrap_err();
        assert!(matches!(error, CheckError::WrongArity { found: 2, .. }), "{}", text);
    }
}

#[test]
fn test_check_is_deterministic() {
    let descriptor = resolve("dict[str, list[int]]").unwrap();
    let value = literal_eval("{'a': [1, 2], 'b': []}").unwrap();

    assert_eq!(check(&value, &descriptor), check(&value, &descriptor));
}

#[test]
fn test_check_annotation_outcomes() {
    let locals = Namespace::new();
    let globals = typing_globals();
    let env = Environment::new(&locals, &globals);
    let value = literal_eval("{1: 2}").unwrap();

    let outcome = |text: &str| check_annotation(&value, text, &env).map(|verdict| verdict.outcome);

    assert_eq!(outcome("dict[int, int]"), Ok(Outcome::Conformant));
    assert_eq!(outcome("dict[str, int]"), Ok(Outcome::Mismatch));
    assert!(matches!(outcome("dict[int]"), Ok(Outcome::Malformed(_))));
    assert!(matches!(outcome("dict[int:int]"), Ok(Outcome::Malformed(_))));
    assert!(matches!(outcome("Union[int, str]"), Ok(Outcome::Unsupported(_))));
    assert!(matches!(outcome("Nope"), Err(ResolveError::Unresolved { .. })));
}

#[test]
fn test_outcome_display() {
    assert!(Outcome::Conformant.is_conformant());
    assert!(!Outcome::Malformed(String::new()).is_conformant());
    assert_eq!(Outcome::Mismatch.to_string(), "mismatch");
}
