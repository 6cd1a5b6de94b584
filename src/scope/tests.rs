use super::{
    scope::{Scope, ScopeStack},
    table::flatten,
};

fn some(text: &str) -> Option<String> {
    Some(text.to_string())
}

#[test]
fn test_record_defaults_to_scope_start() {
    let mut scope = Scope::new(3, 8);
    scope.add_type("a", some("int"), None);
    scope.add_type("b", None, Some(5));

    assert_eq!(scope.records[0].line_from, 3);
    assert_eq!(scope.records[0].line_to, 8);
    assert_eq!(scope.records[1].line_from, 5);
    assert_eq!(scope.records[1].line_to, 8);
}

#[test]
fn test_annotation_wins_regardless_of_order() {
    let mut before = Scope::new(1, 3);
    before.add_type("x", None, Some(2));
    before.add_type("x", some("int"), Some(2));

    let mut after = Scope::new(1, 3);
    after.add_type("x", some("int"), Some(2));
    after.add_type("x", None, Some(2));

    for scope in [before, after] {
        let table = flatten(&scope);
        assert_eq!(table.get(1, "x"), None);
        assert_eq!(table.get(2, "x"), Some("int"));
        assert_eq!(table.get(3, "x"), Some("int"));
    }
}

#[test]
fn test_reassignment_keeps_declared_type() {
    let mut scope = Scope::new(1, 4);
    scope.add_type("x", some("list[int]"), Some(1));
    scope.add_type("x", None, Some(3));

    let table = flatten(&scope);
    assert_eq!(table.get(4, "x"), Some("list[int]"));
}

#[test]
fn test_later_annotation_overrides_from_its_line() {
    let mut scope = Scope::new(1, 4);
    scope.add_type("x", some("int"), Some(1));
    scope.add_type("x", some("str"), Some(3));

    let table = flatten(&scope);
    assert_eq!(table.get(2, "x"), Some("int"));
    assert_eq!(table.get(3, "x"), Some("str"));
}

#[test]
fn test_unannotated_name_has_entry_but_no_type() {
    let mut scope = Scope::new(1, 2);
    scope.add_type("y", None, Some(1));

    let table = flatten(&scope);
    assert_eq!(table.types_at(1).unwrap().get("y"), Some(&None));
    assert_eq!(table.get(1, "y"), None);
}

#[test]
fn test_every_line_has_a_row() {
    let scope = Scope::new(1, 5);
    let table = flatten(&scope);

    assert_eq!(table.line_end(), 5);
    assert!(table.iter().all(|(_, types)| types.is_empty()));
    assert_eq!(table.iter().map(|(line, _)| line).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    assert!(table.types_at(0).is_none());
    assert!(table.types_at(6).is_none());
}

#[test]
fn test_child_scope_replaces_parent_lines() {
    let mut stack = ScopeStack::new(Scope::new(1, 10));
    stack.current().add_type("g", some("int"), Some(1));
    stack.push(4, 6);
    stack.current().add_type("p", some("str"), None);
    stack.pop();
    let root = stack.finish();

    assert_eq!(root.children.len(), 1);
    assert!(root.contains(&root.children[0]));

    let table = flatten(&root);
    assert_eq!(table.get(3, "g"), Some("int"));
    assert_eq!(table.get(4, "p"), Some("str"));
    assert_eq!(table.get(4, "g"), None);
    assert_eq!(table.get(7, "g"), Some("int"));
    assert_eq!(table.get(7, "p"), None);
}

#[test]
fn test_nested_scopes_take_precedence() {
    let mut stack = ScopeStack::new(Scope::new(1, 10));
    stack.push(2, 9);
    stack.current().add_type("a", some("int"), None);
    stack.push(4, 5);
    stack.current().add_type("b", some("str"), None);
    assert_eq!(stack.depth(), 3);
    let root = stack.finish();

    let table = flatten(&root);
    assert_eq!(table.get(3, "a"), Some("int"));
    assert_eq!(table.get(4, "a"), None);
    assert_eq!(table.get(4, "b"), Some("str"));
    assert_eq!(table.get(6, "a"), Some("int"));
}

#[test]
fn test_empty_root_scope() {
    let scope = Scope::new(1, 0);

    assert!(scope.is_empty());
    assert_eq!(flatten(&scope).line_end(), 0);
}

#[test]
fn test_module_scope_is_never_popped() {
    let mut stack = ScopeStack::new(Scope::new(1, 3));
    stack.pop();

    assert_eq!(stack.depth(), 1);
    assert_eq!(stack.finish().line_end, 3);
}
