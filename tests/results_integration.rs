//! Integration tests for return value resolution.
//!
//! These tests load the fixture module under `testdata/fixtures` and check
//! the values resolved for each result slot.

use goinfer::{FunctionResults, Program, TypedValue};

const LABEL: &str = "example.com/fixtures.Label";

fn load() -> Program {
    Program::load("testdata/fixtures").expect("fixtures should load")
}

fn resolve(program: &Program, name: &str) -> FunctionResults {
    let function = program
        .func(name)
        .unwrap_or_else(|| panic!("function {} should exist", name));
    program
        .results_of(function)
        .expect("resolution should succeed")
        .expect("function should have a body")
}

fn rendered(values: &[TypedValue]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn label(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{}({:?})", LABEL, v),
        None => LABEL.to_string(),
    }
}

// =============================================================================
// Single values
// =============================================================================

#[test]
fn test_constant_result() {
    let program = load();
    let results = resolve(&program, "Two");

    assert_eq!(results.arity, 1);
    assert_eq!(rendered(results.results.slot(0)), vec!["int(2)"]);
}

#[test]
fn test_interface_result_uses_last_assignment() {
    let program = load();
    let results = resolve(&program, "Dynamic");

    assert_eq!(rendered(results.results.slot(0)), vec!["int(2)"]);
}

#[test]
fn test_selector_on_literal() {
    let program = load();
    let results = resolve(&program, "FieldOfLiteral");

    assert_eq!(rendered(results.results.slot(0)), vec!["string"]);
}

#[test]
fn test_method_with_opaque_calls() {
    let program = load();
    let method = program.method("Label", "Joined").expect("method should exist");
    let results = program.results_of(method).unwrap().unwrap();

    assert_eq!(results.arity, 1);
    assert_eq!(rendered(results.results.slot(0)), vec!["string"]);
}

// =============================================================================
// Calls and splicing
// =============================================================================

#[test]
fn test_call_results_are_chased() {
    let program = load();
    let results = resolve(&program, "Pair");

    assert_eq!(results.results.len(), 2);
    assert_eq!(rendered(results.results.slot(0)), vec!["int(2)"]);
    assert_eq!(rendered(results.results.slot(1)), vec![label(None)]);
}

#[test]
fn test_multi_value_call_is_spliced() {
    let program = load();
    let results = resolve(&program, "Forward");

    assert_eq!(results.arity, 2);
    assert_eq!(rendered(results.results.slot(0)), vec!["int(2)"]);
    assert_eq!(rendered(results.results.slot(1)), vec![label(None)]);
}

#[test]
fn test_named_results_assigned_from_call() {
    let program = load();
    let results = resolve(&program, "AssignedFromCall");

    assert_eq!(rendered(results.results.slot(0)), vec!["int(2)"]);
    assert_eq!(rendered(results.results.slot(1)), vec![label(None)]);
}

#[test]
fn test_function_literal_variable() {
    let program = load();
    let results = resolve(&program, "LocalClosure");

    assert_eq!(rendered(results.results.slot(0)), vec!["int(1)"]);
    assert_eq!(rendered(results.results.slot(1)), vec![label(Some("1"))]);
}

#[test]
fn test_curried_call_across_packages() {
    let program = load();
    let results = resolve(&program, "Curried");

    assert_eq!(rendered(results.results.slot(0)), vec!["int(1)", "int(2)"]);
}

// =============================================================================
// Named results and control flow
// =============================================================================

#[test]
fn test_bare_return_of_named_results() {
    let program = load();
    let results = resolve(&program, "NamedByAssign");

    assert_eq!(rendered(results.results.slot(0)), vec!["string(\"1\")"]);
    assert_eq!(rendered(results.results.slot(1)), vec![label(Some("2"))]);
}

#[test]
fn test_switch_cases_in_source_order() {
    let program = load();
    let results = resolve(&program, "Switch");

    assert_eq!(
        rendered(results.results.slot(0)),
        vec!["string(\"a1\")", "string(\"a2\")", "string(\"a3\")"]
    );
    assert_eq!(
        rendered(results.results.slot(1)),
        vec![label(Some("b1")), label(Some("b2")), label(Some("b3"))]
    );
}

#[test]
fn test_if_else_chain_in_source_order() {
    let program = load();
    let results = resolve(&program, "Branches");

    assert_eq!(
        rendered(results.results.slot(0)),
        vec!["string(\"a0\")", "string(\"a1\")", "string"]
    );
}

#[test]
fn test_mutual_recursion_terminates() {
    let program = load();

    assert_eq!(rendered(resolve(&program, "Ping").results.slot(0)), vec!["int(0)"]);
    assert_eq!(rendered(resolve(&program, "Pong").results.slot(0)), vec!["int(0)"]);
}

// =============================================================================
// General properties
// =============================================================================

#[test]
fn test_slot_count_matches_arity() {
    let program = load();

    for name in [
        "Two",
        "Dynamic",
        "Pair",
        "Forward",
        "AssignedFromCall",
        "NamedByAssign",
        "Switch",
        "Branches",
        "LocalClosure",
        "Curried",
    ] {
        let results = resolve(&program, name);
        assert_eq!(results.results.len(), results.arity, "slot count of {}", name);
    }
}

#[test]
fn test_resolution_is_idempotent() {
    let program = load();

    for name in ["Switch", "Curried", "AssignedFromCall"] {
        assert_eq!(resolve(&program, name), resolve(&program, name), "{}", name);
    }
}

#[test]
fn test_values_keep_originating_expression() {
    let program = load();
    let results = resolve(&program, "Curried");

    let lines: Vec<usize> = results
        .results
        .slot(0)
        .iter()
        .map(|v| program.span(v.expr).start_line)
        .collect();
    let paths: Vec<&str> = results
        .results
        .slot(0)
        .iter()
        .map(|v| program.file_of(v.expr).path.as_str())
        .collect();

    // `return 1` inside CurryCall and `return 2` inside two.
    assert_eq!(lines, vec![17, 4]);
    assert!(paths.iter().all(|p| p.ends_with("curry.go")));
}

#[test]
fn test_non_functions_have_no_results() {
    let program = load();
    let main = program.func("main").expect("main should exist");

    assert!(program.results_of(program.type_name("Label").unwrap()).unwrap().is_none());
    assert_eq!(program.results_of(main).unwrap().unwrap().arity, 0);
}
