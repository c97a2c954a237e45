//! Integration tests for comment lookup.
//!
//! These tests load the fixture module under `testdata/fixtures` and check
//! the comment text associated with declarations, specs, fields and
//! statements.

use goinfer::report::CommentReport;
use goinfer::syntax::SyntaxKind;
use goinfer::{CommentScanner, NodeId, Program};

fn load() -> Program {
    Program::load("testdata/fixtures").expect("fixtures should load")
}

fn comments_file(program: &Program) -> &goinfer::program::SourceFile {
    program
        .files()
        .iter()
        .find(|f| f.path.ends_with("comments.go"))
        .expect("comments.go should be loaded")
}

/// First node of the given kind whose text is `text`.
fn find(program: &Program, kind: SyntaxKind, text: &str) -> NodeId {
    let root = comments_file(program).root;
    program
        .syntax()
        .subtree(root)
        .find(|n| program.kind(*n) == kind && program.text(*n) == text)
        .unwrap_or_else(|| panic!("{:?} {} should exist", kind, text))
}

fn declared(program: &Program, object: Option<goinfer::ObjectId>) -> NodeId {
    let object = object.expect("object should exist");
    program.object(object).ident.expect("object should have an identifier")
}

#[test]
fn test_type_declaration() {
    let program = load();
    let date = declared(&program, program.type_name("Date"));

    assert_eq!(program.comments_of(date), "type Date");
}

#[test]
fn test_grouped_type_declaration() {
    let program = load();
    let pairs = declared(&program, program.type_name("Pairs"));

    assert_eq!(program.comments_of(pairs), "type Pairs");
}

#[test]
fn test_const_specs_join_leading_and_trailing_groups() {
    let program = load();

    assert_eq!(program.comments_of(declared(&program, program.const_("A"))), "a\n\nA");
    assert_eq!(program.comments_of(declared(&program, program.const_("B"))), "b\n\nB");
    assert_eq!(program.comments_of(declared(&program, program.const_("C"))), "c\n\nC");
}

#[test]
fn test_var_spec_falls_back_to_declaration() {
    let program = load();

    assert_eq!(program.comments_of(declared(&program, program.var("record"))), "var");
    assert_eq!(program.comments_of(declared(&program, program.var("first"))), "first");
    assert_eq!(program.comments_of(declared(&program, program.var("second"))), "second");
}

#[test]
fn test_struct_fields() {
    let program = load();

    for (name, expected) in [
        ("Name", "field Name"),
        ("Count", "field Count"),
        ("When", "field When"),
        ("Left", "field Left"),
        ("Right", "field Right"),
    ] {
        let field = find(&program, SyntaxKind::FieldIdentifier, name);
        assert_eq!(program.comments_of(field), expected);
    }
}

#[test]
fn test_functions_and_methods() {
    let program = load();
    let recv = program.method("Record", "Recv").expect("method should exist");

    assert_eq!(program.comments_of(declared(&program, program.func("Print"))), "func Print");
    assert_eq!(program.comments_of(declared(&program, program.func("run"))), "func run");
    assert_eq!(program.comments_of(declared(&program, Some(recv))), "method");
}

#[test]
fn test_statements_and_expressions() {
    let program = load();

    let res = declared(&program, program.var("res"));
    assert_eq!(program.comments_of(res), "call");

    let println = find(&program, SyntaxKind::FieldIdentifier, "Println");
    let call = program
        .ancestors(println)
        .find(|n| program.kind(*n) == SyntaxKind::CallExpression)
        .expect("Println should be called");
    assert_eq!(program.comments_of(call), "print");
}

#[test]
fn test_file_comment() {
    let program = load();
    let file = comments_file(&program);

    assert_eq!(program.comments_of(file.root), "Package main holds comment fixtures.");
}

#[test]
fn test_uncommented_nodes() {
    let program = load();
    let function = declared(&program, program.func("Two"));

    assert_eq!(program.comments_of(function), "");
}

#[test]
fn test_comments_stay_short() {
    let program = load();
    let file = comments_file(&program);
    let scanner = CommentScanner::new(&program, file.id);

    for node in program.syntax().subtree(file.root) {
        let text = scanner.comments_of(node);
        assert!(
            text.lines().count() <= 3,
            "{:?} at {} has {:?}",
            program.kind(node),
            program.span(node),
            text
        );
    }
}

#[test]
fn test_comment_report() {
    let program = load();
    let node = declared(&program, program.func("Print"));

    let report = CommentReport::new(&program, node);
    assert_eq!(report.text, "func Print");
    assert!(report.file.ends_with("comments.go"));
    assert!(report.to_json().unwrap().contains("\"text\": \"func Print\""));
}
