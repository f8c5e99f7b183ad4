//! Function lifting integration tests.
//!
//! Parses JavaScript, runs the lifter and compares the full output text.

use bumpalo::Bump;
use jslift_ast::SyntaxKind;
use jslift_parser::parse_source_file;
use jslift_printer::PrinterOptions;
use jslift_transformers::{FunctionLifter, LiftError};
use pretty_assertions::assert_eq;

/// Helper: lift `source` with default options.
fn lift(source: &str) -> Result<String, LiftError> {
    lift_with(FunctionLifter::new(), source)
}

fn lift_with(mut lifter: FunctionLifter, source: &str) -> Result<String, LiftError> {
    let arena = Bump::new();
    let (sf, diagnostics) = parse_source_file(&arena, "test.js", source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    lifter.lift_source_file(&sf)
}

/// Helper: assert that lifting succeeds with exactly `expected`.
fn assert_lifted(source: &str, expected: &str) {
    match lift(source) {
        Ok(text) => assert_eq!(text, expected),
        Err(err) => panic!("lifting failed for {:?}: {}", source, err),
    }
}

/// Helper: assert that lifting fails on a construct of `kind`.
fn assert_unsupported(source: &str, kind: SyntaxKind) {
    match lift(source) {
        Err(LiftError::UnsupportedConstruct { kind: actual, .. }) => {
            assert_eq!(actual, kind, "source: {}", source)
        }
        Ok(text) => panic!("expected {:?} to be rejected, got:\n{}", source, text),
    }
}

// ============================================================================
// Lifting and capture
// ============================================================================

#[test]
fn test_single_capture() {
    assert_lifted(
        "function outer(){ var x = 1; function inner(){ return x + 1; } return inner(); }",
        "function outer() {\n    var x = 1;\n    return inner(x);\n}\nfunction inner(x) {\n    return (x) + (1);\n}\n",
    );
}

#[test]
fn test_no_capture_keeps_parameters() {
    assert_lifted(
        "function outer(a) { function add(x, y) { return x + y; } return add(a, 1); }",
        "function outer(a) {\n    return add(a, 1);\n}\nfunction add(x, y) {\n    return (x) + (y);\n}\n",
    );
}

#[test]
fn test_parameter_shadowing_is_not_captured() {
    assert_lifted(
        "function outer() { var x = 1; function inner(x) { return x * 2; } return inner(x); }",
        "function outer() {\n    var x = 1;\n    return inner(x);\n}\nfunction inner(x) {\n    return (x) * (2);\n}\n",
    );
}

#[test]
fn test_explicit_arguments_then_captures() {
    assert_lifted(
        "function outer() { var c = 3; function f(a) { return a + c; } print(f(1)); }",
        "function outer() {\n    var c = 3;\n    print(f(1, c));\n}\nfunction f(a, c) {\n    return (a) + (c);\n}\n",
    );
}

#[test]
fn test_missing_explicit_arguments_are_padded() {
    assert_lifted(
        "function outer() { var c = 3; function f(a) { return c; } return f(); }",
        "function outer() {\n    var c = 3;\n    return f(void 0, c);\n}\nfunction f(a, c) {\n    return c;\n}\n",
    );
}

#[test]
fn test_forward_reference_is_not_augmented() {
    assert_lifted(
        "function outer() { var x = 1; var r = inner(); function inner() { return x; } return r + inner(); }",
        "function outer() {\n    var x = 1;\n    var r = inner();\n    return (r) + (inner(x));\n}\nfunction inner(x) {\n    return x;\n}\n",
    );
}

#[test]
fn test_later_declaration_overwrites_earlier() {
    assert_lifted(
        "function outer() { var a = 1; var b = 2; function g() { return a; } function g() { return b; } return g(); }",
        "function outer() {\n    var a = 1;\n    var b = 2;\n    return g(b);\n}\nfunction g(b) {\n    return b;\n}\n",
    );
}

#[test]
fn test_self_recursion_is_augmented() {
    assert_lifted(
        "function outer(n) { var step = 1; function down(k) { return k && down(k - step); } return down(n); }",
        "function outer(n) {\n    var step = 1;\n    return down(n, down, step);\n}\nfunction down(k, down, step) {\n    return (k) && (down((k) - (step), down, step));\n}\n",
    );
}

#[test]
fn test_call_to_lifted_sibling_passes_its_captures() {
    assert_lifted(
        "function outer() { var x = 1; function a() { return x; } function b() { return a(); } return b(); }",
        "function outer() {\n    var x = 1;\n    return b(a, x);\n}\nfunction a(x) {\n    return x;\n}\nfunction b(a, x) {\n    return a(x);\n}\n",
    );
}

#[test]
fn test_deeply_nested_functions() {
    assert_lifted(
        "function outer(p) { function mid() { function leaf() { return p; } return leaf(); } return mid(); }",
        "function outer(p) {\n    return mid(p);\n}\nfunction mid(p) {\n    return leaf(p);\n}\nfunction leaf(p) {\n    return p;\n}\n",
    );
}

#[test]
fn test_registry_contents() {
    let arena = Bump::new();
    let (sf, _) = parse_source_file(
        &arena,
        "test.js",
        "function outer(y) { var x = 1; function inner(a) { return a + x + y; } }",
    );
    let mut lifter = FunctionLifter::new();
    lifter.lift_source_file(&sf).unwrap();
    let inner = lifter.registry().get("inner").unwrap();
    assert_eq!(inner.explicit_params, vec!["a"]);
    assert_eq!(inner.captured_params, vec!["x", "y"]);
    assert_eq!(inner.body, "{\n    return ((a) + (x)) + (y);\n}");
}

// ============================================================================
// Printing of supported constructs
// ============================================================================

#[test]
fn test_declarations_one_per_line() {
    assert_lifted("let a = 1, b; const c = a;", "let a = 1;\nlet b;\nconst c = a;\n");
}

#[test]
fn test_literals_are_reproduced_verbatim() {
    assert_lifted(
        r#"var s = 'it\'s'; var d = "q\"x"; var h = 0xFF; var e = 1e3; var n = null; var t = true; var f = false;"#,
        "var s = 'it\\'s';\nvar d = \"q\\\"x\";\nvar h = 0xFF;\nvar e = 1e3;\nvar n = null;\nvar t = true;\nvar f = false;\n",
    );
}

#[test]
fn test_unary_operators() {
    assert_lifted(
        "var a = - -b; var t = typeof a; var n = !a; var v = void 0; x++; --x; var p = + +x;",
        "var a = - -b;\nvar t = typeof a;\nvar n = !a;\nvar v = void 0;\nx++;\n--x;\nvar p = + +x;\n",
    );
}

#[test]
fn test_assignment_and_grouping() {
    assert_lifted("x = (a + b) * c;", "x = (((a) + (b))) * (c);\n");
}

#[test]
fn test_comma_and_in_operators() {
    assert_lifted("a, b; r = k in o;", "(a) , (b);\nr = (k) in (o);\n");
}

#[test]
fn test_empty_bodies() {
    assert_lifted("function f() {}", "function f() {}\n");
    assert_lifted(
        "function outer() { function inner() {} }",
        "function outer() {}\nfunction inner() {}\n",
    );
}

#[test]
fn test_top_level_block() {
    assert_lifted("{ var a = 1; { a; } }", "{\n    var a = 1;\n    {\n        a;\n    }\n}\n");
}

#[test]
fn test_bare_return() {
    assert_lifted("function f() { return; }", "function f() {\n    return;\n}\n");
}

#[test]
fn test_empty_program() {
    assert_lifted("", "");
}

#[test]
fn test_custom_printer_options() {
    let lifter = FunctionLifter::with_options(PrinterOptions {
        indent_str: "\t".to_string(),
        new_line: "\n".to_string(),
        trailing_newline: false,
    });
    let text = lift_with(lifter, "function outer() { var x = 1; function inner() { return x; } }").unwrap();
    assert_eq!(text, "function outer() {\n\tvar x = 1;\n}\nfunction inner(x) {\n\treturn x;\n}");
}

// ============================================================================
// Unsupported constructs
// ============================================================================

#[test]
fn test_control_flow_is_rejected() {
    assert_unsupported("function f(x) { if (x) { return 1; } }", SyntaxKind::IfStatement);
    assert_unsupported("while (a) {}", SyntaxKind::WhileStatement);
    assert_unsupported("for (;;) {}", SyntaxKind::ForStatement);
    assert_unsupported("switch (a) {}", SyntaxKind::SwitchStatement);
    assert_unsupported("try { a(); } finally { b(); }", SyntaxKind::TryStatement);
}

#[test]
fn test_data_literals_are_rejected() {
    assert_unsupported("var a = [1];", SyntaxKind::ArrayLiteralExpression);
    assert_unsupported("var o = {};", SyntaxKind::ObjectLiteralExpression);
    assert_unsupported("var t = `x`;", SyntaxKind::NoSubstitutionTemplateLiteral);
}

#[test]
fn test_operators_outside_the_table_are_rejected() {
    assert_unsupported("x += 1;", SyntaxKind::PlusEqualsToken);
    assert_unsupported("var p = a ** b;", SyntaxKind::AsteriskAsteriskToken);
    assert_unsupported("var q = a ?? b;", SyntaxKind::QuestionQuestionToken);
    assert_unsupported("var r = a instanceof B;", SyntaxKind::InstanceOfKeyword);
}

#[test]
fn test_other_unsupported_forms() {
    assert_unsupported("console.log(1);", SyntaxKind::PropertyAccessExpression);
    assert_unsupported("function f(a = 1) {}", SyntaxKind::Parameter);
    assert_unsupported("var { a } = o;", SyntaxKind::ObjectBindingPattern);
    assert_unsupported("class A {}", SyntaxKind::ClassDeclaration);
    assert_unsupported("async function f() {}", SyntaxKind::FunctionDeclaration);
    assert_unsupported("var f = function () {};", SyntaxKind::FunctionExpression);
    assert_unsupported(";", SyntaxKind::EmptyStatement);
}

#[test]
fn test_unsupported_inside_nested_function() {
    assert_unsupported(
        "function outer() { function inner() { for (;;) {} } return inner(); }",
        SyntaxKind::ForStatement,
    );
}
