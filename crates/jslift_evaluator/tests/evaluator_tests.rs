//! Interpreter integration tests: parse a program, run it, compare output.

use bumpalo::Bump;
use jslift_ast::SyntaxKind;
use jslift_evaluator::{EvalError, Interpreter};
use jslift_parser::parse_source_file;
use pretty_assertions::assert_eq;

/// Helper: run `source` with a call depth limit and return its output.
fn run_with_limit(source: &str, limit: usize) -> Result<String, EvalError> {
    let arena = Bump::new();
    let (sf, diagnostics) = parse_source_file(&arena, "test.js", source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    Interpreter::new().with_call_depth_limit(limit).run(&sf)
}

fn run(source: &str) -> Result<String, EvalError> {
    run_with_limit(source, jslift_evaluator::DEFAULT_CALL_DEPTH_LIMIT)
}

fn assert_output(source: &str, expected: &str) {
    match run(source) {
        Ok(output) => assert_eq!(output, expected),
        Err(err) => panic!("{:?} failed: {}", source, err),
    }
}

// ============================================================================
// Output and values
// ============================================================================

#[test]
fn test_print_joins_arguments() {
    assert_output("print(1, 'a', true, null, void 0);", "1 a true null undefined\n");
    assert_output("print();", "\n");
}

#[test]
fn test_arithmetic() {
    assert_output("print(1 + 2 * 3, (1 + 2) * 3, 7 % 4, 1 / 0, -1 / 0);", "7 9 3 Infinity -Infinity\n");
    assert_output("print(0.1 + 0.2);", "0.30000000000000004\n");
    assert_output("print('1' + 2, '3' - 1, '2' * '4');", "12 2 8\n");
}

#[test]
fn test_unary_operators() {
    assert_output(
        "var x = 1; print(-x, +'5', !x, ~x, typeof x, typeof missing, void x);",
        "-1 5 false -2 number undefined undefined\n",
    );
    assert_output("var i = 1; print(i++, i, ++i, i--, --i);", "1 2 3 3 1\n");
}

#[test]
fn test_logical_operators_short_circuit() {
    assert_output("var a = 0 && boom(); var b = 1 || boom(); print(a, b, null || 'd');", "0 1 d\n");
}

#[test]
fn test_equality() {
    assert_output(
        "print(1 == '1', 1 === '1', null == void 0, null === void 0, 0 != false, 'a' !== 'a');",
        "true false true false false false\n",
    );
}

#[test]
fn test_comma_and_assignment_values() {
    assert_output("var a; var b = (a = 2, a + 1); print(a, b);", "2 3\n");
}

// ============================================================================
// Scoping and functions
// ============================================================================

#[test]
fn test_closures_capture_environment() {
    assert_output(
        "function outer() { var x = 1; function inner() { return x + 1; } return inner(); } print(outer());",
        "2\n",
    );
}

#[test]
fn test_function_hoisting() {
    assert_output("print(f()); function f() { return 'hoisted'; }", "hoisted\n");
}

#[test]
fn test_var_hoisting_and_block_scope() {
    assert_output("print(v); var v = 1; { var w = 2; let z = 3; } print(w);", "undefined\n2\n");
    assert_eq!(
        run("{ let z = 3; } print(z);"),
        Err(EvalError::Reference("z is not defined".to_string()))
    );
}

#[test]
fn test_missing_arguments_are_undefined() {
    assert_output("function f(a, b) { return b; } print(f(1), f(1, 2, 3));", "undefined 2\n");
}

#[test]
fn test_recursion() {
    assert_output(
        "function fact(n) { return n <= 1 && 1 || n * fact(n - 1); } print(fact(10));",
        "3628800\n",
    );
}

#[test]
fn test_functions_are_values() {
    assert_output(
        "function twice(f, x) { return f(f(x)); } function inc(n) { return n + 1; } print(twice(inc, 1));",
        "3\n",
    );
    assert_output("var p = print; p('via alias');", "via alias\n");
}

#[test]
fn test_assignment_to_undeclared_creates_global() {
    assert_output("function f() { g = 5; } f(); print(g);", "5\n");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_reference_errors() {
    assert_eq!(run("print(nope);"), Err(EvalError::Reference("nope is not defined".to_string())));
    assert_eq!(
        run("print(x); let x = 1;"),
        Err(EvalError::Reference("Cannot access 'x' before initialization".to_string()))
    );
}

#[test]
fn test_type_errors() {
    assert_eq!(run("var n = 1; n();"), Err(EvalError::Type("n is not a function".to_string())));
    assert_eq!(
        run("const c = 1; c = 2;"),
        Err(EvalError::Type("Assignment to constant variable.".to_string()))
    );
}

#[test]
fn test_call_depth_limit() {
    let result = run_with_limit("function f() { return f(); } f();", 20);
    assert_eq!(result, Err(EvalError::Range("Maximum call stack size exceeded".to_string())));
}

#[test]
fn test_unsupported_constructs() {
    assert_eq!(run("if (1) {}"), Err(EvalError::Unsupported(SyntaxKind::IfStatement)));
    assert_eq!(run("var a = [];"), Err(EvalError::Unsupported(SyntaxKind::ArrayLiteralExpression)));
}
