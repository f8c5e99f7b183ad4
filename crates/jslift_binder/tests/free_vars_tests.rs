//! Free-variable collection tests.
//!
//! Parses a program, finds the first function declared inside the first
//! top-level function and collects its free variables.

use bumpalo::Bump;
use jslift_ast::*;
use jslift_binder::{CallAugmentation, FreeVariableCollector};
use jslift_parser::parse_source_file;

/// A fixed table of captured names per callee, ignoring explicit arguments.
struct FixedCaptures(Vec<(&'static str, Vec<String>)>);

impl CallAugmentation for FixedCaptures {
    fn appended_captures(&self, callee: &str, argument_count: usize) -> &[String] {
        self.0
            .iter()
            .find(|(name, _)| *name == callee)
            .map(|(_, captured)| &captured[argument_count.min(captured.len())..])
            .unwrap_or(&[])
    }
}

fn first_nested_function<'a, 'b>(sf: &'b SourceFile<'a>) -> &'b FunctionDeclaration<'a> {
    let outer = sf
        .statements
        .iter()
        .find_map(|s| match s {
            Statement::FunctionDeclaration(f) => Some(f),
            _ => None,
        })
        .expect("no top-level function");
    outer
        .body
        .statements
        .iter()
        .find_map(|s| match s {
            Statement::FunctionDeclaration(f) => Some(f),
            _ => None,
        })
        .expect("no nested function")
}

/// Helper: free variables of the first nested function in `source`.
fn free_vars_with(source: &str, calls: &dyn CallAugmentation) -> Vec<String> {
    let arena = Bump::new();
    let (sf, diagnostics) = parse_source_file(&arena, "test.js", source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    FreeVariableCollector::new(calls).collect(first_nested_function(&sf))
}

fn free_vars(source: &str) -> Vec<String> {
    free_vars_with(source, &())
}

// ============================================================================
// Basic capture
// ============================================================================

#[test]
fn test_no_free_variables() {
    let vars = free_vars("function outer() { function inner(a) { return a + 1; } }");
    assert!(vars.is_empty());
}

#[test]
fn test_single_outer_variable() {
    let vars = free_vars("function outer() { var x = 1; function inner() { return x + 1; } }");
    assert_eq!(vars, vec!["x"]);
}

#[test]
fn test_order_of_first_reference_and_dedup() {
    let vars = free_vars("function outer() { function inner() { return b + a + b + c + a; } }");
    assert_eq!(vars, vec!["b", "a", "c"]);
}

#[test]
fn test_assignment_target_is_a_reference() {
    let vars = free_vars("function outer() { function inner() { total = total + 1; } }");
    assert_eq!(vars, vec!["total"]);
}

// ============================================================================
// Shadowing
// ============================================================================

#[test]
fn test_parameter_shadows_outer_name() {
    let vars = free_vars("function outer() { var x = 1; function inner(x) { return x + y; } }");
    assert_eq!(vars, vec!["y"]);
}

#[test]
fn test_local_declaration_is_bound_before_its_initializer() {
    let vars = free_vars("function outer() { function inner() { var x = x + 1; return x; } }");
    assert!(vars.is_empty());
}

#[test]
fn test_block_bindings_do_not_leak() {
    let vars = free_vars("function outer() { function inner() { { var t = 1; } return t; } }");
    assert_eq!(vars, vec!["t"]);
}

#[test]
fn test_use_before_local_declaration_is_free() {
    let vars = free_vars("function outer() { function inner() { print(v); var v = 2; } }");
    assert_eq!(vars, vec!["print", "v"]);
}

// ============================================================================
// Calls and nested functions
// ============================================================================

#[test]
fn test_callee_is_a_reference() {
    let vars = free_vars("function outer() { function inner() { return sibling(1); } }");
    assert_eq!(vars, vec!["sibling"]);
}

#[test]
fn test_inner_function_frees_propagate() {
    let vars = free_vars(
        "function outer() { function inner(p) { function deeper(q) { return p + q + z; } return deeper(p); } }",
    );
    assert_eq!(vars, vec!["z"]);
}

#[test]
fn test_inner_function_name_is_bound() {
    let vars = free_vars("function outer() { function inner() { function helper() {} return helper(); } }");
    assert!(vars.is_empty());
}

#[test]
fn test_augmented_call_captures_are_references() {
    let calls = FixedCaptures(vec![("lifted", vec!["a".to_string(), "b".to_string()])]);
    let vars = free_vars_with(
        "function outer() { function inner(a) { return lifted(); } }",
        &calls,
    );
    assert_eq!(vars, vec!["lifted", "b"]);
}

#[test]
fn test_explicit_arguments_cover_captures() {
    let calls = FixedCaptures(vec![("lifted", vec!["a".to_string()])]);
    let vars = free_vars_with("function outer() { function inner() { return lifted(1); } }", &calls);
    assert_eq!(vars, vec!["lifted"]);
}

#[test]
fn test_unsupported_constructs_are_skipped() {
    let vars = free_vars("function outer() { function inner() { if (a) { b(); } return c; } }");
    assert_eq!(vars, vec!["c"]);
}

#[test]
fn test_locally_declared_callee_ignores_recorded_captures() {
    // `helper` may still have a record from an earlier declaration elsewhere.
    let calls = FixedCaptures(vec![("helper", vec!["stale".to_string()])]);
    let vars = free_vars_with(
        "function outer() { function inner() { function helper() { return 1; } return helper(); } }",
        &calls,
    );
    assert!(vars.is_empty(), "{:?}", vars);
}

#[test]
fn test_self_call_ignores_recorded_captures() {
    let calls = FixedCaptures(vec![("inner", vec!["stale".to_string()])]);
    let vars = free_vars_with(
        "function outer() { function inner(n) { return inner(n - 1); } }",
        &calls,
    );
    assert_eq!(vars, vec!["inner"]);
}
