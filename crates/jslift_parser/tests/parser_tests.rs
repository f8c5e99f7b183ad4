//! Parser integration tests.
//!
//! Verifies that the parser builds the expected AST shapes from JavaScript
//! source and reports malformed input as diagnostics.

use bumpalo::Bump;
use jslift_ast::*;
use jslift_parser::parse_source_file;

/// Helper: parse source text and return the number of top-level statements.
/// Fails the test if any diagnostic is reported.
fn parse(source: &str) -> usize {
    let arena = Bump::new();
    let (sf, diagnostics) = parse_source_file(&arena, "test.js", source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:?}",
        source,
        diagnostics.diagnostics()
    );
    sf.statements.len()
}

/// Helper: assert that parsing produces the expected number of top-level statements.
fn assert_statement_count(source: &str, expected: usize) {
    assert_eq!(parse(source), expected, "source: {}", source);
}

/// Helper: the diagnostic codes reported for `source`.
fn error_codes(source: &str) -> Vec<u32> {
    let arena = Bump::new();
    let (_, diagnostics) = parse_source_file(&arena, "test.js", source);
    diagnostics.diagnostics().iter().map(|d| d.code).collect()
}

/// Helper: the expression of the single expression statement in `source`.
fn with_expression(source: &str, check: impl FnOnce(&Expression<'_>)) {
    let arena = Bump::new();
    let (sf, diagnostics) = parse_source_file(&arena, "test.js", source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    match &sf.statements[0] {
        Statement::ExpressionStatement(stmt) => check(stmt.expression),
        other => panic!("expected expression statement, got {:?}", other.kind()),
    }
}

// ============================================================================
// Variable Declarations
// ============================================================================

#[test]
fn test_parse_var_let_const() {
    assert_statement_count("var a = 1; let b = 2; const c = 3;", 3);
}

#[test]
fn test_declaration_keyword_flags() {
    let arena = Bump::new();
    let (sf, _) = parse_source_file(&arena, "test.js", "let a = 1, b; const c = 2; var d;");
    let keywords: Vec<&str> = sf
        .statements
        .iter()
        .map(|s| match s {
            Statement::VariableStatement(v) => v.declaration_list.data.flags.declaration_keyword(),
            _ => "?",
        })
        .collect();
    assert_eq!(keywords, vec!["let", "const", "var"]);

    let Statement::VariableStatement(first) = &sf.statements[0] else {
        panic!("expected variable statement");
    };
    assert_eq!(first.declaration_list.declarations.len(), 2);
    assert!(first.declaration_list.declarations[1].initializer.is_none());
}

#[test]
fn test_parse_destructuring_declarations() {
    assert_statement_count("var { a, b: c, ...rest } = o; var [x, , y = 2] = arr;", 2);
}

// ============================================================================
// Function Declarations
// ============================================================================

#[test]
fn test_parse_nested_function_declarations() {
    let arena = Bump::new();
    let source = "function outer(a, b) { function inner(c) { return a + c; } return inner(b); }";
    let (sf, diagnostics) = parse_source_file(&arena, "test.js", source);
    assert!(diagnostics.is_empty());
    let Statement::FunctionDeclaration(outer) = &sf.statements[0] else {
        panic!("expected function declaration");
    };
    assert_eq!(outer.name_text(), Some("outer"));
    assert_eq!(outer.parameters.len(), 2);
    assert_eq!(outer.parameters[1].simple_name(), Some("b"));
    assert_eq!(outer.body.statements.len(), 2);
    assert!(matches!(outer.body.statements[0], Statement::FunctionDeclaration(_)));
}

#[test]
fn test_parse_async_and_generator_functions() {
    let arena = Bump::new();
    let (sf, diagnostics) = parse_source_file(&arena, "test.js", "async function a() {} function* g() {}");
    assert!(diagnostics.is_empty());
    let flags: Vec<NodeFlags> = sf.statements.iter().map(|s| s.data().flags).collect();
    assert!(flags[0].contains(NodeFlags::ASYNC));
    assert!(flags[1].contains(NodeFlags::GENERATOR));
}

#[test]
fn test_parse_rest_and_default_parameters() {
    assert_statement_count("function f(a, b = 1, ...c) { return c; }", 1);
}

#[test]
fn test_bare_return() {
    assert_statement_count("function f() { return; }", 1);
    assert_statement_count("function f() { return\n1 }", 1);
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_binary_precedence() {
    with_expression("a + b * c;", |expr| {
        let Expression::Binary(bin) = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(bin.operator(), SyntaxKind::PlusToken);
        assert!(matches!(bin.right, Expression::Binary(_)));
    });
}

#[test]
fn test_exponent_is_right_associative() {
    with_expression("a ** b ** c;", |expr| {
        let Expression::Binary(bin) = expr else {
            panic!("expected binary expression");
        };
        assert!(matches!(bin.left, Expression::Identifier(_)));
        assert!(matches!(bin.right, Expression::Binary(_)));
    });
}

#[test]
fn test_assignment_is_binary_with_equals() {
    with_expression("x = y = 1;", |expr| {
        let Expression::Binary(bin) = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(bin.operator(), SyntaxKind::EqualsToken);
        assert!(matches!(bin.right, Expression::Binary(_)));
    });
}

#[test]
fn test_comma_expression() {
    with_expression("a, b, c;", |expr| {
        let Expression::Binary(bin) = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(bin.operator(), SyntaxKind::CommaToken);
    });
}

#[test]
fn test_call_with_identifier_callee() {
    with_expression("f(1, 'two', g(x));", |expr| {
        let Expression::Call(call) = expr else {
            panic!("expected call expression");
        };
        assert_eq!(call.callee_name(), Some("f"));
        assert_eq!(call.arguments.len(), 3);
    });
}

#[test]
fn test_member_call_has_no_identifier_callee() {
    with_expression("console.log(1);", |expr| {
        let Expression::Call(call) = expr else {
            panic!("expected call expression");
        };
        assert_eq!(call.callee_name(), None);
    });
}

#[test]
fn test_literal_raw_text_is_preserved() {
    with_expression("0x1F;", |expr| {
        let Expression::NumericLiteral(lit) = expr else {
            panic!("expected numeric literal");
        };
        assert_eq!(lit.raw, "0x1F");
        assert_eq!(lit.value, 31.0);
    });
    with_expression(r#""a\nb";"#, |expr| {
        let Expression::StringLiteral(lit) = expr else {
            panic!("expected string literal");
        };
        assert_eq!(lit.raw, r#""a\nb""#);
        assert_eq!(lit.text, "a\nb");
    });
}

#[test]
fn test_prefix_and_postfix_unary() {
    with_expression("typeof -x++;", |expr| {
        let Expression::PrefixUnary(typeof_expr) = expr else {
            panic!("expected prefix unary");
        };
        assert_eq!(typeof_expr.operator, SyntaxKind::TypeOfKeyword);
        let Expression::PrefixUnary(neg) = typeof_expr.operand else {
            panic!("expected prefix unary");
        };
        assert!(matches!(neg.operand, Expression::PostfixUnary(_)));
    });
}

#[test]
fn test_conditional_expression() {
    with_expression("a ? b : c;", |expr| {
        assert!(matches!(expr, Expression::Conditional(_)));
    });
}

#[test]
fn test_arrow_functions() {
    with_expression("x => x + 1;", |expr| {
        assert!(matches!(expr, Expression::ArrowFunction(_)));
    });
    with_expression("(a, b) => { return a; };", |expr| {
        let Expression::ArrowFunction(arrow) = expr else {
            panic!("expected arrow function");
        };
        assert_eq!(arrow.parameters.len(), 2);
        assert!(matches!(arrow.body, ConciseBody::Block(_)));
    });
    with_expression("(a + b);", |expr| {
        assert!(matches!(expr, Expression::Parenthesized(_)));
    });
}

#[test]
fn test_templates_and_regex() {
    with_expression("`a${b}c${d}e`;", |expr| {
        let Expression::TemplateExpression(template) = expr else {
            panic!("expected template expression");
        };
        assert_eq!(template.head.text, "a");
        assert_eq!(template.template_spans.len(), 2);
    });
    with_expression("/ab+c/gi;", |expr| {
        let Expression::RegularExpressionLiteral(re) = expr else {
            panic!("expected regular expression");
        };
        assert_eq!(re.raw, "/ab+c/gi");
    });
}

#[test]
fn test_object_and_array_literals() {
    with_expression("({ a: 1, b, [c]: 2, m() {}, get g() { return 1; }, ...s });", |expr| {
        let Expression::Parenthesized(paren) = expr else {
            panic!("expected parenthesized expression");
        };
        let Expression::ObjectLiteral(object) = paren.expression else {
            panic!("expected object literal");
        };
        assert_eq!(object.properties.len(), 6);
    });
    with_expression("[1, , ...rest];", |expr| {
        let Expression::ArrayLiteral(array) = expr else {
            panic!("expected array literal");
        };
        assert_eq!(array.elements.len(), 3);
        assert!(matches!(array.elements[1], Expression::OmittedExpression(_)));
    });
}

#[test]
fn test_new_and_optional_chain() {
    with_expression("new Foo(1).bar?.baz;", |expr| {
        assert!(matches!(expr, Expression::PropertyAccess(_)));
    });
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_control_flow_statements() {
    assert_statement_count(
        "if (a) b(); else c();\n\
         while (x) { x--; }\n\
         do { y++; } while (y < 3);\n\
         for (var i = 0; i < 3; i++) {}\n\
         for (var k in o) {}\n\
         for (const v of list) {}\n\
         switch (n) { case 1: break; default: f(); }\n\
         try { g(); } catch (e) { h(e); } finally { done(); }\n\
         outer: for (;;) { break outer; }\n\
         throw err;",
        10,
    );
}

#[test]
fn test_for_in_initializer_disallows_in() {
    let arena = Bump::new();
    let (sf, diagnostics) = parse_source_file(&arena, "test.js", "for (x in obj) {}");
    assert!(diagnostics.is_empty());
    assert_eq!(sf.statements[0].kind(), SyntaxKind::ForInStatement);
}

#[test]
fn test_class_declaration() {
    assert_statement_count(
        "class A extends B { constructor(x) { super(x); } static s() {} get v() { return 1; } f = 2; static { init(); } }",
        1,
    );
}

#[test]
fn test_import_export() {
    assert_statement_count(
        "import d, { a as b } from './m.js';\n\
         import * as ns from 'ns';\n\
         export function f() {}\n\
         export default 42;\n\
         export { f as g };\n\
         export * from './other.js';",
        6,
    );
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_missing_close_paren() {
    assert_eq!(error_codes("f(1;"), vec![1005]);
}

#[test]
fn test_missing_function_name() {
    assert!(error_codes("function () {}").contains(&1003));
}

#[test]
fn test_try_without_handler() {
    assert_eq!(error_codes("try {}"), vec![1472]);
}

#[test]
fn test_unterminated_string_is_attributed_to_file() {
    let arena = Bump::new();
    let (_, diagnostics) = parse_source_file(&arena, "bad.js", "var s = 'abc");
    let first = &diagnostics.diagnostics()[0];
    assert_eq!(first.code, 1002);
    assert_eq!(first.file.as_deref(), Some("bad.js"));
}

#[test]
fn test_recovers_after_error() {
    let arena = Bump::new();
    let (sf, diagnostics) = parse_source_file(&arena, "test.js", "var = ; function ok() {}");
    assert!(diagnostics.has_errors());
    assert!(sf
        .statements
        .iter()
        .any(|s| matches!(s, Statement::FunctionDeclaration(f) if f.name_text() == Some("ok"))));
}
