//! The rewrite/emit pass.
//!
//! One top-down traversal prints every supported construct. A function
//! declared inside another function is not printed where it stands: it is
//! registered with its captured variables and printed after the top-level
//! statements. Calls to a registered function receive the captured variables
//! as trailing arguments. Only declarations visited before a call can augment
//! it; a call that precedes the declaration keeps its explicit arguments.

use jslift_ast::*;
use jslift_binder::FreeVariableCollector;
use jslift_core::text::TextSpan;
use jslift_printer::{
    binary_operator_text, needs_space_after_prefix, postfix_operator_text, prefix_operator_text, Printer,
    PrinterOptions,
};
use thiserror::Error;
use tracing::debug;

use crate::registry::{LiftedFunction, Registry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiftError {
    /// A node outside the accepted subset. Traversal stops at the first one.
    #[error("unsupported construct: {kind}")]
    UnsupportedConstruct { kind: SyntaxKind, span: TextSpan },
}

impl LiftError {
    fn unsupported(kind: SyntaxKind, span: TextSpan) -> Self {
        LiftError::UnsupportedConstruct { kind, span }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            LiftError::UnsupportedConstruct { span, .. } => *span,
        }
    }
}

type Result<T> = std::result::Result<T, LiftError>;

/// Lifts nested function declarations to the top level.
pub struct FunctionLifter {
    options: PrinterOptions,
    registry: Registry,
    /// Number of function bodies enclosing the node being emitted.
    function_depth: u32,
}

impl Default for FunctionLifter {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionLifter {
    pub fn new() -> Self {
        Self::with_options(PrinterOptions::default())
    }

    pub fn with_options(options: PrinterOptions) -> Self {
        Self {
            options,
            registry: Registry::new(),
            function_depth: 0,
        }
    }

    /// Records registered by the last `lift_source_file` call.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Rewrite `source_file` and return the program text. The registry is
    /// reset first, so one lifter can be reused across files.
    pub fn lift_source_file(&mut self, source_file: &SourceFile<'_>) -> Result<String> {
        self.registry.clear();
        self.function_depth = 0;

        let mut printer = Printer::with_options(self.options.clone());
        for stmt in source_file.statements.iter() {
            self.emit_statement(&mut printer, stmt)?;
        }
        for function in self.registry.iter() {
            printer.write_line_start();
            write_function_head(&mut printer, &function.name, function.parameters());
            printer.write(&function.body);
        }
        Ok(printer.finish())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn emit_statement<'a>(&mut self, p: &mut Printer, stmt: &Statement<'a>) -> Result<()> {
        match stmt {
            Statement::VariableStatement(n) => self.emit_variable_statement(p, n),
            Statement::FunctionDeclaration(n) => self.emit_function_declaration(p, n),
            Statement::Block(n) => {
                p.write_line_start();
                self.emit_block(p, n)
            }
            Statement::ExpressionStatement(n) => {
                p.write_line_start();
                self.emit_expression(p, n.expression)?;
                p.write(";");
                Ok(())
            }
            Statement::ReturnStatement(n) => {
                p.write_line_start();
                p.write("return");
                if let Some(expr) = n.expression {
                    p.write(" ");
                    self.emit_expression(p, expr)?;
                }
                p.write(";");
                Ok(())
            }
            _ => Err(LiftError::unsupported(stmt.kind(), stmt.span())),
        }
    }

    /// One statement per declarator, keeping the declaration keyword.
    fn emit_variable_statement<'a>(&mut self, p: &mut Printer, node: &VariableStatement<'a>) -> Result<()> {
        let keyword = node.declaration_list.data.flags.declaration_keyword();
        for decl in node.declaration_list.declarations.iter() {
            let BindingName::Identifier(name) = &decl.name else {
                let data = decl.name.data();
                return Err(LiftError::unsupported(data.kind, data.span()));
            };
            p.write_line_start();
            p.write(keyword);
            p.write(" ");
            p.write(name.text);
            if let Some(init) = decl.initializer {
                p.write(" = ");
                self.emit_expression(p, init)?;
            }
            p.write(";");
        }
        Ok(())
    }

    fn emit_block<'a>(&mut self, p: &mut Printer, node: &Block<'a>) -> Result<()> {
        p.write("{");
        let opened_at = p.text().len();
        p.increase_indent();
        for stmt in node.statements.iter() {
            if let Err(err) = self.emit_statement(p, stmt) {
                p.decrease_indent();
                return Err(err);
            }
        }
        p.decrease_indent();
        // Everything inside may have been lifted away.
        if p.text().len() != opened_at {
            p.write_line_start();
        }
        p.write("}");
        Ok(())
    }

    fn emit_function_declaration<'a>(&mut self, p: &mut Printer, node: &FunctionDeclaration<'a>) -> Result<()> {
        let (name, params) = self.check_function_signature(node)?;
        if self.function_depth > 0 {
            return self.lift_function(node, name, params);
        }

        p.write_line_start();
        write_function_head(p, name, params.iter().map(String::as_str));
        self.function_depth += 1;
        let result = self.emit_block(p, &node.body);
        self.function_depth -= 1;
        result
    }

    /// The name and plain parameter names of a declaration the lifter can
    /// handle.
    fn check_function_signature<'a>(&self, node: &FunctionDeclaration<'a>) -> Result<(&'a str, Vec<String>)> {
        if node.data.flags.intersects(NodeFlags::ASYNC | NodeFlags::GENERATOR) {
            return Err(LiftError::unsupported(node.data.kind, node.data.span()));
        }
        let name = match node.name_text() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(LiftError::unsupported(node.data.kind, node.data.span())),
        };
        let mut params = Vec::with_capacity(node.parameters.len());
        for param in node.parameters.iter() {
            match param.simple_name() {
                Some(param_name) => params.push(param_name.to_string()),
                None => return Err(LiftError::unsupported(param.data.kind, param.data.span())),
            }
        }
        Ok((name, params))
    }

    /// Register `node` and emit its body into the registry record.
    fn lift_function<'a>(&mut self, node: &FunctionDeclaration<'a>, name: &'a str, params: Vec<String>) -> Result<()> {
        let captured = FreeVariableCollector::new(&self.registry).collect(node);
        debug!(name, ?params, ?captured, "lifting nested function");

        // Registered before the body is emitted so recursive calls inside it
        // are augmented too.
        let id = self.registry.register(LiftedFunction::new(name, params, captured));

        let mut body = Printer::with_options(self.options.clone());
        self.function_depth += 1;
        let result = self.emit_block(&mut body, &node.body);
        self.function_depth -= 1;
        result?;

        self.registry.set_body(name, id, body.into_text());
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn emit_expression<'a>(&mut self, p: &mut Printer, expr: &Expression<'a>) -> Result<()> {
        match expr {
            Expression::Identifier(id) => p.write(id.text),
            Expression::NumericLiteral(lit) => p.write(lit.raw),
            Expression::StringLiteral(lit) => p.write(lit.raw),
            Expression::TrueKeyword(_) => p.write("true"),
            Expression::FalseKeyword(_) => p.write("false"),
            Expression::NullKeyword(_) => p.write("null"),
            Expression::Parenthesized(n) => {
                p.write("(");
                self.emit_expression(p, n.expression)?;
                p.write(")");
            }
            Expression::Binary(n) => self.emit_binary_expression(p, n)?,
            Expression::PrefixUnary(n) => {
                let Some(op) = prefix_operator_text(n.operator) else {
                    return Err(LiftError::unsupported(n.operator, n.data.span()));
                };
                let operand = self.expression_text(n.operand)?;
                p.write(op);
                if needs_space_after_prefix(op, &operand) {
                    p.write(" ");
                }
                p.write(&operand);
            }
            Expression::PostfixUnary(n) => {
                let Some(op) = postfix_operator_text(n.operator) else {
                    return Err(LiftError::unsupported(n.operator, n.data.span()));
                };
                self.emit_expression(p, n.operand)?;
                p.write(op);
            }
            Expression::Call(n) => self.emit_call_expression(p, n)?,
            _ => return Err(LiftError::unsupported(expr.kind(), expr.span())),
        }
        Ok(())
    }

    /// Emit `expr` on its own to inspect its text.
    fn expression_text<'a>(&mut self, expr: &Expression<'a>) -> Result<String> {
        let mut scratch = Printer::with_options(self.options.clone());
        self.emit_expression(&mut scratch, expr)?;
        Ok(scratch.into_text())
    }

    fn emit_binary_expression<'a>(&mut self, p: &mut Printer, node: &BinaryExpression<'a>) -> Result<()> {
        let operator = node.operator();
        let Some(op) = binary_operator_text(operator) else {
            return Err(LiftError::unsupported(operator, node.operator_token.data.span()));
        };

        if operator == SyntaxKind::EqualsToken {
            let Expression::Identifier(target) = node.left else {
                return Err(LiftError::unsupported(node.left.kind(), node.left.span()));
            };
            p.write(target.text);
            p.write(" = ");
            return self.emit_expression(p, node.right);
        }

        p.write("(");
        self.emit_expression(p, node.left)?;
        p.write(") ");
        p.write(op);
        p.write(" (");
        self.emit_expression(p, node.right)?;
        p.write(")");
        Ok(())
    }

    fn emit_call_expression<'a>(&mut self, p: &mut Printer, node: &CallExpression<'a>) -> Result<()> {
        if node.data.flags.contains(NodeFlags::OPTIONAL_CHAIN) {
            return Err(LiftError::unsupported(node.data.kind, node.data.span()));
        }
        let Some(callee) = node.callee_name() else {
            return Err(LiftError::unsupported(node.expression.kind(), node.expression.span()));
        };

        p.write(callee);
        p.write("(");
        for (i, arg) in node.arguments.iter().enumerate() {
            if i > 0 {
                p.write(", ");
            }
            self.emit_expression(p, arg)?;
        }
        if let Some(function) = self.registry.get(callee) {
            let appended = function.appended_arguments(node.arguments.len());
            if !node.arguments.is_empty() && !appended.is_empty() {
                p.write(", ");
            }
            p.write_comma_list(&appended);
        }
        p.write(")");
        Ok(())
    }
}

fn write_function_head<'s>(p: &mut Printer, name: &str, params: impl Iterator<Item = &'s str>) {
    p.write("function ");
    p.write(name);
    p.write("(");
    for (i, param) in params.enumerate() {
        if i > 0 {
            p.write(", ");
        }
        p.write(param);
    }
    p.write(") ");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_program() {
        let file = SourceFile {
            data: NodeData::new(SyntaxKind::SourceFile, 0, 0),
            statements: &[],
            end_of_file_token: Token::new(SyntaxKind::EndOfFileToken, 0, 0),
            file_name: "empty.js".to_string(),
            text: "",
        };
        let mut lifter = FunctionLifter::new();
        assert_eq!(lifter.lift_source_file(&file), Ok(String::new()));
        assert_eq!(lifter.registry().iter().count(), 0);
    }

    #[test]
    fn test_error_reports_kind() {
        let err = LiftError::unsupported(SyntaxKind::IfStatement, TextSpan::new(3, 4));
        assert_eq!(err.to_string(), "unsupported construct: IfStatement");
        assert_eq!(err.span(), TextSpan::new(3, 4));
    }
}
