//! AST visitor trait for the function-body subset the lifter accepts.
//!
//! The default methods walk variable declarations, nested function
//! declarations, blocks, expression statements and returns, and inside
//! expressions identifiers, parentheses, unary and binary operators and
//! calls. Every other node kind is treated as a leaf.

use crate::node::*;

pub trait AstVisitor<'a> {
    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        match stmt {
            Statement::VariableStatement(n) => self.visit_variable_statement(n),
            Statement::FunctionDeclaration(n) => self.visit_function_declaration(n),
            Statement::Block(n) => self.visit_block(n),
            Statement::ExpressionStatement(n) => self.visit_expression(n.expression),
            Statement::ReturnStatement(n) => {
                if let Some(expr) = n.expression {
                    self.visit_expression(expr);
                }
            }
            _ => {}
        }
    }

    fn visit_variable_statement(&mut self, node: &VariableStatement<'a>) {
        for decl in node.declaration_list.declarations.iter() {
            self.visit_variable_declaration(decl);
        }
    }

    fn visit_variable_declaration(&mut self, node: &VariableDeclaration<'a>) {
        if let Some(init) = node.initializer {
            self.visit_expression(init);
        }
    }

    fn visit_function_declaration(&mut self, node: &FunctionDeclaration<'a>) {
        self.visit_block(&node.body);
    }

    fn visit_block(&mut self, node: &Block<'a>) {
        for stmt in node.statements.iter() {
            self.visit_statement(stmt);
        }
    }

    fn visit_expression(&mut self, expr: &Expression<'a>) {
        match expr {
            Expression::Identifier(n) => self.visit_identifier(n),
            Expression::Parenthesized(n) => self.visit_expression(n.expression),
            Expression::PrefixUnary(n) => self.visit_expression(n.operand),
            Expression::PostfixUnary(n) => self.visit_expression(n.operand),
            Expression::Binary(n) => {
                self.visit_expression(n.left);
                self.visit_expression(n.right);
            }
            Expression::Call(n) => self.visit_call_expression(n),
            _ => {}
        }
    }

    fn visit_identifier(&mut self, _node: &Identifier<'a>) {}

    fn visit_call_expression(&mut self, node: &CallExpression<'a>) {
        self.visit_expression(node.expression);
        for arg in node.arguments.iter() {
            self.visit_expression(arg);
        }
    }
}
