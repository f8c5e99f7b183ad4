//! Statement execution and expression evaluation.

use std::rc::Rc;

use jslift_ast::*;
use thiserror::Error;
use tracing::{debug, trace};

use crate::environment::{AccessError, BindingKind, Environment};
use crate::value::{Builtin, Closure, Value};

/// Nested user calls allowed before a `RangeError`.
pub const DEFAULT_CALL_DEPTH_LIMIT: usize = 256;

/// A runtime failure. Each variant renders like the JavaScript exception a
/// host would throw.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("ReferenceError: {0}")]
    Reference(String),
    #[error("TypeError: {0}")]
    Type(String),
    #[error("RangeError: {0}")]
    Range(String),
    #[error("unsupported construct: {0}")]
    Unsupported(SyntaxKind),
}

impl EvalError {
    fn access(name: &str, err: AccessError) -> Self {
        match err {
            AccessError::NotDefined => EvalError::Reference(format!("{} is not defined", name)),
            AccessError::Uninitialized => {
                EvalError::Reference(format!("Cannot access '{}' before initialization", name))
            }
            AccessError::ConstAssignment => EvalError::Type("Assignment to constant variable.".to_string()),
        }
    }
}

type Result<T> = std::result::Result<T, EvalError>;

enum Completion<'a> {
    Normal,
    Return(Value<'a>),
}

/// Runs one program and collects what it prints.
pub struct Interpreter<'a> {
    global: Rc<Environment<'a>>,
    output: String,
    call_depth: usize,
    call_depth_limit: usize,
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Interpreter<'a> {
    pub fn new() -> Self {
        let global = Environment::global();
        global.declare(Builtin::Print.name(), BindingKind::Var, Some(Value::Builtin(Builtin::Print)));
        Self {
            global,
            output: String::new(),
            call_depth: 0,
            call_depth_limit: DEFAULT_CALL_DEPTH_LIMIT,
        }
    }

    pub fn with_call_depth_limit(mut self, limit: usize) -> Self {
        self.call_depth_limit = limit;
        self
    }

    /// Execute `source_file` and return everything it printed.
    pub fn run(mut self, source_file: &SourceFile<'a>) -> Result<String> {
        debug!(file = %source_file.file_name, "evaluating program");
        let global = Rc::clone(&self.global);
        self.exec_body(source_file.statements, &global)?;
        Ok(self.output)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Hoist the declarations of a function or program body into `env`, then
    /// run it.
    fn exec_body(&mut self, statements: &'a [Statement<'a>], env: &Rc<Environment<'a>>) -> Result<Completion<'a>> {
        let mut vars = Vec::new();
        collect_var_names(statements, &mut vars);
        for name in vars {
            env.declare(name, BindingKind::Var, Some(Value::Undefined));
        }
        self.exec_statements(statements, env)
    }

    fn exec_statements(&mut self, statements: &'a [Statement<'a>], env: &Rc<Environment<'a>>) -> Result<Completion<'a>> {
        for stmt in statements {
            match stmt {
                Statement::VariableStatement(n) if n.declaration_list.data.flags.intersects(NodeFlags::BLOCK_SCOPED) => {
                    let kind = if n.declaration_list.data.flags.contains(NodeFlags::CONST) {
                        BindingKind::Const
                    } else {
                        BindingKind::Let
                    };
                    for decl in n.declaration_list.declarations {
                        if let BindingName::Identifier(name) = &decl.name {
                            env.declare(name.text, kind, None);
                        }
                    }
                }
                Statement::FunctionDeclaration(f) => {
                    if let Some(name) = f.name_text() {
                        let closure = Closure {
                            declaration: f,
                            env: Rc::clone(env),
                        };
                        env.declare(name, BindingKind::Function, Some(Value::Function(Rc::new(closure))));
                    }
                }
                _ => {}
            }
        }

        for stmt in statements {
            if let Completion::Return(value) = self.exec_statement(stmt, env)? {
                return Ok(Completion::Return(value));
            }
        }
        Ok(Completion::Normal)
    }

    fn exec_statement(&mut self, stmt: &'a Statement<'a>, env: &Rc<Environment<'a>>) -> Result<Completion<'a>> {
        match stmt {
            Statement::VariableStatement(n) => {
                self.exec_variable_statement(n, env)?;
                Ok(Completion::Normal)
            }
            // Bound when the enclosing body or block was entered.
            Statement::FunctionDeclaration(_) | Statement::EmptyStatement(_) => Ok(Completion::Normal),
            Statement::Block(block) => {
                let scope = Environment::child(env);
                self.exec_statements(block.statements, &scope)
            }
            Statement::ExpressionStatement(n) => {
                self.eval_expression(n.expression, env)?;
                Ok(Completion::Normal)
            }
            Statement::ReturnStatement(n) => {
                let value = match n.expression {
                    Some(expr) => self.eval_expression(expr, env)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            _ => Err(EvalError::Unsupported(stmt.kind())),
        }
    }

    fn exec_variable_statement(&mut self, node: &'a VariableStatement<'a>, env: &Rc<Environment<'a>>) -> Result<()> {
        let block_scoped = node.declaration_list.data.flags.intersects(NodeFlags::BLOCK_SCOPED);
        for decl in node.declaration_list.declarations {
            let BindingName::Identifier(name) = &decl.name else {
                return Err(EvalError::Unsupported(decl.name.data().kind));
            };
            let value = match decl.initializer {
                Some(init) => Some(self.eval_expression(init, env)?),
                None => None,
            };
            if block_scoped {
                env.initialize(name.text, value.unwrap_or(Value::Undefined));
            } else if let Some(value) = value {
                env.set(name.text, value).map_err(|err| EvalError::access(name.text, err))?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn eval_expression(&mut self, expr: &'a Expression<'a>, env: &Rc<Environment<'a>>) -> Result<Value<'a>> {
        match expr {
            Expression::Identifier(id) => lookup(env, id.text),
            Expression::NumericLiteral(lit) => Ok(Value::Number(lit.value)),
            Expression::StringLiteral(lit) => Ok(Value::string(lit.text)),
            Expression::TrueKeyword(_) => Ok(Value::Boolean(true)),
            Expression::FalseKeyword(_) => Ok(Value::Boolean(false)),
            Expression::NullKeyword(_) => Ok(Value::Null),
            Expression::Parenthesized(n) => self.eval_expression(n.expression, env),
            Expression::Binary(n) => self.eval_binary_expression(n, env),
            Expression::PrefixUnary(n) => self.eval_prefix_unary(n, env),
            Expression::PostfixUnary(n) => {
                let (old, _) = self.update_identifier(n.operand, n.operator, env)?;
                Ok(Value::Number(old))
            }
            Expression::Call(n) => self.eval_call_expression(n, env),
            _ => Err(EvalError::Unsupported(expr.kind())),
        }
    }

    fn eval_binary_expression(&mut self, node: &'a BinaryExpression<'a>, env: &Rc<Environment<'a>>) -> Result<Value<'a>> {
        let operator = node.operator();
        match operator {
            SyntaxKind::EqualsToken => {
                let Expression::Identifier(target) = node.left else {
                    return Err(EvalError::Unsupported(node.left.kind()));
                };
                let value = self.eval_expression(node.right, env)?;
                assign(&self.global, env, target.text, value.clone())?;
                return Ok(value);
            }
            SyntaxKind::AmpersandAmpersandToken => {
                let left = self.eval_expression(node.left, env)?;
                return if left.to_boolean() { self.eval_expression(node.right, env) } else { Ok(left) };
            }
            SyntaxKind::BarBarToken => {
                let left = self.eval_expression(node.left, env)?;
                return if left.to_boolean() { Ok(left) } else { self.eval_expression(node.right, env) };
            }
            SyntaxKind::CommaToken => {
                self.eval_expression(node.left, env)?;
                return self.eval_expression(node.right, env);
            }
            _ => {}
        }

        let left = self.eval_expression(node.left, env)?;
        let right = self.eval_expression(node.right, env)?;
        binary_operation(operator, &left, &right)
    }

    fn eval_prefix_unary(&mut self, node: &'a PrefixUnaryExpression<'a>, env: &Rc<Environment<'a>>) -> Result<Value<'a>> {
        match node.operator {
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                let (_, new) = self.update_identifier(node.operand, node.operator, env)?;
                return Ok(Value::Number(new));
            }
            SyntaxKind::TypeOfKeyword => {
                // An unresolvable name is not an error under typeof.
                if let Expression::Identifier(id) = node.operand {
                    if !env.is_resolvable(id.text) {
                        return Ok(Value::string("undefined"));
                    }
                }
                let operand = self.eval_expression(node.operand, env)?;
                return Ok(Value::string(operand.type_of()));
            }
            SyntaxKind::DeleteKeyword => {
                if let Expression::Identifier(id) = node.operand {
                    return Ok(Value::Boolean(!env.is_resolvable(id.text)));
                }
                self.eval_expression(node.operand, env)?;
                return Ok(Value::Boolean(true));
            }
            _ => {}
        }

        let operand = self.eval_expression(node.operand, env)?;
        let value = match node.operator {
            SyntaxKind::ExclamationToken => Value::Boolean(!operand.to_boolean()),
            SyntaxKind::TildeToken => Value::Number(f64::from(!operand.to_int32())),
            SyntaxKind::PlusToken => Value::Number(operand.to_number()),
            SyntaxKind::MinusToken => Value::Number(-operand.to_number()),
            SyntaxKind::VoidKeyword => Value::Undefined,
            other => return Err(EvalError::Unsupported(other)),
        };
        Ok(value)
    }

    /// `++`/`--` on an identifier. Returns the old value converted to a
    /// number and the new value.
    fn update_identifier(
        &mut self,
        operand: &'a Expression<'a>,
        operator: SyntaxKind,
        env: &Rc<Environment<'a>>,
    ) -> Result<(f64, f64)> {
        let Expression::Identifier(id) = operand else {
            return Err(EvalError::Reference(
                "Invalid left-hand side expression in update operation".to_string(),
            ));
        };
        let old = lookup(env, id.text)?.to_number();
        let new = match operator {
            SyntaxKind::PlusPlusToken => old + 1.0,
            SyntaxKind::MinusMinusToken => old - 1.0,
            other => return Err(EvalError::Unsupported(other)),
        };
        assign(&self.global, env, id.text, Value::Number(new))?;
        Ok((old, new))
    }

    fn eval_call_expression(&mut self, node: &'a CallExpression<'a>, env: &Rc<Environment<'a>>) -> Result<Value<'a>> {
        if node.data.flags.contains(NodeFlags::OPTIONAL_CHAIN) {
            return Err(EvalError::Unsupported(node.data.kind));
        }
        let Some(callee_name) = node.callee_name() else {
            return Err(EvalError::Unsupported(node.expression.kind()));
        };
        let callee = lookup(env, callee_name)?;
        let mut args = Vec::with_capacity(node.arguments.len());
        for arg in node.arguments {
            args.push(self.eval_expression(arg, env)?);
        }

        match callee {
            Value::Builtin(builtin) => Ok(self.call_builtin(builtin, &args)),
            Value::Function(closure) => self.call_function(&closure, args),
            _ => Err(EvalError::Type(format!("{} is not a function", callee_name))),
        }
    }

    fn call_builtin(&mut self, builtin: Builtin, args: &[Value<'a>]) -> Value<'a> {
        match builtin {
            Builtin::Print => {
                let line = args.iter().map(Value::to_js_string).collect::<Vec<_>>().join(" ");
                trace!(%line, "print");
                self.output.push_str(&line);
                self.output.push('\n');
                Value::Undefined
            }
        }
    }

    fn call_function(&mut self, closure: &Closure<'a>, args: Vec<Value<'a>>) -> Result<Value<'a>> {
        if self.call_depth >= self.call_depth_limit {
            return Err(EvalError::Range("Maximum call stack size exceeded".to_string()));
        }
        let declaration = closure.declaration;
        let scope = Environment::child(&closure.env);
        let mut args = args.into_iter();
        for param in declaration.parameters {
            let Some(name) = param.simple_name() else {
                return Err(EvalError::Unsupported(param.data.kind));
            };
            scope.declare(name, BindingKind::Parameter, Some(args.next().unwrap_or(Value::Undefined)));
        }

        self.call_depth += 1;
        let completion = self.exec_body(declaration.body.statements, &scope);
        self.call_depth -= 1;

        match completion? {
            Completion::Return(value) => Ok(value),
            Completion::Normal => Ok(Value::Undefined),
        }
    }
}

fn lookup<'a>(env: &Environment<'a>, name: &str) -> Result<Value<'a>> {
    env.get(name).map_err(|err| EvalError::access(name, err))
}

/// Assign to `name`, creating a global for a name that is not declared
/// anywhere.
fn assign<'a>(global: &Environment<'a>, env: &Environment<'a>, name: &str, value: Value<'a>) -> Result<()> {
    match env.set(name, value.clone()) {
        Ok(()) => Ok(()),
        Err(AccessError::NotDefined) => {
            global.declare(name, BindingKind::Var, Some(value));
            Ok(())
        }
        Err(err) => Err(EvalError::access(name, err)),
    }
}

/// Names declared with `var` in `statements`, including inside blocks but
/// not inside nested functions.
fn collect_var_names<'a>(statements: &'a [Statement<'a>], names: &mut Vec<&'a str>) {
    for stmt in statements {
        match stmt {
            Statement::VariableStatement(n) if !n.declaration_list.data.flags.intersects(NodeFlags::BLOCK_SCOPED) => {
                for decl in n.declaration_list.declarations {
                    if let BindingName::Identifier(name) = &decl.name {
                        names.push(name.text);
                    }
                }
            }
            Statement::Block(block) => collect_var_names(block.statements, names),
            _ => {}
        }
    }
}

fn binary_operation<'a>(operator: SyntaxKind, left: &Value<'a>, right: &Value<'a>) -> Result<Value<'a>> {
    let number = |f: fn(f64, f64) -> f64| Value::Number(f(left.to_number(), right.to_number()));
    let int32 = |f: fn(i32, i32) -> i32| Value::Number(f64::from(f(left.to_int32(), right.to_int32())));
    let shift_count = right.to_uint32() & 31;

    let value = match operator {
        SyntaxKind::PlusToken => match (left, right) {
            (Value::String(_), _) | (_, Value::String(_)) | (Value::Function(_) | Value::Builtin(_), _)
            | (_, Value::Function(_) | Value::Builtin(_)) => {
                let mut text = left.to_js_string();
                text.push_str(&right.to_js_string());
                Value::string(&text)
            }
            _ => number(|a, b| a + b),
        },
        SyntaxKind::MinusToken => number(|a, b| a - b),
        SyntaxKind::AsteriskToken => number(|a, b| a * b),
        SyntaxKind::SlashToken => number(|a, b| a / b),
        SyntaxKind::PercentToken => number(|a, b| a % b),
        SyntaxKind::EqualsEqualsToken => Value::Boolean(left.loose_equals(right)),
        SyntaxKind::ExclamationEqualsToken => Value::Boolean(!left.loose_equals(right)),
        SyntaxKind::EqualsEqualsEqualsToken => Value::Boolean(left.strict_equals(right)),
        SyntaxKind::ExclamationEqualsEqualsToken => Value::Boolean(!left.strict_equals(right)),
        SyntaxKind::LessThanToken => Value::Boolean(less_than(left, right) == Some(true)),
        SyntaxKind::GreaterThanToken => Value::Boolean(less_than(right, left) == Some(true)),
        SyntaxKind::LessThanEqualsToken => Value::Boolean(less_than(right, left) == Some(false)),
        SyntaxKind::GreaterThanEqualsToken => Value::Boolean(less_than(left, right) == Some(false)),
        SyntaxKind::AmpersandToken => int32(|a, b| a & b),
        SyntaxKind::BarToken => int32(|a, b| a | b),
        SyntaxKind::CaretToken => int32(|a, b| a ^ b),
        SyntaxKind::LessThanLessThanToken => Value::Number(f64::from(left.to_int32().wrapping_shl(shift_count))),
        SyntaxKind::GreaterThanGreaterThanToken => Value::Number(f64::from(left.to_int32() >> shift_count)),
        SyntaxKind::GreaterThanGreaterThanGreaterThanToken => {
            Value::Number(f64::from(left.to_uint32() >> shift_count))
        }
        SyntaxKind::InKeyword => {
            return Err(EvalError::Type(format!(
                "Cannot use 'in' operator to search for '{}' in {}",
                left.to_js_string(),
                right.to_js_string()
            )))
        }
        other => return Err(EvalError::Unsupported(other)),
    };
    Ok(value)
}

/// Abstract relational comparison. `None` when either side is NaN.
fn less_than(left: &Value<'_>, right: &Value<'_>) -> Option<bool> {
    if let (Value::String(a), Value::String(b)) = (left, right) {
        return Some(a.encode_utf16().lt(b.encode_utf16()));
    }
    let (a, b) = (left.to_number(), right.to_number());
    if a.is_nan() || b.is_nan() {
        None
    } else {
        Some(a < b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(n: f64) -> Value<'static> {
        Value::Number(n)
    }

    fn eval_binary(operator: SyntaxKind, left: Value<'static>, right: Value<'static>) -> String {
        match binary_operation(operator, &left, &right) {
            Ok(value) => value.to_js_string(),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn test_addition_and_concatenation() {
        assert_eq!(eval_binary(SyntaxKind::PlusToken, number(1.0), number(2.0)), "3");
        assert_eq!(eval_binary(SyntaxKind::PlusToken, Value::string("a"), number(1.0)), "a1");
        assert_eq!(eval_binary(SyntaxKind::PlusToken, Value::Boolean(true), Value::Null), "1");
        assert_eq!(eval_binary(SyntaxKind::PlusToken, number(1.0), Value::Undefined), "NaN");
    }

    #[test]
    fn test_bitwise_and_shift() {
        assert_eq!(eval_binary(SyntaxKind::BarToken, number(5.0), number(2.0)), "7");
        assert_eq!(eval_binary(SyntaxKind::LessThanLessThanToken, number(1.0), number(33.0)), "2");
        assert_eq!(eval_binary(SyntaxKind::GreaterThanGreaterThanToken, number(-8.0), number(1.0)), "-4");
        assert_eq!(
            eval_binary(SyntaxKind::GreaterThanGreaterThanGreaterThanToken, number(-1.0), number(0.0)),
            "4294967295"
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval_binary(SyntaxKind::LessThanToken, Value::string("10"), Value::string("9")), "true");
        assert_eq!(eval_binary(SyntaxKind::LessThanToken, number(10.0), Value::string("9")), "false");
        assert_eq!(eval_binary(SyntaxKind::LessThanEqualsToken, number(f64::NAN), number(1.0)), "false");
        assert_eq!(eval_binary(SyntaxKind::GreaterThanEqualsToken, number(2.0), number(2.0)), "true");
        assert_eq!(eval_binary(SyntaxKind::PercentToken, number(-7.0), number(3.0)), "-1");
    }

    #[test]
    fn test_in_operator_is_a_type_error() {
        assert_eq!(
            eval_binary(SyntaxKind::InKeyword, Value::string("k"), number(1.0)),
            "TypeError: Cannot use 'in' operator to search for 'k' in 1"
        );
    }
}
