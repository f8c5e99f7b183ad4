//! Free-variable collection for nested function declarations.
//!
//! A name is free in a function when the function reads it but neither its
//! parameters nor any declaration inside its body binds it at the point of
//! use. Free names are reported once each, in order of first reference.

use indexmap::IndexSet;
use jslift_ast::visitor::AstVisitor;
use jslift_ast::*;
use tracing::trace;

use crate::scope::ScopeStack;

/// Knowledge about calls that will be rewritten with extra trailing
/// arguments. The collector treats those arguments as references made at
/// the call site.
pub trait CallAugmentation {
    /// Captured names appended to a call of `callee` that passes
    /// `argument_count` explicit arguments.
    fn appended_captures(&self, callee: &str, argument_count: usize) -> &[String];
}

/// No call is rewritten.
impl CallAugmentation for () {
    fn appended_captures(&self, _callee: &str, _argument_count: usize) -> &[String] {
        &[]
    }
}

/// Walks one function declaration and gathers the names it reads from
/// enclosing scopes.
///
/// Only the constructs the lifter supports are walked; anything else is
/// skipped here and rejected later when the function is emitted.
pub struct FreeVariableCollector<'a, 'r> {
    scopes: ScopeStack<'a>,
    free: IndexSet<String>,
    calls: &'r dyn CallAugmentation,
    /// Name of the declaration being analysed.
    function_name: Option<&'a str>,
}

impl<'a, 'r> FreeVariableCollector<'a, 'r> {
    pub fn new(calls: &'r dyn CallAugmentation) -> Self {
        Self {
            scopes: ScopeStack::new(),
            free: IndexSet::new(),
            calls,
            function_name: None,
        }
    }

    /// Free variables of `func`, in order of first reference.
    pub fn collect(mut self, func: &FunctionDeclaration<'a>) -> Vec<String> {
        self.function_name = func.name_text();
        self.scopes.push();
        self.bind_parameters(func.parameters);
        self.visit_block(&func.body);
        self.scopes.pop();
        self.free.into_iter().collect()
    }

    fn bind_parameters(&mut self, parameters: &[ParameterDeclaration<'a>]) {
        for param in parameters {
            if let BindingName::Identifier(id) = &param.name {
                self.scopes.bind(id.text);
            }
        }
    }

    fn reference(&mut self, name: &str) {
        if self.scopes.is_bound(name) || self.free.contains(name) {
            return;
        }
        trace!(name, "free variable");
        self.free.insert(name.to_string());
    }

    /// Whether a call to `callee` receives appended captures that belong to
    /// this analysis. A callee declared inside the function has had its body
    /// walked already, and the function's own captures are what is being
    /// computed. Any record held for those names is from an earlier,
    /// unrelated declaration.
    fn uses_recorded_captures(&self, callee: &str) -> bool {
        !self.scopes.is_bound(callee) && self.function_name != Some(callee)
    }
}

impl<'a, 'r> AstVisitor<'a> for FreeVariableCollector<'a, 'r> {
    fn visit_variable_declaration(&mut self, node: &VariableDeclaration<'a>) {
        // The name is bound before its initializer is read.
        if let BindingName::Identifier(id) = &node.name {
            self.scopes.bind(id.text);
        }
        if let Some(init) = node.initializer {
            self.visit_expression(init);
        }
    }

    fn visit_function_declaration(&mut self, node: &FunctionDeclaration<'a>) {
        if let Some(name) = node.name_text() {
            self.scopes.bind(name);
        }
        self.scopes.push();
        self.bind_parameters(node.parameters);
        self.visit_block(&node.body);
        self.scopes.pop();
    }

    fn visit_block(&mut self, node: &Block<'a>) {
        self.scopes.push();
        for stmt in node.statements.iter() {
            self.visit_statement(stmt);
        }
        self.scopes.pop();
    }

    fn visit_identifier(&mut self, node: &Identifier<'a>) {
        self.reference(node.text);
    }

    fn visit_call_expression(&mut self, node: &CallExpression<'a>) {
        let Some(callee) = node.callee_name() else {
            return;
        };
        self.reference(callee);
        for arg in node.arguments.iter() {
            self.visit_expression(arg);
        }
        if !self.uses_recorded_captures(callee) {
            return;
        }
        let calls = self.calls;
        for name in calls.appended_captures(callee, node.arguments.len()) {
            self.reference(name);
        }
    }
}
