//! AST node definitions for JavaScript.
//!
//! Nodes reference child nodes via arena-allocated references. Every node
//! carries a `NodeData` with its kind, source range and flags.

use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use jslift_core::text::{TextRange, TextSpan};

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all AST nodes.
#[derive(Debug, Clone, Copy)]
pub struct NodeData {
    /// The kind of this node.
    pub kind: SyntaxKind,
    /// Source position range.
    pub range: TextRange,
    /// Node flags.
    pub flags: NodeFlags,
}

impl NodeData {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            kind,
            range: TextRange::new(pos, end),
            flags: NodeFlags::NONE,
        }
    }

    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn span(&self) -> TextSpan {
        self.range.to_span()
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// An optional arena-allocated node.
pub type OptionalNode<'a, T> = Option<&'a T>;

// ============================================================================
// Source File
// ============================================================================

#[derive(Debug)]
pub struct SourceFile<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
    pub end_of_file_token: Token,
    pub file_name: String,
    pub text: &'a str,
}

// ============================================================================
// Token
// ============================================================================

/// A simple token with kind and range.
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub data: NodeData,
}

impl Token {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            data: NodeData::new(kind, pos, end),
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }
}

// ============================================================================
// Identifier and literals
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a> {
    pub data: NodeData,
    /// The name, with unicode escapes resolved.
    pub text: &'a str,
}

/// String, template and regular expression literal pieces.
#[derive(Debug, Clone, Copy)]
pub struct LiteralLike<'a> {
    pub data: NodeData,
    /// The cooked value (escapes resolved).
    pub text: &'a str,
    /// The literal exactly as written in the source, quotes included.
    pub raw: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct NumericLiteral<'a> {
    pub data: NodeData,
    pub value: f64,
    pub raw: &'a str,
}

// ============================================================================
// Names and binding patterns
// ============================================================================

#[derive(Debug)]
pub enum PropertyName<'a> {
    Identifier(Identifier<'a>),
    StringLiteral(LiteralLike<'a>),
    NumericLiteral(NumericLiteral<'a>),
    Computed(&'a Expression<'a>),
}

#[derive(Debug)]
pub enum BindingName<'a> {
    Identifier(Identifier<'a>),
    ObjectBindingPattern(BindingPattern<'a>),
    ArrayBindingPattern(BindingPattern<'a>),
}

impl<'a> BindingName<'a> {
    /// The bound identifier, if this is not a destructuring pattern.
    pub fn as_identifier(&self) -> Option<&Identifier<'a>> {
        match self {
            BindingName::Identifier(id) => Some(id),
            _ => None,
        }
    }

    pub fn data(&self) -> &NodeData {
        match self {
            BindingName::Identifier(id) => &id.data,
            BindingName::ObjectBindingPattern(p) | BindingName::ArrayBindingPattern(p) => &p.data,
        }
    }
}

#[derive(Debug)]
pub struct BindingPattern<'a> {
    pub data: NodeData,
    /// `None` marks a hole in an array pattern.
    pub elements: NodeList<'a, Option<BindingElement<'a>>>,
}

#[derive(Debug)]
pub struct BindingElement<'a> {
    pub data: NodeData,
    pub dot_dot_dot_token: Option<Token>,
    pub property_name: Option<PropertyName<'a>>,
    pub name: BindingName<'a>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct ParameterDeclaration<'a> {
    pub data: NodeData,
    pub dot_dot_dot_token: Option<Token>,
    pub name: BindingName<'a>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

impl<'a> ParameterDeclaration<'a> {
    /// The parameter's name when it is a plain identifier without default or rest.
    pub fn simple_name(&self) -> Option<&'a str> {
        if self.dot_dot_dot_token.is_some() || self.initializer.is_some() {
            return None;
        }
        self.name.as_identifier().map(|id| id.text)
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expression<'a> {
    Identifier(Identifier<'a>),
    NumericLiteral(NumericLiteral<'a>),
    StringLiteral(LiteralLike<'a>),
    RegularExpressionLiteral(LiteralLike<'a>),
    NoSubstitutionTemplateLiteral(LiteralLike<'a>),
    TemplateExpression(TemplateExpression<'a>),
    ArrayLiteral(ArrayLiteralExpression<'a>),
    ObjectLiteral(ObjectLiteralExpression<'a>),
    PropertyAccess(PropertyAccessExpression<'a>),
    ElementAccess(ElementAccessExpression<'a>),
    Call(CallExpression<'a>),
    New(NewExpression<'a>),
    TaggedTemplate(TaggedTemplateExpression<'a>),
    Parenthesized(ParenthesizedExpression<'a>),
    FunctionExpression(FunctionExpression<'a>),
    ArrowFunction(ArrowFunction<'a>),
    PrefixUnary(PrefixUnaryExpression<'a>),
    PostfixUnary(PostfixUnaryExpression<'a>),
    Binary(BinaryExpression<'a>),
    Conditional(ConditionalExpression<'a>),
    Spread(SpreadElement<'a>),
    ClassExpression(ClassExpression<'a>),
    OmittedExpression(NodeData),
    // Keyword expressions
    ThisKeyword(NodeData),
    SuperKeyword(NodeData),
    NullKeyword(NodeData),
    TrueKeyword(NodeData),
    FalseKeyword(NodeData),
}

impl<'a> Expression<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Identifier(n) => &n.data,
            Expression::NumericLiteral(n) => &n.data,
            Expression::StringLiteral(n)
            | Expression::RegularExpressionLiteral(n)
            | Expression::NoSubstitutionTemplateLiteral(n) => &n.data,
            Expression::TemplateExpression(n) => &n.data,
            Expression::ArrayLiteral(n) => &n.data,
            Expression::ObjectLiteral(n) => &n.data,
            Expression::PropertyAccess(n) => &n.data,
            Expression::ElementAccess(n) => &n.data,
            Expression::Call(n) => &n.data,
            Expression::New(n) => &n.data,
            Expression::TaggedTemplate(n) => &n.data,
            Expression::Parenthesized(n) => &n.data,
            Expression::FunctionExpression(n) => &n.data,
            Expression::ArrowFunction(n) => &n.data,
            Expression::PrefixUnary(n) => &n.data,
            Expression::PostfixUnary(n) => &n.data,
            Expression::Binary(n) => &n.data,
            Expression::Conditional(n) => &n.data,
            Expression::Spread(n) => &n.data,
            Expression::ClassExpression(n) => &n.data,
            Expression::OmittedExpression(d)
            | Expression::ThisKeyword(d)
            | Expression::SuperKeyword(d)
            | Expression::NullKeyword(d)
            | Expression::TrueKeyword(d)
            | Expression::FalseKeyword(d) => d,
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    #[inline]
    pub fn span(&self) -> TextSpan {
        self.data().span()
    }

    pub fn as_identifier(&self) -> Option<&Identifier<'a>> {
        match self {
            Expression::Identifier(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct TemplateExpression<'a> {
    pub data: NodeData,
    pub head: LiteralLike<'a>,
    pub template_spans: NodeList<'a, TemplateSpan<'a>>,
}

#[derive(Debug)]
pub struct TemplateSpan<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    /// A `TemplateMiddle` or `TemplateTail` piece.
    pub literal: LiteralLike<'a>,
}

#[derive(Debug)]
pub struct ArrayLiteralExpression<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct ObjectLiteralExpression<'a> {
    pub data: NodeData,
    pub properties: NodeList<'a, ObjectLiteralElement<'a>>,
}

#[derive(Debug)]
pub enum ObjectLiteralElement<'a> {
    PropertyAssignment(PropertyAssignment<'a>),
    ShorthandPropertyAssignment(ShorthandPropertyAssignment<'a>),
    SpreadAssignment(SpreadElement<'a>),
    Method(MethodDeclaration<'a>),
}

#[derive(Debug)]
pub struct PropertyAssignment<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub initializer: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ShorthandPropertyAssignment<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    /// `{ a = 1 }` in an assignment pattern position.
    pub object_assignment_initializer: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct PropertyAccessExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub name: Identifier<'a>,
}

#[derive(Debug)]
pub struct ElementAccessExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub argument_expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub arguments: NodeList<'a, Expression<'a>>,
}

impl<'a> CallExpression<'a> {
    /// The callee's name when the callee is a bare identifier.
    pub fn callee_name(&self) -> Option<&'a str> {
        match self.expression {
            Expression::Identifier(id) => Some(id.text),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct NewExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub arguments: Option<NodeList<'a, Expression<'a>>>,
}

#[derive(Debug)]
pub struct TaggedTemplateExpression<'a> {
    pub data: NodeData,
    pub tag: &'a Expression<'a>,
    pub template: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ParenthesizedExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct FunctionExpression<'a> {
    pub data: NodeData,
    pub name: Option<Identifier<'a>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub body: Block<'a>,
}

#[derive(Debug)]
pub struct ArrowFunction<'a> {
    pub data: NodeData,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub body: ConciseBody<'a>,
}

#[derive(Debug)]
pub enum ConciseBody<'a> {
    Block(Block<'a>),
    Expression(&'a Expression<'a>),
}

/// Prefix operators, including `typeof`, `void` and `delete`.
#[derive(Debug)]
pub struct PrefixUnaryExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct PostfixUnaryExpression<'a> {
    pub data: NodeData,
    pub operand: &'a Expression<'a>,
    pub operator: SyntaxKind,
}

/// Binary operators, including assignment and the comma operator.
#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub left: &'a Expression<'a>,
    pub operator_token: Token,
    pub right: &'a Expression<'a>,
}

impl BinaryExpression<'_> {
    #[inline]
    pub fn operator(&self) -> SyntaxKind {
        self.operator_token.kind()
    }
}

#[derive(Debug)]
pub struct ConditionalExpression<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub when_true: &'a Expression<'a>,
    pub when_false: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct SpreadElement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    VariableStatement(VariableStatement<'a>),
    FunctionDeclaration(FunctionDeclaration<'a>),
    ClassDeclaration(ClassDeclaration<'a>),
    ImportDeclaration(ImportDeclaration<'a>),
    ExportDeclaration(ExportDeclaration<'a>),
    Block(Block<'a>),
    EmptyStatement(NodeData),
    ExpressionStatement(ExpressionStatement<'a>),
    IfStatement(IfStatement<'a>),
    DoStatement(DoStatement<'a>),
    WhileStatement(WhileStatement<'a>),
    ForStatement(ForStatement<'a>),
    ForInStatement(ForInOrOfStatement<'a>),
    ForOfStatement(ForInOrOfStatement<'a>),
    ContinueStatement(JumpStatement<'a>),
    BreakStatement(JumpStatement<'a>),
    ReturnStatement(ReturnStatement<'a>),
    WithStatement(WithStatement<'a>),
    SwitchStatement(SwitchStatement<'a>),
    LabeledStatement(LabeledStatement<'a>),
    ThrowStatement(ThrowStatement<'a>),
    TryStatement(TryStatement<'a>),
    DebuggerStatement(NodeData),
}

impl<'a> Statement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::VariableStatement(n) => &n.data,
            Statement::FunctionDeclaration(n) => &n.data,
            Statement::ClassDeclaration(n) => &n.data,
            Statement::ImportDeclaration(n) => &n.data,
            Statement::ExportDeclaration(n) => &n.data,
            Statement::Block(n) => &n.data,
            Statement::ExpressionStatement(n) => &n.data,
            Statement::IfStatement(n) => &n.data,
            Statement::DoStatement(n) => &n.data,
            Statement::WhileStatement(n) => &n.data,
            Statement::ForStatement(n) => &n.data,
            Statement::ForInStatement(n) | Statement::ForOfStatement(n) => &n.data,
            Statement::ContinueStatement(n) | Statement::BreakStatement(n) => &n.data,
            Statement::ReturnStatement(n) => &n.data,
            Statement::WithStatement(n) => &n.data,
            Statement::SwitchStatement(n) => &n.data,
            Statement::LabeledStatement(n) => &n.data,
            Statement::ThrowStatement(n) => &n.data,
            Statement::TryStatement(n) => &n.data,
            Statement::EmptyStatement(d) | Statement::DebuggerStatement(d) => d,
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    #[inline]
    pub fn span(&self) -> TextSpan {
        self.data().span()
    }
}

#[derive(Debug)]
pub struct Block<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct VariableStatement<'a> {
    pub data: NodeData,
    pub declaration_list: VariableDeclarationList<'a>,
}

/// `LET` / `CONST` in `data.flags` record the declaration keyword.
#[derive(Debug)]
pub struct VariableDeclarationList<'a> {
    pub data: NodeData,
    pub declarations: NodeList<'a, VariableDeclaration<'a>>,
}

#[derive(Debug)]
pub struct VariableDeclaration<'a> {
    pub data: NodeData,
    pub name: BindingName<'a>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct IfStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub then_statement: &'a Statement<'a>,
    pub else_statement: OptionalNode<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct DoStatement<'a> {
    pub data: NodeData,
    pub statement: &'a Statement<'a>,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct WhileStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug)]
pub enum ForInitializer<'a> {
    VariableDeclarationList(VariableDeclarationList<'a>),
    Expression(&'a Expression<'a>),
}

#[derive(Debug)]
pub struct ForStatement<'a> {
    pub data: NodeData,
    pub initializer: Option<ForInitializer<'a>>,
    pub condition: OptionalNode<'a, Expression<'a>>,
    pub incrementor: OptionalNode<'a, Expression<'a>>,
    pub statement: &'a Statement<'a>,
}

/// `for (x in o)` and `for (x of o)`; `data.kind` tells them apart.
#[derive(Debug)]
pub struct ForInOrOfStatement<'a> {
    pub data: NodeData,
    pub initializer: ForInitializer<'a>,
    pub expression: &'a Expression<'a>,
    pub statement: &'a Statement<'a>,
}

/// `break` and `continue`.
#[derive(Debug)]
pub struct JumpStatement<'a> {
    pub data: NodeData,
    pub label: Option<Identifier<'a>>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub expression: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct WithStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct SwitchStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub clauses: NodeList<'a, CaseOrDefaultClause<'a>>,
}

/// A `case` clause, or the `default` clause when `expression` is `None`.
#[derive(Debug)]
pub struct CaseOrDefaultClause<'a> {
    pub data: NodeData,
    pub expression: OptionalNode<'a, Expression<'a>>,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct LabeledStatement<'a> {
    pub data: NodeData,
    pub label: Identifier<'a>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct ThrowStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct TryStatement<'a> {
    pub data: NodeData,
    pub try_block: Block<'a>,
    pub catch_clause: Option<CatchClause<'a>>,
    pub finally_block: Option<Block<'a>>,
}

#[derive(Debug)]
pub struct CatchClause<'a> {
    pub data: NodeData,
    pub variable_declaration: Option<BindingName<'a>>,
    pub block: Block<'a>,
}

// ============================================================================
// Declarations
// ============================================================================

/// `ASYNC` / `GENERATOR` in `data.flags` mark `async function` and `function*`.
#[derive(Debug)]
pub struct FunctionDeclaration<'a> {
    pub data: NodeData,
    pub name: Option<Identifier<'a>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub body: Block<'a>,
}

impl<'a> FunctionDeclaration<'a> {
    pub fn name_text(&self) -> Option<&'a str> {
        self.name.map(|n| n.text)
    }
}

/// Class declarations and class expressions share one shape.
#[derive(Debug)]
pub struct ClassDeclaration<'a> {
    pub data: NodeData,
    pub name: Option<Identifier<'a>>,
    pub heritage: OptionalNode<'a, Expression<'a>>,
    pub members: NodeList<'a, ClassElement<'a>>,
}

pub type ClassExpression<'a> = ClassDeclaration<'a>;

#[derive(Debug)]
pub enum ClassElement<'a> {
    Method(MethodDeclaration<'a>),
    Property(PropertyDeclaration<'a>),
    StaticBlock(Block<'a>),
    Semicolon(NodeData),
}

/// Methods, getters and setters (`data.kind` is `MethodDeclaration`,
/// `GetAccessor` or `SetAccessor`).
#[derive(Debug)]
pub struct MethodDeclaration<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub body: Block<'a>,
}

#[derive(Debug)]
pub struct PropertyDeclaration<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub initializer: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct ImportDeclaration<'a> {
    pub data: NodeData,
    pub default_binding: Option<Identifier<'a>>,
    pub namespace_binding: Option<Identifier<'a>>,
    pub named_bindings: NodeList<'a, ModuleSpecifier<'a>>,
    pub module_specifier: LiteralLike<'a>,
}

/// `export` in any of its forms. `EXPORT_DEFAULT` in `data.flags` marks
/// `export default`.
#[derive(Debug)]
pub struct ExportDeclaration<'a> {
    pub data: NodeData,
    pub declaration: OptionalNode<'a, Statement<'a>>,
    pub expression: OptionalNode<'a, Expression<'a>>,
    pub specifiers: NodeList<'a, ModuleSpecifier<'a>>,
    pub module_specifier: Option<LiteralLike<'a>>,
}

/// `a` or `a as b` inside import/export braces.
#[derive(Debug)]
pub struct ModuleSpecifier<'a> {
    pub data: NodeData,
    pub property_name: Option<Identifier<'a>>,
    pub name: Identifier<'a>,
}
