//! The JavaScript parser implementation.
//!
//! A recursive descent parser that consumes tokens from the scanner and builds
//! an arena-allocated AST. Node ranges run from the first token of the node to
//! the end of its last consumed token.

use bumpalo::Bump;
use jslift_ast::node::*;
use jslift_ast::syntax_kind::SyntaxKind;
use jslift_ast::types::*;
use jslift_core::text::TextSpan;
use jslift_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use jslift_scanner::Scanner;

use crate::precedence::Precedence;
use crate::utilities::*;

/// Maximum nesting depth of statements and expressions. Deeper input is
/// reported instead of overflowing the stack.
pub const MAX_RECURSION_DEPTH: u32 = 200;

/// Allocate a Vec into the arena as a slice.
fn alloc_vec_in<T>(arena: &Bump, vec: Vec<T>) -> &[T] {
    if vec.is_empty() {
        return &[];
    }
    arena.alloc_slice_fill_iter(vec)
}

/// The parser produces a SourceFile AST from JavaScript source text.
pub struct Parser<'a> {
    arena: &'a Bump,
    scanner: Scanner<'a>,
    file_name: String,
    source_text: &'a str,
    context_flags: NodeFlags,
    diagnostics: DiagnosticCollection,
    /// End of the most recently consumed token.
    prev_token_end: u32,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    recursion_depth: u32,
    /// Set once the nesting limit is hit; the rest of the file is skipped.
    aborted: bool,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, file_name: &str, source_text: &str) -> Self {
        let source_text: &'a str = arena.alloc_str(source_text);
        Self {
            arena,
            scanner: Scanner::new(source_text),
            file_name: file_name.to_string(),
            source_text,
            context_flags: NodeFlags::NONE,
            diagnostics: DiagnosticCollection::new(),
            prev_token_end: 0,
            recursion_depth: 0,
            aborted: false,
        }
    }

    pub fn parse_source_file(&mut self) -> SourceFile<'a> {
        self.scanner.skip_shebang();
        self.next_token();

        let statements = self.parse_statement_list(|kind| kind == SyntaxKind::EndOfFileToken);
        let end = self.source_text.len() as u32;

        SourceFile {
            data: NodeData::new(SyntaxKind::SourceFile, 0, end),
            statements,
            end_of_file_token: Token::new(SyntaxKind::EndOfFileToken, end, end),
            file_name: self.file_name.clone(),
            text: self.source_text,
        }
    }

    /// Scanner and parser diagnostics, attributed to this file and sorted by position.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        let mut all = DiagnosticCollection::new();
        for diagnostic in self.scanner.take_diagnostics().into_diagnostics() {
            all.add(diagnostic.in_file(&self.file_name));
        }
        all.extend(std::mem::take(&mut self.diagnostics));
        all.sort();
        all
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    fn next_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.scanner.token_end() as u32;
        self.scanner.scan()
    }

    #[inline]
    fn token_pos(&self) -> u32 {
        self.scanner.token_start() as u32
    }

    #[inline]
    fn token_end(&self) -> u32 {
        self.scanner.token_end() as u32
    }

    /// End position for a node whose last token was just consumed.
    #[inline]
    fn node_end(&self) -> u32 {
        self.prev_token_end
    }

    #[inline]
    fn token_value(&self) -> &str {
        self.scanner.token_value()
    }

    fn is_identifier_text(&self, text: &str) -> bool {
        self.current_token() == SyntaxKind::Identifier && self.token_value() == text
    }

    fn expect_token(&mut self, kind: SyntaxKind) -> Token {
        let pos = self.token_pos();
        let end = self.token_end();
        if self.current_token() == kind {
            self.next_token();
            Token::new(kind, pos, end)
        } else {
            let text = kind.token_text().unwrap_or("token");
            self.error(&messages::_0_EXPECTED, &[text]);
            Token::new(kind, pos, pos)
        }
    }

    fn optional_token(&mut self, kind: SyntaxKind) -> Option<Token> {
        if self.current_token() == kind {
            let pos = self.token_pos();
            let end = self.token_end();
            self.next_token();
            Some(Token::new(kind, pos, end))
        } else {
            None
        }
    }

    /// Consume a `;` if present. Automatic semicolon insertion is lenient: a
    /// missing semicolon is never an error.
    fn parse_expected_semicolon(&mut self) {
        if self.current_token() == SyntaxKind::SemicolonToken {
            self.next_token();
        }
    }

    /// Whether the current token can end a statement without a `;`.
    fn can_insert_semicolon(&self) -> bool {
        matches!(
            self.current_token(),
            SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) || self.scanner.has_preceding_line_break()
    }

    fn error(&mut self, msg: &DiagnosticMessage, args: &[&str]) {
        if self.aborted {
            return;
        }
        let span = TextSpan::from_bounds(self.token_pos(), self.token_end());
        self.diagnostics.add(Diagnostic::at(span, msg, args).in_file(&self.file_name));
    }

    fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Scanner<'a>) -> T) -> T {
        self.scanner.look_ahead(f)
    }

    /// Whether the next token is `kind` on the same line.
    fn next_token_is_on_same_line(&mut self, kind: SyntaxKind) -> bool {
        self.look_ahead(|s| s.scan() == kind && !s.has_preceding_line_break())
    }

    // ========================================================================
    // Recursion guard
    // ========================================================================

    /// Enter one nesting level. Returns false once the limit is exceeded, after
    /// reporting it and skipping to the end of the input.
    fn enter_nesting(&mut self) -> bool {
        self.recursion_depth += 1;
        if self.aborted {
            return false;
        }
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            let limit = MAX_RECURSION_DEPTH.to_string();
            self.error(&messages::MAXIMUM_NESTING_DEPTH_EXCEEDED, &[&limit]);
            self.aborted = true;
            while self.current_token() != SyntaxKind::EndOfFileToken {
                self.next_token();
            }
            return false;
        }
        true
    }

    #[inline]
    fn exit_nesting(&mut self) {
        self.recursion_depth -= 1;
    }

    // ========================================================================
    // Node helpers
    // ========================================================================

    fn alloc_expression(&self, expr: Expression<'a>) -> &'a Expression<'a> {
        self.arena.alloc(expr)
    }

    fn alloc_statement(&self, stmt: Statement<'a>) -> &'a Statement<'a> {
        self.arena.alloc(stmt)
    }

    fn alloc_str(&self, text: &str) -> &'a str {
        self.arena.alloc_str(text)
    }

    /// A zero-width identifier standing in for a missing name.
    fn create_missing_identifier(&self) -> Identifier<'a> {
        let pos = self.token_pos();
        Identifier {
            data: NodeData::new(SyntaxKind::Identifier, pos, pos)
                .with_flags(NodeFlags::THIS_NODE_HAS_ERROR),
            text: "",
        }
    }

    fn with_context<T>(&mut self, flags: NodeFlags, enabled: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.context_flags;
        self.context_flags.set(flags, enabled);
        let result = f(self);
        self.context_flags = saved;
        result
    }

    // ========================================================================
    // Statement parsing
    // ========================================================================

    fn parse_statement_list(&mut self, is_terminator: fn(SyntaxKind) -> bool) -> &'a [Statement<'a>] {
        let mut statements = Vec::new();
        while !is_terminator(self.current_token()) && self.current_token() != SyntaxKind::EndOfFileToken {
            let saved_pos = self.scanner.token_start();
            let stmt = self.parse_statement();
            statements.push(stmt);

            // Error recovery: if the parser hasn't advanced, skip forward to
            // the next statement-starting token to avoid infinite loops.
            if self.scanner.token_start() == saved_pos {
                self.skip_to_next_statement();
                if self.scanner.token_start() == saved_pos {
                    self.next_token();
                }
            }
        }
        alloc_vec_in(self.arena, statements)
    }

    fn parse_statements(&mut self) -> &'a [Statement<'a>] {
        self.parse_statement_list(|kind| kind == SyntaxKind::CloseBraceToken)
    }

    /// Error recovery: skip tokens until we find one that can start a new statement.
    fn skip_to_next_statement(&mut self) {
        while !is_statement_recovery_point(self.current_token()) {
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> Statement<'a> {
        if !self.enter_nesting() {
            self.exit_nesting();
            let pos = self.token_pos();
            return Statement::EmptyStatement(NodeData::new(SyntaxKind::EmptyStatement, pos, pos));
        }
        let stmt = self.parse_statement_worker();
        self.exit_nesting();
        stmt
    }

    fn parse_statement_worker(&mut self) -> Statement<'a> {
        match self.current_token() {
            SyntaxKind::SemicolonToken => {
                let pos = self.token_pos();
                self.next_token();
                Statement::EmptyStatement(NodeData::new(SyntaxKind::EmptyStatement, pos, self.node_end()))
            }
            SyntaxKind::OpenBraceToken => Statement::Block(self.parse_block()),
            SyntaxKind::VarKeyword | SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword => {
                self.parse_variable_statement()
            }
            SyntaxKind::FunctionKeyword => {
                Statement::FunctionDeclaration(self.parse_function_declaration(NodeFlags::NONE, false))
            }
            SyntaxKind::Identifier if self.is_async_function() => {
                let pos = self.token_pos();
                self.next_token();
                let mut decl = self.parse_function_declaration(NodeFlags::ASYNC, false);
                decl.data.range.pos = pos;
                Statement::FunctionDeclaration(decl)
            }
            SyntaxKind::ClassKeyword => Statement::ClassDeclaration(self.parse_class(SyntaxKind::ClassDeclaration)),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::DoKeyword => self.parse_do_statement(),
            SyntaxKind::BreakKeyword => self.parse_break_or_continue_statement(SyntaxKind::BreakStatement),
            SyntaxKind::ContinueKeyword => {
                self.parse_break_or_continue_statement(SyntaxKind::ContinueStatement)
            }
            SyntaxKind::ThrowKeyword => self.parse_throw_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::WithKeyword => self.parse_with_statement(),
            SyntaxKind::DebuggerKeyword => {
                let pos = self.token_pos();
                self.next_token();
                self.parse_expected_semicolon();
                Statement::DebuggerStatement(NodeData::new(SyntaxKind::DebuggerStatement, pos, self.node_end()))
            }
            SyntaxKind::ImportKeyword => self.parse_import_declaration(),
            SyntaxKind::ExportKeyword => self.parse_export_declaration(),
            SyntaxKind::Identifier if self.is_labeled_statement() => self.parse_labeled_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    /// `async function` with no line break between the two words.
    fn is_async_function(&mut self) -> bool {
        self.is_identifier_text("async") && self.next_token_is_on_same_line(SyntaxKind::FunctionKeyword)
    }

    fn is_labeled_statement(&mut self) -> bool {
        self.look_ahead(|s| s.scan() == SyntaxKind::ColonToken)
    }

    fn parse_block(&mut self) -> Block<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statements();
        self.expect_token(SyntaxKind::CloseBraceToken);
        Block {
            data: NodeData::new(SyntaxKind::Block, pos, self.node_end()),
            statements,
        }
    }

    fn parse_variable_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let declaration_list = self.parse_variable_declaration_list();
        self.parse_expected_semicolon();
        Statement::VariableStatement(VariableStatement {
            data: NodeData::new(SyntaxKind::VariableStatement, pos, self.node_end()),
            declaration_list,
        })
    }

    fn parse_variable_declaration_list(&mut self) -> VariableDeclarationList<'a> {
        let pos = self.token_pos();
        let flags = match self.current_token() {
            SyntaxKind::LetKeyword => NodeFlags::LET,
            SyntaxKind::ConstKeyword => NodeFlags::CONST,
            _ => NodeFlags::NONE,
        };
        self.next_token();

        let mut declarations = Vec::new();
        loop {
            if !matches!(
                self.current_token(),
                SyntaxKind::Identifier | SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken
            ) {
                self.error(&messages::VARIABLE_DECLARATION_EXPECTED, &[]);
                break;
            }
            declarations.push(self.parse_variable_declaration());
            if self.optional_token(SyntaxKind::CommaToken).is_none() {
                break;
            }
        }
        VariableDeclarationList {
            data: NodeData::new(SyntaxKind::VariableDeclarationList, pos, self.node_end()).with_flags(flags),
            declarations: alloc_vec_in(self.arena, declarations),
        }
    }

    fn parse_variable_declaration(&mut self) -> VariableDeclaration<'a> {
        let pos = self.token_pos();
        let name = self.parse_binding_name();
        let initializer = self.parse_initializer();
        VariableDeclaration {
            data: NodeData::new(SyntaxKind::VariableDeclaration, pos, self.node_end()),
            name,
            initializer,
        }
    }

    fn parse_initializer(&mut self) -> OptionalNode<'a, Expression<'a>> {
        self.optional_token(SyntaxKind::EqualsToken)?;
        Some(self.parse_assignment_expression_and_alloc())
    }

    fn parse_expression_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let expression = self.parse_expression_and_alloc();
        self.parse_expected_semicolon();
        Statement::ExpressionStatement(ExpressionStatement {
            data: NodeData::new(SyntaxKind::ExpressionStatement, pos, self.node_end()),
            expression,
        })
    }

    fn parse_parenthesized_condition(&mut self) -> &'a Expression<'a> {
        self.expect_token(SyntaxKind::OpenParenToken);
        let expr = self.parse_expression_and_alloc();
        self.expect_token(SyntaxKind::CloseParenToken);
        expr
    }

    fn parse_embedded_statement(&mut self) -> &'a Statement<'a> {
        let stmt = self.parse_statement();
        self.alloc_statement(stmt)
    }

    fn parse_if_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::IfKeyword);
        let expression = self.parse_parenthesized_condition();
        let then_statement = self.parse_embedded_statement();
        let else_statement = if self.optional_token(SyntaxKind::ElseKeyword).is_some() {
            Some(self.parse_embedded_statement())
        } else {
            None
        };
        Statement::IfStatement(IfStatement {
            data: NodeData::new(SyntaxKind::IfStatement, pos, self.node_end()),
            expression,
            then_statement,
            else_statement,
        })
    }

    fn parse_return_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ReturnKeyword);
        let expression = if self.can_insert_semicolon() {
            None
        } else {
            Some(self.parse_expression_and_alloc())
        };
        self.parse_expected_semicolon();
        Statement::ReturnStatement(ReturnStatement {
            data: NodeData::new(SyntaxKind::ReturnStatement, pos, self.node_end()),
            expression,
        })
    }

    fn parse_while_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::WhileKeyword);
        let expression = self.parse_parenthesized_condition();
        let statement = self.parse_embedded_statement();
        Statement::WhileStatement(WhileStatement {
            data: NodeData::new(SyntaxKind::WhileStatement, pos, self.node_end()),
            expression,
            statement,
        })
    }

    fn parse_do_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::DoKeyword);
        let statement = self.parse_embedded_statement();
        self.expect_token(SyntaxKind::WhileKeyword);
        let expression = self.parse_parenthesized_condition();
        self.parse_expected_semicolon();
        Statement::DoStatement(DoStatement {
            data: NodeData::new(SyntaxKind::DoStatement, pos, self.node_end()),
            statement,
            expression,
        })
    }

    fn parse_for_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ForKeyword);
        self.expect_token(SyntaxKind::OpenParenToken);

        let initializer = match self.current_token() {
            SyntaxKind::SemicolonToken => None,
            SyntaxKind::VarKeyword | SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword => {
                Some(self.with_context(NodeFlags::DISALLOW_IN_CONTEXT, true, |p| {
                    ForInitializer::VariableDeclarationList(p.parse_variable_declaration_list())
                }))
            }
            _ => Some(self.with_context(NodeFlags::DISALLOW_IN_CONTEXT, true, |p| {
                ForInitializer::Expression(p.parse_expression_and_alloc())
            })),
        };

        let loop_kind = if self.current_token() == SyntaxKind::InKeyword {
            Some(SyntaxKind::ForInStatement)
        } else if self.is_identifier_text("of") {
            Some(SyntaxKind::ForOfStatement)
        } else {
            None
        };

        let initializer = match (loop_kind, initializer) {
            (Some(kind), Some(initializer)) => {
                self.next_token();
                let expression = if kind == SyntaxKind::ForInStatement {
                    self.parse_expression_and_alloc()
                } else {
                    self.parse_assignment_expression_and_alloc()
                };
                self.expect_token(SyntaxKind::CloseParenToken);
                let statement = self.parse_embedded_statement();
                let node = ForInOrOfStatement {
                    data: NodeData::new(kind, pos, self.node_end()),
                    initializer,
                    expression,
                    statement,
                };
                return if kind == SyntaxKind::ForInStatement {
                    Statement::ForInStatement(node)
                } else {
                    Statement::ForOfStatement(node)
                };
            }
            (_, initializer) => initializer,
        };

        self.expect_token(SyntaxKind::SemicolonToken);
        let condition = if self.current_token() != SyntaxKind::SemicolonToken {
            Some(self.parse_expression_and_alloc())
        } else {
            None
        };
        self.expect_token(SyntaxKind::SemicolonToken);
        let incrementor = if self.current_token() != SyntaxKind::CloseParenToken {
            Some(self.parse_expression_and_alloc())
        } else {
            None
        };
        self.expect_token(SyntaxKind::CloseParenToken);
        let statement = self.parse_embedded_statement();
        Statement::ForStatement(ForStatement {
            data: NodeData::new(SyntaxKind::ForStatement, pos, self.node_end()),
            initializer,
            condition,
            incrementor,
            statement,
        })
    }

    fn parse_break_or_continue_statement(&mut self, kind: SyntaxKind) -> Statement<'a> {
        let pos = self.token_pos();
        self.next_token();
        let label = if self.current_token() == SyntaxKind::Identifier && !self.scanner.has_preceding_line_break() {
            Some(self.parse_identifier())
        } else {
            None
        };
        self.parse_expected_semicolon();
        let node = JumpStatement {
            data: NodeData::new(kind, pos, self.node_end()),
            label,
        };
        if kind == SyntaxKind::BreakStatement {
            Statement::BreakStatement(node)
        } else {
            Statement::ContinueStatement(node)
        }
    }

    fn parse_throw_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ThrowKeyword);
        let expression = self.parse_expression_and_alloc();
        self.parse_expected_semicolon();
        Statement::ThrowStatement(ThrowStatement {
            data: NodeData::new(SyntaxKind::ThrowStatement, pos, self.node_end()),
            expression,
        })
    }

    fn parse_try_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::TryKeyword);
        let try_block = self.parse_block();

        let catch_clause = if self.current_token() == SyntaxKind::CatchKeyword {
            let catch_pos = self.token_pos();
            self.next_token();
            let variable_declaration = if self.optional_token(SyntaxKind::OpenParenToken).is_some() {
                let name = self.parse_binding_name();
                self.expect_token(SyntaxKind::CloseParenToken);
                Some(name)
            } else {
                None
            };
            let block = self.parse_block();
            Some(CatchClause {
                data: NodeData::new(SyntaxKind::CatchClause, catch_pos, self.node_end()),
                variable_declaration,
                block,
            })
        } else {
            None
        };

        let finally_block = if self.optional_token(SyntaxKind::FinallyKeyword).is_some() {
            Some(self.parse_block())
        } else {
            None
        };

        if catch_clause.is_none() && finally_block.is_none() {
            self.error(&messages::TRY_MUST_HAVE_CATCH_OR_FINALLY, &[]);
        }

        Statement::TryStatement(TryStatement {
            data: NodeData::new(SyntaxKind::TryStatement, pos, self.node_end()),
            try_block,
            catch_clause,
            finally_block,
        })
    }

    fn parse_switch_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::SwitchKeyword);
        let expression = self.parse_parenthesized_condition();
        self.expect_token(SyntaxKind::OpenBraceToken);

        let mut clauses = Vec::new();
        loop {
            let clause_pos = self.token_pos();
            let (kind, expression) = match self.current_token() {
                SyntaxKind::CaseKeyword => {
                    self.next_token();
                    (SyntaxKind::CaseClause, Some(self.parse_expression_and_alloc()))
                }
                SyntaxKind::DefaultKeyword => {
                    self.next_token();
                    (SyntaxKind::DefaultClause, None)
                }
                _ => break,
            };
            self.expect_token(SyntaxKind::ColonToken);
            let statements = self.parse_statement_list(|kind| {
                matches!(
                    kind,
                    SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword | SyntaxKind::CloseBraceToken
                )
            });
            clauses.push(CaseOrDefaultClause {
                data: NodeData::new(kind, clause_pos, self.node_end()),
                expression,
                statements,
            });
        }
        self.expect_token(SyntaxKind::CloseBraceToken);

        Statement::SwitchStatement(SwitchStatement {
            data: NodeData::new(SyntaxKind::SwitchStatement, pos, self.node_end()),
            expression,
            clauses: alloc_vec_in(self.arena, clauses),
        })
    }

    fn parse_with_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::WithKeyword);
        let expression = self.parse_parenthesized_condition();
        let statement = self.parse_embedded_statement();
        Statement::WithStatement(WithStatement {
            data: NodeData::new(SyntaxKind::WithStatement, pos, self.node_end()),
            expression,
            statement,
        })
    }

    fn parse_labeled_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let label = self.parse_identifier();
        self.expect_token(SyntaxKind::ColonToken);
        let statement = self.parse_embedded_statement();
        Statement::LabeledStatement(LabeledStatement {
            data: NodeData::new(SyntaxKind::LabeledStatement, pos, self.node_end()),
            label,
            statement,
        })
    }

    // ========================================================================
    // Functions and classes
    // ========================================================================

    /// Parse `function [*] name (params) { body }`. The current token is
    /// `function`; an `async` prefix has already been consumed by the caller.
    fn parse_function_declaration(&mut self, flags: NodeFlags, name_optional: bool) -> FunctionDeclaration<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::FunctionKeyword);
        let mut flags = flags;
        if self.optional_token(SyntaxKind::AsteriskToken).is_some() {
            flags |= NodeFlags::GENERATOR;
        }
        let name = if name_optional && self.current_token() == SyntaxKind::OpenParenToken {
            None
        } else if self.current_token() == SyntaxKind::Identifier {
            Some(self.parse_identifier())
        } else {
            self.error(&messages::FUNCTION_NAME_EXPECTED, &[]);
            Some(self.create_missing_identifier())
        };
        let parameters = self.parse_parameter_list();
        let body = self.parse_block();
        FunctionDeclaration {
            data: NodeData::new(SyntaxKind::FunctionDeclaration, pos, self.node_end()).with_flags(flags),
            name,
            parameters,
            body,
        }
    }

    fn parse_function_expression(&mut self, flags: NodeFlags) -> Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::FunctionKeyword);
        let mut flags = flags;
        if self.optional_token(SyntaxKind::AsteriskToken).is_some() {
            flags |= NodeFlags::GENERATOR;
        }
        let name = if self.current_token() == SyntaxKind::Identifier {
            Some(self.parse_identifier())
        } else {
            None
        };
        let parameters = self.parse_parameter_list();
        let body = self.parse_block();
        Expression::FunctionExpression(FunctionExpression {
            data: NodeData::new(SyntaxKind::FunctionExpression, pos, self.node_end()).with_flags(flags),
            name,
            parameters,
            body,
        })
    }

    fn parse_parameter_list(&mut self) -> &'a [ParameterDeclaration<'a>] {
        self.expect_token(SyntaxKind::OpenParenToken);
        let mut parameters = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) {
            let saved_pos = self.token_pos();
            parameters.push(self.parse_parameter());
            if self.optional_token(SyntaxKind::CommaToken).is_none() {
                break;
            }
            if self.token_pos() == saved_pos {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);
        alloc_vec_in(self.arena, parameters)
    }

    fn parse_parameter(&mut self) -> ParameterDeclaration<'a> {
        let pos = self.token_pos();
        let dot_dot_dot_token = self.optional_token(SyntaxKind::DotDotDotToken);
        let name = self.parse_binding_name();
        let initializer = self.parse_initializer();
        ParameterDeclaration {
            data: NodeData::new(SyntaxKind::Parameter, pos, self.node_end()),
            dot_dot_dot_token,
            name,
            initializer,
        }
    }

    fn parse_class(&mut self, kind: SyntaxKind) -> ClassDeclaration<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ClassKeyword);
        let name = if self.current_token() == SyntaxKind::Identifier {
            Some(self.parse_identifier())
        } else {
            if kind == SyntaxKind::ClassDeclaration {
                self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            }
            None
        };
        let heritage = if self.optional_token(SyntaxKind::ExtendsKeyword).is_some() {
            let expr = self.parse_left_hand_side_expression();
            Some(self.alloc_expression(expr))
        } else {
            None
        };
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut members = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let saved_pos = self.token_pos();
            members.push(self.parse_class_member());
            if self.token_pos() == saved_pos {
                self.next_token();
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        ClassDeclaration {
            data: NodeData::new(kind, pos, self.node_end()),
            name,
            heritage,
            members: alloc_vec_in(self.arena, members),
        }
    }

    fn parse_class_member(&mut self) -> ClassElement<'a> {
        let pos = self.token_pos();
        if self.current_token() == SyntaxKind::SemicolonToken {
            self.next_token();
            return ClassElement::Semicolon(NodeData::new(SyntaxKind::SemicolonClassElement, pos, self.node_end()));
        }

        let mut flags = NodeFlags::NONE;
        if self.is_identifier_text("static") && self.is_modifier_followed_by_member() {
            self.next_token();
            if self.current_token() == SyntaxKind::OpenBraceToken {
                let block = self.parse_block();
                return ClassElement::StaticBlock(block);
            }
            flags |= NodeFlags::STATIC;
        }

        let (kind, method_flags) = self.parse_method_prefix();
        flags |= method_flags;
        let name = self.parse_property_name();

        if kind != SyntaxKind::MethodDeclaration || self.current_token() == SyntaxKind::OpenParenToken {
            let parameters = self.parse_parameter_list();
            let body = self.parse_block();
            return ClassElement::Method(MethodDeclaration {
                data: NodeData::new(kind, pos, self.node_end()).with_flags(flags),
                name,
                parameters,
                body,
            });
        }

        let initializer = self.parse_initializer();
        self.parse_expected_semicolon();
        ClassElement::Property(PropertyDeclaration {
            data: NodeData::new(SyntaxKind::PropertyDeclaration, pos, self.node_end()).with_flags(flags),
            name,
            initializer,
        })
    }

    /// Whether the current contextual modifier (`static`, `async`, `get`,
    /// `set`) is followed by something that makes it a modifier rather than
    /// a member name.
    fn is_modifier_followed_by_member(&mut self) -> bool {
        self.look_ahead(|s| {
            let next = s.scan();
            !matches!(
                next,
                SyntaxKind::OpenParenToken
                    | SyntaxKind::EqualsToken
                    | SyntaxKind::SemicolonToken
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::ColonToken
                    | SyntaxKind::CommaToken
                    | SyntaxKind::EndOfFileToken
            )
        })
    }

    /// Consume `get`, `set`, `async` and `*` before a method name. Returns
    /// the member kind and method flags.
    fn parse_method_prefix(&mut self) -> (SyntaxKind, NodeFlags) {
        let mut flags = NodeFlags::NONE;
        if (self.is_identifier_text("get") || self.is_identifier_text("set"))
            && self.is_modifier_followed_by_member()
        {
            let kind = if self.token_value() == "get" {
                SyntaxKind::GetAccessor
            } else {
                SyntaxKind::SetAccessor
            };
            self.next_token();
            return (kind, flags);
        }
        if self.is_identifier_text("async")
            && self.is_modifier_followed_by_member()
            && !self.look_ahead(|s| {
                s.scan();
                s.has_preceding_line_break()
            })
        {
            self.next_token();
            flags |= NodeFlags::ASYNC;
        }
        if self.optional_token(SyntaxKind::AsteriskToken).is_some() {
            flags |= NodeFlags::GENERATOR;
        }
        (SyntaxKind::MethodDeclaration, flags)
    }

    fn parse_property_name(&mut self) -> PropertyName<'a> {
        match self.current_token() {
            SyntaxKind::StringLiteral => {
                let literal = self.parse_literal_like(SyntaxKind::StringLiteral);
                PropertyName::StringLiteral(literal)
            }
            SyntaxKind::NumericLiteral => PropertyName::NumericLiteral(self.parse_numeric_literal()),
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                let expr = self.parse_assignment_expression_and_alloc();
                self.expect_token(SyntaxKind::CloseBracketToken);
                PropertyName::Computed(expr)
            }
            _ => PropertyName::Identifier(self.parse_identifier_name()),
        }
    }

    // ========================================================================
    // Modules
    // ========================================================================

    fn parse_import_declaration(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ImportKeyword);

        let mut default_binding = None;
        let mut namespace_binding = None;
        let mut named_bindings: &'a [ModuleSpecifier<'a>] = &[];

        if self.current_token() != SyntaxKind::StringLiteral {
            if self.current_token() == SyntaxKind::Identifier {
                default_binding = Some(self.parse_identifier());
                self.optional_token(SyntaxKind::CommaToken);
            }
            if self.optional_token(SyntaxKind::AsteriskToken).is_some() {
                self.expect_contextual_keyword("as");
                namespace_binding = Some(self.parse_identifier());
            } else if self.current_token() == SyntaxKind::OpenBraceToken {
                named_bindings = self.parse_module_specifiers(SyntaxKind::ImportSpecifier);
            }
            self.expect_contextual_keyword("from");
        }

        let module_specifier = self.parse_module_specifier_string();
        self.parse_expected_semicolon();
        Statement::ImportDeclaration(ImportDeclaration {
            data: NodeData::new(SyntaxKind::ImportDeclaration, pos, self.node_end()),
            default_binding,
            namespace_binding,
            named_bindings,
            module_specifier,
        })
    }

    fn parse_export_declaration(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ExportKeyword);

        let mut flags = NodeFlags::NONE;
        let mut declaration = None;
        let mut expression = None;
        let mut specifiers: &'a [ModuleSpecifier<'a>] = &[];
        let mut module_specifier = None;

        if self.optional_token(SyntaxKind::DefaultKeyword).is_some() {
            flags |= NodeFlags::EXPORT_DEFAULT;
            match self.current_token() {
                SyntaxKind::FunctionKeyword => {
                    let decl = self.parse_function_declaration(NodeFlags::NONE, true);
                    declaration = Some(self.alloc_statement(Statement::FunctionDeclaration(decl)));
                }
                SyntaxKind::ClassKeyword => {
                    let class = self.parse_class(SyntaxKind::ClassDeclaration);
                    declaration = Some(self.alloc_statement(Statement::ClassDeclaration(class)));
                }
                SyntaxKind::Identifier if self.is_async_function() => {
                    self.next_token();
                    let decl = self.parse_function_declaration(NodeFlags::ASYNC, true);
                    declaration = Some(self.alloc_statement(Statement::FunctionDeclaration(decl)));
                }
                _ => {
                    expression = Some(self.parse_assignment_expression_and_alloc());
                    self.parse_expected_semicolon();
                }
            }
        } else if self.optional_token(SyntaxKind::AsteriskToken).is_some() {
            if self.is_identifier_text("as") {
                self.next_token();
                let name = self.parse_identifier_name();
                specifiers = alloc_vec_in(
                    self.arena,
                    vec![ModuleSpecifier {
                        data: NodeData::new(SyntaxKind::ExportSpecifier, name.data.range.pos, name.data.range.end),
                        property_name: None,
                        name,
                    }],
                );
            }
            self.expect_contextual_keyword("from");
            module_specifier = Some(self.parse_module_specifier_string());
            self.parse_expected_semicolon();
        } else if self.current_token() == SyntaxKind::OpenBraceToken {
            specifiers = self.parse_module_specifiers(SyntaxKind::ExportSpecifier);
            if self.is_identifier_text("from") {
                self.next_token();
                module_specifier = Some(self.parse_module_specifier_string());
            }
            self.parse_expected_semicolon();
        } else {
            let stmt = self.parse_statement();
            if !matches!(
                stmt,
                Statement::VariableStatement(_) | Statement::FunctionDeclaration(_) | Statement::ClassDeclaration(_)
            ) {
                self.diagnostics.add(
                    Diagnostic::at(stmt.span(), &messages::DECLARATION_OR_STATEMENT_EXPECTED, &[])
                        .in_file(&self.file_name),
                );
            }
            declaration = Some(self.alloc_statement(stmt));
        }

        Statement::ExportDeclaration(ExportDeclaration {
            data: NodeData::new(SyntaxKind::ExportDeclaration, pos, self.node_end()).with_flags(flags),
            declaration,
            expression,
            specifiers,
            module_specifier,
        })
    }

    /// `{ a, b as c, }` in an import or export clause.
    fn parse_module_specifiers(&mut self, kind: SyntaxKind) -> &'a [ModuleSpecifier<'a>] {
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut specifiers = Vec::new();
        while self.current_token().is_identifier_or_keyword() {
            let pos = self.token_pos();
            let first = self.parse_identifier_name();
            let (property_name, name) = if self.is_identifier_text("as") {
                self.next_token();
                (Some(first), self.parse_identifier_name())
            } else {
                (None, first)
            };
            specifiers.push(ModuleSpecifier {
                data: NodeData::new(kind, pos, self.node_end()),
                property_name,
                name,
            });
            if self.optional_token(SyntaxKind::CommaToken).is_none() {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        alloc_vec_in(self.arena, specifiers)
    }

    fn parse_module_specifier_string(&mut self) -> LiteralLike<'a> {
        if self.current_token() == SyntaxKind::StringLiteral {
            self.parse_literal_like(SyntaxKind::StringLiteral)
        } else {
            self.error(&messages::_0_EXPECTED, &["string literal"]);
            let pos = self.token_pos();
            LiteralLike {
                data: NodeData::new(SyntaxKind::StringLiteral, pos, pos).with_flags(NodeFlags::THIS_NODE_HAS_ERROR),
                text: "",
                raw: "",
            }
        }
    }

    fn expect_contextual_keyword(&mut self, text: &'static str) {
        if self.is_identifier_text(text) {
            self.next_token();
        } else {
            self.error(&messages::_0_EXPECTED, &[text]);
        }
    }

    // ========================================================================
    // Names and binding patterns
    // ========================================================================

    fn parse_identifier(&mut self) -> Identifier<'a> {
        if self.current_token() != SyntaxKind::Identifier {
            self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            return self.create_missing_identifier();
        }
        self.parse_identifier_name()
    }

    /// An identifier in a position where reserved words are allowed
    /// (property names, module specifiers).
    fn parse_identifier_name(&mut self) -> Identifier<'a> {
        if !self.current_token().is_identifier_or_keyword() {
            self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            return self.create_missing_identifier();
        }
        let pos = self.token_pos();
        let text = self.alloc_str(self.token_value());
        self.next_token();
        Identifier {
            data: NodeData::new(SyntaxKind::Identifier, pos, self.node_end()),
            text,
        }
    }

    fn parse_binding_name(&mut self) -> BindingName<'a> {
        match self.current_token() {
            SyntaxKind::OpenBraceToken => BindingName::ObjectBindingPattern(self.parse_object_binding_pattern()),
            SyntaxKind::OpenBracketToken => BindingName::ArrayBindingPattern(self.parse_array_binding_pattern()),
            _ => BindingName::Identifier(self.parse_identifier()),
        }
    }

    fn parse_object_binding_pattern(&mut self) -> BindingPattern<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut elements = Vec::new();
        while self.current_token() != SyntaxKind::CloseBraceToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            let elem_pos = self.token_pos();
            let element = if let Some(dot_dot_dot) = self.optional_token(SyntaxKind::DotDotDotToken) {
                let name = BindingName::Identifier(self.parse_identifier());
                BindingElement {
                    data: NodeData::new(SyntaxKind::BindingElement, elem_pos, self.node_end()),
                    dot_dot_dot_token: Some(dot_dot_dot),
                    property_name: None,
                    name,
                    initializer: None,
                }
            } else {
                let property = self.parse_property_name();
                let (property_name, name) = if self.optional_token(SyntaxKind::ColonToken).is_some() {
                    (Some(property), self.parse_binding_name())
                } else {
                    match property {
                        PropertyName::Identifier(id) => (None, BindingName::Identifier(id)),
                        other => {
                            self.error(&messages::_0_EXPECTED, &[":"]);
                            (Some(other), BindingName::Identifier(self.create_missing_identifier()))
                        }
                    }
                };
                let initializer = self.parse_initializer();
                BindingElement {
                    data: NodeData::new(SyntaxKind::BindingElement, elem_pos, self.node_end()),
                    dot_dot_dot_token: None,
                    property_name,
                    name,
                    initializer,
                }
            };
            elements.push(Some(element));
            if self.optional_token(SyntaxKind::CommaToken).is_none() {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        BindingPattern {
            data: NodeData::new(SyntaxKind::ObjectBindingPattern, pos, self.node_end()),
            elements: alloc_vec_in(self.arena, elements),
        }
    }

    fn parse_array_binding_pattern(&mut self) -> BindingPattern<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBracketToken);
        let mut elements = Vec::new();
        while self.current_token() != SyntaxKind::CloseBracketToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            if self.optional_token(SyntaxKind::CommaToken).is_some() {
                elements.push(None);
                continue;
            }
            let elem_pos = self.token_pos();
            let dot_dot_dot_token = self.optional_token(SyntaxKind::DotDotDotToken);
            let name = self.parse_binding_name();
            let initializer = self.parse_initializer();
            elements.push(Some(BindingElement {
                data: NodeData::new(SyntaxKind::BindingElement, elem_pos, self.node_end()),
                dot_dot_dot_token,
                property_name: None,
                name,
                initializer,
            }));
            if self.optional_token(SyntaxKind::CommaToken).is_none() {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBracketToken);
        BindingPattern {
            data: NodeData::new(SyntaxKind::ArrayBindingPattern, pos, self.node_end()),
            elements: alloc_vec_in(self.arena, elements),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression_and_alloc(&mut self) -> &'a Expression<'a> {
        let expr = self.parse_expression();
        self.alloc_expression(expr)
    }

    fn parse_assignment_expression_and_alloc(&mut self) -> &'a Expression<'a> {
        let expr = self.parse_assignment_expression();
        self.alloc_expression(expr)
    }

    /// Comma expression: `a, b, c` is nested Binary(left, CommaToken, right).
    fn parse_expression(&mut self) -> Expression<'a> {
        let mut expr = self.parse_assignment_expression();
        while self.current_token() == SyntaxKind::CommaToken {
            let pos = expr.data().range.pos;
            let operator_token = Token::new(SyntaxKind::CommaToken, self.token_pos(), self.token_end());
            self.next_token();
            let right = self.parse_assignment_expression();
            expr = Expression::Binary(BinaryExpression {
                data: NodeData::new(SyntaxKind::BinaryExpression, pos, self.node_end()),
                left: self.alloc_expression(expr),
                operator_token,
                right: self.alloc_expression(right),
            });
        }
        expr
    }

    fn parse_assignment_expression(&mut self) -> Expression<'a> {
        if !self.enter_nesting() {
            self.exit_nesting();
            return Expression::Identifier(self.create_missing_identifier());
        }
        let expr = self.parse_assignment_expression_worker();
        self.exit_nesting();
        expr
    }

    fn parse_assignment_expression_worker(&mut self) -> Expression<'a> {
        if let Some(arrow) = self.try_parse_arrow_function() {
            return arrow;
        }

        let expr = self.parse_conditional_expression();

        if self.current_token().is_assignment_operator() {
            let pos = expr.data().range.pos;
            let operator_token = Token::new(self.current_token(), self.token_pos(), self.token_end());
            self.next_token();
            let right = self.parse_assignment_expression();
            return Expression::Binary(BinaryExpression {
                data: NodeData::new(SyntaxKind::BinaryExpression, pos, self.node_end()),
                left: self.alloc_expression(expr),
                operator_token,
                right: self.alloc_expression(right),
            });
        }

        expr
    }

    fn parse_conditional_expression(&mut self) -> Expression<'a> {
        let expr = self.parse_binary_expression(None);

        if self.current_token() != SyntaxKind::QuestionToken {
            return expr;
        }
        let pos = expr.data().range.pos;
        self.next_token();
        let when_true = self.with_context(NodeFlags::DISALLOW_IN_CONTEXT, false, |p| {
            p.parse_assignment_expression_and_alloc()
        });
        self.expect_token(SyntaxKind::ColonToken);
        let when_false = self.parse_assignment_expression_and_alloc();
        Expression::Conditional(ConditionalExpression {
            data: NodeData::new(SyntaxKind::ConditionalExpression, pos, self.node_end()),
            condition: self.alloc_expression(expr),
            when_true,
            when_false,
        })
    }

    fn binary_operator_precedence(&self) -> Option<Precedence> {
        let kind = self.current_token();
        if kind == SyntaxKind::InKeyword && self.context_flags.contains(NodeFlags::DISALLOW_IN_CONTEXT) {
            return None;
        }
        Precedence::of_binary(kind)
    }

    /// Operators binding tighter than `floor` are folded into the result;
    /// `None` accepts every binary operator.
    fn parse_binary_expression(&mut self, floor: Option<Precedence>) -> Expression<'a> {
        let mut left = self.parse_unary_expression();

        loop {
            let precedence = match self.binary_operator_precedence() {
                Some(level) if Some(level) > floor => level,
                _ => break,
            };

            let pos = left.data().range.pos;
            let operator_token = Token::new(self.current_token(), self.token_pos(), self.token_end());
            self.next_token();
            // `**` is right-associative.
            let right_floor = if operator_token.kind() == SyntaxKind::AsteriskAsteriskToken {
                Precedence::Multiplicative
            } else {
                precedence
            };
            let right = self.parse_binary_expression(Some(right_floor));
            left = Expression::Binary(BinaryExpression {
                data: NodeData::new(SyntaxKind::BinaryExpression, pos, self.node_end()),
                left: self.alloc_expression(left),
                operator_token,
                right: self.alloc_expression(right),
            });
        }

        left
    }

    fn parse_unary_expression(&mut self) -> Expression<'a> {
        if !is_prefix_unary_operator(self.current_token()) {
            return self.parse_postfix_expression();
        }
        if !self.enter_nesting() {
            self.exit_nesting();
            return Expression::Identifier(self.create_missing_identifier());
        }
        let pos = self.token_pos();
        let operator = self.current_token();
        self.next_token();
        let operand = self.parse_unary_expression();
        self.exit_nesting();
        Expression::PrefixUnary(PrefixUnaryExpression {
            data: NodeData::new(SyntaxKind::PrefixUnaryExpression, pos, self.node_end()),
            operator,
            operand: self.alloc_expression(operand),
        })
    }

    fn parse_postfix_expression(&mut self) -> Expression<'a> {
        let expr = self.parse_left_hand_side_expression();
        match self.current_token() {
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
                if !self.scanner.has_preceding_line_break() =>
            {
                let pos = expr.data().range.pos;
                let operator = self.current_token();
                self.next_token();
                Expression::PostfixUnary(PostfixUnaryExpression {
                    data: NodeData::new(SyntaxKind::PostfixUnaryExpression, pos, self.node_end()),
                    operand: self.alloc_expression(expr),
                    operator,
                })
            }
            _ => expr,
        }
    }

    fn parse_left_hand_side_expression(&mut self) -> Expression<'a> {
        let expr = if self.current_token() == SyntaxKind::NewKeyword {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        self.parse_call_and_member_rest(expr, true)
    }

    /// Member accesses, calls and tagged templates following `expr`. Calls
    /// are only taken when `allow_calls` (the callee of `new` stops at them).
    fn parse_call_and_member_rest(&mut self, mut expr: Expression<'a>, allow_calls: bool) -> Expression<'a> {
        loop {
            let pos = expr.data().range.pos;
            match self.current_token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let name = self.parse_identifier_name();
                    expr = Expression::PropertyAccess(PropertyAccessExpression {
                        data: NodeData::new(SyntaxKind::PropertyAccessExpression, pos, self.node_end()),
                        expression: self.alloc_expression(expr),
                        name,
                    });
                }
                SyntaxKind::QuestionDotToken if allow_calls => {
                    self.next_token();
                    expr = match self.current_token() {
                        SyntaxKind::OpenParenToken => {
                            let arguments = self.parse_argument_list();
                            Expression::Call(CallExpression {
                                data: NodeData::new(SyntaxKind::CallExpression, pos, self.node_end())
                                    .with_flags(NodeFlags::OPTIONAL_CHAIN),
                                expression: self.alloc_expression(expr),
                                arguments,
                            })
                        }
                        SyntaxKind::OpenBracketToken => {
                            self.next_token();
                            let argument_expression = self.parse_expression_and_alloc();
                            self.expect_token(SyntaxKind::CloseBracketToken);
                            Expression::ElementAccess(ElementAccessExpression {
                                data: NodeData::new(SyntaxKind::ElementAccessExpression, pos, self.node_end())
                                    .with_flags(NodeFlags::OPTIONAL_CHAIN),
                                expression: self.alloc_expression(expr),
                                argument_expression,
                            })
                        }
                        _ => {
                            let name = self.parse_identifier_name();
                            Expression::PropertyAccess(PropertyAccessExpression {
                                data: NodeData::new(SyntaxKind::PropertyAccessExpression, pos, self.node_end())
                                    .with_flags(NodeFlags::OPTIONAL_CHAIN),
                                expression: self.alloc_expression(expr),
                                name,
                            })
                        }
                    };
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let argument_expression = self.with_context(NodeFlags::DISALLOW_IN_CONTEXT, false, |p| {
                        p.parse_expression_and_alloc()
                    });
                    self.expect_token(SyntaxKind::CloseBracketToken);
                    expr = Expression::ElementAccess(ElementAccessExpression {
                        data: NodeData::new(SyntaxKind::ElementAccessExpression, pos, self.node_end()),
                        expression: self.alloc_expression(expr),
                        argument_expression,
                    });
                }
                SyntaxKind::OpenParenToken if allow_calls => {
                    let arguments = self.parse_argument_list();
                    expr = Expression::Call(CallExpression {
                        data: NodeData::new(SyntaxKind::CallExpression, pos, self.node_end()),
                        expression: self.alloc_expression(expr),
                        arguments,
                    });
                }
                SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                    let template = self.parse_template_literal();
                    expr = Expression::TaggedTemplate(TaggedTemplateExpression {
                        data: NodeData::new(SyntaxKind::TaggedTemplateExpression, pos, self.node_end()),
                        tag: self.alloc_expression(expr),
                        template: self.alloc_expression(template),
                    });
                }
                _ => return expr,
            }
        }
    }

    fn parse_new_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::NewKeyword);
        if !self.enter_nesting() {
            self.exit_nesting();
            return Expression::Identifier(self.create_missing_identifier());
        }
        let callee = if self.current_token() == SyntaxKind::NewKeyword {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        let callee = self.parse_call_and_member_rest(callee, false);
        self.exit_nesting();
        let arguments = if self.current_token() == SyntaxKind::OpenParenToken {
            Some(self.parse_argument_list())
        } else {
            None
        };
        Expression::New(NewExpression {
            data: NodeData::new(SyntaxKind::NewExpression, pos, self.node_end()),
            expression: self.alloc_expression(callee),
            arguments,
        })
    }

    fn parse_argument_list(&mut self) -> &'a [Expression<'a>] {
        self.expect_token(SyntaxKind::OpenParenToken);
        let mut arguments = Vec::new();
        while self.current_token() != SyntaxKind::CloseParenToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            if self.current_token() != SyntaxKind::DotDotDotToken && !can_start_expression(self.current_token()) {
                self.error(&messages::ARGUMENT_EXPRESSION_EXPECTED, &[]);
                break;
            }
            arguments.push(self.parse_spread_or_assignment_expression());
            if self.optional_token(SyntaxKind::CommaToken).is_none() {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);
        alloc_vec_in(self.arena, arguments)
    }

    fn parse_spread_or_assignment_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        if self.optional_token(SyntaxKind::DotDotDotToken).is_some() {
            let expression = self.parse_assignment_expression_and_alloc();
            return Expression::Spread(SpreadElement {
                data: NodeData::new(SyntaxKind::SpreadElement, pos, self.node_end()),
                expression,
            });
        }
        self.with_context(NodeFlags::DISALLOW_IN_CONTEXT, false, |p| p.parse_assignment_expression())
    }

    fn parse_primary_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::Identifier if self.is_async_function() => {
                self.next_token();
                let mut expr = self.parse_function_expression(NodeFlags::ASYNC);
                if let Expression::FunctionExpression(ref mut func) = expr {
                    func.data.range.pos = pos;
                }
                expr
            }
            SyntaxKind::Identifier => Expression::Identifier(self.parse_identifier()),
            SyntaxKind::NumericLiteral => Expression::NumericLiteral(self.parse_numeric_literal()),
            SyntaxKind::StringLiteral => Expression::StringLiteral(self.parse_literal_like(SyntaxKind::StringLiteral)),
            SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => self.parse_template_literal(),
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.scanner.rescan_slash_token();
                Expression::RegularExpressionLiteral(self.parse_literal_like(SyntaxKind::RegularExpressionLiteral))
            }
            SyntaxKind::OpenParenToken => self.parse_parenthesized_expression(),
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::FunctionKeyword => self.parse_function_expression(NodeFlags::NONE),
            SyntaxKind::ClassKeyword => Expression::ClassExpression(self.parse_class(SyntaxKind::ClassExpression)),
            SyntaxKind::ThisKeyword => self.parse_keyword_expression(Expression::ThisKeyword),
            SyntaxKind::SuperKeyword => self.parse_keyword_expression(Expression::SuperKeyword),
            SyntaxKind::NullKeyword => self.parse_keyword_expression(Expression::NullKeyword),
            SyntaxKind::TrueKeyword => self.parse_keyword_expression(Expression::TrueKeyword),
            SyntaxKind::FalseKeyword => self.parse_keyword_expression(Expression::FalseKeyword),
            _ => {
                self.error(&messages::EXPRESSION_EXPECTED, &[]);
                // Consume the offending token so expression lists make progress.
                if !is_statement_recovery_point(self.current_token())
                    && !matches!(
                        self.current_token(),
                        SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken | SyntaxKind::SemicolonToken
                    )
                {
                    self.next_token();
                }
                Expression::Identifier(Identifier {
                    data: NodeData::new(SyntaxKind::Identifier, pos, pos).with_flags(NodeFlags::THIS_NODE_HAS_ERROR),
                    text: "",
                })
            }
        }
    }

    fn parse_keyword_expression(&mut self, make: fn(NodeData) -> Expression<'a>) -> Expression<'a> {
        let pos = self.token_pos();
        let kind = self.current_token();
        self.next_token();
        make(NodeData::new(kind, pos, self.node_end()))
    }

    fn parse_numeric_literal(&mut self) -> NumericLiteral<'a> {
        let pos = self.token_pos();
        let value = self.scanner.token_number();
        let raw = self.scanner.token_text();
        self.next_token();
        NumericLiteral {
            data: NodeData::new(SyntaxKind::NumericLiteral, pos, self.node_end()),
            value,
            raw,
        }
    }

    /// A string, template piece or regex token as a literal node.
    fn parse_literal_like(&mut self, kind: SyntaxKind) -> LiteralLike<'a> {
        let pos = self.token_pos();
        let text = self.alloc_str(self.token_value());
        let raw = self.scanner.token_text();
        self.next_token();
        LiteralLike {
            data: NodeData::new(kind, pos, self.node_end()),
            text,
            raw,
        }
    }

    fn parse_parenthesized_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenParenToken);
        let expression = self.with_context(NodeFlags::DISALLOW_IN_CONTEXT, false, |p| {
            p.parse_expression_and_alloc()
        });
        self.expect_token(SyntaxKind::CloseParenToken);
        Expression::Parenthesized(ParenthesizedExpression {
            data: NodeData::new(SyntaxKind::ParenthesizedExpression, pos, self.node_end()),
            expression,
        })
    }

    fn parse_template_literal(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        if self.current_token() == SyntaxKind::NoSubstitutionTemplateLiteral {
            return Expression::NoSubstitutionTemplateLiteral(
                self.parse_literal_like(SyntaxKind::NoSubstitutionTemplateLiteral),
            );
        }

        let head = self.parse_literal_like(SyntaxKind::TemplateHead);
        let mut template_spans = Vec::new();
        loop {
            let span_pos = self.token_pos();
            let expression = self.parse_expression_and_alloc();
            let literal = if self.current_token() == SyntaxKind::CloseBraceToken {
                let kind = self.scanner.rescan_template_token();
                self.parse_literal_like(kind)
            } else {
                self.error(&messages::_0_EXPECTED, &["}"]);
                let at = self.token_pos();
                LiteralLike {
                    data: NodeData::new(SyntaxKind::TemplateTail, at, at).with_flags(NodeFlags::THIS_NODE_HAS_ERROR),
                    text: "",
                    raw: "",
                }
            };
            let is_tail = literal.data.kind == SyntaxKind::TemplateTail;
            template_spans.push(TemplateSpan {
                data: NodeData::new(SyntaxKind::TemplateSpan, span_pos, self.node_end()),
                expression,
                literal,
            });
            if is_tail {
                break;
            }
        }
        Expression::TemplateExpression(TemplateExpression {
            data: NodeData::new(SyntaxKind::TemplateExpression, pos, self.node_end()),
            head,
            template_spans: alloc_vec_in(self.arena, template_spans),
        })
    }

    fn parse_array_literal(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBracketToken);
        let mut elements = Vec::new();
        while self.current_token() != SyntaxKind::CloseBracketToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            if self.current_token() == SyntaxKind::CommaToken {
                let at = self.token_pos();
                self.next_token();
                elements.push(Expression::OmittedExpression(NodeData::new(SyntaxKind::OmittedExpression, at, at)));
                continue;
            }
            elements.push(self.parse_spread_or_assignment_expression());
            if self.optional_token(SyntaxKind::CommaToken).is_none() {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBracketToken);
        Expression::ArrayLiteral(ArrayLiteralExpression {
            data: NodeData::new(SyntaxKind::ArrayLiteralExpression, pos, self.node_end()),
            elements: alloc_vec_in(self.arena, elements),
        })
    }

    fn parse_object_literal(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut properties = Vec::new();
        while self.current_token() != SyntaxKind::CloseBraceToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            let saved_pos = self.token_pos();
            properties.push(self.parse_object_literal_element());
            if self.optional_token(SyntaxKind::CommaToken).is_none() || self.token_pos() == saved_pos {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        Expression::ObjectLiteral(ObjectLiteralExpression {
            data: NodeData::new(SyntaxKind::ObjectLiteralExpression, pos, self.node_end()),
            properties: alloc_vec_in(self.arena, properties),
        })
    }

    fn parse_object_literal_element(&mut self) -> ObjectLiteralElement<'a> {
        let pos = self.token_pos();
        if self.optional_token(SyntaxKind::DotDotDotToken).is_some() {
            let expression = self.parse_assignment_expression_and_alloc();
            return ObjectLiteralElement::SpreadAssignment(SpreadElement {
                data: NodeData::new(SyntaxKind::SpreadAssignment, pos, self.node_end()),
                expression,
            });
        }

        if !is_property_name_start(self.current_token()) {
            self.error(&messages::PROPERTY_ASSIGNMENT_EXPECTED, &[]);
        }

        let (kind, flags) = self.parse_method_prefix();
        let name = self.parse_property_name();

        if kind != SyntaxKind::MethodDeclaration
            || !flags.is_empty()
            || self.current_token() == SyntaxKind::OpenParenToken
        {
            let parameters = self.parse_parameter_list();
            let body = self.parse_block();
            return ObjectLiteralElement::Method(MethodDeclaration {
                data: NodeData::new(kind, pos, self.node_end()).with_flags(flags),
                name,
                parameters,
                body,
            });
        }

        if self.optional_token(SyntaxKind::ColonToken).is_some() {
            let initializer = self.parse_assignment_expression_and_alloc();
            return ObjectLiteralElement::PropertyAssignment(PropertyAssignment {
                data: NodeData::new(SyntaxKind::PropertyAssignment, pos, self.node_end()),
                name,
                initializer,
            });
        }

        match name {
            PropertyName::Identifier(id) => {
                let object_assignment_initializer = self.parse_initializer();
                ObjectLiteralElement::ShorthandPropertyAssignment(ShorthandPropertyAssignment {
                    data: NodeData::new(SyntaxKind::ShorthandPropertyAssignment, pos, self.node_end()),
                    name: id,
                    object_assignment_initializer,
                })
            }
            other => {
                self.error(&messages::_0_EXPECTED, &[":"]);
                let missing = Expression::Identifier(self.create_missing_identifier());
                ObjectLiteralElement::PropertyAssignment(PropertyAssignment {
                    data: NodeData::new(SyntaxKind::PropertyAssignment, pos, self.node_end()),
                    name: other,
                    initializer: self.alloc_expression(missing),
                })
            }
        }
    }

    // ========================================================================
    // Arrow functions
    // ========================================================================

    fn try_parse_arrow_function(&mut self) -> Option<Expression<'a>> {
        let pos = self.token_pos();
        let mut flags = NodeFlags::NONE;

        if self.is_identifier_text("async") && !self.next_token_is_on_same_line(SyntaxKind::EqualsGreaterThanToken) {
            let async_arrow = self.look_ahead(|s| {
                let next = s.scan();
                if s.has_preceding_line_break() {
                    return false;
                }
                match next {
                    SyntaxKind::Identifier => {
                        s.scan() == SyntaxKind::EqualsGreaterThanToken && !s.has_preceding_line_break()
                    }
                    SyntaxKind::OpenParenToken => scan_to_arrow_after_parens(s),
                    _ => false,
                }
            });
            if !async_arrow {
                return None;
            }
            self.next_token();
            flags |= NodeFlags::ASYNC;
        }

        let parameters = match self.current_token() {
            SyntaxKind::Identifier if self.next_token_is_on_same_line(SyntaxKind::EqualsGreaterThanToken) => {
                let param_pos = self.token_pos();
                let name = self.parse_identifier();
                alloc_vec_in(
                    self.arena,
                    vec![ParameterDeclaration {
                        data: NodeData::new(SyntaxKind::Parameter, param_pos, self.node_end()),
                        dot_dot_dot_token: None,
                        name: BindingName::Identifier(name),
                        initializer: None,
                    }],
                )
            }
            SyntaxKind::OpenParenToken if self.look_ahead(scan_to_arrow_after_parens) => {
                self.parse_parameter_list()
            }
            _ => return None,
        };

        self.expect_token(SyntaxKind::EqualsGreaterThanToken);
        let body = if self.current_token() == SyntaxKind::OpenBraceToken {
            ConciseBody::Block(self.parse_block())
        } else {
            ConciseBody::Expression(self.parse_assignment_expression_and_alloc())
        };
        Some(Expression::ArrowFunction(ArrowFunction {
            data: NodeData::new(SyntaxKind::ArrowFunction, pos, self.node_end()).with_flags(flags),
            parameters,
            body,
        }))
    }
}

/// With the scanner on `(`, skip to the matching `)` and report whether `=>`
/// follows on the same line.
fn scan_to_arrow_after_parens(scanner: &mut Scanner<'_>) -> bool {
    let mut depth = 0u32;
    loop {
        match scanner.token() {
            SyntaxKind::OpenParenToken
            | SyntaxKind::OpenBracketToken
            | SyntaxKind::OpenBraceToken
            | SyntaxKind::TemplateHead => depth += 1,
            SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken | SyntaxKind::CloseBraceToken => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return scanner.scan() == SyntaxKind::EqualsGreaterThanToken
                        && !scanner.has_preceding_line_break();
                }
            }
            SyntaxKind::EndOfFileToken => return false,
            _ => {}
        }
        scanner.scan();
    }
}
