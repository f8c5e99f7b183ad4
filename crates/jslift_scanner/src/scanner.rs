//! The JavaScript scanner/lexer.
//!
//! Converts source text into a stream of tokens that the parser pulls one at a
//! time. Positions are byte offsets into the source text. Regular expression
//! literals and template continuations depend on parser context and are
//! produced through the `rescan_*` methods.

use crate::char_codes::*;
use jslift_ast::syntax_kind::SyntaxKind;
use jslift_ast::types::TokenFlags;
use jslift_core::text::TextSpan;
use jslift_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// Saved scanner state for lookahead.
#[derive(Debug, Clone)]
pub struct ScannerState {
    pub pos: usize,
    pub token_start: usize,
    pub token: SyntaxKind,
    pub token_value: String,
    pub token_number: f64,
    pub token_flags: TokenFlags,
    diagnostic_count: usize,
}

/// The scanner converts JavaScript source text into tokens.
pub struct Scanner<'a> {
    /// The source text being scanned.
    text: &'a str,
    /// Current byte position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    /// The current token kind.
    token: SyntaxKind,
    /// The cooked value of the current token (identifier name, string contents).
    token_value: String,
    /// The numeric value of the current token, when it is a numeric literal.
    token_number: f64,
    /// Token flags for the current token.
    token_flags: TokenFlags,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source text.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            token_number: 0.0,
            token_flags: TokenFlags::NONE,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Skip a shebang line at the very beginning of the file (e.g., `#!/usr/bin/env node`).
    /// Call this before the first `scan()` call.
    pub fn skip_shebang(&mut self) {
        if self.pos == 0 && self.text.starts_with("#!") {
            self.pos = 2;
            self.skip_line_comment();
        }
    }

    /// The full source text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Look ahead: save state, call f, restore state and return the result.
    /// Diagnostics reported while looking ahead are discarded.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    /// Get the current token kind.
    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Get the current token's cooked value.
    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// The value of the current numeric literal token.
    #[inline]
    pub fn token_number(&self) -> f64 {
        self.token_number
    }

    /// The current token exactly as written in the source.
    #[inline]
    pub fn token_text(&self) -> &'a str {
        &self.text[self.token_start..self.pos]
    }

    /// Get the start position of the current token (after trivia).
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Get the current position (end of current token).
    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn token_span(&self) -> TextSpan {
        TextSpan::from_bounds(self.token_start as u32, self.pos as u32)
    }

    /// Get the current token flags.
    #[inline]
    pub fn token_flags(&self) -> TokenFlags {
        self.token_flags
    }

    /// Whether the current token was preceded by a line break.
    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    /// Get the accumulated diagnostics.
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Save the full scanner state for lookahead.
    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
            token_number: self.token_number,
            token_flags: self.token_flags,
            diagnostic_count: self.diagnostics.len(),
        }
    }

    /// Restore the full scanner state from a saved state.
    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
        self.token_number = state.token_number;
        self.token_flags = state.token_flags;
        self.diagnostics.truncate(state.diagnostic_count);
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Look at the byte at position pos + offset.
    #[inline]
    fn peek(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + offset).copied()
    }

    fn error_at(&mut self, start: usize, end: usize, message: &DiagnosticMessage, args: &[&str]) {
        let span = TextSpan::from_bounds(start as u32, end.max(start) as u32);
        self.diagnostics.add(Diagnostic::at(span, message, args));
    }

    fn error(&mut self, message: &DiagnosticMessage) {
        self.error_at(self.token_start, self.pos, message, &[]);
    }

    /// Skip whitespace and comments (trivia), setting token_flags for line breaks.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.current_char() {
            match ch {
                '\r' | '\n' | LINE_SEPARATOR | PARAGRAPH_SEPARATOR => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += ch.len_utf8();
                }
                '/' if self.peek(1) == Some(b'/') => {
                    self.pos += 2;
                    self.skip_line_comment();
                }
                '/' if self.peek(1) == Some(b'*') => self.skip_block_comment(),
                c if is_white_space_single_line(c) => self.pos += c.len_utf8(),
                _ => return,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        let rest = &self.text.as_bytes()[self.pos..];
        self.pos += memchr::memchr2(b'\n', b'\r', rest).unwrap_or(rest.len());
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let rest = &self.text[self.pos..];
        let (body, terminated) = match memchr::memmem::find(rest.as_bytes(), b"*/") {
            Some(offset) => (&rest[..offset], true),
            None => (rest, false),
        };
        if body.chars().any(is_line_break) {
            self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
        }
        if terminated {
            self.pos += body.len() + 2;
        } else {
            self.pos = self.text.len();
            self.error_at(start, self.pos, &messages::ASTERISK_SLASH_EXPECTED, &[]);
        }
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_flags = TokenFlags::NONE;
        self.token_value.clear();
        self.token_number = 0.0;

        self.skip_trivia();
        self.token_start = self.pos;

        let Some(ch) = self.current_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            '(' => self.single(SyntaxKind::OpenParenToken),
            ')' => self.single(SyntaxKind::CloseParenToken),
            '{' => self.single(SyntaxKind::OpenBraceToken),
            '}' => self.single(SyntaxKind::CloseBraceToken),
            '[' => self.single(SyntaxKind::OpenBracketToken),
            ']' => self.single(SyntaxKind::CloseBracketToken),
            ';' => self.single(SyntaxKind::SemicolonToken),
            ',' => self.single(SyntaxKind::CommaToken),
            '~' => self.single(SyntaxKind::TildeToken),
            ':' => self.single(SyntaxKind::ColonToken),

            '.' => self.scan_dot(),
            '?' => self.scan_question(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '=' => self.scan_equals(),
            '!' => self.scan_exclamation(),
            '+' => self.scan_doubled_or_equals(
                b'+',
                SyntaxKind::PlusToken,
                SyntaxKind::PlusPlusToken,
                SyntaxKind::PlusEqualsToken,
            ),
            '-' => self.scan_doubled_or_equals(
                b'-',
                SyntaxKind::MinusToken,
                SyntaxKind::MinusMinusToken,
                SyntaxKind::MinusEqualsToken,
            ),
            '*' => self.scan_asterisk(),
            '/' => self.scan_with_equals(SyntaxKind::SlashToken, SyntaxKind::SlashEqualsToken),
            '%' => self.scan_with_equals(SyntaxKind::PercentToken, SyntaxKind::PercentEqualsToken),
            '^' => self.scan_with_equals(SyntaxKind::CaretToken, SyntaxKind::CaretEqualsToken),
            '&' => self.scan_logical(
                b'&',
                SyntaxKind::AmpersandToken,
                SyntaxKind::AmpersandEqualsToken,
                SyntaxKind::AmpersandAmpersandToken,
                SyntaxKind::AmpersandAmpersandEqualsToken,
            ),
            '|' => self.scan_logical(
                b'|',
                SyntaxKind::BarToken,
                SyntaxKind::BarEqualsToken,
                SyntaxKind::BarBarToken,
                SyntaxKind::BarBarEqualsToken,
            ),

            '\'' | '"' => self.scan_string_literal(ch),
            '`' => {
                self.pos += 1;
                self.scan_template_piece(true)
            }

            '0'..='9' => self.scan_number(),

            '\\' if self.peek(1) == Some(b'u') => self.scan_identifier(),
            _ if is_identifier_start(ch) => self.scan_identifier(),

            _ => {
                self.pos += ch.len_utf8();
                self.error(&messages::INVALID_CHARACTER);
                SyntaxKind::Unknown
            }
        };

        self.token
    }

    // ========================================================================
    // Token-specific scanning methods
    // ========================================================================

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    fn scan_with_equals(&mut self, plain: SyntaxKind, with_equals: SyntaxKind) -> SyntaxKind {
        if self.peek(1) == Some(b'=') {
            self.pos += 2;
            with_equals
        } else {
            self.pos += 1;
            plain
        }
    }

    /// `+`, `++`, `+=` and the `-` family.
    fn scan_doubled_or_equals(
        &mut self,
        ch: u8,
        plain: SyntaxKind,
        doubled: SyntaxKind,
        with_equals: SyntaxKind,
    ) -> SyntaxKind {
        if self.peek(1) == Some(ch) {
            self.pos += 2;
            doubled
        } else {
            self.scan_with_equals(plain, with_equals)
        }
    }

    /// `&`, `&=`, `&&`, `&&=` and the `|` family.
    fn scan_logical(
        &mut self,
        ch: u8,
        plain: SyntaxKind,
        with_equals: SyntaxKind,
        doubled: SyntaxKind,
        doubled_equals: SyntaxKind,
    ) -> SyntaxKind {
        if self.peek(1) == Some(ch) {
            if self.peek(2) == Some(b'=') {
                self.pos += 3;
                doubled_equals
            } else {
                self.pos += 2;
                doubled
            }
        } else {
            self.scan_with_equals(plain, with_equals)
        }
    }

    fn scan_dot(&mut self) -> SyntaxKind {
        if self.peek(1) == Some(b'.') && self.peek(2) == Some(b'.') {
            self.pos += 3;
            SyntaxKind::DotDotDotToken
        } else if self.peek(1).is_some_and(|b| b.is_ascii_digit()) {
            self.scan_number()
        } else {
            self.pos += 1;
            SyntaxKind::DotToken
        }
    }

    fn scan_question(&mut self) -> SyntaxKind {
        if self.peek(1) == Some(b'?') {
            if self.peek(2) == Some(b'=') {
                self.pos += 3;
                SyntaxKind::QuestionQuestionEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::QuestionQuestionToken
            }
        } else if self.peek(1) == Some(b'.') && !self.peek(2).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 2;
            SyntaxKind::QuestionDotToken
        } else {
            self.pos += 1;
            SyntaxKind::QuestionToken
        }
    }

    fn scan_less_than(&mut self) -> SyntaxKind {
        if self.peek(1) == Some(b'<') {
            if self.peek(2) == Some(b'=') {
                self.pos += 3;
                SyntaxKind::LessThanLessThanEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::LessThanLessThanToken
            }
        } else {
            self.scan_with_equals(SyntaxKind::LessThanToken, SyntaxKind::LessThanEqualsToken)
        }
    }

    fn scan_greater_than(&mut self) -> SyntaxKind {
        match (self.peek(1), self.peek(2), self.peek(3)) {
            (Some(b'>'), Some(b'>'), Some(b'=')) => {
                self.pos += 4;
                SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken
            }
            (Some(b'>'), Some(b'>'), _) => {
                self.pos += 3;
                SyntaxKind::GreaterThanGreaterThanGreaterThanToken
            }
            (Some(b'>'), Some(b'='), _) => {
                self.pos += 3;
                SyntaxKind::GreaterThanGreaterThanEqualsToken
            }
            (Some(b'>'), _, _) => {
                self.pos += 2;
                SyntaxKind::GreaterThanGreaterThanToken
            }
            _ => self.scan_with_equals(SyntaxKind::GreaterThanToken, SyntaxKind::GreaterThanEqualsToken),
        }
    }

    fn scan_equals(&mut self) -> SyntaxKind {
        if self.peek(1) == Some(b'=') {
            if self.peek(2) == Some(b'=') {
                self.pos += 3;
                SyntaxKind::EqualsEqualsEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::EqualsEqualsToken
            }
        } else if self.peek(1) == Some(b'>') {
            self.pos += 2;
            SyntaxKind::EqualsGreaterThanToken
        } else {
            self.pos += 1;
            SyntaxKind::EqualsToken
        }
    }

    fn scan_exclamation(&mut self) -> SyntaxKind {
        if self.peek(1) == Some(b'=') {
            if self.peek(2) == Some(b'=') {
                self.pos += 3;
                SyntaxKind::ExclamationEqualsEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::ExclamationEqualsToken
            }
        } else {
            self.pos += 1;
            SyntaxKind::ExclamationToken
        }
    }

    fn scan_asterisk(&mut self) -> SyntaxKind {
        if self.peek(1) == Some(b'*') {
            if self.peek(2) == Some(b'=') {
                self.pos += 3;
                SyntaxKind::AsteriskAsteriskEqualsToken
            } else {
                self.pos += 2;
                SyntaxKind::AsteriskAsteriskToken
            }
        } else {
            self.scan_with_equals(SyntaxKind::AsteriskToken, SyntaxKind::AsteriskEqualsToken)
        }
    }

    // ========================================================================
    // Strings and templates
    // ========================================================================

    fn scan_string_literal(&mut self, quote: char) -> SyntaxKind {
        self.pos += 1; // skip opening quote
        let mut result = String::new();
        loop {
            let Some(ch) = self.current_char() else {
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(&messages::UNTERMINATED_STRING_LITERAL);
                break;
            };
            if ch == quote {
                self.pos += 1;
                break;
            }
            if ch == '\\' {
                self.scan_escape_sequence(&mut result);
                continue;
            }
            if ch == '\n' || ch == '\r' {
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(&messages::UNTERMINATED_STRING_LITERAL);
                break;
            }
            result.push(ch);
            self.pos += ch.len_utf8();
        }
        self.token_value = result;
        SyntaxKind::StringLiteral
    }

    /// Scan one template piece. `from_backtick` is true for the first piece of
    /// a template; otherwise the piece continues after a `}`.
    fn scan_template_piece(&mut self, from_backtick: bool) -> SyntaxKind {
        let mut result = String::new();
        let (closed, open) = if from_backtick {
            (SyntaxKind::NoSubstitutionTemplateLiteral, SyntaxKind::TemplateHead)
        } else {
            (SyntaxKind::TemplateTail, SyntaxKind::TemplateMiddle)
        };
        let kind = loop {
            let Some(ch) = self.current_char() else {
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(&messages::UNTERMINATED_TEMPLATE_LITERAL);
                break closed;
            };
            match ch {
                '`' => {
                    self.pos += 1;
                    break closed;
                }
                '$' if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    break open;
                }
                '\\' => self.scan_escape_sequence(&mut result),
                '\r' => {
                    // CRLF and lone CR are both cooked to LF.
                    self.pos += 1;
                    if self.peek(0) == Some(b'\n') {
                        self.pos += 1;
                    }
                    result.push('\n');
                }
                _ => {
                    result.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        };
        self.token_value = result;
        kind
    }

    /// Scan a template middle or tail. Called by the parser when the current
    /// token is the `}` closing a template substitution.
    pub fn rescan_template_token(&mut self) -> SyntaxKind {
        self.pos = self.token_start + 1;
        self.token_value.clear();
        self.token = self.scan_template_piece(false);
        self.token
    }

    /// Rescan the current `/` or `/=` token as a regex literal (called by the parser).
    pub fn rescan_slash_token(&mut self) -> SyntaxKind {
        self.pos = self.token_start + 1; // after the /
        let mut in_character_class = false;

        loop {
            let Some(ch) = self.current_char() else {
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(&messages::UNTERMINATED_REGULAR_EXPRESSION_LITERAL);
                break;
            };
            if is_line_break(ch) {
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(&messages::UNTERMINATED_REGULAR_EXPRESSION_LITERAL);
                break;
            }
            self.pos += ch.len_utf8();
            match ch {
                '\\' => {
                    if let Some(next) = self.current_char().filter(|c| !is_line_break(*c)) {
                        self.pos += next.len_utf8();
                    }
                }
                '[' => in_character_class = true,
                ']' => in_character_class = false,
                '/' if !in_character_class => {
                    // Flags
                    while let Some(flag) = self.current_char().filter(|c| is_identifier_part(*c)) {
                        self.pos += flag.len_utf8();
                    }
                    break;
                }
                _ => {}
            }
        }

        self.token_value = self.token_text().to_string();
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    /// Cook one escape sequence starting at the backslash into `out`.
    fn scan_escape_sequence(&mut self, out: &mut String) {
        let start = self.pos;
        self.pos += 1; // backslash
        let Some(ch) = self.current_char() else {
            // The enclosing literal reports the missing terminator.
            return;
        };
        self.pos += ch.len_utf8();
        match ch {
            '0' if !self.peek(0).is_some_and(|b| b.is_ascii_digit()) => out.push('\0'),
            'b' => out.push('\u{0008}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'v' => out.push('\u{000B}'),
            'f' => out.push('\u{000C}'),
            'r' => out.push('\r'),
            'x' => match self.scan_exact_hex_digits(2).and_then(char::from_u32) {
                Some(c) => out.push(c),
                None => {
                    self.token_flags |= TokenFlags::CONTAINS_INVALID_ESCAPE;
                    self.error_at(start, self.pos, &messages::HEXADECIMAL_DIGIT_EXPECTED, &[]);
                }
            },
            'u' => match self.scan_unicode_escape() {
                Some(c) => out.push(c),
                None => {
                    self.token_flags |= TokenFlags::CONTAINS_INVALID_ESCAPE;
                    self.error_at(start, self.pos, &messages::INVALID_ESCAPE_SEQUENCE, &[]);
                }
            },
            '0'..='7' => {
                // Legacy octal escape, at most three digits and 0o377.
                self.token_flags |= TokenFlags::OCTAL;
                let mut value = ch as u32 - '0' as u32;
                for _ in 0..2 {
                    match self.peek(0) {
                        Some(b @ b'0'..=b'7') if value * 8 + u32::from(b - b'0') <= 0o377 => {
                            value = value * 8 + u32::from(b - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            '\r' => {
                // Line continuation
                if self.peek(0) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            '\n' | LINE_SEPARATOR | PARAGRAPH_SEPARATOR => {}
            other => out.push(other),
        }
    }

    /// Scan exactly `count` hex digits, returning their value.
    fn scan_exact_hex_digits(&mut self, count: usize) -> Option<u32> {
        let digits = self.text.get(self.pos..self.pos + count)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        self.pos += count;
        u32::from_str_radix(digits, 16).ok()
    }

    /// Scan the part of a `\u` escape after the `u`.
    fn scan_unicode_escape(&mut self) -> Option<char> {
        if self.peek(0) == Some(b'{') {
            self.pos += 1;
            let digits_start = self.pos;
            while self.current_char().is_some_and(is_hex_digit) {
                self.pos += 1;
            }
            let digits = &self.text[digits_start..self.pos];
            if digits.is_empty() || self.peek(0) != Some(b'}') {
                return None;
            }
            self.pos += 1;
            return u32::from_str_radix(digits, 16).ok().and_then(char::from_u32);
        }

        let value = self.scan_exact_hex_digits(4)?;
        if !(0xD800..=0xDBFF).contains(&value) {
            return Some(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        // A high surrogate combines with an immediately following `\uDC00`-`\uDFFF`.
        let save = self.pos;
        if self.peek(0) == Some(b'\\') && self.peek(1) == Some(b'u') {
            self.pos += 2;
            if let Some(low) = self.scan_exact_hex_digits(4).filter(|v| (0xDC00..=0xDFFF).contains(v)) {
                let combined = 0x10000 + ((value - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(combined);
            }
            self.pos = save;
        }
        Some(char::REPLACEMENT_CHARACTER)
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;

        if self.peek(0) == Some(b'0') {
            match self.peek(1) {
                Some(b'x' | b'X') => return self.scan_radix_number(16, TokenFlags::HEX_SPECIFIER),
                Some(b'b' | b'B') => return self.scan_radix_number(2, TokenFlags::BINARY_SPECIFIER),
                Some(b'o' | b'O') => return self.scan_radix_number(8, TokenFlags::OCTAL_SPECIFIER),
                Some(b'0'..=b'9') => {
                    if let Some(kind) = self.try_scan_legacy_octal() {
                        return kind;
                    }
                }
                _ => {}
            }
        }

        let mut digits = String::new();
        self.scan_digits(&mut digits);

        if self.peek(0) == Some(b'.') {
            self.pos += 1;
            digits.push('.');
            self.scan_digits(&mut digits);
        }

        // Exponent
        if let Some(b'e' | b'E') = self.peek(0) {
            self.pos += 1;
            self.token_flags |= TokenFlags::SCIENTIFIC;
            digits.push('e');
            if let Some(sign @ (b'+' | b'-')) = self.peek(0) {
                self.pos += 1;
                digits.push(sign as char);
            }
            let before = digits.len();
            self.scan_digits(&mut digits);
            if digits.len() == before {
                self.error_at(self.pos, self.pos + 1, &messages::DIGIT_EXPECTED, &[]);
                digits.push('0');
            }
        }

        // `.5` and `5.` are valid JavaScript but not valid Rust float syntax.
        if digits.starts_with('.') {
            digits.insert(0, '0');
        }
        let normalized = digits.replace(".e", ".0e");
        self.token_number = normalized.trim_end_matches('.').parse().unwrap_or(f64::NAN);
        self.token_value = self.text[start..self.pos].to_string();
        self.check_for_identifier_after_number();
        SyntaxKind::NumericLiteral
    }

    /// `0x1F`, `0b101`, `0o17`.
    fn scan_radix_number(&mut self, radix: u32, flag: TokenFlags) -> SyntaxKind {
        let start = self.pos;
        self.pos += 2; // skip 0x / 0b / 0o
        self.token_flags |= flag;
        let mut value = 0f64;
        let mut any = false;
        while let Some(ch) = self.current_char() {
            if ch == '_' {
                self.token_flags |= TokenFlags::CONTAINS_SEPARATOR;
            } else if let Some(digit) = ch.to_digit(radix) {
                value = value * f64::from(radix) + f64::from(digit);
                any = true;
            } else {
                break;
            }
            self.pos += 1;
        }
        if !any {
            let message = if radix == 16 {
                &messages::HEXADECIMAL_DIGIT_EXPECTED
            } else {
                &messages::DIGIT_EXPECTED
            };
            self.error_at(self.pos, self.pos + 1, message, &[]);
        }
        self.token_number = value;
        self.token_value = self.text[start..self.pos].to_string();
        self.check_for_identifier_after_number();
        SyntaxKind::NumericLiteral
    }

    /// `0777` is octal when every digit is an octal digit; `089` is decimal.
    fn try_scan_legacy_octal(&mut self) -> Option<SyntaxKind> {
        let start = self.pos;
        let rest = &self.text.as_bytes()[start + 1..];
        let len = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        let digits = &rest[..len];
        if digits.iter().any(|b| *b > b'7') {
            return None;
        }
        self.pos = start + 1 + len;
        self.token_flags |= TokenFlags::OCTAL;
        self.token_number = digits
            .iter()
            .fold(0f64, |acc, b| acc * 8.0 + f64::from(b - b'0'));
        self.token_value = self.text[start..self.pos].to_string();
        self.check_for_identifier_after_number();
        Some(SyntaxKind::NumericLiteral)
    }

    fn scan_digits(&mut self, out: &mut String) {
        while let Some(b) = self.peek(0) {
            if b == b'_' {
                self.token_flags |= TokenFlags::CONTAINS_SEPARATOR;
            } else if b.is_ascii_digit() {
                out.push(b as char);
            } else {
                break;
            }
            self.pos += 1;
        }
    }

    fn check_for_identifier_after_number(&mut self) {
        if let Some(ch) = self.current_char().filter(|c| is_identifier_start(*c)) {
            let start = self.pos;
            self.pos += ch.len_utf8();
            while let Some(part) = self.current_char().filter(|c| is_identifier_part(*c)) {
                self.pos += part.len_utf8();
            }
            self.error_at(start, self.pos, &messages::IDENTIFIER_CANNOT_FOLLOW_NUMERIC_LITERAL, &[]);
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn scan_identifier(&mut self) -> SyntaxKind {
        let text = self.text;
        let start = self.pos;
        // Only allocated once an escape forces the name to differ from the source.
        let mut cooked: Option<String> = None;

        loop {
            match self.current_char() {
                Some('\\') if self.peek(1) == Some(b'u') => {
                    let escape_start = self.pos;
                    self.pos += 2;
                    self.token_flags |= TokenFlags::UNICODE_ESCAPE;
                    let buf = cooked.get_or_insert_with(|| text[start..escape_start].to_string());
                    match self.scan_unicode_escape() {
                        Some(c) if is_identifier_part(c) => buf.push(c),
                        _ => self.error_at(escape_start, self.pos, &messages::INVALID_CHARACTER, &[]),
                    }
                }
                Some(c) if is_identifier_part(c) => {
                    if let Some(buf) = cooked.as_mut() {
                        buf.push(c);
                    }
                    self.pos += c.len_utf8();
                }
                _ => break,
            }
        }

        match cooked {
            Some(name) => {
                self.token_value = name;
                SyntaxKind::Identifier
            }
            None => {
                let name = &text[start..self.pos];
                self.token_value = name.to_string();
                SyntaxKind::from_keyword(name).unwrap_or(SyntaxKind::Identifier)
            }
        }
    }
}
