//! jslift_diagnostics: Scanner and parser problem reports.
//!
//! Problems are collected into a [`DiagnosticCollection`] rather than
//! returned as errors, so parsing always produces a tree and the caller
//! decides whether it is usable. Every report is built from one of the
//! static templates in [`messages`].

use jslift_core::text::{LineMap, TextSpan};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl DiagnosticCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
        }
    }
}

/// Static message template. `{0}`, `{1}` ... are filled from the
/// arguments given when the diagnostic is reported.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

impl DiagnosticMessage {
    const fn error(code: u32, message: &'static str) -> Self {
        DiagnosticMessage { code, category: DiagnosticCategory::Error, message }
    }

    fn fill(&self, args: &[&str]) -> String {
        args.iter()
            .enumerate()
            .fold(self.message.to_string(), |text, (index, arg)| {
                text.replace(&format!("{{{}}}", index), arg)
            })
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub span: TextSpan,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// A report at `span`. The scanner does not know the file name; the
    /// parser attaches it with [`Diagnostic::in_file`].
    pub fn at(span: TextSpan, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Diagnostic {
            file: None,
            span,
            message_text: message.fill(args),
            code: message.code,
            category: message.category,
        }
    }

    /// Set the file name unless one is already present.
    pub fn in_file(mut self, file: &str) -> Self {
        self.file.get_or_insert_with(|| file.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    /// `file(line,col): error JL1005: ';' expected.`
    pub fn render(&self, line_map: &LineMap) -> String {
        let position = line_map.line_and_column_of(self.span.start);
        self.format_with(&position.to_string())
    }

    fn format_with(&self, position: &str) -> String {
        let body = format!("{} JL{}: {}", self.category.as_str(), self.code, self.message_text);
        match &self.file {
            Some(file) => format!("{}({}): {}", file, position, body),
            None => body,
        }
    }
}

/// Like [`Diagnostic::render`] but with the raw byte offset in place of
/// the line and column.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(&self.span.start.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Forget everything reported after the collection held `len` entries.
    /// Used when the scanner rolls back a look-ahead.
    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    /// Order by file, then by offset. Stable, so reports at the same
    /// offset keep the order they were made in.
    pub fn sort(&mut self) {
        self.diagnostics
            .sort_by(|a, b| (a.file.as_deref(), a.span.start).cmp(&(b.file.as_deref(), b.span.start)));
    }
}

pub mod messages {
    use super::DiagnosticMessage as M;

    // Scanner
    pub const UNTERMINATED_STRING_LITERAL: M = M::error(1002, "Unterminated string literal.");
    pub const ASTERISK_SLASH_EXPECTED: M = M::error(1010, "'*/' expected.");
    pub const DIGIT_EXPECTED: M = M::error(1124, "Digit expected.");
    pub const HEXADECIMAL_DIGIT_EXPECTED: M = M::error(1125, "Hexadecimal digit expected.");
    pub const INVALID_CHARACTER: M = M::error(1127, "Invalid character.");
    pub const UNTERMINATED_TEMPLATE_LITERAL: M = M::error(1160, "Unterminated template literal.");
    pub const UNTERMINATED_REGULAR_EXPRESSION_LITERAL: M =
        M::error(1161, "Unterminated regular expression literal.");
    pub const INVALID_ESCAPE_SEQUENCE: M = M::error(1198, "Invalid escape sequence.");
    pub const IDENTIFIER_CANNOT_FOLLOW_NUMERIC_LITERAL: M =
        M::error(1351, "An identifier or keyword cannot immediately follow a numeric literal.");

    // Parser
    pub const IDENTIFIER_EXPECTED: M = M::error(1003, "Identifier expected.");
    pub const FUNCTION_NAME_EXPECTED: M = M::error(1003, "Function name expected.");
    pub const _0_EXPECTED: M = M::error(1005, "'{0}' expected.");
    pub const UNEXPECTED_TOKEN: M = M::error(1012, "Unexpected token.");
    pub const EXPRESSION_EXPECTED: M = M::error(1109, "Expression expected.");
    pub const DECLARATION_OR_STATEMENT_EXPECTED: M = M::error(1128, "Declaration or statement expected.");
    pub const VARIABLE_DECLARATION_EXPECTED: M = M::error(1134, "Variable declaration expected.");
    pub const ARGUMENT_EXPRESSION_EXPECTED: M = M::error(1135, "Argument expression expected.");
    pub const PROPERTY_ASSIGNMENT_EXPECTED: M = M::error(1136, "Property assignment expected.");
    pub const TRY_MUST_HAVE_CATCH_OR_FINALLY: M = M::error(1472, "'catch' or 'finally' expected.");
    pub const MAXIMUM_NESTING_DEPTH_EXCEEDED: M = M::error(1500, "Maximum nesting depth of {0} exceeded.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(file: &str, start: u32, message: &DiagnosticMessage) -> Diagnostic {
        Diagnostic::at(TextSpan::new(start, 1), message, &[]).in_file(file)
    }

    #[test]
    fn test_placeholders_are_filled() {
        let diag = Diagnostic::at(TextSpan::new(0, 1), &messages::_0_EXPECTED, &[")"]);
        assert_eq!(diag.message_text, "')' expected.");
        assert_eq!(diag.to_string(), "error JL1005: ')' expected.");

        let depth = Diagnostic::at(TextSpan::default(), &messages::MAXIMUM_NESTING_DEPTH_EXCEEDED, &["64"]);
        assert_eq!(depth.message_text, "Maximum nesting depth of 64 exceeded.");
    }

    #[test]
    fn test_display_uses_offset() {
        let diag = report("main.js", 4, &messages::UNEXPECTED_TOKEN);
        assert_eq!(diag.to_string(), "main.js(4): error JL1012: Unexpected token.");
    }

    #[test]
    fn test_render_uses_line_and_column() {
        let map = LineMap::new("var a = 1;\nvar = 2;");
        let diag = report("main.js", 15, &messages::IDENTIFIER_EXPECTED);
        assert_eq!(diag.render(&map), "main.js(2,5): error JL1003: Identifier expected.");
    }

    #[test]
    fn test_in_file_does_not_overwrite() {
        let diag = report("a.js", 0, &messages::UNEXPECTED_TOKEN).in_file("b.js");
        assert_eq!(diag.file.as_deref(), Some("a.js"));
    }

    #[test]
    fn test_collection_truncate_and_extend() {
        let mut collection = DiagnosticCollection::new();
        assert!(!collection.has_errors());

        collection.add(report("a.js", 1, &messages::UNEXPECTED_TOKEN));
        let mark = collection.len();
        collection.add(report("a.js", 2, &messages::EXPRESSION_EXPECTED));
        collection.truncate(mark);
        assert_eq!(collection.len(), 1);

        let mut other = DiagnosticCollection::new();
        other.add(report("a.js", 3, &messages::DIGIT_EXPECTED));
        collection.extend(other);
        let codes: Vec<u32> = collection.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![1012, 1124]);
        assert!(collection.has_errors());
    }

    #[test]
    fn test_sort_by_file_then_offset() {
        let mut collection = DiagnosticCollection::new();
        collection.add(report("b.js", 1, &messages::UNEXPECTED_TOKEN));
        collection.add(report("a.js", 9, &messages::DIGIT_EXPECTED));
        collection.add(report("a.js", 2, &messages::INVALID_CHARACTER));
        collection.sort();

        let order: Vec<(&str, u32)> = collection
            .diagnostics()
            .iter()
            .map(|d| (d.file.as_deref().unwrap_or(""), d.span.start))
            .collect();
        assert_eq!(order, vec![("a.js", 2), ("a.js", 9), ("b.js", 1)]);
    }
}
