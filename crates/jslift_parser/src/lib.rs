//! jslift_parser: Recursive descent parser for JavaScript.
//!
//! Parses token streams from the scanner into an arena-allocated AST.
//! Syntax errors are collected as diagnostics; the parser always makes
//! progress and never panics on malformed input.

mod parser;
mod precedence;
mod utilities;

use bumpalo::Bump;
use jslift_ast::SourceFile;
use jslift_diagnostics::DiagnosticCollection;

pub use parser::{Parser, MAX_RECURSION_DEPTH};

/// Parse `source_text` into `arena`, returning the tree and every diagnostic
/// reported while scanning and parsing it.
pub fn parse_source_file<'a>(
    arena: &'a Bump,
    file_name: &str,
    source_text: &str,
) -> (SourceFile<'a>, DiagnosticCollection) {
    let mut parser = Parser::new(arena, file_name, source_text);
    let source_file = parser.parse_source_file();
    (source_file, parser.take_diagnostics())
}
