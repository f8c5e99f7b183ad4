//! jslift_scanner: Lexer/tokenizer for JavaScript source code.
//!
//! Produces tokens on demand for the parser, with support for:
//! - All JavaScript punctuation and operators
//! - String and template literals, with escapes cooked
//! - Regular expression literals (rescanned on parser request)
//! - Unicode identifiers

mod char_codes;
mod scanner;

pub use scanner::{Scanner, ScannerState};
