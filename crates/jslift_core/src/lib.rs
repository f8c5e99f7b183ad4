//! jslift_core: Source positions shared by the scanner, parser, diagnostics
//! and the lifter.

pub mod text;

pub use text::{LineAndColumn, LineMap, TextPos, TextRange, TextSpan};
