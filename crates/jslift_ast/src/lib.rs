//! jslift_ast: Abstract Syntax Tree definitions for JavaScript sources.
//!
//! The tree covers far more of the language than the lifter accepts, so that
//! every construct reaches later phases as its own node kind and can be
//! rejected by name rather than as a syntax error.

pub mod node;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
