use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Every way a transformation can fail. Each one ends the invocation
/// without writing an output file.
#[derive(Debug, Error, Diagnostic)]
pub enum TransformError {
    #[error("invalid arguments")]
    #[diagnostic(code(jslift::invalid_arguments), help("{usage}"))]
    InvalidArguments { usage: String },

    #[error("invalid output path '{}': {reason}", .path.display())]
    #[diagnostic(code(jslift::invalid_output_path))]
    InvalidOutputPath { path: PathBuf, reason: String },

    /// `diagnostics` holds one rendered line per syntax error.
    #[error("failed to parse {file}: {} syntax error(s)", .diagnostics.len())]
    #[diagnostic(code(jslift::parse_failure))]
    ParseFailure { file: String, diagnostics: Vec<String> },

    /// `line` and `column` are 1-based.
    #[error("{file}({line},{column}): unsupported construct: {construct}")]
    #[diagnostic(
        code(jslift::unsupported_construct),
        help("only variable declarations, function declarations, blocks, expression statements and returns can be lifted")
    )]
    UnsupportedConstruct {
        file: String,
        construct: String,
        line: u32,
        column: u32,
    },

    #[error("cannot access '{}'", .path.display())]
    #[diagnostic(code(jslift::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransformError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            TransformError::InvalidArguments { .. } => 2,
            _ => 1,
        }
    }
}
