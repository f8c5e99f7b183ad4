//! jslift_compiler: Entry points for the lifting transformation.
//!
//! `transform_source` turns program text into lifted program text.
//! `transform_file` adds the file handling around it: the output path is
//! checked first and the output file is written only when every step
//! succeeded.

mod error;

use std::fs;
use std::path::Path;

use bumpalo::Bump;
use jslift_core::text::LineMap;
use jslift_parser::parse_source_file;
use jslift_transformers::{FunctionLifter, LiftError};
use tracing::info;

pub use error::TransformError;

/// Parse `text` and lift its nested functions.
pub fn transform_source(file_name: &str, text: &str) -> Result<String, TransformError> {
    let arena = Bump::new();
    let (source_file, diagnostics) = parse_source_file(&arena, file_name, text);
    if diagnostics.has_errors() {
        let line_map = LineMap::new(text);
        return Err(TransformError::ParseFailure {
            file: file_name.to_string(),
            diagnostics: diagnostics
                .diagnostics()
                .iter()
                .map(|diagnostic| diagnostic.render(&line_map))
                .collect(),
        });
    }

    let mut lifter = FunctionLifter::new();
    lifter.lift_source_file(&source_file).map_err(|err| {
        let position = LineMap::new(text).line_and_column_of(err.span().start);
        let LiftError::UnsupportedConstruct { kind, .. } = err;
        TransformError::UnsupportedConstruct {
            file: file_name.to_string(),
            construct: kind.to_string(),
            line: position.line + 1,
            column: position.character + 1,
        }
    })
}

/// Transform the program at `input` and write the result to `output`.
pub fn transform_file(input: &Path, output: &Path) -> Result<(), TransformError> {
    info!(input = %input.display(), output = %output.display(), "transforming file");
    prepare_output_path(output)?;

    let text = fs::read_to_string(input).map_err(|source| TransformError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let lifted = transform_source(&input.display().to_string(), &text)?;

    fs::write(output, &lifted).map_err(|source| TransformError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    info!(output = %output.display(), bytes = lifted.len(), "transform finished");
    Ok(())
}

/// Reject unusable output paths and create the missing parent directories.
fn prepare_output_path(output: &Path) -> Result<(), TransformError> {
    let invalid = |reason: String| TransformError::InvalidOutputPath {
        path: output.to_path_buf(),
        reason,
    };
    if output.as_os_str().is_empty() {
        return Err(invalid("path is empty".to_string()));
    }
    if output.is_dir() {
        return Err(invalid("path is a directory".to_string()));
    }
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|err| invalid(err.to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_source_lifts() {
        let lifted = transform_source(
            "outer.js",
            "function outer(){ var x = 1; function inner(){ return x + 1; } return inner(); }",
        )
        .unwrap();
        assert_eq!(
            lifted,
            "function outer() {\n    var x = 1;\n    return inner(x);\n}\nfunction inner(x) {\n    return (x) + (1);\n}\n"
        );
    }

    #[test]
    fn test_parse_failure_renders_diagnostics() {
        match transform_source("bad.js", "var a = 1;\nf(1;") {
            Err(TransformError::ParseFailure { file, diagnostics }) => {
                assert_eq!(file, "bad.js");
                assert_eq!(diagnostics.len(), 1);
                assert!(diagnostics[0].starts_with("bad.js(2,"), "{}", diagnostics[0]);
                assert!(diagnostics[0].contains("error JL1005"), "{}", diagnostics[0]);
            }
            other => panic!("expected a parse failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_construct_position() {
        match transform_source("loop.js", "var a = 1;\nfunction f() {\n    while (a) {}\n}") {
            Err(TransformError::UnsupportedConstruct { construct, line, column, .. }) => {
                assert_eq!(construct, "WhileStatement");
                assert_eq!((line, column), (3, 5));
            }
            other => panic!("expected an unsupported construct, got {:?}", other),
        }
    }

    #[test]
    fn test_exit_codes() {
        let usage = TransformError::InvalidArguments { usage: String::new() };
        let path = TransformError::InvalidOutputPath {
            path: "".into(),
            reason: "path is empty".to_string(),
        };
        assert_eq!(usage.exit_code(), 2);
        assert_eq!(path.exit_code(), 1);
        assert_eq!(path.to_string(), "invalid output path '': path is empty");
    }
}
