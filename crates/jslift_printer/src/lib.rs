//! jslift_printer: Text output for rewritten programs.
//!
//! `Printer` owns the output buffer and the indentation state. The operator
//! tables map token kinds to their source text and double as the definition
//! of which operators the lifter accepts.

mod operators;

pub use operators::{binary_operator_text, needs_space_after_prefix, postfix_operator_text, prefix_operator_text};

/// Options for the printer.
#[derive(Debug, Clone)]
pub struct PrinterOptions {
    /// Indentation string.
    pub indent_str: String,
    /// Newline string.
    pub new_line: String,
    /// Whether to emit a trailing newline.
    pub trailing_newline: bool,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            indent_str: "    ".to_string(),
            new_line: "\n".to_string(),
            trailing_newline: true,
        }
    }
}

/// An append-only text buffer with indentation tracking.
#[derive(Debug)]
pub struct Printer {
    output: String,
    indent_level: u32,
    options: PrinterOptions,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self::with_options(PrinterOptions::default())
    }

    pub fn with_options(options: PrinterOptions) -> Self {
        Self {
            output: String::with_capacity(1024),
            indent_level: 0,
            options,
        }
    }

    pub fn options(&self) -> &PrinterOptions {
        &self.options
    }

    /// The text written so far.
    pub fn text(&self) -> &str {
        &self.output
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Consume the printer, appending the trailing newline when configured
    /// and the output is non-empty.
    pub fn finish(mut self) -> String {
        if self.options.trailing_newline && !self.output.is_empty() {
            self.write_newline();
        }
        self.output
    }

    /// Consume the printer and return the text exactly as written.
    pub fn into_text(self) -> String {
        self.output
    }

    // ========================================================================
    // Low-level writing
    // ========================================================================

    pub fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    pub fn write_newline(&mut self) {
        self.output.push_str(&self.options.new_line);
    }

    pub fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.options.indent_str);
        }
    }

    /// Start a new line at the current indentation, unless nothing has been
    /// written yet.
    pub fn write_line_start(&mut self) {
        if !self.output.is_empty() {
            self.write_newline();
        }
        self.write_indent();
    }

    /// Write `items` separated by `, `.
    pub fn write_comma_list<S: AsRef<str>>(&mut self, items: &[S]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(item.as_ref());
        }
    }

    pub fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn indent_level(&self) -> u32 {
        self.indent_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout() {
        let mut p = Printer::new();
        p.write_line_start();
        p.write("{");
        p.increase_indent();
        p.write_line_start();
        p.write("x;");
        p.decrease_indent();
        p.write_line_start();
        p.write("}");
        assert_eq!(p.finish(), "{\n    x;\n}\n");
    }

    #[test]
    fn test_empty_output_has_no_trailing_newline() {
        assert_eq!(Printer::new().finish(), "");
    }

    #[test]
    fn test_custom_options() {
        let mut p = Printer::with_options(PrinterOptions {
            indent_str: "\t".to_string(),
            new_line: "\r\n".to_string(),
            trailing_newline: false,
        });
        p.write("a");
        p.increase_indent();
        p.write_line_start();
        p.write("b");
        assert_eq!(p.finish(), "a\r\n\tb");
    }

    #[test]
    fn test_comma_list() {
        let mut p = Printer::new();
        p.write_comma_list(&["a", "b", "c"]);
        assert_eq!(p.into_text(), "a, b, c");
    }

    #[test]
    fn test_decrease_indent_saturates() {
        let mut p = Printer::new();
        p.decrease_indent();
        assert_eq!(p.indent_level(), 0);
    }
}
