//! Flag types carried on AST nodes and tokens.

bitflags::bitflags! {
    /// Flags for AST nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u32 {
        const NONE                 = 0;
        const LET                  = 1 << 0;
        const CONST                = 1 << 1;
        const ASYNC                = 1 << 2;
        const GENERATOR            = 1 << 3;
        const STATIC               = 1 << 4;
        const EXPORT_DEFAULT       = 1 << 5;
        const OPTIONAL_CHAIN       = 1 << 6;
        const THIS_NODE_HAS_ERROR  = 1 << 7;
        /// Parser context: `in` is not a binary operator (for-statement heads).
        const DISALLOW_IN_CONTEXT  = 1 << 8;

        const BLOCK_SCOPED = Self::LET.bits() | Self::CONST.bits();
    }
}

impl NodeFlags {
    /// The declaration keyword a variable declaration list was written with.
    pub fn declaration_keyword(self) -> &'static str {
        if self.contains(NodeFlags::CONST) {
            "const"
        } else if self.contains(NodeFlags::LET) {
            "let"
        } else {
            "var"
        }
    }
}

bitflags::bitflags! {
    /// Flags set by the scanner on the current token.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u16 {
        const NONE                   = 0;
        const PRECEDING_LINE_BREAK   = 1 << 0;
        const UNTERMINATED           = 1 << 1;
        const SCIENTIFIC             = 1 << 2;
        const OCTAL                  = 1 << 3;
        const HEX_SPECIFIER          = 1 << 4;
        const BINARY_SPECIFIER       = 1 << 5;
        const OCTAL_SPECIFIER        = 1 << 6;
        const CONTAINS_SEPARATOR     = 1 << 7;
        const UNICODE_ESCAPE         = 1 << 8;
        const CONTAINS_INVALID_ESCAPE = 1 << 9;

        const NUMERIC_LITERAL_FLAGS = Self::SCIENTIFIC.bits()
            | Self::OCTAL.bits()
            | Self::HEX_SPECIFIER.bits()
            | Self::BINARY_SPECIFIER.bits()
            | Self::OCTAL_SPECIFIER.bits()
            | Self::CONTAINS_SEPARATOR.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_keyword() {
        assert_eq!(NodeFlags::NONE.declaration_keyword(), "var");
        assert_eq!(NodeFlags::LET.declaration_keyword(), "let");
        assert_eq!(NodeFlags::CONST.declaration_keyword(), "const");
        assert!(NodeFlags::BLOCK_SCOPED.contains(NodeFlags::LET));
    }
}
