//! Operator text tables.
//!
//! A `None` result means the operator is outside the accepted subset.

use jslift_ast::SyntaxKind;

/// Text of a binary operator. Assignment is limited to plain `=`.
pub fn binary_operator_text(kind: SyntaxKind) -> Option<&'static str> {
    let text = match kind {
        SyntaxKind::PlusToken => "+",
        SyntaxKind::MinusToken => "-",
        SyntaxKind::AsteriskToken => "*",
        SyntaxKind::SlashToken => "/",
        SyntaxKind::PercentToken => "%",
        SyntaxKind::EqualsEqualsToken => "==",
        SyntaxKind::ExclamationEqualsToken => "!=",
        SyntaxKind::EqualsEqualsEqualsToken => "===",
        SyntaxKind::ExclamationEqualsEqualsToken => "!==",
        SyntaxKind::LessThanToken => "<",
        SyntaxKind::LessThanEqualsToken => "<=",
        SyntaxKind::GreaterThanToken => ">",
        SyntaxKind::GreaterThanEqualsToken => ">=",
        SyntaxKind::AmpersandAmpersandToken => "&&",
        SyntaxKind::BarBarToken => "||",
        SyntaxKind::AmpersandToken => "&",
        SyntaxKind::BarToken => "|",
        SyntaxKind::CaretToken => "^",
        SyntaxKind::LessThanLessThanToken => "<<",
        SyntaxKind::GreaterThanGreaterThanToken => ">>",
        SyntaxKind::GreaterThanGreaterThanGreaterThanToken => ">>>",
        SyntaxKind::InKeyword => "in",
        SyntaxKind::CommaToken => ",",
        SyntaxKind::EqualsToken => "=",
        _ => return None,
    };
    Some(text)
}

pub fn prefix_operator_text(kind: SyntaxKind) -> Option<&'static str> {
    let text = match kind {
        SyntaxKind::ExclamationToken => "!",
        SyntaxKind::TildeToken => "~",
        SyntaxKind::PlusToken => "+",
        SyntaxKind::MinusToken => "-",
        SyntaxKind::PlusPlusToken => "++",
        SyntaxKind::MinusMinusToken => "--",
        SyntaxKind::TypeOfKeyword => "typeof",
        SyntaxKind::VoidKeyword => "void",
        SyntaxKind::DeleteKeyword => "delete",
        _ => return None,
    };
    Some(text)
}

pub fn postfix_operator_text(kind: SyntaxKind) -> Option<&'static str> {
    match kind {
        SyntaxKind::PlusPlusToken => Some("++"),
        SyntaxKind::MinusMinusToken => Some("--"),
        _ => None,
    }
}

/// Whether a space must separate prefix operator `op` from `operand` so the
/// two do not lex as a different token.
pub fn needs_space_after_prefix(op: &str, operand: &str) -> bool {
    let Some(last) = op.chars().last() else {
        return false;
    };
    if last.is_ascii_alphabetic() {
        return true;
    }
    matches!((last, operand.chars().next()), ('+', Some('+')) | ('-', Some('-')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_operators() {
        assert_eq!(binary_operator_text(SyntaxKind::AsteriskAsteriskToken), None);
        assert_eq!(binary_operator_text(SyntaxKind::QuestionQuestionToken), None);
        assert_eq!(binary_operator_text(SyntaxKind::InstanceOfKeyword), None);
        assert_eq!(binary_operator_text(SyntaxKind::PlusEqualsToken), None);
    }

    #[test]
    fn test_accepted_operators() {
        assert_eq!(binary_operator_text(SyntaxKind::GreaterThanGreaterThanGreaterThanToken), Some(">>>"));
        assert_eq!(binary_operator_text(SyntaxKind::InKeyword), Some("in"));
        assert_eq!(prefix_operator_text(SyntaxKind::TypeOfKeyword), Some("typeof"));
        assert_eq!(postfix_operator_text(SyntaxKind::MinusMinusToken), Some("--"));
        assert_eq!(postfix_operator_text(SyntaxKind::ExclamationToken), None);
    }

    #[test]
    fn test_prefix_spacing() {
        assert!(needs_space_after_prefix("-", "-x"));
        assert!(needs_space_after_prefix("+", "++x"));
        assert!(needs_space_after_prefix("typeof", "x"));
        assert!(!needs_space_after_prefix("-", "x"));
        assert!(!needs_space_after_prefix("!", "!x"));
        assert!(!needs_space_after_prefix("-", "(x)"));
    }
}
