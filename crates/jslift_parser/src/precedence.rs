//! Binding power of binary operators.

use jslift_ast::syntax_kind::SyntaxKind;

/// Binary operator levels. Declaration order is binding order, weakest
/// first, so the derived `Ord` compares binding power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Coalesce,
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Exponent,
}

impl Precedence {
    /// Level of `kind` used as a binary operator, or `None` when the token
    /// does not continue a binary expression.
    pub fn of_binary(kind: SyntaxKind) -> Option<Precedence> {
        use SyntaxKind::*;
        let level = match kind {
            QuestionQuestionToken => Precedence::Coalesce,
            BarBarToken => Precedence::Or,
            AmpersandAmpersandToken => Precedence::And,
            BarToken => Precedence::BitOr,
            CaretToken => Precedence::BitXor,
            AmpersandToken => Precedence::BitAnd,
            EqualsEqualsToken | ExclamationEqualsToken | EqualsEqualsEqualsToken
            | ExclamationEqualsEqualsToken => Precedence::Equality,
            LessThanToken | GreaterThanToken | LessThanEqualsToken | GreaterThanEqualsToken
            | InstanceOfKeyword | InKeyword => Precedence::Relational,
            LessThanLessThanToken | GreaterThanGreaterThanToken | GreaterThanGreaterThanGreaterThanToken => {
                Precedence::Shift
            }
            PlusToken | MinusToken => Precedence::Additive,
            AsteriskToken | SlashToken | PercentToken => Precedence::Multiplicative,
            AsteriskAsteriskToken => Precedence::Exponent,
            _ => return None,
        };
        Some(level)
    }
}
