// src/lexer/tables/tokens.rs

/// Rule kinds of the sample grammar. Discriminants are the rule ids stored in `backtrack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TokenKind {
    Ident = 0,
    Let = 1,
    Int = 2,
    White = 3,

    Assign = 4, // =
    EqEq = 5,   // ==
    Minus = 6,  // -
    Arrow = 7,  // ->
    LineComment = 8, // -- ... (stops before '\n')

    Dot = 9,
    Ellipsis = 10, // ...
    LParen = 11,
    RParen = 12,

    String = 13,
    UnterminatedString = 14, // "... running into end of input
}

pub const ALL_KINDS: [TokenKind; 15] = [
    TokenKind::Ident,
    TokenKind::Let,
    TokenKind::Int,
    TokenKind::White,
    TokenKind::Assign,
    TokenKind::EqEq,
    TokenKind::Minus,
    TokenKind::Arrow,
    TokenKind::LineComment,
    TokenKind::Dot,
    TokenKind::Ellipsis,
    TokenKind::LParen,
    TokenKind::RParen,
    TokenKind::String,
    TokenKind::UnterminatedString,
];

impl TokenKind {
    #[inline]
    pub fn rule(self) -> u32 {
        self as u32
    }

    /// Whitespace and comments.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::White | TokenKind::LineComment)
    }
}

impl TryFrom<u32> for TokenKind {
    type Error = u32;

    fn try_from(rule: u32) -> Result<Self, u32> {
        ALL_KINDS.get(rule as usize).copied().ok_or(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_ids_follow_declaration_order() {
        for (i, k) in ALL_KINDS.iter().enumerate() {
            assert_eq!(k.rule() as usize, i);
            assert_eq!(TokenKind::try_from(i as u32), Ok(*k));
        }
        assert_eq!(TokenKind::try_from(15), Err(15));
    }

    #[test]
    fn trivia_is_whitespace_and_comments() {
        let trivia: Vec<TokenKind> = ALL_KINDS.into_iter().filter(|k| k.is_trivia()).collect();
        assert_eq!(trivia, vec![TokenKind::White, TokenKind::LineComment]);
    }
}
