// src/lexer/tables/dfa.rs
// Sample grammar as a small hand-built automaton, packed through TableBuilder.
//
//   ident   [A-Za-z_][A-Za-z0-9_]*     keyword `let` wins over ident
//   int     [0-9]+
//   white   [ \t\r\n]+
//   = == - -> --...(to '\n')  . ...  ( )
//   string  "[^"\n]*"                   EOF inside a string -> UnterminatedString
//
// The keyword states fall back to Ident through `default`, so they only spell
// out the one byte that keeps the keyword alive.

use super::{TableBuilder, TransitionTableSet, tokens::TokenKind};
use crate::lexer::error::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S {
    Start,
    Ident,

    // `let` spelled one byte at a time
    L,
    Le,
    Let,

    Int,
    White,

    Assign,
    EqEq,
    Minus,
    Arrow,
    LineComment,

    Dot,
    DotDot, // not accepting: ".." has to back off to "."
    Ellipsis,

    LParen,
    RParen,

    Str,
    StrDone,
    StrEof,
}

impl S {
    #[inline]
    pub fn id(self) -> u32 {
        self as u32
    }
}

pub const START: S = S::Start;

pub const ALL_STATES: &[S] = &[
    S::Start,
    S::Ident,
    S::L,
    S::Le,
    S::Let,
    S::Int,
    S::White,
    S::Assign,
    S::EqEq,
    S::Minus,
    S::Arrow,
    S::LineComment,
    S::Dot,
    S::DotDot,
    S::Ellipsis,
    S::LParen,
    S::RParen,
    S::Str,
    S::StrDone,
    S::StrEof,
];

pub(crate) fn token_of_state(s: S) -> Option<TokenKind> {
    use S::*;
    match s {
        Ident | L | Le => Some(TokenKind::Ident),
        Let => Some(TokenKind::Let),
        Int => Some(TokenKind::Int),
        White => Some(TokenKind::White),
        Assign => Some(TokenKind::Assign),
        EqEq => Some(TokenKind::EqEq),
        Minus => Some(TokenKind::Minus),
        Arrow => Some(TokenKind::Arrow),
        LineComment => Some(TokenKind::LineComment),
        Dot => Some(TokenKind::Dot),
        Ellipsis => Some(TokenKind::Ellipsis),
        LParen => Some(TokenKind::LParen),
        RParen => Some(TokenKind::RParen),
        StrDone => Some(TokenKind::String),
        StrEof => Some(TokenKind::UnterminatedString),
        Start | DotDot | Str => None,
    }
}

const DIGITS: &[u8] = b"0123456789";
const WHITE: &[u8] = b" \t\r\n";

fn ident_start(b: &mut TableBuilder, from: S, to: S) {
    b.edge_range(from.id(), b'a', b'z', to.id())
        .edge_range(from.id(), b'A', b'Z', to.id())
        .edge(from.id(), b'_' as u32, to.id());
}

/// Packed tables for the sample grammar; the initial state is [`START`].
pub fn build_sample_tables() -> Result<TransitionTableSet, TableError> {
    let mut b = TableBuilder::with_states(ALL_STATES.len());
    let id = S::id;

    // Start
    ident_start(&mut b, S::Start, S::Ident);
    b.edge(id(S::Start), b'l' as u32, id(S::L))
        .edges(id(S::Start), DIGITS, id(S::Int))
        .edges(id(S::Start), WHITE, id(S::White))
        .edges(id(S::Start), b"=", id(S::Assign))
        .edges(id(S::Start), b"-", id(S::Minus))
        .edges(id(S::Start), b".", id(S::Dot))
        .edges(id(S::Start), b"(", id(S::LParen))
        .edges(id(S::Start), b")", id(S::RParen))
        .edges(id(S::Start), b"\"", id(S::Str));

    // Ident
    ident_start(&mut b, S::Ident, S::Ident);
    b.edges(id(S::Ident), DIGITS, id(S::Ident));

    // Keyword prefix states share Ident's row via `default`
    b.edges(id(S::L), b"e", id(S::Le)).fallback(id(S::L), id(S::Ident));
    b.edges(id(S::Le), b"t", id(S::Let)).fallback(id(S::Le), id(S::Ident));
    b.fallback(id(S::Let), id(S::Ident));

    // Int, White
    b.edges(id(S::Int), DIGITS, id(S::Int));
    b.edges(id(S::White), WHITE, id(S::White));

    // Operators
    b.edges(id(S::Assign), b"=", id(S::EqEq));
    b.edges(id(S::Minus), b">", id(S::Arrow))
        .edges(id(S::Minus), b"-", id(S::LineComment));
    b.edges_except(id(S::LineComment), b"\n", id(S::LineComment));
    b.edges(id(S::Dot), b".", id(S::DotDot));
    b.edges(id(S::DotDot), b".", id(S::Ellipsis));

    // Strings
    b.edges_except(id(S::Str), b"\"\n", id(S::Str))
        .edges(id(S::Str), b"\"", id(S::StrDone))
        .eoi_edge(id(S::Str), id(S::StrEof));

    for &s in ALL_STATES {
        if let Some(kind) = token_of_state(s) {
            b.accept(s.id(), kind.rule());
        }
    }

    b.build()
}
