// src/dev/generator.rs
// Random-but-valid input for the sample grammar.
//
// Every piece is followed by whitespace unless it is a paren, so adjacent
// pieces never fuse into a longer token and the expected token stream is
// known up front.

use rand::Rng;

use crate::lexer::tables::TokenKind;

pub fn gen_valid_source<R: Rng>(rng: &mut R, target_len: usize) -> String {
    gen_tokens(rng, target_len)
        .into_iter()
        .map(|(_, text)| text)
        .collect()
}

/// Same input as [`gen_valid_source`], split into the tokens it lexes to.
pub fn gen_tokens<R: Rng>(rng: &mut R, target_len: usize) -> Vec<(TokenKind, String)> {
    let mut out = Vec::new();
    let mut len = 0usize;

    while len < target_len {
        let roll = rng.random_range(0u32..100);
        let piece = match roll {
            0..=29 => ident(rng),
            30..=44 => (TokenKind::Int, digits(rng, 1..=8)),
            45..=51 => line_comment(rng),
            52..=59 => string(rng),
            60..=99 => operator(rng),
            _ => unreachable!(),
        };

        let needs_sep = !matches!(piece.0, TokenKind::LParen | TokenKind::RParen);
        let after_comment = piece.0 == TokenKind::LineComment;
        len += piece.1.len();
        out.push(piece);

        if needs_sep {
            let ws = white(rng, after_comment);
            len += ws.len();
            out.push((TokenKind::White, ws));
        }
    }
    out
}

fn ident<R: Rng>(rng: &mut R) -> (TokenKind, String) {
    if rng.random_bool(0.1) {
        return (TokenKind::Let, "let".to_string());
    }
    let len = rng.random_range(1..=12);
    let mut s = String::with_capacity(len);
    s.push(random_alpha(rng));
    for _ in 1..len {
        if rng.random_bool(0.7) {
            s.push(random_alpha(rng));
        } else {
            s.push(random_digit(rng));
        }
    }
    let kind = if s == "let" { TokenKind::Let } else { TokenKind::Ident };
    (kind, s)
}

fn digits<R: Rng>(rng: &mut R, len: std::ops::RangeInclusive<usize>) -> String {
    let n = rng.random_range(len);
    (0..n).map(|_| random_digit(rng)).collect()
}

fn white<R: Rng>(rng: &mut R, newline_first: bool) -> String {
    const OPTS: [char; 4] = [' ', '\t', '\r', '\n'];
    let mut s = String::new();
    if newline_first {
        s.push('\n');
    }
    let n = rng.random_range(usize::from(!newline_first)..=4);
    for _ in 0..n {
        s.push(OPTS[rng.random_range(0..OPTS.len())]);
    }
    s
}

fn line_comment<R: Rng>(rng: &mut R) -> (TokenKind, String) {
    const BODY: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789 =-.()\"\t";
    let mut s = String::from("--");
    for _ in 0..rng.random_range(0..=40) {
        s.push(BODY[rng.random_range(0..BODY.len())] as char);
    }
    (TokenKind::LineComment, s)
}

fn string<R: Rng>(rng: &mut R) -> (TokenKind, String) {
    const BODY: &[u8] = b"abcdefghijklmnopqrstuvwxyz 0123456789=-.()\t\\";
    let mut s = String::from("\"");
    for _ in 0..rng.random_range(0..=24) {
        s.push(BODY[rng.random_range(0..BODY.len())] as char);
    }
    s.push('"');
    (TokenKind::String, s)
}

fn operator<R: Rng>(rng: &mut R) -> (TokenKind, String) {
    const OPS: [(TokenKind, &str); 8] = [
        (TokenKind::Assign, "="),
        (TokenKind::EqEq, "=="),
        (TokenKind::Minus, "-"),
        (TokenKind::Arrow, "->"),
        (TokenKind::Dot, "."),
        (TokenKind::Ellipsis, "..."),
        (TokenKind::LParen, "("),
        (TokenKind::RParen, ")"),
    ];
    let (kind, text) = OPS[rng.random_range(0..OPS.len())];
    (kind, text.to_string())
}

fn random_alpha<R: Rng>(rng: &mut R) -> char {
    let set = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
    set[rng.random_range(0..set.len())] as char
}

fn random_digit<R: Rng>(rng: &mut R) -> char {
    let set = b"0123456789";
    set[rng.random_range(0..set.len())] as char
}
