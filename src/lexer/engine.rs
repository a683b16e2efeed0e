// src/lexer/engine.rs
//! Automaton stepper: one bounded walk of the comb tables over a scan buffer.
//!
//! The walk keeps extending past accepting states (longest match) and backs
//! off to the last one when it gets stuck. When buffered input runs out before
//! the end of the stream it returns [`Outcome::Suspended`]; the caller refills
//! and calls [`step`] again with the returned state. Nothing else survives
//! between calls: the rest of the walk lives in the buffer's positions.

use super::{
    buffer::ScanBuffer,
    error::ScanError,
    tables::{EOI, RuleId, StateId, TransitionTableSet},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// A rule matched; `buffer.lexeme()` is the token.
    Matched(RuleId),
    /// Buffered input ran out mid-walk; refill and resume from this state.
    Suspended(StateId),
}

/// Walks `tables` from `state` over `buffer`.
///
/// The session must have been opened with [`ScanBuffer::begin_token`]; a
/// resumed walk continues the same session. On `Matched` and on
/// [`ScanError::NoMatch`] the cursor is left at the last accepted extent
/// (`start` when nothing was accepted).
///
/// Panics if `state` is not a state of `tables`.
pub fn step<S>(
    tables: &TransitionTableSet,
    mut state: StateId,
    buffer: &mut ScanBuffer<S>,
) -> Result<Outcome, ScanError> {
    let mut eoi_taken = false;

    loop {
        let symbol = match buffer.peek() {
            Some(b) => b as u32,
            None if !buffer.at_end() => return Ok(Outcome::Suspended(state)),
            None if eoi_taken => break,
            None => EOI,
        };

        let Some(next) = tables.resolve(state, symbol) else {
            break;
        };
        if symbol == EOI {
            eoi_taken = true;
        } else {
            buffer.advance();
        }
        state = next;

        if let Some(rule) = tables.accepts(state) {
            buffer.mark_accepting(rule);
        }
    }

    buffer.rewind();
    match buffer.matched_rule() {
        Some(rule) => Ok(Outcome::Matched(rule)),
        None => Err(ScanError::NoMatch {
            offset: buffer.start_offset(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{
        buffer::ChunkSource,
        tables::{
            NONE, TableBuilder, build_sample_tables,
            dfa::{S, START},
            tokens::TokenKind,
        },
    };

    fn run_whole(tables: &TransitionTableSet, src: &str) -> (Result<Outcome, ScanError>, String) {
        let mut buf = ScanBuffer::from_bytes(src);
        buf.begin_token();
        let out = step(tables, START.id(), &mut buf);
        (out, String::from_utf8_lossy(buf.lexeme()).into_owned())
    }

    fn matched(kind: TokenKind) -> Outcome {
        Outcome::Matched(kind.rule())
    }

    #[test]
    fn single_dead_state_is_no_match_without_consuming() {
        let t = TransitionTableSet::new(vec![NONE], vec![NONE], vec![], vec![], vec![NONE])
            .unwrap();
        let mut buf = ScanBuffer::from_bytes("a");
        buf.begin_token();
        let err = step(&t, 0, &mut buf).unwrap_err();
        assert!(matches!(err, ScanError::NoMatch { offset: 0 }));
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn prefers_the_longest_match() {
        let t = build_sample_tables().unwrap();
        let (out, lex) = run_whole(&t, "==x");
        assert_eq!(out.unwrap(), matched(TokenKind::EqEq));
        assert_eq!(lex, "==");

        let (out, lex) = run_whole(&t, "->");
        assert_eq!(out.unwrap(), matched(TokenKind::Arrow));
        assert_eq!(lex, "->");

        let (out, lex) = run_whole(&t, "-- note\nx");
        assert_eq!(out.unwrap(), matched(TokenKind::LineComment));
        assert_eq!(lex, "-- note");
    }

    #[test]
    fn backs_off_to_the_last_accepting_state() {
        let t = build_sample_tables().unwrap();
        let mut buf = ScanBuffer::from_bytes("..x");
        buf.begin_token();
        assert_eq!(step(&t, START.id(), &mut buf).unwrap(), matched(TokenKind::Dot));
        assert_eq!(buf.lexeme(), b".");
        assert_eq!(buf.cursor(), buf.last_match_end());
    }

    #[test]
    fn default_chain_keeps_keyword_prefixes_as_idents() {
        let t = build_sample_tables().unwrap();
        for (src, kind, lex) in [
            ("let", TokenKind::Let, "let"),
            ("let ", TokenKind::Let, "let"),
            ("lex", TokenKind::Ident, "lex"),
            ("letter", TokenKind::Ident, "letter"),
            ("le(", TokenKind::Ident, "le"),
            ("l", TokenKind::Ident, "l"),
        ] {
            let (out, got) = run_whole(&t, src);
            assert_eq!(out.unwrap(), matched(kind), "{src:?}");
            assert_eq!(got, lex, "{src:?}");
        }
    }

    #[test]
    fn end_of_input_symbol_takes_part_in_lookups() {
        let t = build_sample_tables().unwrap();
        let (out, lex) = run_whole(&t, "\"abc");
        assert_eq!(out.unwrap(), matched(TokenKind::UnterminatedString));
        assert_eq!(lex, "\"abc");
    }

    #[test]
    fn newline_in_string_is_no_match() {
        let t = build_sample_tables().unwrap();
        let mut buf = ScanBuffer::from_bytes("\"ab\ncd\"");
        buf.begin_token();
        let err = step(&t, START.id(), &mut buf).unwrap_err();
        assert_eq!(err.offset(), Some(0));
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn suspends_at_end_of_buffered_input_and_resumes() {
        let t = build_sample_tables().unwrap();
        let mut buf = ScanBuffer::new(ChunkSource::new(["=", "=", "1"]));
        buf.begin_token();

        let mut state = START.id();
        let mut suspensions = 0;
        let out = loop {
            match step(&t, state, &mut buf).unwrap() {
                Outcome::Suspended(s) => {
                    suspensions += 1;
                    assert!(buf.start() <= buf.last_match_end());
                    assert!(buf.last_match_end() <= buf.cursor());
                    assert!(buf.cursor() <= buf.len());
                    buf.request_refill().unwrap();
                    state = s;
                }
                done => break done,
            }
        };
        // empty, after '=', after '=='
        assert_eq!(suspensions, 3);
        assert_eq!(out, matched(TokenKind::EqEq));
        assert_eq!(buf.lexeme(), b"==");
    }

    #[test]
    fn suspended_state_is_the_state_reached_so_far() {
        let t = build_sample_tables().unwrap();
        let mut buf = ScanBuffer::new(ChunkSource::new(["le", "t"]));
        buf.request_refill().unwrap();
        buf.begin_token();
        assert_eq!(
            step(&t, START.id(), &mut buf).unwrap(),
            Outcome::Suspended(S::Le.id())
        );
        assert_eq!(buf.matched_rule(), Some(TokenKind::Ident.rule()));
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn eoi_self_loop_does_not_spin() {
        let mut b = TableBuilder::with_states(2);
        b.edge(0, b'a' as u32, 1).eoi_edge(1, 1).accept(1, 3);
        let t = b.build().unwrap();
        let mut buf = ScanBuffer::from_bytes("a");
        buf.begin_token();
        assert_eq!(step(&t, 0, &mut buf).unwrap(), Outcome::Matched(3));
        assert_eq!(buf.lexeme(), b"a");
    }

    #[test]
    fn accepting_default_states_are_not_marked() {
        // 1 falls back to 2, which accepts but is never entered by a transition.
        let mut b = TableBuilder::with_states(3);
        b.edge(0, b'a' as u32, 1)
            .fallback(1, 2)
            .accept(2, 9)
            .edge(2, b'b' as u32, 2);
        let t = b.build().unwrap();

        let mut buf = ScanBuffer::from_bytes("ac");
        buf.begin_token();
        assert!(matches!(step(&t, 0, &mut buf), Err(ScanError::NoMatch { .. })));

        let mut buf = ScanBuffer::from_bytes("abc");
        buf.begin_token();
        assert_eq!(step(&t, 0, &mut buf).unwrap(), Outcome::Matched(9));
        assert_eq!(buf.lexeme(), b"ab");
    }
}
