//! Feeding the same input in different chunkings must not change the tokens.
//!  - every two-way split of small inputs
//!  - random splits of generated inputs (FUZZ_SEED / SWEEP_ITERS to widen)

use lexstep::{
    dev::generator::gen_tokens,
    lexer::{
        ChunkSource, FnSource, Outcome, Refill, ScanBuffer, ScanError, Scanner, Span,
        TransitionTableSet, step,
        tables::{TokenKind, build_sample_tables, dfa::S},
    },
};
use pretty_assertions::assert_eq;
use rand::{Rng, SeedableRng, rngs::StdRng};

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
}

fn lex<S: Refill>(t: &TransitionTableSet, buf: ScanBuffer<S>) -> Vec<(u32, Span)> {
    Scanner::new(t, buf)
        .map(|r| {
            let tok = r.expect("lex failed");
            (tok.rule, tok.span)
        })
        .collect()
}

fn lex_chunks(t: &TransitionTableSet, chunks: Vec<Vec<u8>>) -> Vec<(u32, Span)> {
    lex(t, ScanBuffer::new(ChunkSource::new(chunks)))
}

#[test]
fn every_two_way_split_agrees() {
    let t = build_sample_tables().unwrap();
    for src in [
        "let x = 1",
        "letter->y ... ..z",
        "\"a b\"(-- tail\n)",
        "== = ==== -",
        "\"open",
    ] {
        let whole = lex(&t, ScanBuffer::from_bytes(src));
        let b = src.as_bytes();
        for cut in 0..=b.len() {
            let got = lex_chunks(&t, vec![b[..cut].to_vec(), b[cut..].to_vec()]);
            assert_eq!(got, whole, "{src:?} cut at {cut}");
        }
    }
}

#[test]
fn byte_at_a_time_agrees() {
    let t = build_sample_tables().unwrap();
    let src = "let f = (a -> \"s\") -- done\n...";
    let whole = lex(&t, ScanBuffer::from_bytes(src));
    let bytes: Vec<Vec<u8>> = src.bytes().map(|b| vec![b]).collect();
    assert_eq!(lex_chunks(&t, bytes), whole);
}

#[test]
fn random_splits_of_generated_input() {
    let t = build_sample_tables().unwrap();
    let seed = env_usize("FUZZ_SEED", 1) as u64;
    let iters = env_usize("SWEEP_ITERS", 16);
    let mut rng = StdRng::seed_from_u64(seed);

    for i in 0..iters {
        let pieces = gen_tokens(&mut rng, 2_000);
        let src: String = pieces.iter().map(|(_, s)| s.as_str()).collect();
        let want: Vec<u32> = pieces.iter().map(|(k, _)| k.rule()).collect();

        let whole = lex(&t, ScanBuffer::from_bytes(src.as_str()));
        assert_eq!(whole.iter().map(|&(r, _)| r).collect::<Vec<_>>(), want, "iter {i}");

        let bytes = src.as_bytes();
        let mut chunks = Vec::new();
        let mut at = 0;
        while at < bytes.len() {
            let n = rng.random_range(1..=17).min(bytes.len() - at);
            chunks.push(bytes[at..at + n].to_vec());
            at += n;
        }
        assert_eq!(lex_chunks(&t, chunks), whole, "iter {i}");
    }
}

#[test]
fn reader_source_matches_in_memory() {
    let t = build_sample_tables().unwrap();
    let src = "let a = \"x\" -> b\n-- c\n(1 ... 2)";
    let whole = lex(&t, ScanBuffer::from_bytes(src));
    for chunk in [1, 2, 3, 7, 64] {
        let got = lex(&t, ScanBuffer::from_reader(src.as_bytes(), chunk));
        assert_eq!(got, whole, "chunk size {chunk}");
    }
}

#[test]
fn positions_stay_ordered_while_suspended() {
    let t = build_sample_tables().unwrap();
    let mut buf = ScanBuffer::new(ChunkSource::new(["-", "-", " x", "\ny"]));
    buf.begin_token();
    let mut state = S::Start.id();
    let rule = loop {
        match step(&t, state, &mut buf).unwrap() {
            Outcome::Suspended(s) => {
                assert!(buf.start() <= buf.last_match_end());
                assert!(buf.last_match_end() <= buf.cursor());
                assert!(buf.cursor() <= buf.len());
                buf.request_refill().unwrap();
                state = s;
            }
            Outcome::Matched(rule) => break rule,
        }
    };
    assert_eq!(rule, TokenKind::LineComment.rule());
    assert_eq!(buf.lexeme(), b"-- x");
}

#[test]
fn source_errors_propagate() {
    let t = build_sample_tables().unwrap();
    let mut calls = 0;
    let buf = ScanBuffer::new(FnSource::new(move |dst: &mut Vec<u8>| {
        calls += 1;
        if calls == 1 {
            dst.extend_from_slice(b"ab");
            Ok(2)
        } else {
            Err(std::io::Error::other("pipe closed"))
        }
    }));
    let mut sc = Scanner::new(&t, buf);
    assert!(matches!(sc.next_token(), Err(ScanError::Source(_))));
    assert!(sc.next_token().unwrap().is_none());
}
