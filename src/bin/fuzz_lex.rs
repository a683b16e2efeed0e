// src/bin/fuzz_lex.rs
// Generate random-but-valid inputs, lex them whole and fed in random chunks,
// and compare both streams against the generator's own token list.
//   FUZZ_SEED / FUZZ_ITERS / FUZZ_LEN   generator knobs
//   FUZZ_INPUT=path                     replay a saved case (whole vs chunked only)
//   FUZZ_SAVE=1 FUZZ_DIR=...            keep every generated case on disk

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use lexstep::{
    dev::generator::gen_tokens,
    lexer::{
        ChunkSource, Refill, ScanBuffer, Scanner, TransitionTableSet,
        tables::{TokenKind, build_sample_tables},
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};

type Lexed = Vec<(u32, usize, usize)>; // (rule, start, end)

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() -> Result<()> {
    env_logger::init();
    let tables = build_sample_tables()?;

    if let Ok(path) = std::env::var("FUZZ_INPUT") {
        eprintln!("[replay] reading {path}");
        let src = fs::read(&path).with_context(|| format!("failed to read {path}"))?;
        let mut rng = StdRng::seed_from_u64(env_or("FUZZ_SEED", 42));
        if !run_once(&tables, &mut rng, &src, None) {
            std::process::exit(1);
        }
        return Ok(());
    }

    let save_cases = std::env::var("FUZZ_SAVE").ok().as_deref() == Some("1");
    let out_dir = std::env::var("FUZZ_DIR").unwrap_or_else(|_| "fuzz-cases".to_string());
    let len: usize = env_or("FUZZ_LEN", 100_000);
    let iters: usize = env_or("FUZZ_ITERS", 8);
    let seed: u64 = env_or("FUZZ_SEED", 42);

    eprintln!("[fuzz] len={len} iters={iters} seed={seed}");
    let mut rng = StdRng::seed_from_u64(seed);
    if save_cases {
        fs::create_dir_all(&out_dir).with_context(|| format!("failed to create {out_dir}"))?;
    }

    for i in 0..iters {
        let pieces = gen_tokens(&mut rng, len);
        let src: String = pieces.iter().map(|(_, s)| s.as_str()).collect();
        eprintln!("[fuzz] iter {i}: generated {} bytes, {} tokens", src.len(), pieces.len());

        if save_cases {
            let path = save_case(&out_dir, seed, i, &src)?;
            eprintln!("[save] wrote {}", path.display());
        }

        if !run_once(&tables, &mut rng, src.as_bytes(), Some(pieces.as_slice())) {
            std::process::exit(1);
        }
    }
    eprintln!("[fuzz] all iterations matched");
    Ok(())
}

fn lex_all<S: Refill>(mut sc: Scanner<'_, S>) -> Result<Lexed, String> {
    let mut out = Vec::new();
    loop {
        match sc.next_token() {
            Ok(Some(t)) => out.push((t.rule, t.span.start, t.span.end)),
            Ok(None) => return Ok(out),
            Err(e) => return Err(e.to_string()),
        }
    }
}

fn random_chunks<R: Rng>(rng: &mut R, src: &[u8]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut at = 0;
    while at < src.len() {
        let n = rng.random_range(0..=64).min(src.len() - at);
        chunks.push(src[at..at + n].to_vec());
        at += n;
    }
    chunks
}

fn run_once<R: Rng>(
    tables: &TransitionTableSet,
    rng: &mut R,
    src: &[u8],
    expected: Option<&[(TokenKind, String)]>,
) -> bool {
    let t0 = Instant::now();
    let whole = match lex_all(Scanner::new(tables, ScanBuffer::from_bytes(src))) {
        Ok(toks) => toks,
        Err(e) => {
            eprintln!("[whole] {e}");
            return false;
        }
    };
    let t1 = Instant::now();
    let chunks = random_chunks(rng, src);
    let n_chunks = chunks.len();
    let chunked = match lex_all(Scanner::new(tables, ScanBuffer::new(ChunkSource::new(chunks)))) {
        Ok(toks) => toks,
        Err(e) => {
            eprintln!("[chunked] {e}");
            return false;
        }
    };
    let t2 = Instant::now();

    let mut ok = compare("whole", "chunked", src, &whole, &chunked);
    eprintln!(
        "[fuzz] whole {} ms | chunked {} ms over {n_chunks} chunks | tokens = {} -> {}",
        (t1 - t0).as_millis(),
        (t2 - t1).as_millis(),
        whole.len(),
        if ok { "OK" } else { "MISMATCH!" }
    );

    if let Some(exp) = expected {
        let mut at = 0;
        let want: Lexed = exp
            .iter()
            .map(|(k, s)| {
                let start = at;
                at += s.len();
                (k.rule(), start, at)
            })
            .collect();
        ok &= compare("whole", "generator", src, &whole, &want);
    }
    ok
}

fn compare(a_name: &str, b_name: &str, src: &[u8], a: &Lexed, b: &Lexed) -> bool {
    let n = a.len().min(b.len());
    let Some(i) = (0..n).find(|&i| a[i] != b[i]).or((a.len() != b.len()).then_some(n)) else {
        return true;
    };
    eprintln!(
        "[diff] {a_name} vs {b_name}: first divergence at token {i} (counts {} / {})",
        a.len(),
        b.len()
    );
    for j in i.saturating_sub(2)..(i + 4).min(a.len().max(b.len())) {
        let show = |t: Option<&(u32, usize, usize)>| {
            t.map(|&(rule, s, e)| {
                let kind = TokenKind::try_from(rule).map(|k| format!("{k:?}")).unwrap_or_default();
                (kind, s, e, String::from_utf8_lossy(&src[s..e]).into_owned())
            })
        };
        eprintln!("#{j:06} {a_name}={:?} {b_name}={:?}", show(a.get(j)), show(b.get(j)));
    }
    if let Some(&(_, start, _)) = a.get(i).or(b.get(i)) {
        let (line, col) = line_col_at(src, start);
        eprintln!("    at line {line}, col {col}");
    }
    false
}

fn line_col_at(src: &[u8], byte_idx: usize) -> (usize, usize) {
    let before = &src[..byte_idx.min(src.len())];
    let line = 1 + before.iter().filter(|&&b| b == b'\n').count();
    let col = 1 + before.iter().rev().take_while(|&&b| b != b'\n').count();
    (line, col)
}

fn save_case(dir: &str, seed: u64, iter: usize, src: &str) -> Result<PathBuf> {
    let path = Path::new(dir).join(format!("case_s{seed}_i{iter}_n{}.lx", src.len()));
    fs::write(&path, src.as_bytes()).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
