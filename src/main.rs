// src/main.rs
// Usage:
//   lexstep                         lex a built-in sample with the sample grammar
//   lexstep path/to/input           stream a file through the scanner
//   lexstep --tables t.json input   use tables from disk (.json or .bin)
//
// LEXSTEP_CHUNK_SIZE / LEXSTEP_RECOVERY tune the scanner, LEXSTEP_TRIVIA=0 hides
// whitespace and comments, RUST_LOG sets the logging.

use std::{env, fs, path::Path};

use anyhow::{Context, Result, bail};
use lexstep::lexer::{
    Refill, Scanner, ScannerConfig, TransitionTableSet,
    tables::{TokenKind, build_sample_tables, load_tables_bin_bytes, load_tables_json_bytes},
};

const SAMPLE: &str = r#"let greet = f("hi") -- say hello
let n = 42 -> ...
"#;

fn load_tables(path: &Path) -> Result<TransitionTableSet> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let tables = match path.extension().and_then(|e| e.to_str()) {
        Some("bin") => load_tables_bin_bytes(&bytes),
        _ => load_tables_json_bytes(&bytes),
    }
    .with_context(|| format!("loading tables from {}", path.display()))?;
    Ok(tables)
}

fn is_trivia(rule: u32) -> bool {
    TokenKind::try_from(rule).is_ok_and(TokenKind::is_trivia)
}

fn rule_name(rule: u32) -> String {
    match TokenKind::try_from(rule) {
        Ok(kind) => format!("{kind:?}"),
        Err(r) => format!("rule#{r}"),
    }
}

/// Prints every token; returns (all, non-trivia) counts.
fn dump<S: Refill>(mut scanner: Scanner<'_, S>, show_trivia: bool) -> Result<(usize, usize)> {
    let mut count = 0;
    let mut significant = 0;
    let mut failed = 0;
    loop {
        match scanner.next_lexeme() {
            Ok(Some((tok, text))) => {
                count += 1;
                if is_trivia(tok.rule) {
                    if !show_trivia {
                        continue;
                    }
                } else {
                    significant += 1;
                }
                println!(
                    "{:>6}..{:<6} {:<18} {:?}",
                    tok.span.start,
                    tok.span.end,
                    rule_name(tok.rule),
                    String::from_utf8_lossy(text)
                );
            }
            Ok(None) => break,
            Err(e) => {
                failed += 1;
                eprintln!("lex error: {e}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} lex error(s) after {count} token(s)");
    }
    Ok((count, significant))
}

fn main() -> Result<()> {
    env_logger::init();

    let mut tables_path = None;
    let mut input_path = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tables" => {
                tables_path = Some(args.next().context("--tables needs a file")?);
            }
            _ if input_path.is_none() => input_path = Some(arg),
            _ => bail!("unexpected argument {arg:?}"),
        }
    }

    let tables = match &tables_path {
        Some(p) => load_tables(Path::new(p))?,
        None => build_sample_tables()?,
    };
    let cfg = ScannerConfig::from_env();
    let show_trivia = env::var("LEXSTEP_TRIVIA").ok().as_deref() != Some("0");
    log::debug!(
        "{} states, {} slots, {} rules, {cfg:?}",
        tables.n_states(),
        tables.n_slots(),
        tables.rule_count()
    );

    let (count, significant) = match &input_path {
        Some(p) => {
            let f = fs::File::open(p).with_context(|| format!("opening {p}"))?;
            dump(Scanner::from_reader(&tables, f, cfg), show_trivia)?
        }
        None => dump(Scanner::from_reader(&tables, SAMPLE.as_bytes(), cfg), show_trivia)?,
    };
    eprintln!("[lexstep] {count} tokens ({significant} non-trivia)");
    Ok(())
}
