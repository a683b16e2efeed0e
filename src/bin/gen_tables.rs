// src/bin/gen_tables.rs
// Build the sample grammar's tables once and write them to disk.
// Usage:
//   cargo run --bin gen_tables                # writes tables/lexer_tables.{json,bin}
//   cargo run --bin gen_tables -- /path/out   # writes /path/out/lexer_tables.{json,bin}

use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result};
use lexstep::lexer::tables::{build_sample_tables, save_tables_bin, save_tables_json};

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = PathBuf::from(env::args().nth(1).unwrap_or_else(|| "tables".to_string()));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    println!("[gen_tables] building sample grammar tables…");
    let t = build_sample_tables()?;

    let filled = t.check().iter().filter(|&&c| c != lexstep::lexer::NONE).count();
    println!(
        "[gen_tables] states = {}, slots = {} ({} used, {:.1}%), rules = {}",
        t.n_states(),
        t.n_slots(),
        filled,
        100.0 * filled as f64 / t.n_slots().max(1) as f64,
        t.rule_count()
    );

    let json = out_dir.join("lexer_tables.json");
    save_tables_json(&json, &t).with_context(|| format!("failed to write {}", json.display()))?;
    println!("[gen_tables] wrote {}", json.display());

    let bin = out_dir.join("lexer_tables.bin");
    save_tables_bin(&bin, &t).with_context(|| format!("failed to write {}", bin.display()))?;
    println!("[gen_tables] wrote {}", bin.display());
    Ok(())
}
