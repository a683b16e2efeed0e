// src/lexer/error.rs
//! Error kinds surfaced by table loading and by scanning.

use thiserror::Error;

/// Fatal outcome of one scan session.
///
/// `BufferExhausted` and `NoMatch` are the engine's own failure kinds; `Source`
/// wraps I/O failures of a caller-supplied refill source. Offsets are absolute
/// byte positions in the input stream.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("input exhausted mid-token at byte {offset}")]
    BufferExhausted { offset: usize },

    #[error("no rule matches at byte {offset}")]
    NoMatch { offset: usize },

    #[error("refill source failed")]
    Source(#[source] std::io::Error),
}

impl ScanError {
    /// Absolute offset the error refers to, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ScanError::BufferExhausted { offset } | ScanError::NoMatch { offset } => Some(*offset),
            ScanError::Source(_) => None,
        }
    }
}

/// Malformed or unreadable transition tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table set has no states")]
    Empty,

    #[error("`{table}` has {found} entries, expected {expected}")]
    LengthMismatch {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("`{table}[{index}]` = {value} names a state outside 0..{n_states}")]
    StateOutOfRange {
        table: &'static str,
        index: usize,
        value: u32,
        n_states: usize,
    },

    #[error("default chain starting at state {state} is cyclic")]
    DefaultCycle { state: u32 },

    #[error("symbol {symbol} on state {state} is outside 0..=256")]
    SymbolOutOfRange { state: u32, symbol: u32 },

    #[error("`{table}[{index}]` = {value} is negative")]
    NegativeEntry {
        table: &'static str,
        index: usize,
        value: i64,
    },

    #[error("packed `{table}` has odd byte length {len}")]
    OddLength { table: &'static str, len: usize },

    #[error("bad magic in tables .bin")]
    BadMagic,

    #[error("tables .bin truncated while reading {what}")]
    Truncated { what: &'static str },

    #[error("{count} trailing bytes after tables .bin payload")]
    TrailingBytes { count: usize },

    #[error("failed to parse tables JSON")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
