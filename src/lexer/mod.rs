// src/lexer/mod.rs
pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod scanner;
pub mod tables;

pub use buffer::{ChunkSource, Exhausted, FnSource, ReaderSource, Refill, ScanBuffer, Span};
pub use config::{Recovery, ScannerConfig};
pub use engine::{Outcome, step};
pub use error::{ScanError, TableError};
pub use scanner::{Scanner, Token};
pub use tables::{EOI, NONE, N_SYMBOLS, RuleId, StateId, TransitionTableSet};
