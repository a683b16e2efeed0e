// src/lexer/config.rs
use std::env;

use super::tables::StateId;

/// What the scanner does after a failed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recovery {
    /// Stop; every later call reports end of stream.
    #[default]
    Abort,
    /// Skip one symbol at the failed position, then keep scanning.
    Resync,
}

impl Recovery {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Some(Recovery::Abort),
            "resync" | "skip" => Some(Recovery::Resync),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Bytes requested per refill from reader-backed sources.
    pub chunk_size: usize,
    pub recovery: Recovery,
    /// Automaton state every token starts from.
    pub initial_state: StateId,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            recovery: Recovery::Abort,
            initial_state: 0,
        }
    }
}

impl ScannerConfig {
    /// Defaults overridden by `LEXSTEP_CHUNK_SIZE` and `LEXSTEP_RECOVERY`.
    /// Unset or unparsable variables keep the default.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(n) = env::var("LEXSTEP_CHUNK_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            cfg.chunk_size = n;
        }
        if let Some(r) = env::var("LEXSTEP_RECOVERY")
            .ok()
            .and_then(|s| Recovery::parse(&s))
        {
            cfg.recovery = r;
        }
        cfg
    }

    pub fn with_recovery(mut self, recovery: Recovery) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_initial_state(mut self, state: StateId) -> Self {
        self.initial_state = state;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_names() {
        assert_eq!(Recovery::parse("abort"), Some(Recovery::Abort));
        assert_eq!(Recovery::parse(" Resync "), Some(Recovery::Resync));
        assert_eq!(Recovery::parse("skip"), Some(Recovery::Resync));
        assert_eq!(Recovery::parse("retry"), None);
    }

    #[test]
    fn builders_clamp_chunk_size() {
        let cfg = ScannerConfig::default().with_chunk_size(0);
        assert_eq!(cfg.chunk_size, 1);
        assert_eq!(cfg.recovery, Recovery::Abort);
    }
}
