// src/lexer/scanner.rs
//! Dispatch loop around the stepper: open a session, walk, refill on
//! suspension, hand back the matched rule and its span.

use std::io::Read;

use super::{
    buffer::{ReaderSource, Refill, ScanBuffer, Span},
    config::{Recovery, ScannerConfig},
    engine::{Outcome, step},
    error::ScanError,
    tables::{RuleId, TransitionTableSet},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub rule: RuleId,
    pub span: Span,
}

pub struct Scanner<'t, S> {
    tables: &'t TransitionTableSet,
    buffer: ScanBuffer<S>,
    config: ScannerConfig,
    pending_resync: bool,
    finished: bool,
}

impl<'t, S: Refill> Scanner<'t, S> {
    pub fn new(tables: &'t TransitionTableSet, buffer: ScanBuffer<S>) -> Self {
        Self::with_config(tables, buffer, ScannerConfig::default())
    }

    /// Panics if `config.initial_state` is not a state of `tables`.
    pub fn with_config(
        tables: &'t TransitionTableSet,
        buffer: ScanBuffer<S>,
        config: ScannerConfig,
    ) -> Self {
        assert!(
            (config.initial_state as usize) < tables.n_states(),
            "initial state {} outside 0..{}",
            config.initial_state,
            tables.n_states()
        );
        Self {
            tables,
            buffer,
            config,
            pending_resync: false,
            finished: false,
        }
    }

    /// Next token, or `None` once the input is fully consumed.
    ///
    /// Errors are never retried here. Under [`Recovery::Resync`] a `NoMatch`
    /// makes the following call skip one byte first; anything else ends the scan.
    pub fn next_token(&mut self) -> Result<Option<Token>, ScanError> {
        if self.finished {
            return Ok(None);
        }
        if std::mem::take(&mut self.pending_resync) {
            let at = self.buffer.start_offset();
            match self.buffer.skip_symbol() {
                Ok(_) => log::warn!("resync: skipped byte at {at}"),
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            }
        }

        match self.scan_one() {
            Ok(tok) => {
                self.finished = tok.is_none();
                Ok(tok)
            }
            Err(e) => {
                match (self.config.recovery, &e) {
                    (Recovery::Resync, ScanError::NoMatch { .. }) => self.pending_resync = true,
                    _ => self.finished = true,
                }
                Err(e)
            }
        }
    }

    /// Like [`next_token`](Self::next_token), with the token's bytes.
    pub fn next_lexeme(&mut self) -> Result<Option<(Token, &[u8])>, ScanError> {
        let tok = self.next_token()?;
        Ok(tok.map(|t| (t, self.buffer.lexeme())))
    }

    /// Runs to the end, copying out every lexeme. Stops at the first error.
    pub fn collect_tokens(&mut self) -> Result<Vec<(Token, Vec<u8>)>, ScanError> {
        let mut out = Vec::new();
        while let Some((tok, text)) = self.next_lexeme()? {
            out.push((tok, text.to_vec()));
        }
        Ok(out)
    }

    /// Discards one byte at the current position and reopens the scan.
    /// Returns `false` if there was nothing left to discard.
    pub fn resync(&mut self) -> Result<bool, ScanError> {
        self.pending_resync = false;
        self.finished = false;
        self.buffer.skip_symbol()
    }

    fn scan_one(&mut self) -> Result<Option<Token>, ScanError> {
        self.buffer.begin_token();
        while self.buffer.peek().is_none() && !self.buffer.at_end() {
            self.buffer.request_refill()?;
        }
        if self.buffer.is_drained() {
            return Ok(None);
        }

        let mut state = self.config.initial_state;
        loop {
            match step(self.tables, state, &mut self.buffer)? {
                Outcome::Matched(rule) => {
                    let span = self.buffer.span();
                    log::trace!("rule {rule} at {}..{}", span.start, span.end);
                    return Ok(Some(Token { rule, span }));
                }
                Outcome::Suspended(s) => {
                    log::trace!("refill at {} (state {s})", self.buffer.cursor_offset());
                    self.buffer.request_refill()?;
                    state = s;
                }
            }
        }
    }
}

impl<'t, R: Read> Scanner<'t, ReaderSource<R>> {
    /// Streams `reader` in `config.chunk_size` pieces.
    pub fn from_reader(tables: &'t TransitionTableSet, reader: R, config: ScannerConfig) -> Self {
        let buffer = ScanBuffer::from_reader(reader, config.chunk_size);
        Self::with_config(tables, buffer, config)
    }
}

impl<S> Scanner<'_, S> {
    /// Bytes of the token last returned.
    pub fn lexeme(&self) -> &[u8] {
        self.buffer.lexeme()
    }

    pub fn buffer(&self) -> &ScanBuffer<S> {
        &self.buffer
    }

    pub fn tables(&self) -> &TransitionTableSet {
        self.tables
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn into_buffer(self) -> ScanBuffer<S> {
        self.buffer
    }
}

impl<S: Refill> Iterator for Scanner<'_, S> {
    type Item = Result<Token, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
