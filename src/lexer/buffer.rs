// src/lexer/buffer.rs
//! Scan buffer: the input window, cursor bookkeeping, and the refill contract.
//!
//! Positions (`start`, `cursor`, `last_match_end`) index into the buffered
//! `content`; bytes before `start` may be dropped on refill, so anything that
//! leaves the buffer (spans, error offsets) is reported as an absolute offset.

use std::{
    io::{self, Read},
    iter::Fuse,
};

use super::{error::ScanError, tables::RuleId};

/// Caller-supplied input capability.
///
/// `refill` appends to `dst` and returns how many bytes it appended; `Ok(0)`
/// means the input is over. Once a source has returned `Ok(0)` it must keep
/// doing so.
pub trait Refill {
    fn refill(&mut self, dst: &mut Vec<u8>) -> io::Result<usize>;
}

/// Source with nothing left to give. Buffers built from an in-memory slice use it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exhausted;

impl Refill for Exhausted {
    fn refill(&mut self, _dst: &mut Vec<u8>) -> io::Result<usize> {
        Ok(0)
    }
}

/// Reads fixed-size chunks from any [`Read`].
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }
}

impl<R: Read> Refill for ReaderSource<R> {
    fn refill(&mut self, dst: &mut Vec<u8>) -> io::Result<usize> {
        if self.done {
            return Ok(0);
        }
        let old = dst.len();
        dst.resize(old + self.chunk_size, 0);
        loop {
            match self.reader.read(&mut dst[old..]) {
                Ok(n) => {
                    dst.truncate(old + n);
                    self.done = n == 0;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    dst.truncate(old);
                    return Err(e);
                }
            }
        }
    }
}

/// Feeds pre-split chunks one per refill; empty chunks are skipped.
#[derive(Debug)]
pub struct ChunkSource<I: Iterator> {
    chunks: Fuse<I>,
}

impl<I: Iterator> ChunkSource<I> {
    pub fn new(chunks: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            chunks: chunks.into_iter().fuse(),
        }
    }
}

impl<I> Refill for ChunkSource<I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    fn refill(&mut self, dst: &mut Vec<u8>) -> io::Result<usize> {
        for chunk in self.chunks.by_ref() {
            let chunk = chunk.as_ref();
            if !chunk.is_empty() {
                dst.extend_from_slice(chunk);
                return Ok(chunk.len());
            }
        }
        Ok(0)
    }
}

/// Closure-backed source with the same contract as [`Refill::refill`].
pub struct FnSource<F> {
    f: F,
    done: bool,
}

impl<F> FnSource<F>
where
    F: FnMut(&mut Vec<u8>) -> io::Result<usize>,
{
    pub fn new(f: F) -> Self {
        Self { f, done: false }
    }
}

impl<F> Refill for FnSource<F>
where
    F: FnMut(&mut Vec<u8>) -> io::Result<usize>,
{
    fn refill(&mut self, dst: &mut Vec<u8>) -> io::Result<usize> {
        if self.done {
            return Ok(0);
        }
        let n = (self.f)(dst)?;
        self.done = n == 0;
        Ok(n)
    }
}

/// Absolute byte range in the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Mutable input window for one scan session.
///
/// Between operations `start <= last_match_end <= cursor <= content.len()`.
#[derive(Debug)]
pub struct ScanBuffer<S = Exhausted> {
    content: Vec<u8>,
    start: usize,
    cursor: usize,
    last_match_end: usize,
    matched_rule: Option<RuleId>,
    at_end: bool,
    discarded: usize, // bytes dropped from the front by compaction
    source: S,
}

impl ScanBuffer<Exhausted> {
    /// Whole input up front; the buffer is already at end.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content: bytes.into(),
            at_end: true,
            ..Self::new(Exhausted)
        }
    }
}

impl<R: Read> ScanBuffer<ReaderSource<R>> {
    pub fn from_reader(reader: R, chunk_size: usize) -> Self {
        Self::new(ReaderSource::new(reader, chunk_size))
    }
}

impl<S> ScanBuffer<S> {
    /// Empty buffer that pulls all of its input from `source`.
    pub fn new(source: S) -> Self {
        Self {
            content: Vec::new(),
            start: 0,
            cursor: 0,
            last_match_end: 0,
            matched_rule: None,
            at_end: false,
            discarded: 0,
            source,
        }
    }

    /// Code unit at the cursor; `None` is the end-of-buffer symbol. Never refills.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.content.get(self.cursor).copied()
    }

    /// Moves the cursor one position. The caller must have seen `peek()` return a byte.
    #[inline]
    pub fn advance(&mut self) {
        debug_assert!(self.cursor < self.content.len(), "advance past buffered input");
        self.cursor += 1;
    }

    /// Records an accepting state reached at the cursor.
    #[inline]
    pub fn mark_accepting(&mut self, rule: RuleId) {
        self.last_match_end = self.cursor;
        self.matched_rule = Some(rule);
    }

    /// Starts a new scan session at the cursor.
    pub fn begin_token(&mut self) {
        self.start = self.cursor;
        self.last_match_end = self.cursor;
        self.matched_rule = None;
    }

    /// Drops speculative progress: the cursor returns to the last accepted extent.
    #[inline]
    pub(crate) fn rewind(&mut self) {
        self.cursor = self.last_match_end;
    }

    /// Bytes `[start, cursor)`; meaningful once a walk has reported a match.
    pub fn lexeme(&self) -> &[u8] {
        &self.content[self.start..self.cursor]
    }

    pub fn lexeme_at(&self, i: usize) -> Option<u8> {
        self.lexeme().get(i).copied()
    }

    /// Absolute span of [`lexeme`](Self::lexeme).
    pub fn span(&self) -> Span {
        Span {
            start: self.discarded + self.start,
            end: self.discarded + self.cursor,
        }
    }

    /// Discards everything buffered. `at_end` is kept.
    pub fn flush(&mut self) {
        self.discarded += self.content.len();
        self.content.clear();
        self.start = 0;
        self.cursor = 0;
        self.last_match_end = 0;
        self.matched_rule = None;
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
    pub fn len(&self) -> usize {
        self.content.len()
    }
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
    pub fn start(&self) -> usize {
        self.start
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn last_match_end(&self) -> usize {
        self.last_match_end
    }
    pub fn matched_rule(&self) -> Option<RuleId> {
        self.matched_rule
    }
    pub fn at_end(&self) -> bool {
        self.at_end
    }

    /// Absolute offset of `start`.
    pub fn start_offset(&self) -> usize {
        self.discarded + self.start
    }
    /// Absolute offset of `cursor`.
    pub fn cursor_offset(&self) -> usize {
        self.discarded + self.cursor
    }

    /// Everything buffered has been consumed and no more input will come.
    pub fn is_drained(&self) -> bool {
        self.at_end && self.cursor == self.content.len()
    }

    /// Drops bytes before `start`; positions shift, absolute offsets do not.
    fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        self.content.drain(..self.start);
        self.discarded += self.start;
        self.cursor -= self.start;
        self.last_match_end -= self.start;
        self.start = 0;
    }
}

impl<S: Refill> ScanBuffer<S> {
    /// Asks the source for more input.
    ///
    /// Fails with [`ScanError::BufferExhausted`] once the buffer is at end;
    /// `content` and `at_end` are left as they were.
    pub fn request_refill(&mut self) -> Result<(), ScanError> {
        if self.at_end {
            return Err(ScanError::BufferExhausted {
                offset: self.cursor_offset(),
            });
        }
        self.compact();
        let appended = self
            .source
            .refill(&mut self.content)
            .map_err(ScanError::Source)?;
        if appended == 0 {
            self.at_end = true;
        }
        Ok(())
    }

    /// Discards one symbol at the cursor and starts a fresh session after it.
    /// Returns `false` when there was nothing left to discard.
    pub fn skip_symbol(&mut self) -> Result<bool, ScanError> {
        self.begin_token();
        if self.cursor == self.content.len() && !self.at_end {
            self.request_refill()?;
        }
        if self.cursor == self.content.len() {
            return Ok(false);
        }
        self.cursor += 1;
        self.begin_token();
        Ok(true)
    }
}
