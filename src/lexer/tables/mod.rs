// src/lexer/tables/mod.rs
pub mod build;
pub mod dfa;
pub mod io;
pub mod tokens;

// Re-exports to keep the external API flat.
pub use build::TableBuilder;
pub use dfa::build_sample_tables;
pub use io::{
    PackedTables,
    load_packed_tables,
    load_tables_bin_bytes,
    load_tables_json_bytes,
    save_tables_bin,
    save_tables_json,
};
pub use tokens::TokenKind;

use crate::lexer::error::TableError;

/// Automaton state index.
pub type StateId = u32;
/// Rule identifier written into `backtrack` by the table generator.
pub type RuleId = u32;

/// Reserved "absent" entry in `default`, `backtrack`, `check` and `base`.
pub const NONE: u32 = u32::MAX;
/// Symbol value reserved for end of input.
pub const EOI: u32 = 256;
/// Number of distinct symbols (all bytes plus `EOI`).
pub const N_SYMBOLS: usize = 257;

/// Comb-compressed transition tables for one grammar.
///
/// `check[base[s] + c] == s` marks an explicit edge `s --c--> transition[base[s] + c]`.
/// States without an edge for `c` fall back along `default` without consuming
/// input. Immutable once built; the stepper only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTableSet {
    base: Vec<u32>,
    default: Vec<u32>,
    check: Vec<u32>,
    transition: Vec<u32>,
    backtrack: Vec<u32>,
    rule_count: u32,
}

impl TransitionTableSet {
    /// Validates the five arrays and wraps them.
    pub fn new(
        base: Vec<u32>,
        default: Vec<u32>,
        check: Vec<u32>,
        transition: Vec<u32>,
        backtrack: Vec<u32>,
    ) -> Result<Self, TableError> {
        let n_states = base.len();
        if n_states == 0 {
            return Err(TableError::Empty);
        }
        expect_len("default", n_states, default.len())?;
        expect_len("backtrack", n_states, backtrack.len())?;
        expect_len("transition", check.len(), transition.len())?;

        // `NONE` itself must never be a real state id.
        if n_states >= NONE as usize {
            return Err(TableError::StateOutOfRange {
                table: "base",
                index: n_states - 1,
                value: NONE,
                n_states,
            });
        }

        check_states("default", &default, n_states, |_, v| v != NONE)?;
        check_states("check", &check, n_states, |_, v| v != NONE)?;
        // Only slots owned by some state are ever read.
        check_states("transition", &transition, n_states, |i, _| check[i] != NONE)?;
        check_default_chains(&default)?;

        let rule_count = backtrack
            .iter()
            .filter(|&&r| r != NONE)
            .max()
            .map_or(0, |&r| r + 1);

        Ok(Self {
            base,
            default,
            check,
            transition,
            backtrack,
            rule_count,
        })
    }

    pub fn n_states(&self) -> usize {
        self.base.len()
    }

    /// Number of slots in `check`/`transition`.
    pub fn n_slots(&self) -> usize {
        self.check.len()
    }

    /// One past the largest rule id any accepting state reports.
    pub fn rule_count(&self) -> u32 {
        self.rule_count
    }

    pub fn base(&self) -> &[u32] {
        &self.base
    }
    pub fn default(&self) -> &[u32] {
        &self.default
    }
    pub fn check(&self) -> &[u32] {
        &self.check
    }
    pub fn transition(&self) -> &[u32] {
        &self.transition
    }
    pub fn backtrack(&self) -> &[u32] {
        &self.backtrack
    }

    /// Explicit edge of `state` on `symbol`, if the comb has one.
    ///
    /// Panics if `state` is not a state of this set.
    #[inline]
    pub fn lookup(&self, state: StateId, symbol: u32) -> Option<StateId> {
        let base = self.base[state as usize];
        if base == NONE {
            return None;
        }
        let idx = (base as usize).checked_add(symbol as usize)?;
        (self.check.get(idx) == Some(&state)).then(|| self.transition[idx])
    }

    /// Next state of the `default` chain.
    #[inline]
    pub fn fallback(&self, state: StateId) -> Option<StateId> {
        let d = self.default[state as usize];
        (d != NONE).then_some(d)
    }

    /// Rule matched by reaching `state`, or `None` for non-accepting states.
    #[inline]
    pub fn accepts(&self, state: StateId) -> Option<RuleId> {
        let r = self.backtrack[state as usize];
        (r != NONE).then_some(r)
    }

    /// Resolves `symbol` from `state`, following `default` without consuming.
    #[inline]
    pub fn resolve(&self, mut state: StateId, symbol: u32) -> Option<StateId> {
        loop {
            if let Some(next) = self.lookup(state, symbol) {
                return Some(next);
            }
            state = self.fallback(state)?;
        }
    }
}

fn expect_len(table: &'static str, expected: usize, found: usize) -> Result<(), TableError> {
    if expected != found {
        return Err(TableError::LengthMismatch {
            table,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_states(
    table: &'static str,
    values: &[u32],
    n_states: usize,
    relevant: impl Fn(usize, u32) -> bool,
) -> Result<(), TableError> {
    for (index, &value) in values.iter().enumerate() {
        if relevant(index, value) && value as usize >= n_states {
            return Err(TableError::StateOutOfRange {
                table,
                index,
                value,
                n_states,
            });
        }
    }
    Ok(())
}

/// Rejects cyclic `default` chains. Entries must already be in range.
fn check_default_chains(default: &[u32]) -> Result<(), TableError> {
    const UNSEEN: u8 = 0;
    const ON_CHAIN: u8 = 1;
    const DONE: u8 = 2;

    let mut mark = vec![UNSEEN; default.len()];
    for s in 0..default.len() {
        let mut cur = s;
        loop {
            match mark[cur] {
                DONE => break,
                ON_CHAIN => return Err(TableError::DefaultCycle { state: s as u32 }),
                _ => {}
            }
            mark[cur] = ON_CHAIN;
            match default[cur] {
                NONE => break,
                d => cur = d as usize,
            }
        }

        let mut cur = s;
        while mark[cur] == ON_CHAIN {
            mark[cur] = DONE;
            match default[cur] {
                NONE => break,
                d => cur = d as usize,
            }
        }
    }
    Ok(())
}
