// src/lexer/tables/build.rs
// Packs hand-declared automata into the comb layout the stepper reads.
// No pattern compilation happens here: callers name states and edges directly.

use hashbrown::HashMap;

use super::{EOI, NONE, RuleId, StateId, TransitionTableSet};
use crate::lexer::error::TableError;

#[derive(Clone, Default)]
struct StateSpec {
    edges: HashMap<u32, StateId>, // symbol -> target
    default: Option<StateId>,
    accept: Option<RuleId>,
}

/// Incremental description of an automaton, packed by [`TableBuilder::build`].
#[derive(Clone, Default)]
pub struct TableBuilder {
    states: Vec<StateSpec>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with `n` fresh states numbered `0..n`.
    pub fn with_states(n: usize) -> Self {
        Self {
            states: vec![StateSpec::default(); n],
        }
    }

    pub fn add_state(&mut self) -> StateId {
        self.states.push(StateSpec::default());
        (self.states.len() - 1) as StateId
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// Explicit edge on one symbol (a byte, or [`EOI`]). Later edges overwrite earlier ones.
    pub fn edge(&mut self, from: StateId, symbol: u32, to: StateId) -> &mut Self {
        self.spec(from).edges.insert(symbol, to);
        self
    }

    pub fn edges(&mut self, from: StateId, bytes: &[u8], to: StateId) -> &mut Self {
        for &b in bytes {
            self.edge(from, b as u32, to);
        }
        self
    }

    pub fn edge_range(&mut self, from: StateId, lo: u8, hi: u8, to: StateId) -> &mut Self {
        for b in lo..=hi {
            self.edge(from, b as u32, to);
        }
        self
    }

    /// Edges on every byte except `except` (never on [`EOI`]).
    pub fn edges_except(&mut self, from: StateId, except: &[u8], to: StateId) -> &mut Self {
        for b in 0u8..=255 {
            if !except.contains(&b) {
                self.edge(from, b as u32, to);
            }
        }
        self
    }

    pub fn eoi_edge(&mut self, from: StateId, to: StateId) -> &mut Self {
        self.edge(from, EOI, to)
    }

    /// Fallback state tried (without consuming) when `from` has no edge.
    pub fn fallback(&mut self, from: StateId, to: StateId) -> &mut Self {
        self.spec(from).default = Some(to);
        self
    }

    pub fn accept(&mut self, state: StateId, rule: RuleId) -> &mut Self {
        self.spec(state).accept = Some(rule);
        self
    }

    fn spec(&mut self, state: StateId) -> &mut StateSpec {
        let idx = state as usize;
        if idx >= self.states.len() {
            self.states.resize_with(idx + 1, StateSpec::default);
        }
        &mut self.states[idx]
    }

    /// First-fit packing: densest rows are placed first, each at the lowest
    /// base whose slots are all free.
    pub fn build(&self) -> Result<TransitionTableSet, TableError> {
        let n = self.states.len();
        let mut rows: Vec<(StateId, Vec<(u32, StateId)>)> = Vec::with_capacity(n);
        for (s, spec) in self.states.iter().enumerate() {
            let mut row: Vec<(u32, StateId)> = spec.edges.iter().map(|(&c, &t)| (c, t)).collect();
            row.sort_unstable();
            if let Some(&(symbol, _)) = row.iter().find(|&&(c, _)| c > EOI) {
                return Err(TableError::SymbolOutOfRange {
                    state: s as u32,
                    symbol,
                });
            }
            rows.push((s as StateId, row));
        }
        rows.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));

        let mut base = vec![NONE; n];
        let mut check: Vec<u32> = Vec::new();
        let mut transition: Vec<u32> = Vec::new();

        for (state, row) in &rows {
            let Some(&(first, _)) = row.first() else {
                continue;
            };
            let mut b = 0usize;
            while !row.iter().all(|&(c, _)| slot_free(&check, b + c as usize)) {
                b += 1;
            }
            let span_end = b + row.last().map_or(first, |&(c, _)| c) as usize + 1;
            if check.len() < span_end {
                check.resize(span_end, NONE);
                transition.resize(span_end, NONE);
            }
            for &(c, target) in row {
                check[b + c as usize] = *state;
                transition[b + c as usize] = target;
            }
            base[*state as usize] = b as u32;
        }

        let default = self
            .states
            .iter()
            .map(|s| s.default.unwrap_or(NONE))
            .collect();
        let backtrack = self
            .states
            .iter()
            .map(|s| s.accept.unwrap_or(NONE))
            .collect();

        let tables = TransitionTableSet::new(base, default, check, transition, backtrack)?;
        log::debug!(
            "packed {} states into {} slots (dense would be {})",
            n,
            tables.n_slots(),
            n * super::N_SYMBOLS
        );
        Ok(tables)
    }
}

#[inline]
fn slot_free(check: &[u32], idx: usize) -> bool {
    check.get(idx).is_none_or(|&owner| owner == NONE)
}
