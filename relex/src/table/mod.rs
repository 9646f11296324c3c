//! The flattened scanner table handed off to code emitters.
//!
//! Row 0 is the reserved error row: every cell holds [ERROR_SENTINEL]. The
//! `i`-th DFA state occupies row `i + 1`, and a cell holds `target + 1` when
//! the state has a transition on that column's ASCII code, or `0` when it
//! has none. Cell values and row indices share one numbering, so
//! `next_state` can be chained directly.

use crate::dfa::Dfa;
use crate::nfa::Anchor;

/// Columns per row: one per ASCII code `0..=126`.
pub const ASCII_COLUMNS: usize = 127;

/// Fills every cell of the reserved error row.
pub const ERROR_SENTINEL: i16 = -1;

/// A dense `(states + 1) x 127` next-state table, with per-row acceptance
/// and anchor data surfaced for the emitter.
#[derive(Clone, Debug)]
pub struct TransitionTable {
    rows: Vec<[i16; ASCII_COLUMNS]>,
    accepting: Vec<bool>,
    anchors: Vec<Anchor>,
    start_row: usize,
}

impl TransitionTable {
    pub(crate) fn new(dfa: &Dfa) -> Self {
        let mut rows = vec![[ERROR_SENTINEL; ASCII_COLUMNS]];
        let mut accepting = vec![false];
        let mut anchors = vec![Anchor::NONE];
        for (index, state) in dfa.states().iter().enumerate() {
            let mut row = [0i16; ASCII_COLUMNS];
            for (code, cell) in row.iter_mut().enumerate() {
                if let Some(target) = dfa.goto_on(index, code as u8) {
                    *cell = target as i16 + 1;
                }
            }
            rows.push(row);
            accepting.push(state.is_accepting());
            anchors.push(state.anchor());
        }
        TransitionTable {
            rows,
            accepting,
            anchors,
            start_row: dfa.start_index() + 1,
        }
    }

    /// The row of the DFA's start state.
    pub fn start_row(&self) -> usize {
        self.start_row
    }

    /// Number of real states (the error row is not counted).
    pub fn num_states(&self) -> usize {
        self.rows.len() - 1
    }

    /// `rows[row][c]`: the next row on `c`, `0` for no transition, or
    /// [ERROR_SENTINEL] in the error row.
    pub fn next_state(&self, row: usize, c: u8) -> i16 {
        self.rows[row][c as usize]
    }

    pub fn is_accepting(&self, row: usize) -> bool {
        self.accepting[row]
    }

    pub fn anchor(&self, row: usize) -> Anchor {
        self.anchors[row]
    }

    /// All rows, error row included, for emitters that dump the table
    /// verbatim.
    pub fn rows(&self) -> &[[i16; ASCII_COLUMNS]] {
        self.rows.as_slice()
    }
}
