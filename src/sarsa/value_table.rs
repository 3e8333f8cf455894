//! Value table with per-entry eligibility traces

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Action, DiscreteState};

/// Estimated value and eligibility trace of one (state, action) pair.
///
/// Serialized as a `[value, eligibility]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct TraceEntry {
    pub value: f64,
    pub eligibility: f64,
}

impl TraceEntry {
    pub fn new(value: f64, eligibility: f64) -> Self {
        Self { value, eligibility }
    }
}

impl From<(f64, f64)> for TraceEntry {
    fn from((value, eligibility): (f64, f64)) -> Self {
        Self { value, eligibility }
    }
}

impl From<TraceEntry> for (f64, f64) {
    fn from(entry: TraceEntry) -> Self {
        (entry.value, entry.eligibility)
    }
}

/// Diagnostic counts over the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableStats {
    /// Stored (state, action) pairs
    pub entries: usize,
    /// Pairs whose value is not exactly zero
    pub nonzero_values: usize,
    /// Pairs whose eligibility is not exactly zero
    pub active_traces: usize,
}

/// Value table mapping (state, action) pairs to value and eligibility
///
/// Grows as pairs are first visited. Entries are never removed; a decayed
/// trace is clamped to zero instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    entries: HashMap<(DiscreteState, Action), TraceEntry>,
}

impl ValueTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored entry for a pair, if it has ever been visited
    pub fn get(&self, state: &DiscreteState, action: Action) -> Option<TraceEntry> {
        self.entries.get(&(state.clone(), action)).copied()
    }

    /// Value of a pair, reading an unseen pair as 0.0 without storing it
    pub fn value(&self, state: &DiscreteState, action: Action) -> f64 {
        self.get(state, action).map_or(0.0, |entry| entry.value)
    }

    /// Insert or overwrite the entry for a pair
    pub fn upsert(&mut self, state: DiscreteState, action: Action, entry: TraceEntry) {
        self.entries.insert((state, action), entry);
    }

    /// Record a visit: bump the pair's trace by 1.0, creating it if needed.
    ///
    /// Returns the pair's value as it was before the visit.
    pub fn visit(&mut self, state: &DiscreteState, action: Action) -> f64 {
        let entry = self.entries.entry((state.clone(), action)).or_default();
        entry.eligibility += 1.0;
        entry.value
    }

    /// Apply a TD error to every entry with a live trace.
    ///
    /// value += alpha * error * e, then e ← decay * e, and e is clamped to
    /// exactly 0.0 once it is at or below `cutoff`. Entries whose trace is
    /// already 0.0 are skipped. Returns the number of entries touched.
    pub fn sweep(&mut self, td_error: f64, alpha: f64, decay: f64, cutoff: f64) -> usize {
        let mut touched = 0;
        for entry in self.entries.values_mut() {
            if entry.eligibility == 0.0 {
                continue;
            }
            entry.value += alpha * td_error * entry.eligibility;
            let decayed = decay * entry.eligibility;
            entry.eligibility = if decayed > cutoff { decayed } else { 0.0 };
            touched += 1;
        }
        touched
    }

    /// Iterate over all stored pairs
    pub fn iter(&self) -> impl Iterator<Item = (&DiscreteState, Action, &TraceEntry)> {
        self.entries
            .iter()
            .map(|((state, action), entry)| (state, *action, entry))
    }

    /// Get total number of stored pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            entries: self.entries.len(),
            nonzero_values: self.entries.values().filter(|e| e.value != 0.0).count(),
            active_traces: self
                .entries
                .values()
                .filter(|e| e.eligibility != 0.0)
                .count(),
        }
    }
}

impl FromIterator<((DiscreteState, Action), TraceEntry)> for ValueTable {
    fn from_iter<I: IntoIterator<Item = ((DiscreteState, Action), TraceEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
