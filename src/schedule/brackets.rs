//! Fixed-premium bracket table for policy amounts between the minimum
//! threshold and the table's upper bound

use serde::{Deserialize, Serialize};

/// Width of one bracket in dollars
pub const BRACKET_INCREMENT: u64 = 500;

/// Premium lookup by breakpoint, amounts rounded up to the next $500
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTable {
    /// (breakpoint, premium) pairs, ascending by breakpoint
    entries: Vec<(u64, f64)>,
}

impl BracketTable {
    /// Create from (breakpoint, premium) pairs. Order is checked by
    /// `RateSchedule::validate`, not here.
    pub fn from_entries(entries: &[(u64, f64)]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    pub fn entries(&self) -> &[(u64, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest breakpoint in the table (0 when empty)
    pub fn upper_bound(&self) -> u64 {
        self.entries.last().map(|(b, _)| *b).unwrap_or(0)
    }

    /// Premium of the highest bracket
    pub fn top_premium(&self) -> Option<f64> {
        self.entries.last().map(|(_, p)| *p)
    }

    /// Breakpoint that prices `amount`: the amount rounded up to the next
    /// increment, capped at the table's maximum key
    pub fn breakpoint_for(&self, amount: f64) -> u64 {
        let increment = BRACKET_INCREMENT as f64;
        let rounded = (amount / increment).ceil() * increment;
        let upper = self.upper_bound();
        if rounded >= upper as f64 {
            upper
        } else {
            rounded as u64
        }
    }

    /// Exact lookup of a breakpoint
    pub fn get(&self, breakpoint: u64) -> Option<f64> {
        self.entries
            .binary_search_by_key(&breakpoint, |(b, _)| *b)
            .ok()
            .map(|idx| self.entries[idx].1)
    }
}
