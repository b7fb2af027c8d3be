//! Recent results, newest first.

use crate::engine::controller::RoundReport;
use crate::engine::pocket::{Pocket, PocketColor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub round_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub outcome: Pocket,
    pub color: PocketColor,
    pub total_wagered: u64,
    pub total_win: u64,
}

impl From<&RoundReport> for HistoryEntry {
    fn from(report: &RoundReport) -> Self {
        Self {
            round_id: report.round_id,
            timestamp: report.timestamp,
            outcome: report.outcome,
            color: report.color,
            total_wagered: report.total_wagered(),
            total_win: report.total_win(),
        }
    }
}

/// Bounded log of recent rounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundHistory {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl RoundHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a settled round, evicting the oldest entry when full.
    pub fn record(&mut self, report: &RoundReport) {
        self.push(HistoryEntry::from(report));
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Outcomes of the last `n` rounds, newest first.
    pub fn recent_outcomes(&self, n: usize) -> Vec<Pocket> {
        self.entries.iter().take(n).map(|entry| entry.outcome).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for RoundHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(outcome: u8) -> HistoryEntry {
        let pocket = Pocket::Number(outcome);
        HistoryEntry {
            round_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            outcome: pocket,
            color: pocket.color(),
            total_wagered: 10,
            total_win: 0,
        }
    }

    #[test]
    fn test_newest_first_and_capped() {
        let mut history = RoundHistory::new(3);
        for outcome in 1..=5 {
            history.push(entry(outcome));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(
            history.recent_outcomes(10),
            vec![Pocket::Number(5), Pocket::Number(4), Pocket::Number(3)]
        );
        assert_eq!(history.latest().map(|e| e.outcome), Some(Pocket::Number(5)));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut history = RoundHistory::new(0);
        history.push(entry(1));
        history.push(entry(2));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.recent_outcomes(5), vec![Pocket::Number(2)]);
    }

    #[test]
    fn test_clear() {
        let mut history = RoundHistory::default();
        history.push(entry(9));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
    }
}
