//! Cumulative table statistics.

use crate::engine::controller::RoundReport;
use crate::engine::pocket::Pocket;
use crate::engine::types::BetCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub kind: StreakKind,
    pub length: u32,
}

/// Running totals across every settled round of a game.
///
/// A round is a win when it returned more than was wagered, a loss when it
/// returned less and a push otherwise. Pushes leave the current streak as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableStats {
    pub rounds: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub total_wagered: u64,
    pub total_returned: u64,
    pub biggest_win: u64,
    pub current_streak: Option<Streak>,
    pub longest_win_streak: u32,
    pub longest_loss_streak: u32,
    /// Straight-up bets per pocket, keyed by pocket label ("00" for double zero)
    pub number_bets: BTreeMap<String, u64>,
    /// Times each pocket came up
    pub outcomes: BTreeMap<String, u64>,
}

impl TableStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &RoundReport) {
        let wagered = report.total_wagered();
        let returned = report.total_win();

        self.rounds += 1;
        self.total_wagered = self.total_wagered.saturating_add(wagered);
        self.total_returned = self.total_returned.saturating_add(returned);
        self.biggest_win = self.biggest_win.max(returned.saturating_sub(wagered));

        if returned > wagered {
            self.wins += 1;
            self.extend_streak(StreakKind::Win);
        } else if returned < wagered {
            self.losses += 1;
            self.extend_streak(StreakKind::Loss);
        } else {
            self.pushes += 1;
        }

        for bet in report.bets().filter(|bet| bet.category == BetCategory::Straight) {
            for pocket in &bet.targets {
                *self.number_bets.entry(pocket.to_string()).or_default() += 1;
            }
        }
        *self.outcomes.entry(report.outcome.to_string()).or_default() += 1;
    }

    fn extend_streak(&mut self, kind: StreakKind) {
        let length = match self.current_streak {
            Some(streak) if streak.kind == kind => streak.length + 1,
            _ => 1,
        };
        self.current_streak = Some(Streak { kind, length });

        let longest = match kind {
            StreakKind::Win => &mut self.longest_win_streak,
            StreakKind::Loss => &mut self.longest_loss_streak,
        };
        *longest = (*longest).max(length);
    }

    /// Share of wagered chips paid back, if anything was wagered.
    pub fn return_to_player(&self) -> Option<f64> {
        (self.total_wagered > 0).then(|| self.total_returned as f64 / self.total_wagered as f64)
    }

    pub fn net(&self) -> i128 {
        self.total_returned as i128 - self.total_wagered as i128
    }

    pub fn outcome_count(&self, pocket: Pocket) -> u64 {
        self.outcomes.get(&pocket.to_string()).copied().unwrap_or(0)
    }

    /// Most-backed straight-up pocket and how often it was backed.
    pub fn favorite_number(&self) -> Option<(&str, u64)> {
        self.number_bets
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(label, count)| (label.as_str(), *count))
    }

    /// Most frequent outcome so far.
    pub fn hottest_pocket(&self) -> Option<(&str, u64)> {
        self.outcomes
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(label, count)| (label.as_str(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolver::resolve;
    use crate::engine::types::Bet;
    use chrono::Utc;
    use uuid::Uuid;

    fn round(bets: &[Bet], outcome: Pocket) -> RoundReport {
        RoundReport {
            round_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            outcome,
            color: outcome.color(),
            settlement: resolve(bets, 1000, outcome),
        }
    }

    fn straight(n: u8, amount: u64) -> Bet {
        Bet::new(BetCategory::Straight, [Pocket::Number(n)], amount)
    }

    #[test]
    fn test_streaks() {
        let mut stats = TableStats::new();
        let bet = [straight(7, 10)];
        for outcome in [7, 7, 1, 2, 3, 7] {
            stats.record(&round(&bet, Pocket::Number(outcome)));
        }

        assert_eq!(stats.rounds, 6);
        assert_eq!(stats.wins, 3);
        assert_eq!(stats.losses, 3);
        assert_eq!(stats.longest_win_streak, 2);
        assert_eq!(stats.longest_loss_streak, 3);
        assert_eq!(
            stats.current_streak,
            Some(Streak {
                kind: StreakKind::Win,
                length: 1
            })
        );
        assert_eq!(stats.biggest_win, 350);
        assert_eq!(stats.outcome_count(Pocket::Number(7)), 3);
        assert_eq!(stats.favorite_number(), Some(("7", 6)));
        assert_eq!(stats.hottest_pocket(), Some(("7", 3)));
    }

    #[test]
    fn test_push_keeps_streak() {
        // Red and black together on a red number: 10 back on 10 wagered
        let bets = [
            Bet::new(BetCategory::Red, crate::engine::layout::outside_targets(BetCategory::Red).unwrap(), 5),
            Bet::new(BetCategory::Black, crate::engine::layout::outside_targets(BetCategory::Black).unwrap(), 5),
        ];
        let mut stats = TableStats::new();
        stats.record(&round(&[straight(1, 5)], Pocket::Number(2)));
        stats.record(&round(&bets, Pocket::Number(1)));

        assert_eq!(stats.pushes, 1);
        assert_eq!(
            stats.current_streak,
            Some(Streak {
                kind: StreakKind::Loss,
                length: 1
            })
        );
        assert_eq!(stats.return_to_player(), Some(10.0 / 15.0));
        assert_eq!(stats.net(), -5);
    }

    #[test]
    fn test_empty_stats() {
        let stats = TableStats::new();
        assert_eq!(stats.return_to_player(), None);
        assert_eq!(stats.favorite_number(), None);
        assert_eq!(stats.outcome_count(Pocket::DoubleZero), 0);
    }
}
