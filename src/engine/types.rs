use crate::engine::pocket::{Pocket, WheelKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Starting bankroll for a fresh game.
pub const DEFAULT_BALANCE: u64 = 1000;

/// Chip selected when a session starts.
pub const DEFAULT_CHIP: u64 = 5;

/// Roulette bet categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetCategory {
    Straight,
    Split,
    Street,
    Corner,
    SixLine,
    Column,
    Dozen,
    Red,
    Black,
    Odd,
    Even,
    Low,
    High,
}

impl BetCategory {
    pub const ALL: [BetCategory; 13] = [
        BetCategory::Straight,
        BetCategory::Split,
        BetCategory::Street,
        BetCategory::Corner,
        BetCategory::SixLine,
        BetCategory::Column,
        BetCategory::Dozen,
        BetCategory::Red,
        BetCategory::Black,
        BetCategory::Odd,
        BetCategory::Even,
        BetCategory::Low,
        BetCategory::High,
    ];

    /// Profit paid per unit wagered (excludes the returned stake).
    pub fn payout_ratio(self) -> u64 {
        match self {
            BetCategory::Straight => 35,
            BetCategory::Split => 17,
            BetCategory::Street => 11,
            BetCategory::Corner => 8,
            BetCategory::SixLine => 5,
            BetCategory::Column | BetCategory::Dozen => 2,
            BetCategory::Red
            | BetCategory::Black
            | BetCategory::Odd
            | BetCategory::Even
            | BetCategory::Low
            | BetCategory::High => 1,
        }
    }

    /// Even-money bets decided by a predicate on the outcome. Zeros lose all of them.
    pub fn is_outside(self) -> bool {
        matches!(
            self,
            BetCategory::Red
                | BetCategory::Black
                | BetCategory::Odd
                | BetCategory::Even
                | BetCategory::Low
                | BetCategory::High
        )
    }
}

impl fmt::Display for BetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BetCategory::Straight => "straight",
            BetCategory::Split => "split",
            BetCategory::Street => "street",
            BetCategory::Corner => "corner",
            BetCategory::SixLine => "sixline",
            BetCategory::Column => "column",
            BetCategory::Dozen => "dozen",
            BetCategory::Red => "red",
            BetCategory::Black => "black",
            BetCategory::Odd => "odd",
            BetCategory::Even => "even",
            BetCategory::Low => "low",
            BetCategory::High => "high",
        };
        write!(f, "{}", name)
    }
}

/// A single wager on the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub category: BetCategory,
    pub targets: BTreeSet<Pocket>,
    pub amount: u64,
}

impl Bet {
    pub fn new(category: BetCategory, targets: impl IntoIterator<Item = Pocket>, amount: u64) -> Self {
        Self {
            category,
            targets: targets.into_iter().collect(),
            amount,
        }
    }

    /// Ledger de-duplication key: same category on the same pockets.
    pub fn same_spot(&self, category: BetCategory, targets: &BTreeSet<Pocket>) -> bool {
        self.category == category && &self.targets == targets
    }
}

/// Table phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Betting,
    Spinning,
    Result,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Betting => write!(f, "betting"),
            Phase::Spinning => write!(f, "spinning"),
            Phase::Result => write!(f, "result"),
        }
    }
}

/// Player state for one game at one table.
///
/// Fields are only reachable through the ledger and resolver so the
/// balance/phase invariants cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub(crate) wheel: WheelKind,
    pub(crate) balance: u64,
    pub(crate) active_bets: Vec<Bet>,
    /// Every chip stack added to `active_bets`, oldest first; undo pops from here
    #[serde(default)]
    pub(crate) placements: Vec<Bet>,
    pub(crate) last_round_bets: Vec<Bet>,
    pub(crate) selected_chip: u64,
    pub(crate) phase: Phase,
    pub(crate) last_outcome: Option<Pocket>,
    pub(crate) last_win_amount: u64,
}

impl Session {
    /// Create a session with an externally supplied starting balance.
    pub fn new(wheel: WheelKind, initial_balance: u64) -> Self {
        Self {
            wheel,
            balance: initial_balance,
            active_bets: Vec::new(),
            placements: Vec::new(),
            last_round_bets: Vec::new(),
            selected_chip: DEFAULT_CHIP,
            phase: Phase::Betting,
            last_outcome: None,
            last_win_amount: 0,
        }
    }

    pub fn with_default_balance(wheel: WheelKind) -> Self {
        Self::new(wheel, DEFAULT_BALANCE)
    }

    pub fn wheel(&self) -> WheelKind {
        self.wheel
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn active_bets(&self) -> &[Bet] {
        &self.active_bets
    }

    pub fn last_round_bets(&self) -> &[Bet] {
        &self.last_round_bets
    }

    pub fn selected_chip(&self) -> u64 {
        self.selected_chip
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_outcome(&self) -> Option<Pocket> {
        self.last_outcome
    }

    pub fn last_win_amount(&self) -> u64 {
        self.last_win_amount
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_ratios() {
        assert_eq!(BetCategory::Straight.payout_ratio(), 35);
        assert_eq!(BetCategory::Split.payout_ratio(), 17);
        assert_eq!(BetCategory::Street.payout_ratio(), 11);
        assert_eq!(BetCategory::Corner.payout_ratio(), 8);
        assert_eq!(BetCategory::SixLine.payout_ratio(), 5);
        assert_eq!(BetCategory::Column.payout_ratio(), 2);
        assert_eq!(BetCategory::Dozen.payout_ratio(), 2);
        let even_money = BetCategory::ALL.iter().filter(|c| c.payout_ratio() == 1).count();
        assert_eq!(even_money, 6);
    }

    #[test]
    fn test_target_order_is_irrelevant() {
        let a = Bet::new(BetCategory::Split, [Pocket::Number(1), Pocket::Number(2)], 5);
        let b = Bet::new(BetCategory::Split, [Pocket::Number(2), Pocket::Number(1)], 5);
        assert_eq!(a, b);
        assert!(a.same_spot(BetCategory::Split, &b.targets));
        assert!(!a.same_spot(BetCategory::Straight, &b.targets));
    }

    #[test]
    fn test_new_session_defaults() {
        let session = Session::with_default_balance(WheelKind::European);
        assert_eq!(session.balance(), DEFAULT_BALANCE);
        assert_eq!(session.phase(), Phase::Betting);
        assert_eq!(session.selected_chip(), DEFAULT_CHIP);
        assert!(session.active_bets().is_empty());
        assert_eq!(session.last_outcome(), None);
    }
}
