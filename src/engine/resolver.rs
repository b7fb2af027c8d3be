//! Payout resolver.
//!
//! `resolve` is a pure function of `(bets, balance, outcome)`; `settle`
//! applies its result to a session.

use crate::engine::pocket::{is_red, Pocket};
use crate::engine::types::{Bet, BetCategory, Session};
use serde::{Deserialize, Serialize};

/// Outcome of a single bet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetOutcome {
    pub bet: Bet,
    pub won: bool,
    /// Stake plus profit for winners, zero for losers
    pub returned: u64,
}

/// Full breakdown of a settled round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub outcome: Pocket,
    pub bets: Vec<BetOutcome>,
    pub total_wagered: u64,
    pub total_win: u64,
    pub new_balance: u64,
}

impl Settlement {
    /// Round profit relative to the amount wagered; negative on a net loss.
    pub fn net(&self) -> i128 {
        self.total_win as i128 - self.total_wagered as i128
    }
}

/// Check if a bet wins for a given outcome.
pub fn bet_wins(bet: &Bet, outcome: Pocket) -> bool {
    if !bet.category.is_outside() {
        return bet.targets.contains(&outcome);
    }

    // Zeros lose every even-money bet
    let Some(number) = outcome.value() else {
        return false;
    };

    match bet.category {
        BetCategory::Red => is_red(number),
        BetCategory::Black => !is_red(number),
        BetCategory::Odd => number % 2 == 1,
        BetCategory::Even => number % 2 == 0,
        BetCategory::Low => number <= 18,
        BetCategory::High => number >= 19,
        _ => false,
    }
}

/// Stake plus profit for a winning bet.
pub fn winning_return(bet: &Bet) -> u64 {
    bet.amount.saturating_add(bet.amount.saturating_mul(bet.category.payout_ratio()))
}

/// Evaluates every bet against `outcome`.
///
/// `outcome` is expected to be a pocket of the wheel the bets were placed on.
/// Anything else matches no inside bet and loses every outside bet.
pub fn resolve(bets: &[Bet], balance: u64, outcome: Pocket) -> Settlement {
    let outcomes: Vec<BetOutcome> = bets
        .iter()
        .map(|bet| {
            let won = bet_wins(bet, outcome);
            BetOutcome {
                bet: bet.clone(),
                won,
                returned: if won { winning_return(bet) } else { 0 },
            }
        })
        .collect();

    let total_wagered: u64 = bets.iter().map(|bet| bet.amount).sum();
    let total_win: u64 = outcomes.iter().map(|o| o.returned).sum();
    // Placement keeps wagers within the balance; the clamp only guards against misuse.
    let new_balance = balance.saturating_sub(total_wagered).saturating_add(total_win);

    Settlement {
        outcome,
        bets: outcomes,
        total_wagered,
        total_win,
        new_balance,
    }
}

/// Pays or forfeits every active bet and records the round on the session.
///
/// Active bets stay in place; the controller clears them after the result
/// has been presented.
pub fn settle_round(session: &mut Session, outcome: Pocket) -> Settlement {
    debug_assert!(
        session.wheel.contains(outcome),
        "outcome {} is not on the {} wheel",
        outcome,
        session.wheel
    );
    let settlement = resolve(&session.active_bets, session.balance, outcome);
    session.balance = settlement.new_balance;
    session.last_round_bets = session.active_bets.clone();
    session.last_outcome = Some(outcome);
    session.last_win_amount = settlement.total_win;
    settlement
}

/// Settles the round and returns the total amount paid back.
pub fn settle(session: &mut Session, outcome: Pocket) -> u64 {
    settle_round(session, outcome).total_win
}
