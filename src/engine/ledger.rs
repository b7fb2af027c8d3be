//! Wager ledger: placement, stacking, undo and repeat.
//!
//! Every operation checks all of its preconditions before touching the
//! session, so a rejected call leaves the session exactly as it was. The
//! `try_*` forms report why; the plain forms collapse that to a `bool` for
//! UI callers that only need to know whether to play a "denied" cue.

use crate::engine::layout;
use crate::engine::pocket::Pocket;
use crate::engine::types::{Bet, BetCategory, Phase, Session};
use crate::errors::WagerError;
use std::collections::BTreeSet;

impl Session {
    /// Sum of all active wagers.
    pub fn total_active_wager(&self) -> u64 {
        self.active_bets.iter().map(|bet| bet.amount).sum()
    }

    /// Balance not yet committed to active bets.
    pub fn available_balance(&self) -> u64 {
        self.balance.saturating_sub(self.total_active_wager())
    }

    /// Zero balance with nothing left on the table.
    pub fn is_bankrupt(&self) -> bool {
        self.balance == 0 && self.active_bets.is_empty()
    }

    fn ensure_betting(&self) -> Result<(), WagerError> {
        if self.phase != Phase::Betting {
            return Err(WagerError::BettingClosed(self.phase));
        }
        Ok(())
    }

    /// Adds `amount` to the bet on this spot, or appends a new bet, and
    /// records the placement for undo.
    fn stack(&mut self, category: BetCategory, targets: BTreeSet<Pocket>, amount: u64) {
        self.placements.push(Bet {
            category,
            targets: targets.clone(),
            amount,
        });
        match self
            .active_bets
            .iter_mut()
            .find(|bet| bet.same_spot(category, &targets))
        {
            Some(existing) => existing.amount += amount,
            None => self.active_bets.push(Bet {
                category,
                targets,
                amount,
            }),
        }
    }

    pub fn select_chip(&mut self, chip: u64) -> Result<(), WagerError> {
        if chip == 0 {
            return Err(WagerError::InvalidChip);
        }
        self.selected_chip = chip;
        Ok(())
    }

    /// Place one chip of the selected denomination on a spot.
    pub fn try_place_bet(
        &mut self,
        category: BetCategory,
        targets: impl IntoIterator<Item = Pocket>,
    ) -> Result<(), WagerError> {
        self.ensure_betting()?;

        let targets: BTreeSet<Pocket> = targets.into_iter().collect();
        if !layout::is_valid_spot(category, &targets, self.wheel) {
            return Err(WagerError::InvalidTargets(category));
        }

        let available = self.available_balance();
        if self.selected_chip > available {
            return Err(WagerError::InsufficientFunds {
                required: self.selected_chip,
                available,
            });
        }

        self.stack(category, targets, self.selected_chip);
        Ok(())
    }

    pub fn place_bet(&mut self, category: BetCategory, targets: impl IntoIterator<Item = Pocket>) -> bool {
        self.try_place_bet(category, targets).is_ok()
    }

    /// Place a chip on an even-money bet; its targets are implied by the category.
    pub fn place_outside_bet(&mut self, category: BetCategory) -> bool {
        match layout::outside_targets(category) {
            Some(targets) => self.place_bet(category, targets),
            None => false,
        }
    }

    /// Empties the active bets. No-op outside the betting phase.
    pub fn clear_bets(&mut self) -> bool {
        if self.ensure_betting().is_err() {
            return false;
        }
        self.active_bets.clear();
        self.placements.clear();
        true
    }

    /// Takes back the most recent placement.
    ///
    /// A stacked bet loses only the chips of that placement; the bet itself
    /// goes once nothing is left on it. Returns the chips taken back.
    pub fn try_undo_last_bet(&mut self) -> Result<Bet, WagerError> {
        self.ensure_betting()?;
        let placement = self.placements.pop().ok_or(WagerError::NoBets)?;
        if let Some(index) = self
            .active_bets
            .iter()
            .position(|bet| bet.same_spot(placement.category, &placement.targets))
        {
            let bet = &mut self.active_bets[index];
            bet.amount = bet.amount.saturating_sub(placement.amount);
            if bet.amount == 0 {
                self.active_bets.remove(index);
            }
        }
        Ok(placement)
    }

    pub fn undo_last_bet(&mut self) -> bool {
        self.try_undo_last_bet().is_ok()
    }

    /// Removes one specific bet regardless of when it was placed.
    pub fn remove_bet(
        &mut self,
        category: BetCategory,
        targets: impl IntoIterator<Item = Pocket>,
    ) -> Result<Bet, WagerError> {
        self.ensure_betting()?;
        let targets: BTreeSet<Pocket> = targets.into_iter().collect();
        let index = self
            .active_bets
            .iter()
            .position(|bet| bet.same_spot(category, &targets))
            .ok_or(WagerError::BetNotFound(category))?;
        self.placements
            .retain(|placement| !placement.same_spot(category, &targets));
        Ok(self.active_bets.remove(index))
    }

    /// Re-applies the previous round's bets at their historical amounts.
    ///
    /// All or nothing: if the whole previous round does not fit in the
    /// available balance, nothing is placed.
    pub fn try_repeat_bets(&mut self) -> Result<(), WagerError> {
        self.ensure_betting()?;
        if self.last_round_bets.is_empty() {
            return Err(WagerError::NoHistory);
        }

        let required: u64 = self.last_round_bets.iter().map(|bet| bet.amount).sum();
        let available = self.available_balance();
        if required > available {
            return Err(WagerError::InsufficientFunds { required, available });
        }

        let previous = self.last_round_bets.clone();
        for bet in previous {
            self.stack(bet.category, bet.targets, bet.amount);
        }
        Ok(())
    }

    pub fn repeat_bets(&mut self) -> bool {
        self.try_repeat_bets().is_ok()
    }

    /// Drops the settled bets once the result has been presented.
    pub(crate) fn finish_round(&mut self) {
        self.active_bets.clear();
        self.placements.clear();
    }
}
