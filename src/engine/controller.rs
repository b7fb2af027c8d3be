//! Table controller: drives betting → spinning → result → betting.
//!
//! The controller is the single owner of the session and the scheduler.
//! Everything it learns is forwarded on a broadcast channel so renderers,
//! audio, history, stats and persistence can follow along without ever
//! feeding back into the round.

use crate::config::{validate, RouletteConfig, TableConfig};
use crate::engine::animation::WheelPose;
use crate::engine::pocket::{Pocket, PocketColor, WheelKind};
use crate::engine::resolver::{settle_round, Settlement};
use crate::engine::scheduler::SpinScheduler;
use crate::engine::types::{Bet, BetCategory, Phase, Session};
use crate::errors::{ConfigurationError, SpinError, TableError, WagerError};
use chrono::{DateTime, Utc};
use rand::{CryptoRng, RngCore};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Everything a collaborator needs to present or record a settled round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub outcome: Pocket,
    pub color: PocketColor,
    pub settlement: Settlement,
}

impl RoundReport {
    pub fn total_wagered(&self) -> u64 {
        self.settlement.total_wagered
    }

    pub fn total_win(&self) -> u64 {
        self.settlement.total_win
    }

    pub fn balance(&self) -> u64 {
        self.settlement.new_balance
    }

    pub fn bets(&self) -> impl Iterator<Item = &Bet> {
        self.settlement.bets.iter().map(|outcome| &outcome.bet)
    }
}

/// Notifications for external collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    PhaseChanged(Phase),
    BetsChanged { total: u64, count: usize },
    RoundSettled(Box<RoundReport>),
    /// Balance exhausted; the table stays halted until a new game
    Bankrupt,
    NewGame { balance: u64 },
}

pub struct TableController<R = OsRng> {
    config: TableConfig,
    session: Session,
    scheduler: SpinScheduler<R>,
    events: broadcast::Sender<TableEvent>,
    halted: bool,
}

impl TableController<OsRng> {
    /// Fresh game at the configured starting balance
    pub fn new(config: &RouletteConfig) -> Result<Self, ConfigurationError> {
        Self::with_balance(config, config.table.initial_balance)
    }

    /// Game resumed from an externally persisted balance
    pub fn with_balance(config: &RouletteConfig, balance: u64) -> Result<Self, ConfigurationError> {
        Self::with_rng(config, balance, OsRng)
    }
}

impl<R: RngCore + CryptoRng> TableController<R> {
    /// Rejects configurations that `config::validate` refuses, so a spin can
    /// never be planned from an empty turn or duration range.
    pub fn with_rng(config: &RouletteConfig, balance: u64, rng: R) -> Result<Self, ConfigurationError> {
        validate(config)?;
        let scheduler = SpinScheduler::with_rng(config.table.wheel, config.animation.clone(), rng);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let mut controller = Self {
            config: config.table.clone(),
            session: Session::new(config.table.wheel, balance),
            scheduler,
            events,
            halted: false,
        };
        controller.reset_chip();
        controller.halted = controller.session.is_bankrupt();
        Ok(controller)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn wheel(&self) -> WheelKind {
        self.session.wheel()
    }

    pub fn scheduler(&self) -> &SpinScheduler<R> {
        &self.scheduler
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.events.subscribe()
    }

    pub fn subscribe_poses(&self) -> watch::Receiver<WheelPose> {
        self.scheduler.subscribe_poses()
    }

    /// True while bankrupt and waiting for `new_game`.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.scheduler.set_reduced_motion(reduced);
    }

    fn emit(&self, event: TableEvent) {
        // No subscribers is fine: collaborators are optional
        let _ = self.events.send(event);
    }

    fn enter_phase(&mut self, phase: Phase) {
        self.session.set_phase(phase);
        debug!("Table phase -> {}", phase);
        self.emit(TableEvent::PhaseChanged(phase));
    }

    fn bets_changed(&self) {
        self.emit(TableEvent::BetsChanged {
            total: self.session.total_active_wager(),
            count: self.session.active_bets().len(),
        });
    }

    fn notify_if(&self, changed: bool) -> bool {
        if changed {
            self.bets_changed();
        }
        changed
    }

    fn reset_chip(&mut self) {
        // default_chip is one of the validated, positive table chips
        let _ = self.session.select_chip(self.config.default_chip.max(1));
    }

    /// Select one of the table's chip denominations.
    pub fn select_chip(&mut self, chip: u64) -> Result<(), WagerError> {
        if !self.config.chips.contains(&chip) {
            return Err(WagerError::InvalidChip);
        }
        self.session.select_chip(chip)
    }

    pub fn chips(&self) -> &[u64] {
        &self.config.chips
    }

    pub fn try_place_bet(
        &mut self,
        category: BetCategory,
        targets: impl IntoIterator<Item = Pocket>,
    ) -> Result<(), WagerError> {
        self.session.try_place_bet(category, targets)?;
        self.bets_changed();
        Ok(())
    }

    pub fn place_bet(&mut self, category: BetCategory, targets: impl IntoIterator<Item = Pocket>) -> bool {
        self.try_place_bet(category, targets).is_ok()
    }

    pub fn place_outside_bet(&mut self, category: BetCategory) -> bool {
        let placed = self.session.place_outside_bet(category);
        self.notify_if(placed)
    }

    pub fn clear_bets(&mut self) -> bool {
        let cleared = self.session.clear_bets();
        self.notify_if(cleared)
    }

    pub fn undo_last_bet(&mut self) -> bool {
        let undone = self.session.undo_last_bet();
        self.notify_if(undone)
    }

    pub fn remove_bet(
        &mut self,
        category: BetCategory,
        targets: impl IntoIterator<Item = Pocket>,
    ) -> Result<Bet, WagerError> {
        let removed = self.session.remove_bet(category, targets)?;
        self.bets_changed();
        Ok(removed)
    }

    pub fn repeat_bets(&mut self) -> bool {
        let repeated = self.session.repeat_bets();
        self.notify_if(repeated)
    }

    /// Play one full round with the bets currently on the table.
    ///
    /// Resolves after the animation, the settlement and the dwell interval.
    pub async fn play_round(&mut self) -> Result<RoundReport, TableError> {
        if self.halted {
            return Err(TableError::Bankrupt);
        }
        if self.session.phase() != Phase::Betting {
            return Err(TableError::NotBetting(self.session.phase()));
        }
        if self.session.active_bets().is_empty() {
            return Err(TableError::NoActiveBets);
        }

        self.enter_phase(Phase::Spinning);
        let outcome = match self.run_spin().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Spin failed, reopening bets: {}", e);
                self.scheduler.reset();
                self.enter_phase(Phase::Betting);
                return Err(e.into());
            }
        };

        let settlement = settle_round(&mut self.session, outcome);
        self.enter_phase(Phase::Result);

        let report = RoundReport {
            round_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            outcome,
            color: outcome.color(),
            settlement,
        };
        info!(
            "Round {} settled on {} ({}): wagered {}, returned {}, balance {}",
            report.round_id,
            outcome,
            report.color,
            report.total_wagered(),
            report.total_win(),
            report.balance()
        );
        self.emit(TableEvent::RoundSettled(Box::new(report.clone())));

        self.session.finish_round();
        self.scheduler.reset();
        self.bets_changed();

        let dwell = self.config.dwell();
        if !dwell.is_zero() {
            tokio::time::sleep(dwell).await;
        }

        if self.session.is_bankrupt() {
            warn!("Balance exhausted, table halted until a new game");
            self.halted = true;
            self.emit(TableEvent::Bankrupt);
        } else {
            self.enter_phase(Phase::Betting);
        }

        Ok(report)
    }

    /// Commit an outcome, then wait for the animation to land on it.
    async fn run_spin(&mut self) -> Result<Pocket, SpinError> {
        let committed = self.scheduler.draw_outcome();
        let landed = self.scheduler.animate_to_outcome(committed)?.await?;
        debug_assert_eq!(committed, landed);
        Ok(landed)
    }

    /// Discard the session and start over with `balance`.
    pub fn new_game(&mut self, balance: u64) {
        self.scheduler.reset();
        self.session = Session::new(self.config.wheel, balance);
        self.reset_chip();
        self.halted = false;
        info!("New game on {} wheel with balance {}", self.config.wheel, balance);
        self.emit(TableEvent::NewGame { balance });
        self.emit(TableEvent::PhaseChanged(Phase::Betting));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn controller(balance: u64) -> TableController<StdRng> {
        TableController::with_rng(&RouletteConfig::instant(), balance, StdRng::seed_from_u64(9)).unwrap()
    }

    #[tokio::test]
    async fn test_spin_requires_bets() {
        let mut table = controller(100);
        assert!(matches!(table.play_round().await, Err(TableError::NoActiveBets)));
        assert_eq!(table.session().phase(), Phase::Betting);
    }

    #[tokio::test]
    async fn test_round_settles_and_reopens_betting() {
        let mut table = controller(100);
        let mut events = table.subscribe();
        assert!(table.place_outside_bet(BetCategory::Red));

        let report = table.play_round().await.unwrap();
        let expected = if report.color == PocketColor::Red { 105 } else { 95 };
        assert_eq!(report.balance(), expected);
        assert_eq!(table.session().balance(), expected);
        assert!(table.session().active_bets().is_empty());
        assert_eq!(table.session().last_round_bets().len(), 1);
        assert_eq!(table.session().last_outcome(), Some(report.outcome));
        assert_eq!(table.session().phase(), Phase::Betting);

        let mut phases = Vec::new();
        let mut settled = false;
        while let Ok(event) = events.try_recv() {
            match event {
                TableEvent::PhaseChanged(phase) => phases.push(phase),
                TableEvent::RoundSettled(settled_report) => {
                    assert_eq!(*settled_report, report);
                    settled = true;
                }
                _ => {}
            }
        }
        assert!(settled);
        assert_eq!(phases, vec![Phase::Spinning, Phase::Result, Phase::Betting]);
    }

    #[tokio::test]
    async fn test_bankrupt_halts_until_new_game() {
        let mut table = controller(5);
        let mut events = table.subscribe();
        // Keep betting the whole balance on one number until it is gone
        loop {
            assert!(table.place_bet(BetCategory::Straight, [Pocket::Number(36)]));
            let report = table.play_round().await.unwrap();
            if report.balance() == 0 {
                break;
            }
            table.new_game(5);
        }

        assert!(table.is_halted());
        assert!(table.session().is_bankrupt());
        assert_eq!(table.session().phase(), Phase::Result);
        assert!(!table.place_bet(BetCategory::Straight, [Pocket::Number(1)]));
        assert!(matches!(table.play_round().await, Err(TableError::Bankrupt)));

        let mut saw_bankrupt = false;
        while let Ok(event) = events.try_recv() {
            saw_bankrupt |= event == TableEvent::Bankrupt;
        }
        assert!(saw_bankrupt);

        table.new_game(1000);
        assert!(!table.is_halted());
        assert_eq!(table.session().balance(), 1000);
        assert_eq!(table.session().phase(), Phase::Betting);
        assert!(table.session().last_round_bets().is_empty());
    }

    #[tokio::test]
    async fn test_chip_must_be_offered() {
        let mut table = controller(100);
        assert_eq!(table.select_chip(7), Err(WagerError::InvalidChip));
        assert!(table.select_chip(25).is_ok());
        assert_eq!(table.session().selected_chip(), 25);
    }

    #[tokio::test]
    async fn test_repeat_after_round() {
        let mut table = controller(1000);
        table.select_chip(10).unwrap();
        table.place_outside_bet(BetCategory::Even);
        table.place_bet(BetCategory::Split, [Pocket::Number(8), Pocket::Number(11)]);
        let placed = table.session().active_bets().to_vec();

        table.play_round().await.unwrap();
        table.select_chip(1).unwrap();
        assert!(table.repeat_bets());
        assert_eq!(table.session().active_bets(), placed.as_slice());
    }

    #[test]
    fn test_invalid_animation_ranges_rejected() {
        let mut config = ConfigBuilder::new().reduced_motion(true).build();
        config.animation.min_wheel_turns = 5;
        config.animation.max_wheel_turns = 3;

        let result = TableController::with_rng(&config, 100, StdRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { ref field, .. }) if field == "animation.min_wheel_turns"
        ));
    }

    #[test]
    fn test_zero_balance_starts_halted() {
        let table = controller(0);
        assert!(table.is_halted());
    }
}
