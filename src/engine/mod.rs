//! Roulette round engine
//!
//! Leaf modules hold the data model and the pure rules; the scheduler and
//! controller add time.

pub mod animation;
pub mod controller;
pub mod layout;
pub mod ledger;
pub mod pocket;
pub mod resolver;
pub mod scheduler;
pub mod types;

pub use animation::{SpinPlan, WheelPose};
pub use controller::{RoundReport, TableController, TableEvent};
pub use pocket::{Pocket, PocketColor, WheelKind};
pub use resolver::{resolve, settle, settle_round, BetOutcome, Settlement};
pub use scheduler::{SpinHandle, SpinScheduler, SpinState};
pub use types::{Bet, BetCategory, Phase, Session, DEFAULT_BALANCE, DEFAULT_CHIP};
