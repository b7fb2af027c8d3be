//! Roulette Table - single-table roulette round engine
//!
//! A player wagers on a European (37 pocket) or American (38 pocket) wheel.
//! Each round the outcome is drawn from a cryptographically strong source
//! before the wheel and ball animation is planned, so the animation can only
//! ever land on the committed pocket. Settlement is a pure function of the
//! bets, the balance and that pocket.
//!
//! - [`engine`]: pockets, bet layout, ledger, resolver, spin scheduler and
//!   the table controller
//! - [`records`]: history, statistics and snapshots fed from table events
//! - [`config`]: TOML configuration with `ROULETTE_*` overrides

pub mod config;
pub mod engine;
pub mod errors;
pub mod records;

pub use config::{ConfigBuilder, ConfigLoader, RouletteConfig};
pub use engine::{
    Bet, BetCategory, Phase, Pocket, PocketColor, RoundReport, Session, Settlement, SpinScheduler,
    TableController, TableEvent, WheelKind,
};
pub use errors::{RouletteError, RouletteResult};
