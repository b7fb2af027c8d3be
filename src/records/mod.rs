//! Round records kept outside the engine: history, statistics and the
//! snapshot file that lets a game survive a restart.
//!
//! Everything here is fed from `TableEvent`s and never writes back into a
//! session.

pub mod history;
pub mod stats;
pub mod store;

pub use history::{HistoryEntry, RoundHistory};
pub use stats::{Streak, StreakKind, TableStats};
pub use store::{SnapshotStore, TableSnapshot};
