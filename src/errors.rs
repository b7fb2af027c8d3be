//! Error types for the roulette table
//!
//! Ledger rejections, spin scheduling misuse, controller sequencing,
//! configuration and snapshot storage each get their own enum; `RouletteError`
//! wraps them all for callers that only want one type.

use crate::engine::pocket::Pocket;
use crate::engine::types::{BetCategory, Phase};

/// Root error type for all table operations
#[derive(Debug, thiserror::Error)]
pub enum RouletteError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Wager error: {0}")]
    Wager(#[from] WagerError),

    #[error("Spin error: {0}")]
    Spin(#[from] SpinError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Reasons a ledger operation was refused. The session is untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WagerError {
    #[error("Bets are closed during the {0} phase")]
    BettingClosed(Phase),

    #[error("Insufficient funds: {required} required, {available} available")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Targets do not form a legal {0} bet on this wheel")]
    InvalidTargets(BetCategory),

    #[error("Chip amount is not a positive table denomination")]
    InvalidChip,

    #[error("No active bets")]
    NoBets,

    #[error("No bets from a previous round to repeat")]
    NoHistory,

    #[error("No {0} bet on those pockets")]
    BetNotFound(BetCategory),
}

/// Spin scheduling errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpinError {
    #[error("Pocket {0} is not on this wheel")]
    PocketNotOnWheel(Pocket),

    #[error("Outcome {committed} is already committed, cannot animate to {requested}")]
    OutcomeMismatch { committed: Pocket, requested: Pocket },

    #[error("Spin was preempted by a newer spin")]
    Preempted,
}

/// Round sequencing errors raised by the table controller
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Cannot spin during the {0} phase")]
    NotBetting(Phase),

    #[error("Place at least one bet before spinning")]
    NoActiveBets,

    #[error("Table is halted: balance exhausted, start a new game")]
    Bankrupt,

    #[error(transparent)]
    Spin(#[from] SpinError),
}

/// Configuration and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue { field: String, value: String, reason: String },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Snapshot persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot is corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
}

// Convenience type alias for Results
pub type RouletteResult<T> = Result<T, RouletteError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let config_error = ConfigurationError::MissingRequired("table.chips".to_string());
        let error = RouletteError::Configuration(config_error);

        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("table.chips"));
    }

    #[test]
    fn test_wager_error_details() {
        let wager_error = WagerError::InsufficientFunds {
            required: 25,
            available: 10,
        };

        assert!(wager_error.to_string().contains("25 required"));
        assert!(wager_error.to_string().contains("10 available"));
        assert!(WagerError::BettingClosed(Phase::Spinning)
            .to_string()
            .contains("spinning"));
    }

    #[test]
    fn test_error_conversion() {
        let error: RouletteError = SpinError::Preempted.into();

        match error {
            RouletteError::Spin(SpinError::Preempted) => {}
            _ => panic!("Expected spin error"),
        }

        let table: TableError = SpinError::PocketNotOnWheel(Pocket::DoubleZero).into();
        assert!(table.to_string().contains("00"));
    }

    #[test]
    fn test_error_source() {
        let error = RouletteError::Wager(WagerError::NoBets);
        assert!(error.source().is_some());
    }
}
