//! Configuration management with validation and defaults
//!
//! Table, animation, logging and storage settings load from a TOML file,
//! pick up `ROULETTE_*` environment overrides, and are validated before use.

use crate::engine::pocket::WheelKind;
use crate::engine::types::{DEFAULT_BALANCE, DEFAULT_CHIP};
use crate::errors::{ConfigurationError, RouletteResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Complete table configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouletteConfig {
    pub table: TableConfig,
    pub animation: AnimationConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

/// Game rules and pacing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub wheel: WheelKind,
    pub initial_balance: u64,
    /// Chip denominations offered to the player
    pub chips: Vec<u64>,
    pub default_chip: u64,
    /// Pause on the result before betting reopens
    pub dwell_ms: u64,
    /// Rounds kept by the history collaborator
    pub history_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            wheel: WheelKind::European,
            initial_balance: DEFAULT_BALANCE,
            chips: vec![1, 5, 10, 25, 100],
            default_chip: DEFAULT_CHIP,
            dwell_ms: 3000,
            history_capacity: 20,
        }
    }
}

impl TableConfig {
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }
}

/// Spin animation bounds. Turn counts and duration are drawn per spin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub min_wheel_turns: u32,
    pub max_wheel_turns: u32,
    pub min_ball_turns: u32,
    pub max_ball_turns: u32,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub bounce: bool,
    pub bounce_duration_ms: u64,
    pub bounce_amplitude_deg: f64,
    pub bounce_oscillations: u32,
    pub frame_interval_ms: u64,
    /// Skip the animation and jump straight to the final pose
    pub reduced_motion: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            min_wheel_turns: 3,
            max_wheel_turns: 5,
            min_ball_turns: 4,
            max_ball_turns: 7,
            min_duration_ms: 4000,
            max_duration_ms: 6000,
            bounce: true,
            bounce_duration_ms: 600,
            bounce_amplitude_deg: 8.0,
            bounce_oscillations: 3,
            frame_interval_ms: 16,
            reduced_motion: false,
        }
    }
}

impl AnimationConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(()),
        }
    }
}

/// Where the snapshot collaborator keeps balance, history and stats
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub snapshot_path: String,
    pub persist: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: "./roulette_snapshot.json".to_string(),
            persist: true,
        }
    }
}

impl RouletteConfig {
    /// No animation and no dwell, for simulations and tests
    pub fn instant() -> Self {
        Self {
            table: TableConfig {
                dwell_ms: 0,
                ..Default::default()
            },
            animation: AnimationConfig {
                reduced_motion: true,
                ..Default::default()
            },
            storage: StorageConfig {
                persist: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> RouletteResult<RouletteConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            RouletteConfig::default()
        };

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        validate(&config)?;

        Ok(config)
    }

    /// Load configuration from TOML file
    fn load_from_file(&self, path: &str) -> RouletteResult<RouletteConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    /// Save configuration to file
    pub fn save(&self, config: &RouletteConfig, path: &str) -> RouletteResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_override<T: std::str::FromStr>(field: &str, value: String, reason: &str) -> Result<T, ConfigurationError> {
    value.parse().map_err(|_| ConfigurationError::InvalidValue {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    })
}

/// Apply `ROULETTE_*` overrides read through `lookup`.
pub fn apply_overrides<F>(config: &mut RouletteConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(wheel) = lookup("ROULETTE_WHEEL") {
        config.table.wheel = match wheel.to_ascii_lowercase().as_str() {
            "european" => WheelKind::European,
            "american" => WheelKind::American,
            _ => {
                return Err(ConfigurationError::InvalidValue {
                    field: "ROULETTE_WHEEL".to_string(),
                    value: wheel,
                    reason: "Expected 'european' or 'american'".to_string(),
                })
            }
        };
    }
    if let Some(balance) = lookup("ROULETTE_INITIAL_BALANCE") {
        config.table.initial_balance = parse_override("ROULETTE_INITIAL_BALANCE", balance, "Invalid balance")?;
    }
    if let Some(dwell) = lookup("ROULETTE_DWELL_MS") {
        config.table.dwell_ms = parse_override("ROULETTE_DWELL_MS", dwell, "Invalid dwell interval")?;
    }
    if let Some(reduced) = lookup("ROULETTE_REDUCED_MOTION") {
        config.animation.reduced_motion = parse_override("ROULETTE_REDUCED_MOTION", reduced, "Invalid boolean value")?;
    }
    if let Some(level) = lookup("ROULETTE_LOG_LEVEL") {
        config.logging.level = parse_override("ROULETTE_LOG_LEVEL", level, "Unknown log level")?;
    }
    if let Some(path) = lookup("ROULETTE_SNAPSHOT_PATH") {
        config.storage.snapshot_path = path;
    }
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Validate configuration values
pub fn validate(config: &RouletteConfig) -> Result<(), ConfigurationError> {
    let table = &config.table;
    if table.chips.is_empty() {
        return Err(ConfigurationError::MissingRequired("table.chips".to_string()));
    }
    if table.chips.contains(&0) {
        return Err(invalid("table.chips", format!("{:?}", table.chips), "Chip denominations must be positive"));
    }
    if !table.chips.contains(&table.default_chip) {
        return Err(invalid("table.default_chip", table.default_chip, "Default chip must be one of table.chips"));
    }
    if table.history_capacity == 0 {
        return Err(invalid("table.history_capacity", 0, "History capacity cannot be zero"));
    }

    let animation = &config.animation;
    if animation.min_wheel_turns == 0 || animation.min_wheel_turns > animation.max_wheel_turns {
        return Err(invalid(
            "animation.min_wheel_turns",
            animation.min_wheel_turns,
            "Wheel turns must be at least 1 and not exceed max_wheel_turns",
        ));
    }
    if animation.min_ball_turns == 0 || animation.min_ball_turns > animation.max_ball_turns {
        return Err(invalid(
            "animation.min_ball_turns",
            animation.min_ball_turns,
            "Ball turns must be at least 1 and not exceed max_ball_turns",
        ));
    }
    if animation.min_duration_ms == 0 || animation.min_duration_ms > animation.max_duration_ms {
        return Err(invalid(
            "animation.min_duration_ms",
            animation.min_duration_ms,
            "Duration must be positive and not exceed max_duration_ms",
        ));
    }
    if animation.frame_interval_ms == 0 {
        return Err(invalid("animation.frame_interval_ms", 0, "Frame interval cannot be zero"));
    }
    if !animation.bounce_amplitude_deg.is_finite() || animation.bounce_amplitude_deg < 0.0 {
        return Err(invalid(
            "animation.bounce_amplitude_deg",
            animation.bounce_amplitude_deg,
            "Amplitude must be a non-negative number",
        ));
    }

    if config.storage.persist && config.storage.snapshot_path.is_empty() {
        return Err(ConfigurationError::MissingRequired("storage.snapshot_path".to_string()));
    }

    Ok(())
}

/// Builder pattern for creating configurations
pub struct ConfigBuilder {
    config: RouletteConfig,
}

impl ConfigBuilder {
    /// Create a new config builder with defaults
    pub fn new() -> Self {
        Self {
            config: RouletteConfig::default(),
        }
    }

    pub fn wheel(mut self, wheel: WheelKind) -> Self {
        self.config.table.wheel = wheel;
        self
    }

    pub fn initial_balance(mut self, balance: u64) -> Self {
        self.config.table.initial_balance = balance;
        self
    }

    pub fn table(mut self, table: TableConfig) -> Self {
        self.config.table = table;
        self
    }

    pub fn animation(mut self, animation: AnimationConfig) -> Self {
        self.config.animation = animation;
        self
    }

    pub fn reduced_motion(mut self, reduced: bool) -> Self {
        self.config.animation.reduced_motion = reduced;
        self
    }

    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> RouletteConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> RouletteResult<()> {
    ConfigLoader::new().save(&RouletteConfig::default(), path)
}
