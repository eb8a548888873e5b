//! Simulation configuration
//!
//! This module re-exports shared types from turnclock-types and provides
//! persistence for SimulationConfig.

pub use turnclock_types::{DEFAULT_TURN_LENGTH_SECS, LoggingConfig, SimulationConfig};

use super::error::ConfigError;

/// Application name used for the platform config directory
pub const APP_NAME: &str = "turnclock";

/// Config file name (stored as `config.toml`)
pub const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// SimulationConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for SimulationConfig persistence
pub trait SimulationConfigExt: Sized {
    /// Load the stored config. A missing file yields (and writes) defaults.
    fn load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
}

impl SimulationConfigExt for SimulationConfig {
    fn load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }
}
