//! Shared configuration types for turnclock
//!
//! This crate contains serializable configuration types that are shared between
//! the engine crate (turnclock-core) and any front end driving a simulation.

use serde::{Deserialize, Serialize};

/// Turn length used when nothing else is configured (seconds).
pub const DEFAULT_TURN_LENGTH_SECS: f64 = 0.2;

// ─────────────────────────────────────────────────────────────────────────────
// Simulation
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for a simulation session driving a timer engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Elapsed duration reported to the engine for each turn, in seconds.
    #[serde(default = "default_turn_length_secs")]
    pub turn_length_secs: f64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            turn_length_secs: DEFAULT_TURN_LENGTH_SECS,
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Raise turnclock crates to debug level (same as `DEBUG_LOGGING=1`)
    #[serde(default)]
    pub debug: bool,
}

fn default_turn_length_secs() -> f64 {
    DEFAULT_TURN_LENGTH_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_turn_is_two_hundred_ms() {
        let config = SimulationConfig::default();
        assert_eq!(config.turn_length_secs, DEFAULT_TURN_LENGTH_SECS);
        assert!(!config.logging.debug);
    }
}
