mod config;
mod error;

pub use config::{
    APP_NAME, CONFIG_NAME, DEFAULT_TURN_LENGTH_SECS, LoggingConfig, SimulationConfig,
    SimulationConfigExt,
};
pub use error::ConfigError;
