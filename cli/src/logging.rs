//! Logging setup for the turnclock driver.
//!
//! Logs go to stdout alongside command output. Set `DEBUG_LOGGING=1` (or
//! `logging.debug = true` in the config file) to enable debug output for
//! turnclock crates.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Whether debug logging was requested through the environment
pub fn debug_from_env() -> bool {
    std::env::var("DEBUG_LOGGING").is_ok()
}

/// Filter directive for the requested verbosity
pub fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        // debug for turnclock crates, info for dependencies
        "info,turnclock_core=debug,turnclock_cli=debug,turnclock=debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. Call once, before the first command runs.
pub fn init(debug_logging: bool) {
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let filter = EnvFilter::new(filter_directive(debug_logging));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(filter)
        .init();

    tracing::info!(debug_logging, "turnclock logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_directive_targets_turnclock_crates() {
        assert_eq!(filter_directive(false), "info");
        assert!(filter_directive(true).contains("turnclock_core=debug"));
    }
}
