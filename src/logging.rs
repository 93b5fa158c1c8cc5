// src/logging.rs
// =============================================================================
// Sets up logging for the CLI.
//
// The engine only emits `tracing` events. Nothing is printed unless a
// subscriber is installed, which is what this module does for the binary.
// Tests and library users that never call init() get no log output.
//
// Filter precedence:
// 1. BOOKMARK_CHECKER_LOG, if set (e.g. "bookmark_checker=trace")
// 2. "bookmark_checker=debug" when --debug is given
// 3. "warn" otherwise
//
// Logs go to stderr so they never mix with the report on stdout.
// =============================================================================

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV_VAR: &str = "BOOKMARK_CHECKER_LOG";

// Picks the log filter from the environment and the --debug flag
pub fn filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("warn,bookmark_checker=debug")
        } else {
            EnvFilter::new("warn")
        }
    })
}

/// Installs the global subscriber. Call once, at startup.
pub fn init(debug: bool) {
    tracing_subscriber::registry()
        .with(filter(debug))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
