//! Tracing subscriber setup.
//!
//! pagewait emits `tracing` events: wait start/finish at `debug`, each poll
//! attempt at `trace`, timeouts at `warn`, fixture lifecycle at `info`.
//! Nothing is printed until a subscriber is installed, which these helpers
//! do with a filter taken from `PAGEWAIT_LOG` (falling back to the given
//! default).

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "PAGEWAIT_LOG";

/// Build the filter from `PAGEWAIT_LOG`, or `default` when unset or invalid
#[must_use]
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a global fmt subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Install a subscriber that writes through the test harness capture.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("pagewait=debug"))
        .with_test_writer()
        .try_init();
}
