//! Tracing setup for the action binary.
//!
//! Runner logs already carry timestamps, so the text format omits them. Step
//! debug logging (`RUNNER_DEBUG=1`) raises the default level to `DEBUG`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Set by the runner when step debug logging is enabled.
pub const RUNNER_DEBUG_VAR: &str = "RUNNER_DEBUG";

/// Default level for a run: `DEBUG` when `verbose` or the runner's debug
/// flag is `1`, `INFO` otherwise.
pub fn log_level(verbose: bool, runner_debug: Option<&str>) -> Level {
    if verbose || runner_debug == Some("1") {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the computed level.
///
/// Only the first call in a process takes effect.
pub fn init_tracing(json: bool, verbose: bool) {
    let runner_debug = std::env::var(RUNNER_DEBUG_VAR).ok();
    let level = log_level(verbose, runner_debug.as_deref());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false).without_time())
            .try_init()
            .ok();
    }
}
