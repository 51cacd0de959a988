//! Tracing subscriber setup.

use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level used when neither the CLI nor the config file sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const QUIET_DEPENDENCIES: &str = "h2=info,hyper=info,hyper_util=info,reqwest=info,rustls=info";

/// Build the filter directive string for `level`.
///
/// A bare level such as `debug` gets quieter defaults for the HTTP stack.
/// Anything containing `,` or `=` is taken as a full directive list.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        format!("{DEFAULT_LOG_LEVEL},{QUIET_DEPENDENCIES}")
    } else if level.contains(',') || level.contains('=') {
        level.to_string()
    } else {
        format!("{level},{QUIET_DEPENDENCIES}")
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for command output.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn setup_logging(level: &str, json: bool) {
    let directives = filter_directives(level);
    let filter = EnvFilter::from_str(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_current_span(false),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        tracing::debug!(filter = %directives, json, "logging initialized");
    }
}
