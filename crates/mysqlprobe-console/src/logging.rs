//! Logging setup.
//!
//! Diagnostics are emitted with `tracing` and written to stderr, keeping
//! stdout free for the report.
//!
//! # Environment Variables
//!
//! - `MYSQLPROBE_LOG=<filter>` - `EnvFilter` directives, overriding the level
//!   chosen on the command line
//! - `NO_COLOR` - Disable ANSI colors in log lines

use tracing_subscriber::EnvFilter;

/// Environment variable holding log filter directives.
pub const LOG_ENV: &str = "MYSQLPROBE_LOG";

/// Map a `--debug` occurrence count to a default filter level.
#[must_use]
pub const fn level_for(debug_count: u8) -> &'static str {
    match debug_count {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `MYSQLPROBE_LOG` takes precedence over the level derived from `debug_count`.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(debug_count: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for(debug_count)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::env::var_os("NO_COLOR").is_none())
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            debug_count,
            level = level_for(debug_count),
            "Logging initialized"
        );
    }
}
