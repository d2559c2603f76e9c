//! Command-line argument definitions.

use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use mysqlprobe_console::OutputMode;
use mysqlprobe_mysql::config::{DEFAULT_PORT, DEFAULT_TIMEOUT};
use mysqlprobe_mysql::{ProbeConfig, ReadDeadline};

/// Report formats for stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatArg {
    /// Pick from MYSQLPROBE_JSON / MYSQLPROBE_PLAIN, defaulting to JSON
    #[default]
    Auto,
    /// A single JSON object
    Json,
    /// `key: value` lines
    Plain,
}

impl FormatArg {
    /// The explicitly requested mode, if any.
    pub fn mode(self) -> Option<OutputMode> {
        match self {
            Self::Auto => None,
            Self::Json => Some(OutputMode::Json),
            Self::Plain => Some(OutputMode::Plain),
        }
    }
}

/// Passively detect a MySQL server from its handshake greeting.
#[derive(Parser, Debug)]
#[command(name = "mysqlprobe")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Target host name or IP address
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Target TCP port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Dial and read timeout, e.g. `3s`, `500ms`, `2m` or bare seconds
    #[arg(long, value_parser = parse_duration, default_value = "3s")]
    pub timeout: Duration,

    /// Include decoded details in the report
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Bound the whole packet read by the timeout instead of each read
    #[arg(long)]
    pub overall_deadline: bool,

    /// Output format for stdout
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    pub format: FormatArg,

    /// Raise log verbosity on stderr (repeat for more)
    #[arg(long, action = ArgAction::Count)]
    pub debug: u8,
}

impl Args {
    /// Build the probe configuration these arguments describe.
    pub fn to_config(&self) -> ProbeConfig {
        let deadline = if self.overall_deadline {
            ReadDeadline::Overall
        } else {
            ReadDeadline::PerRead
        };
        ProbeConfig::new()
            .host(self.host.clone())
            .port(self.port)
            .timeout(self.timeout)
            .deadline(deadline)
            .verbose(self.verbose)
    }
}

impl Default for Args {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            verbose: false,
            overall_deadline: false,
            format: FormatArg::Auto,
            debug: 0,
        }
    }
}

/// Parse a duration such as `3s`, `500ms`, `2m`, `1.5s` or `3`.
///
/// A bare number is taken as seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration '{input}'"))?;
    let seconds = match unit.trim() {
        "" | "s" | "sec" | "secs" => value,
        "ms" => value / 1000.0,
        "m" | "min" | "mins" => value * 60.0,
        other => return Err(format!("unknown duration unit '{other}' in '{input}'")),
    };
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("invalid duration '{input}': {e}"))
}
