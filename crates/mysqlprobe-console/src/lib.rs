//! Console output for mysqlprobe.
//!
//! Renders a [`ProbeReport`](mysqlprobe_mysql::ProbeReport) as a single JSON
//! line (the default, for scripts and tool integrations) or as a plain
//! `key: value` listing for people reading a terminal. Diagnostics go to
//! stderr through `tracing`, so stdout only ever carries the report.
//!
//! # Environment Variables
//!
//! - `MYSQLPROBE_JSON=1` - Force JSON output
//! - `MYSQLPROBE_PLAIN=1` - Force plain text output
//! - `MYSQLPROBE_LOG=<filter>` - Log filter, e.g. `debug` or `mysqlprobe_mysql=trace`
//! - `NO_COLOR` - Disable ANSI colors in log output

pub mod logging;
pub mod mode;
pub mod render;

pub use logging::init_logging;
pub use mode::OutputMode;
pub use render::render;
