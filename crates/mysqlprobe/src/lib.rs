//! mysqlprobe - detect a MySQL server from the greeting it sends unprompted.
//!
//! mysqlprobe opens a TCP connection, reads exactly one packet, and decodes
//! it as a MySQL Protocol-v10 handshake. It never authenticates, never
//! negotiates TLS and never writes to the socket.
//!
//! - Length-prefixed packet framing under a per-read or overall deadline
//! - Defensive greeting decoder that degrades to a partial result when the
//!   optional tail is truncated
//! - Outcome classification into dial failure, read failure, not MySQL, or
//!   detected
//! - JSON or plain-text report rendering
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mysqlprobe::prelude::*;
//!
//! let config = ProbeConfig::new().host("10.0.0.7").port(3306);
//! let outcome = probe(&config);
//! println!("{}", render(&outcome.report(false), OutputMode::Json));
//! ```

pub mod cli;

pub use mysqlprobe_core::{
    ConfigError, ConnectionError, ConnectionErrorKind, DecodeStage, Error, ProtocolError,
    ReadError, ReadStage, Result,
};
pub use mysqlprobe_mysql::{
    Handshake, HandshakeInfo, PacketHeader, ProbeConfig, ProbeOutcome, ProbeReport, RawPacket,
    ReadDeadline, TailField, TimedRead, decode, dial, probe, probe_stream, read_first_packet, run,
};
pub use mysqlprobe_mysql::protocol::{capabilities, charset, server_status};
pub use mysqlprobe_console::{OutputMode, init_logging, render};

pub use cli::Args;

/// Probe the target described by `args` and render the report.
///
/// This is the whole binary minus process setup: the returned string is
/// what gets printed to stdout.
pub fn execute(args: &Args) -> String {
    let config = args.to_config();
    let mode = OutputMode::resolve(args.format.mode());
    tracing::debug!(addr = %config.socket_addr(), %mode, "Starting probe");

    let outcome = probe(&config);
    render(&outcome.report(config.verbose), mode)
}

/// Commonly used items.
///
/// ```rust
/// use mysqlprobe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Error, Handshake, HandshakeInfo, OutputMode, ProbeConfig, ProbeOutcome, ProbeReport,
        ReadDeadline, TailField, probe, render,
    };
}
