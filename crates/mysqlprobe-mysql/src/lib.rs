//! Passive MySQL handshake probe.
//!
//! Opens a TCP connection, reads the single greeting packet a MySQL server
//! sends unprompted, and decodes it. Nothing is ever written to the server:
//! no authentication, no TLS negotiation, no queries.
//!
//! The pipeline has three stages:
//!
//! - [`transport`] frames one packet off the stream under a read timeout
//! - [`handshake`] decodes the Protocol-v10 greeting, degrading gracefully
//!   when the optional tail is truncated
//! - [`outcome`] classifies the result and builds the reported record
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use mysqlprobe_mysql::{ProbeConfig, probe};
//!
//! let config = ProbeConfig::new()
//!     .host("db.internal")
//!     .port(3306)
//!     .timeout(Duration::from_secs(2));
//!
//! let outcome = probe(&config);
//! if let Some(handshake) = outcome.handshake() {
//!     println!("MySQL {}", handshake.info().server_version);
//! }
//! ```

pub mod config;
pub mod handshake;
pub mod outcome;
pub mod probe;
pub mod protocol;
pub mod transport;

pub use config::ProbeConfig;
pub use handshake::{Handshake, HandshakeInfo, TailField, decode};
pub use outcome::{ProbeOutcome, ProbeReport};
pub use probe::{dial, probe, probe_stream, run};
pub use protocol::{PacketHeader, RawPacket};
pub use transport::{ReadDeadline, TimedRead, read_first_packet};
