//! The probe pipeline: dial, read the first packet, decode, classify.
//!
//! The connection is owned by the pipeline and dropped (closed) when the
//! probe returns, whatever the outcome. Nothing is ever written to it.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use mysqlprobe_core::{ConnectionError, ConnectionErrorKind, Result};

use crate::config::ProbeConfig;
use crate::handshake::{self, Handshake};
use crate::outcome::ProbeOutcome;
use crate::transport::{ReadDeadline, TimedRead, read_first_packet};

/// Probe the configured target and classify the result.
pub fn probe(config: &ProbeConfig) -> ProbeOutcome {
    let outcome = ProbeOutcome::classify(run(config));
    tracing::debug!(
        ok = outcome.is_ok(),
        mysql = outcome.is_mysql(),
        "Probe finished"
    );
    outcome
}

/// Run the probe pipeline against the configured target.
#[tracing::instrument(level = "debug", skip(config), fields(addr = %config.socket_addr()))]
pub fn run(config: &ProbeConfig) -> Result<Handshake> {
    config.validate()?;
    let mut stream = dial(config)?;
    probe_stream(&mut stream, config.read_timeout, config.deadline)
}

/// Read and decode the greeting from an already-open stream.
pub fn probe_stream<S: TimedRead>(
    stream: &mut S,
    timeout: Duration,
    deadline: ReadDeadline,
) -> Result<Handshake> {
    let packet = read_first_packet(stream, timeout, deadline)?;
    tracing::debug!(bytes = packet.len(), "Read first packet");
    let handshake = handshake::decode(&packet)?;
    tracing::debug!(
        server_version = %handshake.info().server_version,
        complete = handshake.is_complete(),
        "Decoded greeting"
    );
    Ok(handshake)
}

/// Open a TCP connection to the target, trying each resolved address.
pub fn dial(config: &ProbeConfig) -> std::result::Result<TcpStream, ConnectionError> {
    let addr = config.socket_addr();
    let resolved: Vec<_> = addr
        .to_socket_addrs()
        .map_err(|e| ConnectionError {
            kind: ConnectionErrorKind::DnsResolution,
            message: format!("{addr}: {e}"),
            source: Some(Box::new(e)),
        })?
        .collect();

    if resolved.is_empty() {
        return Err(ConnectionError {
            kind: ConnectionErrorKind::DnsResolution,
            message: format!("{addr}: no addresses resolved"),
            source: None,
        });
    }

    let mut last_err = None;
    for socket_addr in &resolved {
        match TcpStream::connect_timeout(socket_addr, config.connect_timeout) {
            Ok(stream) => {
                stream.set_nodelay(true).ok();
                tracing::debug!(%socket_addr, "Connected");
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!(%socket_addr, error = %e, "Connect attempt failed");
                last_err = Some(e);
            }
        }
    }

    let err = last_err
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no connect attempt"));
    Err(connect_error(&addr, err))
}

fn connect_error(addr: &str, err: io::Error) -> ConnectionError {
    let kind = match err.kind() {
        io::ErrorKind::ConnectionRefused => ConnectionErrorKind::Refused,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ConnectionErrorKind::Timeout,
        _ => ConnectionErrorKind::Connect,
    };
    ConnectionError {
        kind,
        message: format!("{addr}: {err}"),
        source: Some(Box::new(err)),
    }
}
