//! Error types for probe operations.

use std::fmt;

/// The primary error type for a probe.
///
/// Each variant corresponds to one layer of the probe pipeline, so the
/// outcome classifier can map an error to a result category without
/// inspecting messages.
#[derive(Debug)]
pub enum Error {
    /// The TCP connection could not be established
    Connection(ConnectionError),
    /// Connected, but the packet header never arrived
    Read(ReadError),
    /// Bytes arrived but do not contain the mandatory handshake fields
    Protocol(ProtocolError),
    /// Invalid probe configuration
    Config(ConfigError),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Failed to establish connection
    Connect,
    /// Connection refused
    Refused,
    /// No connection within the dial timeout
    Timeout,
    /// Host name did not resolve to any address
    DnsResolution,
}

/// Stage of the transport read that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStage {
    /// The 4-byte packet header
    Header,
}

impl ReadStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReadStage::Header => "read header",
        }
    }
}

#[derive(Debug)]
pub struct ReadError {
    pub stage: ReadStage,
    pub source: std::io::Error,
}

/// Decoder stage at which a handshake was rejected.
///
/// Only the packet framing and the three mandatory fields can fail; the
/// optional tail of the greeting degrades instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Packet header missing or payload shorter than declared
    Header,
    /// Protocol version byte
    ProtocolVersion,
    /// NUL-terminated server version
    ServerVersion,
    /// 4-byte connection id
    ConnectionId,
}

impl DecodeStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            DecodeStage::Header => "header",
            DecodeStage::ProtocolVersion => "protocol version",
            DecodeStage::ServerVersion => "server version",
            DecodeStage::ConnectionId => "connection id",
        }
    }
}

#[derive(Debug)]
pub struct ProtocolError {
    pub stage: DecodeStage,
    pub message: String,
    /// Leading bytes of the offending packet, for diagnostics
    pub raw_data: Option<Vec<u8>>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl Error {
    /// Did the probe fail before a connection existed?
    pub fn is_dial_failure(&self) -> bool {
        matches!(self, Error::Connection(_) | Error::Config(_))
    }

    /// Did the probe connect but never receive a packet header?
    pub fn is_read_failure(&self) -> bool {
        matches!(self, Error::Read(_))
    }

    /// Did the probe receive bytes that are not a handshake greeting?
    pub fn is_protocol_failure(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }
}

impl ProtocolError {
    pub fn new(stage: DecodeStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            raw_data: None,
        }
    }

    /// Attach the leading bytes of the packet.
    #[must_use]
    pub fn with_raw_data(mut self, raw: impl Into<Vec<u8>>) -> Self {
        self.raw_data = Some(raw.into());
        self
    }
}

impl ReadError {
    pub fn header(source: std::io::Error) -> Self {
        Self {
            stage: ReadStage::Header,
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "dial failed: {}", e.message),
            Error::Read(e) => write!(f, "read failed: {}", e),
            Error::Protocol(e) => write!(f, "{}", e.message),
            Error::Config(e) => write!(f, "configuration error: {}", e.message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Read(e) => Some(&e.source),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage.as_str(), self.source)
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProtocolError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<ReadError> for Error {
    fn from(err: ReadError) -> Self {
        Error::Read(err)
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn display_prefixes_layer() {
        let dial = Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Refused,
            message: "127.0.0.1:1: connection refused".to_string(),
            source: None,
        });
        assert_eq!(dial.to_string(), "dial failed: 127.0.0.1:1: connection refused");

        let read = Error::Read(ReadError::header(io::Error::new(
            io::ErrorKind::TimedOut,
            "timed out",
        )));
        assert_eq!(read.to_string(), "read failed: read header: timed out");

        let proto = Error::Protocol(ProtocolError::new(
            DecodeStage::ConnectionId,
            "payload too small for connection id",
        ));
        assert_eq!(proto.to_string(), "payload too small for connection id");
    }

    #[test]
    fn layer_predicates() {
        let read = Error::from(ReadError::header(io::Error::from(
            io::ErrorKind::UnexpectedEof,
        )));
        assert!(read.is_read_failure());
        assert!(!read.is_dial_failure());

        let proto = Error::from(ProtocolError::new(DecodeStage::Header, "short"));
        assert!(proto.is_protocol_failure());

        let config = Error::from(ConfigError {
            message: "empty host".to_string(),
        });
        assert!(config.is_dial_failure());
    }

    #[test]
    fn read_error_exposes_io_source() {
        use std::error::Error as _;

        let err = Error::from(ReadError::header(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "reset",
        )));
        let source = err.source().expect("io source");
        assert_eq!(source.to_string(), "reset");
    }

    #[test]
    fn protocol_error_carries_preview() {
        let err = ProtocolError::new(DecodeStage::ServerVersion, "unterminated")
            .with_raw_data(vec![0x0a, 0x38]);
        assert_eq!(err.raw_data.as_deref(), Some(&[0x0a, 0x38][..]));
        assert_eq!(err.stage.as_str(), "server version");
    }
}
