//! MySQL wire framing as seen by a passive probe.
//!
//! MySQL packets have a 4-byte header:
//! - 3 bytes: payload length (little-endian)
//! - 1 byte: sequence number
//!
//! The probe only ever consumes the first packet a server sends, so the
//! multi-packet continuation rules of the full protocol do not apply here.

pub mod reader;

pub use reader::{Insufficient, PacketReader};

/// Largest declared payload length the probe is willing to buffer.
///
/// Handshake greetings are well under a kilobyte; anything above this is
/// treated as a non-MySQL or malicious length field.
pub const MAX_DECLARED_PAYLOAD: usize = 100_000;

/// Number of leading packet bytes kept for diagnostics.
pub const PREVIEW_LEN: usize = 64;

/// MySQL server capability flags.
pub mod capabilities {
    pub const CLIENT_LONG_PASSWORD: u32 = 1;
    pub const CLIENT_FOUND_ROWS: u32 = 1 << 1;
    pub const CLIENT_LONG_FLAG: u32 = 1 << 2;
    pub const CLIENT_CONNECT_WITH_DB: u32 = 1 << 3;
    pub const CLIENT_NO_SCHEMA: u32 = 1 << 4;
    pub const CLIENT_COMPRESS: u32 = 1 << 5;
    pub const CLIENT_ODBC: u32 = 1 << 6;
    pub const CLIENT_LOCAL_FILES: u32 = 1 << 7;
    pub const CLIENT_IGNORE_SPACE: u32 = 1 << 8;
    pub const CLIENT_PROTOCOL_41: u32 = 1 << 9;
    pub const CLIENT_INTERACTIVE: u32 = 1 << 10;
    pub const CLIENT_SSL: u32 = 1 << 11;
    pub const CLIENT_IGNORE_SIGPIPE: u32 = 1 << 12;
    pub const CLIENT_TRANSACTIONS: u32 = 1 << 13;
    pub const CLIENT_RESERVED: u32 = 1 << 14;
    pub const CLIENT_SECURE_CONNECTION: u32 = 1 << 15;
    pub const CLIENT_MULTI_STATEMENTS: u32 = 1 << 16;
    pub const CLIENT_MULTI_RESULTS: u32 = 1 << 17;
    pub const CLIENT_PS_MULTI_RESULTS: u32 = 1 << 18;
    pub const CLIENT_PLUGIN_AUTH: u32 = 1 << 19;
    pub const CLIENT_CONNECT_ATTRS: u32 = 1 << 20;
    pub const CLIENT_PLUGIN_AUTH_LENENC_CLIENT_DATA: u32 = 1 << 21;
    pub const CLIENT_CAN_HANDLE_EXPIRED_PASSWORDS: u32 = 1 << 22;
    pub const CLIENT_SESSION_TRACK: u32 = 1 << 23;
    pub const CLIENT_DEPRECATE_EOF: u32 = 1 << 24;
    pub const CLIENT_OPTIONAL_RESULTSET_METADATA: u32 = 1 << 25;
    pub const CLIENT_ZSTD_COMPRESSION_ALGORITHM: u32 = 1 << 26;
    pub const CLIENT_QUERY_ATTRIBUTES: u32 = 1 << 27;
    pub const MULTI_FACTOR_AUTHENTICATION: u32 = 1 << 28;
    pub const CLIENT_CAPABILITY_EXTENSION: u32 = 1 << 29;
    pub const CLIENT_SSL_VERIFY_SERVER_CERT: u32 = 1 << 30;
    pub const CLIENT_REMEMBER_OPTIONS: u32 = 1 << 31;

    /// Flag names in bit order.
    pub const NAMES: &[(u32, &str)] = &[
        (CLIENT_LONG_PASSWORD, "CLIENT_LONG_PASSWORD"),
        (CLIENT_FOUND_ROWS, "CLIENT_FOUND_ROWS"),
        (CLIENT_LONG_FLAG, "CLIENT_LONG_FLAG"),
        (CLIENT_CONNECT_WITH_DB, "CLIENT_CONNECT_WITH_DB"),
        (CLIENT_NO_SCHEMA, "CLIENT_NO_SCHEMA"),
        (CLIENT_COMPRESS, "CLIENT_COMPRESS"),
        (CLIENT_ODBC, "CLIENT_ODBC"),
        (CLIENT_LOCAL_FILES, "CLIENT_LOCAL_FILES"),
        (CLIENT_IGNORE_SPACE, "CLIENT_IGNORE_SPACE"),
        (CLIENT_PROTOCOL_41, "CLIENT_PROTOCOL_41"),
        (CLIENT_INTERACTIVE, "CLIENT_INTERACTIVE"),
        (CLIENT_SSL, "CLIENT_SSL"),
        (CLIENT_IGNORE_SIGPIPE, "CLIENT_IGNORE_SIGPIPE"),
        (CLIENT_TRANSACTIONS, "CLIENT_TRANSACTIONS"),
        (CLIENT_RESERVED, "CLIENT_RESERVED"),
        (CLIENT_SECURE_CONNECTION, "CLIENT_SECURE_CONNECTION"),
        (CLIENT_MULTI_STATEMENTS, "CLIENT_MULTI_STATEMENTS"),
        (CLIENT_MULTI_RESULTS, "CLIENT_MULTI_RESULTS"),
        (CLIENT_PS_MULTI_RESULTS, "CLIENT_PS_MULTI_RESULTS"),
        (CLIENT_PLUGIN_AUTH, "CLIENT_PLUGIN_AUTH"),
        (CLIENT_CONNECT_ATTRS, "CLIENT_CONNECT_ATTRS"),
        (
            CLIENT_PLUGIN_AUTH_LENENC_CLIENT_DATA,
            "CLIENT_PLUGIN_AUTH_LENENC_CLIENT_DATA",
        ),
        (
            CLIENT_CAN_HANDLE_EXPIRED_PASSWORDS,
            "CLIENT_CAN_HANDLE_EXPIRED_PASSWORDS",
        ),
        (CLIENT_SESSION_TRACK, "CLIENT_SESSION_TRACK"),
        (CLIENT_DEPRECATE_EOF, "CLIENT_DEPRECATE_EOF"),
        (
            CLIENT_OPTIONAL_RESULTSET_METADATA,
            "CLIENT_OPTIONAL_RESULTSET_METADATA",
        ),
        (
            CLIENT_ZSTD_COMPRESSION_ALGORITHM,
            "CLIENT_ZSTD_COMPRESSION_ALGORITHM",
        ),
        (CLIENT_QUERY_ATTRIBUTES, "CLIENT_QUERY_ATTRIBUTES"),
        (MULTI_FACTOR_AUTHENTICATION, "MULTI_FACTOR_AUTHENTICATION"),
        (CLIENT_CAPABILITY_EXTENSION, "CLIENT_CAPABILITY_EXTENSION"),
        (CLIENT_SSL_VERIFY_SERVER_CERT, "CLIENT_SSL_VERIFY_SERVER_CERT"),
        (CLIENT_REMEMBER_OPTIONS, "CLIENT_REMEMBER_OPTIONS"),
    ];

    /// Names of every flag set in `bits`, lowest bit first.
    pub fn names(bits: u32) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(flag, _)| bits & flag != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

/// MySQL server status flags.
pub mod server_status {
    pub const SERVER_STATUS_IN_TRANS: u16 = 0x0001;
    pub const SERVER_STATUS_AUTOCOMMIT: u16 = 0x0002;
    pub const SERVER_MORE_RESULTS_EXISTS: u16 = 0x0008;
    pub const SERVER_STATUS_NO_GOOD_INDEX_USED: u16 = 0x0010;
    pub const SERVER_STATUS_NO_INDEX_USED: u16 = 0x0020;
    pub const SERVER_STATUS_CURSOR_EXISTS: u16 = 0x0040;
    pub const SERVER_STATUS_LAST_ROW_SENT: u16 = 0x0080;
    pub const SERVER_STATUS_DB_DROPPED: u16 = 0x0100;
    pub const SERVER_STATUS_NO_BACKSLASH_ESCAPES: u16 = 0x0200;
    pub const SERVER_STATUS_METADATA_CHANGED: u16 = 0x0400;
    pub const SERVER_QUERY_WAS_SLOW: u16 = 0x0800;
    pub const SERVER_PS_OUT_PARAMS: u16 = 0x1000;
    pub const SERVER_STATUS_IN_TRANS_READONLY: u16 = 0x2000;
    pub const SERVER_SESSION_STATE_CHANGED: u16 = 0x4000;

    const NAMES: &[(u16, &str)] = &[
        (SERVER_STATUS_IN_TRANS, "SERVER_STATUS_IN_TRANS"),
        (SERVER_STATUS_AUTOCOMMIT, "SERVER_STATUS_AUTOCOMMIT"),
        (SERVER_MORE_RESULTS_EXISTS, "SERVER_MORE_RESULTS_EXISTS"),
        (
            SERVER_STATUS_NO_GOOD_INDEX_USED,
            "SERVER_STATUS_NO_GOOD_INDEX_USED",
        ),
        (SERVER_STATUS_NO_INDEX_USED, "SERVER_STATUS_NO_INDEX_USED"),
        (SERVER_STATUS_CURSOR_EXISTS, "SERVER_STATUS_CURSOR_EXISTS"),
        (SERVER_STATUS_LAST_ROW_SENT, "SERVER_STATUS_LAST_ROW_SENT"),
        (SERVER_STATUS_DB_DROPPED, "SERVER_STATUS_DB_DROPPED"),
        (
            SERVER_STATUS_NO_BACKSLASH_ESCAPES,
            "SERVER_STATUS_NO_BACKSLASH_ESCAPES",
        ),
        (
            SERVER_STATUS_METADATA_CHANGED,
            "SERVER_STATUS_METADATA_CHANGED",
        ),
        (SERVER_QUERY_WAS_SLOW, "SERVER_QUERY_WAS_SLOW"),
        (SERVER_PS_OUT_PARAMS, "SERVER_PS_OUT_PARAMS"),
        (
            SERVER_STATUS_IN_TRANS_READONLY,
            "SERVER_STATUS_IN_TRANS_READONLY",
        ),
        (SERVER_SESSION_STATE_CHANGED, "SERVER_SESSION_STATE_CHANGED"),
    ];

    /// Names of every status flag set in `bits`, lowest bit first.
    pub fn names(bits: u16) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(flag, _)| bits & flag != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

/// MySQL character set (collation) codes commonly seen in greetings.
pub mod charset {
    pub const LATIN1_SWEDISH_CI: u8 = 8;
    pub const UTF8_GENERAL_CI: u8 = 33;
    pub const UTF8MB4_GENERAL_CI: u8 = 45;
    pub const BINARY: u8 = 63;
    pub const UTF8MB4_UNICODE_CI: u8 = 224;
    pub const UTF8MB4_0900_AI_CI: u8 = 255;

    /// Collation name for a known code.
    pub fn name(code: u8) -> Option<&'static str> {
        match code {
            LATIN1_SWEDISH_CI => Some("latin1_swedish_ci"),
            UTF8_GENERAL_CI => Some("utf8_general_ci"),
            UTF8MB4_GENERAL_CI => Some("utf8mb4_general_ci"),
            BINARY => Some("binary"),
            UTF8MB4_UNICODE_CI => Some("utf8mb4_unicode_ci"),
            UTF8MB4_0900_AI_CI => Some("utf8mb4_0900_ai_ci"),
            _ => None,
        }
    }
}

/// A MySQL packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Payload length (3 bytes, max 16MB - 1)
    pub payload_length: u32,
    /// Sequence number
    pub sequence_id: u8,
}

impl PacketHeader {
    /// Total header size in bytes.
    pub const SIZE: usize = 4;

    /// Parse a packet header from 4 bytes.
    pub fn from_bytes(bytes: &[u8; 4]) -> Self {
        let payload_length =
            u32::from(bytes[0]) | (u32::from(bytes[1]) << 8) | (u32::from(bytes[2]) << 16);
        Self {
            payload_length,
            sequence_id: bytes[3],
        }
    }

    /// Parse a header from the front of `bytes`, if four bytes are present.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let head: &[u8; 4] = bytes.get(..Self::SIZE)?.try_into().ok()?;
        Some(Self::from_bytes(head))
    }

    /// Declared payload length as a buffer size.
    pub fn payload_len(&self) -> usize {
        self.payload_length as usize
    }

    /// Is the declared length outside what a greeting can plausibly be?
    pub fn is_anomalous(&self) -> bool {
        self.payload_length == 0 || self.payload_len() > MAX_DECLARED_PAYLOAD
    }
}

/// The first packet read from a server: header bytes followed by whatever
/// payload bytes arrived.
///
/// The payload may be shorter than the header declares when the read was
/// interrupted; the decoder decides what that means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    bytes: Vec<u8>,
}

impl RawPacket {
    /// Wrap raw header + payload bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// All bytes, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total number of bytes received.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when nothing at all was received.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The parsed header, if at least four bytes were received.
    pub fn header(&self) -> Option<PacketHeader> {
        PacketHeader::parse(&self.bytes)
    }

    /// Payload bytes actually received, possibly fewer than declared.
    pub fn payload(&self) -> &[u8] {
        self.bytes.get(PacketHeader::SIZE..).unwrap_or_default()
    }

    /// The first `PREVIEW_LEN` bytes of the packet.
    pub fn preview(&self) -> &[u8] {
        &self.bytes[..self.bytes.len().min(PREVIEW_LEN)]
    }

    /// Hex encoding of [`preview`](Self::preview).
    pub fn preview_hex(&self) -> String {
        hex::encode(self.preview())
    }
}
