//! Protocol-v10 handshake greeting decoder.
//!
//! Layout of the greeting payload:
//!
//! ```text
//! protocol_version      1
//! server_version        NUL-terminated
//! connection_id         4 (LE)
//! auth_plugin_data_1    8
//! filler                1
//! capability_flags_lo   2 (LE)
//! character_set         1
//! status_flags          2 (LE)
//! capability_flags_hi   2 (LE)
//! auth_plugin_data_len  1
//! reserved              10
//! auth_plugin_data_2    auth_plugin_data_len - 8
//! auth_plugin_name      NUL-terminated (CLIENT_PLUGIN_AUTH)
//! ```
//!
//! The framing and the first three fields are mandatory: without them the
//! bytes are not a MySQL greeting and decoding fails with a
//! [`ProtocolError`]. Everything after the connection id is optional;
//! running out of bytes there yields [`Handshake::Partial`] carrying the
//! fields decoded so far.

use std::fmt;

use mysqlprobe_core::{DecodeStage, ProtocolError};

use crate::protocol::{PacketReader, RawPacket, capabilities, charset, server_status};

/// First part of the authentication challenge.
const AUTH_DATA_PART1_LEN: usize = 8;
/// Filler byte after the first challenge part.
const FILLER_LEN: usize = 1;
/// Character set, status flags and upper capability word.
const EXTENDED_FLAGS_LEN: usize = 5;
/// Reserved zero bytes before the second challenge part.
const RESERVED_LEN: usize = 10;

/// Fields decoded from a server greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeInfo {
    /// Protocol version (10 for every supported server)
    pub protocol_version: u8,
    /// Server version string
    pub server_version: String,
    /// Connection (thread) id assigned by the server
    pub connection_id: u32,
    /// Capability flags; only the lower word when the greeting was short
    pub capability_flags: u32,
    /// Default collation code
    pub character_set: Option<u8>,
    /// Server status flags
    pub status_flags: Option<u16>,
    /// Default authentication plugin
    pub auth_plugin_name: Option<String>,
    /// First bytes of the packet, header included
    pub raw_preview: Vec<u8>,
}

impl HandshakeInfo {
    /// Check whether the server advertised a capability flag.
    pub fn has_capability(&self, flag: u32) -> bool {
        self.capability_flags & flag != 0
    }

    /// Names of all advertised capability flags.
    pub fn capability_names(&self) -> Vec<&'static str> {
        capabilities::names(self.capability_flags)
    }

    /// Names of the status flags, empty when none were decoded.
    pub fn status_names(&self) -> Vec<&'static str> {
        self.status_flags.map(server_status::names).unwrap_or_default()
    }

    /// Collation name, when the character set is known.
    pub fn charset_name(&self) -> Option<&'static str> {
        self.character_set.and_then(charset::name)
    }

    /// Hex encoding of the packet preview.
    pub fn preview_hex(&self) -> String {
        hex::encode(&self.raw_preview)
    }
}

/// The first optional field a truncated greeting did not contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailField {
    /// First challenge part and filler
    AuthChallenge,
    /// Lower capability word
    CapabilityLower,
    /// Character set, status flags and upper capability word
    ExtendedFlags,
    /// Length byte of the authentication data
    AuthDataLength,
    /// Authentication plugin name
    AuthPluginName,
}

impl TailField {
    pub const fn as_str(self) -> &'static str {
        match self {
            TailField::AuthChallenge => "auth challenge",
            TailField::CapabilityLower => "capability flags (lower)",
            TailField::ExtendedFlags => "character set / status / capability flags (upper)",
            TailField::AuthDataLength => "auth data length",
            TailField::AuthPluginName => "auth plugin name",
        }
    }
}

impl fmt::Display for TailField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    /// Every field the server's capabilities call for was present.
    Complete(HandshakeInfo),
    /// The greeting ended early; `missing` is the first absent field.
    Partial {
        info: HandshakeInfo,
        missing: TailField,
    },
}

impl Handshake {
    /// The decoded fields.
    pub fn info(&self) -> &HandshakeInfo {
        match self {
            Handshake::Complete(info) | Handshake::Partial { info, .. } => info,
        }
    }

    /// The first field a truncated greeting lacked.
    pub fn missing(&self) -> Option<TailField> {
        match self {
            Handshake::Complete(_) => None,
            Handshake::Partial { missing, .. } => Some(*missing),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Handshake::Complete(_))
    }
}

/// Decode a raw packet as a Protocol-v10 greeting.
///
/// Decoding is a pure function of the packet bytes.
pub fn decode(packet: &RawPacket) -> Result<Handshake, ProtocolError> {
    let reject = |stage: DecodeStage, message: String| {
        ProtocolError::new(stage, message).with_raw_data(packet.preview())
    };

    let header = packet.header().ok_or_else(|| {
        reject(
            DecodeStage::Header,
            "short read (no packet header)".to_string(),
        )
    })?;
    let payload = packet
        .payload()
        .get(..header.payload_len())
        .ok_or_else(|| {
            reject(
                DecodeStage::Header,
                "short read (payload incomplete)".to_string(),
            )
        })?;

    let mut reader = PacketReader::new(payload);

    let protocol_version = reader.read_u8().map_err(|_| {
        reject(
            DecodeStage::ProtocolVersion,
            "payload too small for protocol version".to_string(),
        )
    })?;

    let server_version = reader.read_null_string().map_err(|e| {
        reject(
            DecodeStage::ServerVersion,
            format!("server version parse error: {e}"),
        )
    })?;

    let connection_id = reader.read_u32_le().map_err(|_| {
        reject(
            DecodeStage::ConnectionId,
            "payload too small for connection id".to_string(),
        )
    })?;

    let mut info = HandshakeInfo {
        protocol_version,
        server_version,
        connection_id,
        capability_flags: 0,
        character_set: None,
        status_flags: None,
        auth_plugin_name: None,
        raw_preview: packet.preview().to_vec(),
    };

    let handshake = match decode_tail(&mut reader, &mut info) {
        Ok(()) => Handshake::Complete(info),
        Err(missing) => {
            tracing::debug!(%missing, offset = reader.position(), "Greeting truncated");
            Handshake::Partial { info, missing }
        }
    };
    Ok(handshake)
}

/// Decode the optional fields after the connection id into `info`.
fn decode_tail(reader: &mut PacketReader<'_>, info: &mut HandshakeInfo) -> Result<(), TailField> {
    reader
        .skip(AUTH_DATA_PART1_LEN + FILLER_LEN)
        .map_err(|_| TailField::AuthChallenge)?;

    let caps_lower = reader
        .read_u16_le()
        .map_err(|_| TailField::CapabilityLower)?;
    info.capability_flags = u32::from(caps_lower);

    // All five bytes or none
    let [charset, status_lo, status_hi, caps_lo, caps_hi] = reader
        .take_array::<EXTENDED_FLAGS_LEN>()
        .map_err(|_| TailField::ExtendedFlags)?;
    info.character_set = Some(charset);
    info.status_flags = Some(u16::from_le_bytes([status_lo, status_hi]));
    info.capability_flags |= u32::from(u16::from_le_bytes([caps_lo, caps_hi])) << 16;

    let plugin_auth = info.has_capability(capabilities::CLIENT_PLUGIN_AUTH);
    let auth_data_len = match reader.read_u8() {
        Ok(len) => usize::from(len),
        Err(_) if plugin_auth => return Err(TailField::AuthDataLength),
        Err(_) => 0,
    };

    reader.skip(RESERVED_LEN).ok();

    if auth_data_len > AUTH_DATA_PART1_LEN {
        reader.skip_clamped(auth_data_len - AUTH_DATA_PART1_LEN);
    }

    if !plugin_auth {
        return Ok(());
    }
    let name = reader
        .read_null_string()
        .map_err(|_| TailField::AuthPluginName)?;
    info.auth_plugin_name = Some(name);
    Ok(())
}
