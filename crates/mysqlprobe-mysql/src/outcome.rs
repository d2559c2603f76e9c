//! Probe outcome classification and the reported result record.

use mysqlprobe_core::{DecodeStage, Error};
use serde::Serialize;

use crate::handshake::{Handshake, TailField};

/// The terminal result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// No connection could be established.
    DialFailure { error: String },
    /// Connected, but no packet header arrived.
    ReadFailure { error: String },
    /// A packet arrived but is not a Protocol-v10 greeting.
    NotMySql {
        reason: String,
        stage: DecodeStage,
        preview: Vec<u8>,
    },
    /// A greeting was decoded, possibly truncated.
    Detected(Handshake),
}

impl ProbeOutcome {
    /// Map the result of the probe pipeline to an outcome.
    pub fn classify(result: Result<Handshake, Error>) -> Self {
        match result {
            Ok(handshake) => ProbeOutcome::Detected(handshake),
            Err(err @ (Error::Connection(_) | Error::Config(_))) => ProbeOutcome::DialFailure {
                error: err.to_string(),
            },
            Err(err @ Error::Read(_)) => ProbeOutcome::ReadFailure {
                error: err.to_string(),
            },
            Err(Error::Protocol(err)) => ProbeOutcome::NotMySql {
                reason: err.message,
                stage: err.stage,
                preview: err.raw_data.unwrap_or_default(),
            },
        }
    }

    /// Did the probe reach the server and read something?
    pub fn is_ok(&self) -> bool {
        !matches!(
            self,
            ProbeOutcome::DialFailure { .. } | ProbeOutcome::ReadFailure { .. }
        )
    }

    /// Was a MySQL greeting detected?
    pub fn is_mysql(&self) -> bool {
        matches!(self, ProbeOutcome::Detected(_))
    }

    /// The decoded greeting, when one was detected.
    pub fn handshake(&self) -> Option<&Handshake> {
        match self {
            ProbeOutcome::Detected(handshake) => Some(handshake),
            _ => None,
        }
    }

    /// Build the result record. `verbose` adds the optional greeting
    /// fields and the hex previews.
    pub fn report(&self, verbose: bool) -> ProbeReport {
        let mut report = ProbeReport {
            ok: self.is_ok(),
            mysql: self.is_mysql(),
            ..ProbeReport::default()
        };

        match self {
            ProbeOutcome::DialFailure { error } | ProbeOutcome::ReadFailure { error } => {
                report.error = Some(error.clone());
            }
            ProbeOutcome::NotMySql {
                reason, preview, ..
            } => {
                if verbose {
                    report.reason = Some(reason.clone());
                    report.first_bytes_hex = Some(hex::encode(preview));
                }
            }
            ProbeOutcome::Detected(handshake) => {
                let info = handshake.info();
                report.protocol = Some(info.protocol_version);
                report.server_version = Some(info.server_version.clone());
                report.connection_id = Some(info.connection_id);
                if verbose {
                    report.capability_flags = Some(info.capability_flags);
                    report.character_set = info.character_set;
                    report.status_flags = info.status_flags;
                    report.auth_plugin.clone_from(&info.auth_plugin_name);
                    report.preview_hex = Some(info.preview_hex());
                    report.capability_names = info.capability_names();
                    report.status_names = info.status_names();
                    report.truncated_at = handshake.missing();
                }
            }
        }
        report
    }
}

/// Flat result record handed to the output layer.
///
/// Absent fields are omitted from the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub ok: bool,
    pub mysql: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_bytes_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_flags: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_set: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_flags: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_hex: Option<String>,
    /// Named capability flags, for human-readable output only
    #[serde(skip)]
    pub capability_names: Vec<&'static str>,
    /// Named status flags, for human-readable output only
    #[serde(skip)]
    pub status_names: Vec<&'static str>,
    /// First field a truncated greeting lacked, for human-readable output only
    #[serde(skip)]
    pub truncated_at: Option<TailField>,
}

impl ProbeReport {
    /// Serialize as a single-line JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
