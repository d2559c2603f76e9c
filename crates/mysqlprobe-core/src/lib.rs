//! Core types shared by the mysqlprobe crates.
//!
//! This crate holds the error taxonomy of a probe:
//!
//! - `ConnectionError` when the TCP connection could not be established
//! - `ReadError` when the first packet header never arrived
//! - `ProtocolError` when the bytes are not a usable handshake greeting
//! - `ConfigError` for invalid probe settings

pub mod error;

pub use error::{
    ConfigError, ConnectionError, ConnectionErrorKind, DecodeStage, Error, ProtocolError,
    ReadError, ReadStage, Result,
};
