//! Error kinds produced by the decoder core.
//!
//! Schema-load errors ([`DecodeError::MalformedSchema`]) are fatal: a
//! registry that fails to load is unusable and the caller should not
//! attempt to decode anything with it. Per-frame errors are recoverable —
//! see [`crate::dispatch::Dispatcher`] for how they become an
//! [`crate::record::Record::Error`] instead of aborting a batch.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading schemas or decoding a frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame did not start with the KI magic (0x0D 0xF0)")]
    BadMagic,

    #[error("truncated: needed {expected} bytes, {available} remained")]
    Truncated { expected: usize, available: usize },

    #[error("malformed WSTR: odd byte count or invalid UTF-16")]
    MalformedString,

    #[error("unknown protocol id {0}")]
    UnknownProtocol(u8),

    #[error("unknown message id {msg_id} for protocol {protocol_id}")]
    UnknownMessage { protocol_id: u8, msg_id: u8 },

    #[error("unknown property object type hash {0:#010x}")]
    UnknownPropertyObject(u32),

    #[error("property object nesting exceeded the recursion limit")]
    RecursionLimit,

    /// Not a fatal condition: `content_len` reported less payload than the
    /// buffer actually carries. [`crate::dispatch::Dispatcher`] logs this as
    /// a warning and decodes only the first message; it never appears as an
    /// `Err` returned from `decode`.
    #[error("possible coalesced frames: content_len={content_len}, remaining={remaining}")]
    Coalesced { content_len: u16, remaining: usize },

    #[error("malformed schema at {path}: {reason}")]
    MalformedSchema { path: PathBuf, reason: String },
}

impl DecodeError {
    /// A short, stable tag naming the failure class, used by
    /// [`crate::record::Record::Error`] and by log messages.
    pub fn reason(&self) -> String {
        match self {
            DecodeError::BadMagic => "bad KI header".to_string(),
            DecodeError::Truncated { .. } => "truncated".to_string(),
            DecodeError::MalformedString => "malformed string".to_string(),
            DecodeError::UnknownProtocol(id) => format!("unknown protocol {id}"),
            DecodeError::UnknownMessage {
                protocol_id,
                msg_id,
            } => format!("unknown (protocol={protocol_id}, msg={msg_id})"),
            DecodeError::UnknownPropertyObject(hash) => {
                format!("unknown property object {hash:#010x}")
            }
            DecodeError::RecursionLimit => "recursion limit exceeded".to_string(),
            DecodeError::Coalesced { .. } => "possible coalesced frames".to_string(),
            DecodeError::MalformedSchema { path, reason } => {
                format!("malformed schema {}: {reason}", path.display())
            }
        }
    }
}
