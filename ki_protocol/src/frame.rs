//! Parses and validates the 8-byte KI frame preamble (spec §3, §4.D).
//!
//! The preamble is `0x0D 0xF0 | u16 content_len | u8 content_is_control |
//! u8 opcode | 2 reserved bytes`. Cross-checking the component budget
//! table, §4.D's "8-byte preamble", and the worked `dml_update_poi`
//! example in spec §8 against each other (the DML body's `protocol_id`/
//! `msg_id` line up only if the preamble is 8 bytes long) resolves an
//! internal inconsistency in favor of 8 bytes and 2 reserved bytes; see
//! DESIGN.md.

use crate::cursor::ByteCursor;
use crate::error::DecodeError;

pub const HEADER_LEN: usize = 8;
const MAGIC: [u8; 2] = [0x0D, 0xF0];

/// The parsed frame preamble. Does not include the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub content_len: u16,
    pub content_is_control: bool,
    pub opcode: u8,
}

impl FrameHeader {
    /// Parses the preamble from the front of `cursor` without touching the
    /// body that follows it.
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let magic = cursor.read_bytes(2)?;
        if magic != MAGIC {
            return Err(DecodeError::BadMagic);
        }

        let content_len = cursor.read_u16()?;
        let content_is_control = cursor.read_u8()? != 0;
        let opcode = cursor.read_u8()?;
        cursor.skip(2)?; // reserved

        Ok(Self {
            content_len,
            content_is_control,
            opcode,
        })
    }
}

/// Cheap magic-byte sniff for a producer deciding whether a TCP payload is
/// worth handing to [`crate::dispatch::Dispatcher::decode`] at all — mirrors
/// `moonlight.net.capture.is_ki_packet_naive`, which does the same peek
/// before ever constructing a reader.
pub fn looks_like_ki_frame(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0..2] == MAGIC
}
