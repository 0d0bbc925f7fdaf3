//! Single entry point: [`Dispatcher::decode`] orchestrates frame parsing,
//! branches to control or DML, and applies the error policy (spec §4.H).

use crate::control::ControlProtocol;
use crate::cursor::ByteCursor;
use crate::dml::{DmlEntry, DmlProtocol};
use crate::dml_schema::DmlSchemaRegistry;
use crate::error::DecodeError;
use crate::frame::FrameHeader;
use crate::po::PropertyObjectRegistry;
use crate::record::{ErrorRecord, Record};

/// Orchestrates a single `decode(bytes) -> Record` call. Holds the three
/// schema singletons (spec §3 "Ownership & lifecycle": loaded once, shared
/// read-only by all decodes) plus the one policy knob.
pub struct Dispatcher {
    dml_schema: DmlSchemaRegistry,
    po_registry: PropertyObjectRegistry,
    /// When set, per-frame decode errors are downgraded to a DEBUG log and
    /// reported in-band as a `Record::Error` instead of propagating to the
    /// caller (spec §7 "Propagation policy"). This never changes the
    /// content of a successfully decoded record — only whether a failure
    /// raises or is silently reported.
    silence_decode_errors: bool,
}

impl Dispatcher {
    pub fn new(
        dml_schema: DmlSchemaRegistry,
        po_registry: PropertyObjectRegistry,
        silence_decode_errors: bool,
    ) -> Self {
        Self {
            dml_schema,
            po_registry,
            silence_decode_errors,
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Record, DecodeError> {
        let mut cursor = ByteCursor::new(bytes);

        let header = match FrameHeader::parse(&mut cursor) {
            Ok(header) => header,
            // BadMagic always yields a record; it is not subject to the
            // silence_decode_errors policy (spec §4.H step 1, §8 scenario 1).
            Err(DecodeError::BadMagic) => {
                return Ok(Record::Error(ErrorRecord {
                    reason: "bad KI header".to_string(),
                    raw: bytes.to_vec(),
                }));
            }
            Err(other) => return self.apply_policy(other, bytes),
        };

        let remaining = cursor.remaining();
        if (header.content_len as usize) + 4 < remaining {
            log::warn!(
                "possible coalesced frames: content_len={}, remaining={remaining}",
                header.content_len
            );
        }

        let result = if header.content_is_control {
            ControlProtocol::decode(&mut cursor, header.opcode, &self.po_registry)
                .map(Record::Control)
        } else {
            DmlProtocol::decode(bytes, DmlEntry::Frame, &self.dml_schema, &self.po_registry)
        };

        match result {
            Ok(record) => Ok(record),
            Err(err) => self.apply_policy(err, bytes),
        }
    }

    fn apply_policy(&self, err: DecodeError, raw: &[u8]) -> Result<Record, DecodeError> {
        if self.silence_decode_errors {
            log::debug!("decode error silenced: {err}");
            Ok(Record::Error(ErrorRecord {
                reason: err.reason(),
                raw: raw.to_vec(),
            }))
        } else {
            Err(err)
        }
    }
}
