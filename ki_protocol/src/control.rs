//! The fixed, small catalogue of control-plane opcodes (spec §4.E).
//!
//! Unlike DML, control messages are not data-driven: the body layout for
//! each opcode is compiled in, never loaded from an external schema.

use indexmap::IndexMap;

use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::field_codec::FieldCodec;
use crate::po::PropertyObjectRegistry;
use crate::record::ControlRecord;
use crate::value::FieldKind;

struct ControlTemplate {
    opcode: u8,
    name: &'static str,
    fields: &'static [(&'static str, FieldKind)],
}

/// The built-in opcode table. Real session-handshake payloads beyond
/// `KEEP_ALIVE_RSP`'s confirmed-empty body (spec §8 scenario 2) aren't
/// pinned down by the corpus this crate was built against; the field
/// lists below are a reasonable placeholder shape and are called out as
/// such in DESIGN.md.
const TEMPLATES: &[ControlTemplate] = &[
    ControlTemplate {
        opcode: 0,
        name: "SESSION_OFFER",
        fields: &[
            ("session_id", FieldKind::Uint),
            ("timestamp", FieldKind::Uint),
        ],
    },
    ControlTemplate {
        opcode: 3,
        name: "KEEP_ALIVE",
        fields: &[
            ("session_id", FieldKind::Uint),
            ("timestamp", FieldKind::Uint),
        ],
    },
    ControlTemplate {
        opcode: 4,
        name: "SESSION_ACCEPT",
        fields: &[("session_id", FieldKind::Uint)],
    },
    ControlTemplate {
        opcode: 5,
        name: "KEEP_ALIVE_RSP",
        fields: &[],
    },
];

/// Decodes the fixed catalogue of control opcodes. Stateless: there is no
/// externally loaded configuration for control messages, so this is a
/// zero-sized dispatcher rather than a registry.
pub struct ControlProtocol;

impl ControlProtocol {
    pub fn decode(
        cursor: &mut ByteCursor<'_>,
        opcode: u8,
        po_registry: &PropertyObjectRegistry,
    ) -> Result<ControlRecord, DecodeError> {
        match TEMPLATES.iter().find(|t| t.opcode == opcode) {
            Some(template) => {
                let mut fields = IndexMap::with_capacity(template.fields.len());
                for &(name, kind) in template.fields {
                    let value = FieldCodec::decode_field(cursor, kind, po_registry)?;
                    fields.insert(name.to_string(), value);
                }
                Ok(ControlRecord {
                    opcode,
                    name: template.name.to_string(),
                    fields,
                })
            }
            None => {
                let raw = cursor.read_bytes(cursor.remaining())?;
                let mut fields = IndexMap::with_capacity(1);
                fields.insert(
                    "raw".to_string(),
                    crate::value::Value::Str(raw),
                );
                Ok(ControlRecord {
                    opcode,
                    name: "UNKNOWN".to_string(),
                    fields,
                })
            }
        }
    }
}
