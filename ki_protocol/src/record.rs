//! The decoder's output types (spec §3 "Record").

use indexmap::IndexMap;
use serde::Serialize;

use crate::value::Value;

/// Fields in declaration/wire order, keyed by name.
pub type FieldMap = IndexMap<String, Value>;

/// One decoded frame. Owned by the caller; holds no references into the
/// input buffer (spec §3 "Ownership & lifecycle").
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Record {
    #[serde(rename = "control")]
    Control(ControlRecord),
    #[serde(rename = "dml")]
    Dml(DmlRecord),
    #[serde(rename = "error")]
    Error(ErrorRecord),
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlRecord {
    pub opcode: u8,
    pub name: String,
    pub fields: FieldMap,
}

#[derive(Debug, Clone, Serialize)]
pub struct DmlRecord {
    pub protocol_id: u8,
    pub msg_id: u8,
    pub protocol_name: String,
    pub msg_name: String,
    pub msg_description: String,
    pub fields: FieldMap,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub reason: String,
    #[serde(with = "hex_bytes")]
    pub raw: Vec<u8>,
}

mod hex_bytes {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        serializer.serialize_str(&hex)
    }
}
