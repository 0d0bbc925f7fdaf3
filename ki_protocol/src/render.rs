//! Turns a decoded [`Record`] into an ordered, JSON-shaped tree for display
//! or serialization (spec §4.I). Kept separate from `Record`'s own
//! `Serialize` impl (`record.rs`) because rendering applies presentation
//! choices — hex-encoding bytes, flattening property objects, a `compact`
//! mode — that the wire-faithful `Record`/`Value` types don't bake in.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::record::{ControlRecord, DmlRecord, ErrorRecord, Record};
use crate::value::Value;

/// A JSON-shaped value that preserves field order, the way the wire and
/// the DML schema declare it, instead of serde_json's default alphabetic
/// map order.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// Bytes with no declared text encoding (`STR` fields, `ErrorRecord::raw`)
    /// render as lowercase hex rather than lossily-decoded text.
    Hex(String),
    Map(IndexMap<String, Rendered>),
}

impl Serialize for Rendered {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rendered::Null => serializer.serialize_none(),
            Rendered::Bool(b) => serializer.serialize_bool(*b),
            Rendered::Int(n) => serializer.serialize_i64(*n),
            Rendered::UInt(n) => serializer.serialize_u64(*n),
            Rendered::Float(f) => serializer.serialize_f64(*f),
            Rendered::Str(s) | Rendered::Hex(s) => serializer.serialize_str(s),
            Rendered::Map(map) => {
                let mut ser = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    ser.serialize_entry(k, v)?;
                }
                ser.end()
            }
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn render_value(value: &Value) -> Rendered {
    match value {
        Value::Byt(v) => Rendered::Int(*v as i64),
        Value::Ubyt(v) => Rendered::UInt(*v as u64),
        Value::Shrt(v) => Rendered::Int(*v as i64),
        Value::Ushrt(v) => Rendered::UInt(*v as u64),
        Value::Int(v) => Rendered::Int(*v as i64),
        Value::Uint(v) => Rendered::UInt(*v as u64),
        Value::Gid(v) => Rendered::UInt(*v),
        Value::Flt(v) => Rendered::Float(*v as f64),
        Value::Dbl(v) => Rendered::Float(*v),
        Value::Str(bytes) => Rendered::Hex(hex(bytes)),
        Value::Wstr(s) => Rendered::Str(s.clone()),
        Value::Bool(b) => Rendered::Bool(*b),
        Value::Po { type_hash, props } => {
            let mut map = IndexMap::with_capacity(props.len() + 1);
            map.insert("__type".to_string(), Rendered::Hex(format!("{type_hash:08x}")));
            for (name, prop) in props {
                map.insert(name.clone(), render_value(prop));
            }
            Rendered::Map(map)
        }
        Value::Null => Rendered::Null,
    }
}

fn render_fields(fields: &IndexMap<String, Value>) -> Rendered {
    let mut map = IndexMap::with_capacity(fields.len());
    for (name, value) in fields {
        map.insert(name.clone(), render_value(value));
    }
    Rendered::Map(map)
}

fn render_control(record: &ControlRecord) -> Rendered {
    let mut map = IndexMap::with_capacity(4);
    map.insert("kind".to_string(), Rendered::Str("control".to_string()));
    map.insert("opcode".to_string(), Rendered::UInt(record.opcode as u64));
    map.insert("name".to_string(), Rendered::Str(record.name.clone()));
    map.insert("fields".to_string(), render_fields(&record.fields));
    Rendered::Map(map)
}

fn render_dml(record: &DmlRecord, compact: bool) -> Rendered {
    let mut map = IndexMap::with_capacity(4);
    map.insert("kind".to_string(), Rendered::Str("dml".to_string()));

    if compact {
        map.insert("protocol".to_string(), Rendered::UInt(record.protocol_id as u64));
        map.insert("message".to_string(), Rendered::Str(record.msg_name.clone()));
    } else {
        let mut protocol = IndexMap::with_capacity(2);
        protocol.insert("id".to_string(), Rendered::UInt(record.protocol_id as u64));
        protocol.insert("name".to_string(), Rendered::Str(record.protocol_name.clone()));
        map.insert("protocol".to_string(), Rendered::Map(protocol));

        let mut message = IndexMap::with_capacity(3);
        message.insert("id".to_string(), Rendered::UInt(record.msg_id as u64));
        message.insert("name".to_string(), Rendered::Str(record.msg_name.clone()));
        message.insert(
            "description".to_string(),
            Rendered::Str(record.msg_description.clone()),
        );
        map.insert("message".to_string(), Rendered::Map(message));
    }

    map.insert("fields".to_string(), render_fields(&record.fields));
    Rendered::Map(map)
}

fn render_error(record: &ErrorRecord) -> Rendered {
    // spec §7: a user-visible failure renders as `{ error: <reason>, raw:
    // <hex> }`; `kind` is this module's own envelope tag, carried for
    // consistency with the control/dml branches.
    let mut map = IndexMap::with_capacity(3);
    map.insert("kind".to_string(), Rendered::Str("error".to_string()));
    map.insert("error".to_string(), Rendered::Str(record.reason.clone()));
    map.insert("raw".to_string(), Rendered::Hex(hex(&record.raw)));
    Rendered::Map(map)
}

/// Renders a decoded record into a display-ready tree. `compact` drops
/// message/protocol descriptions, keeping only the identifiers a consumer
/// needs to correlate records (spec §4.I).
pub fn render(record: &Record, compact: bool) -> Rendered {
    match record {
        Record::Control(control) => render_control(control),
        Record::Dml(dml) => render_dml(dml, compact),
        Record::Error(error) => render_error(error),
    }
}
