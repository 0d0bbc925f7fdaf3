//! The field-value type system: the ~15 primitive wire encodings (spec §3)
//! plus the recursive property-object container.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::DecodeError;

/// Tag-like enumeration of every field encoding the wire supports.
///
/// `Gid` and `U64` are the same 8-byte little-endian unsigned wire
/// contract under two names (spec §3 "GID / U64"); both template sources
/// (DML XML `<TYPE>`, built-in control templates) resolve to
/// [`FieldKind::Gid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Byt,
    Ubyt,
    Shrt,
    Ushrt,
    Int,
    Uint,
    Gid,
    Flt,
    Dbl,
    Str,
    Wstr,
    Bool,
    Po,
}

impl FieldKind {
    /// Parses a `<TYPE>` / template kind name. Case-insensitive, since the
    /// DML XML corpus is not consistent about it.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_uppercase().as_str() {
            "BYT" => FieldKind::Byt,
            "UBYT" => FieldKind::Ubyt,
            "SHRT" => FieldKind::Shrt,
            "USHRT" => FieldKind::Ushrt,
            "INT" => FieldKind::Int,
            "UINT" => FieldKind::Uint,
            "GID" | "U64" => FieldKind::Gid,
            "FLT" => FieldKind::Flt,
            "DBL" => FieldKind::Dbl,
            "STR" => FieldKind::Str,
            "WSTR" => FieldKind::Wstr,
            "BOOL" => FieldKind::Bool,
            "PO" => FieldKind::Po,
            _ => return None,
        })
    }
}

/// A decoded field value. Owns all its data — no back-pointers into the
/// input buffer survive past the `decode` call that produced it (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    Byt(i8),
    Ubyt(u8),
    Shrt(i16),
    Ushrt(u16),
    Int(i32),
    Uint(u32),
    Gid(u64),
    Flt(f32),
    Dbl(f64),
    /// Raw bytes: the wire does not carry an encoding for `STR`.
    Str(#[serde(with = "serde_bytes_field")] Vec<u8>),
    Wstr(String),
    Bool(bool),
    Po {
        type_hash: u32,
        props: IndexMap<String, Value>,
    },
    Null,
}

impl Value {
    pub fn kind(&self) -> Option<FieldKind> {
        Some(match self {
            Value::Byt(_) => FieldKind::Byt,
            Value::Ubyt(_) => FieldKind::Ubyt,
            Value::Shrt(_) => FieldKind::Shrt,
            Value::Ushrt(_) => FieldKind::Ushrt,
            Value::Int(_) => FieldKind::Int,
            Value::Uint(_) => FieldKind::Uint,
            Value::Gid(_) => FieldKind::Gid,
            Value::Flt(_) => FieldKind::Flt,
            Value::Dbl(_) => FieldKind::Dbl,
            Value::Str(_) => FieldKind::Str,
            Value::Wstr(_) => FieldKind::Wstr,
            Value::Bool(_) => FieldKind::Bool,
            Value::Po { .. } => FieldKind::Po,
            Value::Null => return None,
        })
    }
}

/// Reads a single non-PO primitive off a cursor. Split out of
/// [`crate::field_codec::FieldCodec`] so it can be reused by the built-in
/// control templates without pulling in the PO registry.
pub fn read_primitive(
    cursor: &mut crate::cursor::ByteCursor<'_>,
    kind: FieldKind,
) -> Result<Value, DecodeError> {
    Ok(match kind {
        FieldKind::Byt => Value::Byt(cursor.read_i8()?),
        FieldKind::Ubyt => Value::Ubyt(cursor.read_u8()?),
        FieldKind::Shrt => Value::Shrt(cursor.read_i16()?),
        FieldKind::Ushrt => Value::Ushrt(cursor.read_u16()?),
        FieldKind::Int => Value::Int(cursor.read_i32()?),
        FieldKind::Uint => Value::Uint(cursor.read_u32()?),
        FieldKind::Gid => Value::Gid(cursor.read_u64()?),
        FieldKind::Flt => Value::Flt(cursor.read_f32()?),
        FieldKind::Dbl => Value::Dbl(cursor.read_f64()?),
        FieldKind::Str => Value::Str(cursor.read_str()?),
        FieldKind::Wstr => Value::Wstr(cursor.read_wstr()?),
        FieldKind::Bool => Value::Bool(cursor.read_u8()? != 0),
        FieldKind::Po => unreachable!("PO fields go through FieldCodec::decode_field"),
    })
}

/// Serializes `STR` bytes as a plain byte array without pulling in the
/// `serde_bytes` crate for one field.
mod serde_bytes_field {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(bytes.iter())
    }
}
