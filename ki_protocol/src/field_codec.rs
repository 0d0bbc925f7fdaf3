//! Decodes a single field value given its [`FieldKind`] and a cursor,
//! recursing into property objects via the [`PropertyObjectRegistry`]
//! (spec §4.B).

use indexmap::IndexMap;

use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::po::PropertyObjectRegistry;
use crate::value::{FieldKind, Value, read_primitive};

/// PO nesting deeper than this is rejected rather than followed (spec §5,
/// §7 `RecursionLimit`). Bounds the work a malicious/corrupt frame can
/// force even though PO payload length isn't self-framed.
pub const MAX_PO_DEPTH: u32 = 64;

/// Stateless dispatcher: all the state it needs (the PO registry) is
/// passed in per call, since registries are shared read-only singletons.
pub struct FieldCodec;

impl FieldCodec {
    /// Decodes one field. `kind == FieldKind::Po` recurses through
    /// `registry`; every other kind is a direct cursor read.
    pub fn decode_field(
        cursor: &mut ByteCursor<'_>,
        kind: FieldKind,
        registry: &PropertyObjectRegistry,
    ) -> Result<Value, DecodeError> {
        Self::decode_field_at_depth(cursor, kind, registry, 0)
    }

    fn decode_field_at_depth(
        cursor: &mut ByteCursor<'_>,
        kind: FieldKind,
        registry: &PropertyObjectRegistry,
        depth: u32,
    ) -> Result<Value, DecodeError> {
        if kind != FieldKind::Po {
            return read_primitive(cursor, kind);
        }

        if depth > MAX_PO_DEPTH {
            return Err(DecodeError::RecursionLimit);
        }

        let type_hash = cursor.read_u32()?;
        if type_hash == 0 {
            // A zero hash denotes a null PO regardless of property_count.
            let _property_count = cursor.read_u32()?;
            return Ok(Value::Null);
        }

        let property_count = cursor.read_u32()? as usize;
        let properties = registry.properties_for(type_hash)?;
        let _ = property_count; // wire-declared count; registry order is authoritative (spec §4.B step 3)

        let mut props = IndexMap::with_capacity(properties.len());
        for prop in properties {
            let value =
                Self::decode_field_at_depth(cursor, prop.kind, registry, depth + 1)?;
            props.insert(prop.name.clone(), value);
        }

        Ok(Value::Po { type_hash, props })
    }
}
