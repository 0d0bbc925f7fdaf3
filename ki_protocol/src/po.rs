//! Loads the externally supplied property-object typedef registry (spec
//! §4.C, §6.2): a JSON document mapping a decimal-string 32-bit hash to a
//! named, ordered property list, with base-type inheritance.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::DecodeError;
use crate::value::FieldKind;

#[derive(Debug, Deserialize)]
struct RawTypedef {
    #[allow(dead_code)]
    name: String,
    #[serde(default)]
    bases: Vec<String>,
    properties: IndexMap<String, RawProperty>,
}

#[derive(Debug, Deserialize)]
struct RawProperty {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    info: serde_json::Value,
}

/// One property in a flattened, decode-ready type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTemplate {
    pub name: String,
    pub kind: FieldKind,
    /// Set when `kind == FieldKind::Po`: the nested type's own hash.
    pub po_type: Option<u32>,
}

/// A fully flattened property-object type: `name` (for diagnostics) plus
/// its effective, ordered property list.
#[derive(Debug, Clone)]
pub struct PropertyObjectType {
    pub name: String,
    pub properties: Vec<PropertyTemplate>,
}

/// Hash → flattened type. Loaded once, shared read-only by all decodes.
#[derive(Debug, Default)]
pub struct PropertyObjectRegistry {
    types: HashMap<u32, PropertyObjectType>,
}

impl PropertyObjectRegistry {
    /// An empty registry. Any PO field encountered will fail with
    /// [`DecodeError::UnknownPropertyObject`].
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading PO typedef document {}", path.display()))?;
        // A malformed typedef document is the load-time failure spec §4.F/§7
        // name `MalformedSchema(path, reason)`; keep that tag live rather
        // than flattening it into an untyped anyhow string.
        Self::parse(&text).map_err(|err| {
            DecodeError::MalformedSchema {
                path: path.to_path_buf(),
                reason: format!("{err:#}"),
            }
            .into()
        })
    }

    pub fn parse(text: &str) -> Result<Self> {
        let raw: IndexMap<String, RawTypedef> =
            serde_json::from_str(text).context("PO typedef document is not valid JSON")?;

        let mut by_hash: HashMap<u32, RawTypedef> = HashMap::with_capacity(raw.len());
        let mut by_name: HashMap<String, u32> = HashMap::with_capacity(raw.len());
        for (key, typedef) in raw {
            let hash: u32 = key
                .parse()
                .with_context(|| format!("typedef key '{key}' is not a decimal u32 hash"))?;
            by_name.insert(typedef.name.clone(), hash);
            by_hash.insert(hash, typedef);
        }

        let mut types = HashMap::with_capacity(by_hash.len());
        for &hash in by_hash.keys() {
            let flattened = flatten(hash, &by_hash, &by_name, &mut Vec::new())?;
            types.insert(hash, flattened);
        }

        Ok(Self { types })
    }

    /// Looks up the flattened property list for a PO type hash.
    pub fn properties_for(&self, type_hash: u32) -> Result<&[PropertyTemplate], DecodeError> {
        self.types
            .get(&type_hash)
            .map(|t| t.properties.as_slice())
            .ok_or(DecodeError::UnknownPropertyObject(type_hash))
    }

    pub fn contains(&self, type_hash: u32) -> bool {
        self.types.contains_key(&type_hash)
    }
}

fn flatten(
    hash: u32,
    by_hash: &HashMap<u32, RawTypedef>,
    by_name: &HashMap<String, u32>,
    stack: &mut Vec<u32>,
) -> Result<PropertyObjectType> {
    if stack.contains(&hash) {
        bail!("cyclic base-type chain involving type hash {hash:#010x}");
    }
    stack.push(hash);

    let typedef = by_hash
        .get(&hash)
        .ok_or_else(|| anyhow!("base type hash {hash:#010x} is not defined"))?;

    let mut properties: Vec<PropertyTemplate> = Vec::new();
    for base_name in &typedef.bases {
        let base_hash = *by_name
            .get(base_name)
            .ok_or_else(|| anyhow!("base type '{base_name}' is not defined"))?;
        let base = flatten(base_hash, by_hash, by_name, stack)?;
        properties.extend(base.properties);
    }

    for (name, raw_prop) in &typedef.properties {
        let kind = FieldKind::from_name(&raw_prop.kind)
            .ok_or_else(|| anyhow!("property '{name}' has unknown type '{}'", raw_prop.kind))?;
        let po_type = if kind == FieldKind::Po {
            Some(parse_po_type_hash(&raw_prop.info).with_context(|| {
                format!("property '{name}' is kind PO but its 'info' is not a type hash")
            })?)
        } else {
            None
        };
        properties.push(PropertyTemplate {
            name: name.clone(),
            kind,
            po_type,
        });
    }

    let mut seen = std::collections::HashSet::with_capacity(properties.len());
    for prop in &properties {
        if !seen.insert(&prop.name) {
            bail!(
                "duplicate property name '{}' in flattened type '{}'",
                prop.name,
                typedef.name
            );
        }
    }

    stack.pop();
    Ok(PropertyObjectType {
        name: typedef.name.clone(),
        properties,
    })
}

fn parse_po_type_hash(info: &serde_json::Value) -> Result<u32> {
    match info {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| anyhow!("type hash does not fit in u32")),
        serde_json::Value::String(s) => s
            .parse()
            .with_context(|| format!("'{s}' is not a decimal u32 type hash")),
        other => bail!("unsupported PO type-hash representation: {other}"),
    }
}
