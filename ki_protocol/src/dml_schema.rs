//! Loads DML service definitions from a directory of XML files into an
//! in-memory registry of message templates keyed by `(protocol_id,
//! msg_id)` (spec §4.F, §6.1).
//!
//! Parsing is grounded on `roxmltree`, the same crate the pack's own
//! Wizard101 DML prior art uses for this exact file format
//! (`examples/other_examples/…buddle-dml-spec…record.rs`): walk element
//! children, read a field's tag name as its key and its text/child
//! elements as its value.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use roxmltree::{Document, Node};

use crate::error::DecodeError;
use crate::value::FieldKind;

/// Metadata element names that belong to a message record rather than to
/// one of its wire fields.
const MSG_NAME: &str = "_MsgName";
const MSG_DESCRIPTION: &str = "_MsgDescription";
const MSG_HANDLER: &str = "_MsgHandler";
const MSG_ACCESS_LVL: &str = "_MsgAccessLvl";
const MSG_ORDER: &str = "_MsgOrder";
const MSG_METADATA: &[&str] = &[
    MSG_NAME,
    MSG_DESCRIPTION,
    MSG_HANDLER,
    MSG_ACCESS_LVL,
    MSG_ORDER,
];

const PROTOCOL_INFO_TAG: &str = "_ProtocolInfo";

/// One field in a message template, in wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTemplate {
    pub name: String,
    pub kind: FieldKind,
    pub noxfer: bool,
    /// Declared expected PO type hash, required by the schema format when
    /// `kind == FieldKind::Po`. The wire's own `type_hash` is what the
    /// decoder actually looks up (spec §4.B); this is carried for schema
    /// completeness/diagnostics only — see DESIGN.md.
    pub po_type: Option<u32>,
}

/// One DML message: its own identity plus its ordered field templates.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub msg_id: u8,
    pub name: String,
    pub description: String,
    pub handler: String,
    pub fields: Vec<FieldTemplate>,
}

/// A service: a namespace of DML messages identified by `protocol_id`.
/// Immutable once constructed (spec §3 "Lifecycle").
#[derive(Debug, Clone)]
pub struct ServiceTemplate {
    pub protocol_id: u8,
    pub protocol_type: String,
    pub version: u32,
    pub description: String,
    pub messages: HashMap<u8, MessageTemplate>,
}

/// The loaded registry of every service, keyed by `protocol_id`.
#[derive(Debug, Default)]
pub struct DmlSchemaRegistry {
    services: HashMap<u8, ServiceTemplate>,
}

impl DmlSchemaRegistry {
    pub fn empty() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Loads every file in `dir` as one DML service XML document.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut services: HashMap<u8, ServiceTemplate> = HashMap::new();

        let mut entries: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("reading DML schema directory {}", dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        entries.sort();

        for path in entries {
            let service = load_service_file(&path)?;
            if let Some(existing) = services.get(&service.protocol_id) {
                return Err(DecodeError::MalformedSchema {
                    path: path.clone(),
                    reason: format!(
                        "protocol_id {} declared by both services named '{}' and '{}'",
                        service.protocol_id, existing.protocol_type, service.protocol_type
                    ),
                }
                .into());
            }
            services.insert(service.protocol_id, service);
        }

        Ok(Self { services })
    }

    pub fn service(&self, protocol_id: u8) -> Option<&ServiceTemplate> {
        self.services.get(&protocol_id)
    }

    pub fn message(&self, protocol_id: u8, msg_id: u8) -> Option<(&ServiceTemplate, &MessageTemplate)> {
        let service = self.service(protocol_id)?;
        let message = service.messages.get(&msg_id)?;
        Some((service, message))
    }
}

fn load_service_file(path: &Path) -> Result<ServiceTemplate> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading DML service file {}", path.display()))?;
    // A malformed document (missing required elements, unknown field type,
    // …) is the load-time failure spec §4.F names `MalformedSchema(path,
    // reason)`; keep that tag live rather than flattening it into an
    // untyped anyhow string.
    parse_service(&text).map_err(|err| {
        DecodeError::MalformedSchema {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        }
        .into()
    })
}

fn parse_service(text: &str) -> Result<ServiceTemplate> {
    let doc = Document::parse(text).context("invalid XML")?;
    let root = doc.root_element();

    let protocol_info = root
        .children()
        .filter(Node::is_element)
        .find(|n| n.tag_name().name() == PROTOCOL_INFO_TAG)
        .with_context(|| format!("missing {PROTOCOL_INFO_TAG} element"))?;

    let protocol_id: u8 = child_text(protocol_info, "ServiceID")
        .context("missing ServiceID")?
        .parse()
        .context("ServiceID is not a u8")?;
    let protocol_type = child_text(protocol_info, "ProtocolType")
        .context("missing ProtocolType")?
        .to_string();
    let version: u32 = child_text(protocol_info, "ProtocolVersion")
        .context("missing ProtocolVersion")?
        .parse()
        .context("ProtocolVersion is not a u32")?;
    let description = child_text(protocol_info, "ProtocolDescription")
        .context("missing ProtocolDescription")?
        .to_string();

    let mut parsed_messages: Vec<(String, MessageTemplate)> = Vec::new();
    for node in root.children().filter(Node::is_element) {
        if node.tag_name().name() == PROTOCOL_INFO_TAG {
            continue;
        }
        let class_name = node.tag_name().name().to_string();
        let message = parse_message(node)
            .with_context(|| format!("parsing message record '{class_name}'"))?;
        parsed_messages.push((class_name, message));
    }

    // msg_id is assigned by sorting message records lexicographically by
    // their own declared (element) name, 1-based (spec §4.F step 3).
    parsed_messages.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut messages = HashMap::with_capacity(parsed_messages.len());
    for (index, (_, mut message)) in parsed_messages.into_iter().enumerate() {
        let msg_id = u8::try_from(index + 1).context("too many messages in one service")?;
        message.msg_id = msg_id;
        messages.insert(msg_id, message);
    }

    Ok(ServiceTemplate {
        protocol_id,
        protocol_type,
        version,
        description,
        messages,
    })
}

fn parse_message(node: Node<'_, '_>) -> Result<MessageTemplate> {
    let name = child_text(node, MSG_NAME)
        .context("missing _MsgName")?
        .to_string();
    let description = child_text(node, MSG_DESCRIPTION)
        .context("missing _MsgDescription")?
        .to_string();
    let handler = child_text(node, MSG_HANDLER)
        .context("missing _MsgHandler")?
        .to_string();
    child_text(node, MSG_ACCESS_LVL).context("missing _MsgAccessLvl")?;

    let mut fields = IndexMap::new();
    for field_node in node.children().filter(Node::is_element) {
        let tag = field_node.tag_name().name();
        if MSG_METADATA.contains(&tag) {
            continue;
        }
        let field = parse_field(field_node)
            .with_context(|| format!("parsing field '{tag}'"))?;
        fields.insert(field.name.clone(), field);
    }

    Ok(MessageTemplate {
        msg_id: 0, // assigned by the caller once sorting is known
        name,
        description,
        handler,
        fields: fields.into_values().collect(),
    })
}

fn parse_field(node: Node<'_, '_>) -> Result<FieldTemplate> {
    let name = node.tag_name().name().to_string();
    let kind_name = child_text(node, "TYPE").context("missing TYPE")?;
    let kind =
        FieldKind::from_name(kind_name).with_context(|| format!("unknown field type '{kind_name}'"))?;
    let noxfer = child_text(node, "NOXFER")
        .map(|v| v.eq_ignore_ascii_case("TRUE"))
        .unwrap_or(false);
    let po_type = if kind == FieldKind::Po {
        Some(
            child_text(node, "POTYPE")
                .context("PO field is missing POTYPE")?
                .parse()
                .context("POTYPE is not a u32")?,
        )
    } else {
        None
    };

    Ok(FieldTemplate {
        name,
        kind,
        noxfer,
        po_type,
    })
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .filter(Node::is_element)
        .find(|n| n.tag_name().name() == tag)
        .and_then(|n| n.text())
        .map(str::trim)
}
