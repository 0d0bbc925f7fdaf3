pub mod control;
pub mod cursor;
pub mod dispatch;
pub mod dml;
pub mod dml_schema;
pub mod error;
pub mod field_codec;
pub mod frame;
pub mod po;
pub mod record;
pub mod render;
pub mod value;

pub use control::ControlProtocol;
pub use cursor::ByteCursor;
pub use dispatch::Dispatcher;
pub use dml::{DmlEntry, DmlProtocol};
pub use dml_schema::{DmlSchemaRegistry, FieldTemplate, MessageTemplate, ServiceTemplate};
pub use error::DecodeError;
pub use field_codec::{FieldCodec, MAX_PO_DEPTH};
pub use frame::{FrameHeader, HEADER_LEN, looks_like_ki_frame};
pub use po::{PropertyObjectRegistry, PropertyObjectType, PropertyTemplate};
pub use record::{ControlRecord, DmlRecord, ErrorRecord, FieldMap, Record};
pub use render::{Rendered, render};
pub use value::{FieldKind, Value};
