//! Serialized field definitions.
//!
//! A [`SchemaDef`] lists fields by type name, the same way they are written
//! in a JSON schema file. `Schema::try_from` checks names and types and
//! builds the runtime [`Schema`].
//!
//! ```json
//! {
//!   "fields": [
//!     { "name": "id", "type": "uint32", "endian": "little" },
//!     { "name": "tags", "type": "string[]", "byte": [4, 8], "count": 2 },
//!     { "name": "crc", "type": "uint16", "order": "last" }
//!   ]
//! }
//! ```
//!
//! A `custom` field cannot be described here since it needs a parser function.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    bytes::Endian,
    errors::SchemaError,
    field::{ByteWidth, FieldType, SchemaEntry},
    order::Order,
    schema::Schema,
};

/// Field definitions in declaration order.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaDef {
    pub fields: Vec<FieldDef>,
}

/// Description of a single decoded field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Becomes the key in the decoded record.
    pub name: String,
    /// Type name such as `uint16` or `string[]`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub offset: Option<usize>,
    /// A single width or one width per element.
    #[serde(default)]
    pub byte: Option<ByteWidth>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub endian: Option<Endian>,
    #[serde(default)]
    pub order: Option<OrderDef>,
}

/// Processing-order hint: any number, `"first"` or `"last"`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum OrderDef {
    At(f64),
    Named(NamedOrderDef),
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NamedOrderDef {
    First,
    Last,
}

impl From<OrderDef> for Order {
    fn from(value: OrderDef) -> Self {
        match value {
            OrderDef::At(n) => Order::At(n),
            OrderDef::Named(NamedOrderDef::First) => Order::First,
            OrderDef::Named(NamedOrderDef::Last) => Order::Last,
        }
    }
}

impl TryFrom<FieldDef> for SchemaEntry {
    type Error = SchemaError;

    fn try_from(value: FieldDef) -> Result<Self, Self::Error> {
        let kind = FieldType::from_name(&value.kind).map_err(|err| match err {
            SchemaError::MissingParser(_) => SchemaError::MissingParser(value.name.clone()),
            other => other,
        })?;

        Ok(SchemaEntry {
            kind,
            offset: value.offset,
            byte: value.byte,
            count: value.count,
            endian: value.endian,
            order: value.order.map(Into::into),
        })
    }
}

impl TryFrom<SchemaDef> for Schema {
    type Error = SchemaError;

    fn try_from(value: SchemaDef) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(value.fields.len());
        let mut schema = Schema::new();

        for field in value.fields {
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField(field.name));
            }

            let name = field.name.clone();
            schema.insert(name, SchemaEntry::try_from(field)?);
        }

        Ok(schema)
    }
}
