//! Schema: named fields in declaration order.

use indexmap::IndexMap;

use crate::{field::SchemaEntry, order};

/// Ordered mapping of field name to [SchemaEntry].
///
/// Declaration order is the default processing order. Declaring a name twice
/// replaces the earlier entry but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, SchemaEntry>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field and returns the schema, for chained construction.
    pub fn field(mut self, name: impl Into<String>, entry: impl Into<SchemaEntry>) -> Self {
        self.insert(name, entry);
        self
    }

    /// Adds a field, returning the entry it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        entry: impl Into<SchemaEntry>,
    ) -> Option<SchemaEntry> {
        self.fields.insert(name.into(), entry.into())
    }

    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaEntry)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fields in processing order. See [crate::order].
    pub fn ordered(&self) -> Vec<(&str, &SchemaEntry)> {
        order::resolve(self.iter().collect(), |(_, entry)| entry.order)
    }
}

impl<K: Into<String>, E: Into<SchemaEntry>> FromIterator<(K, E)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, entry) in iter {
            schema.insert(name, entry);
        }
        schema
    }
}
