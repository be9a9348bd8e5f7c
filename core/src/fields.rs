//! Translation from idiomatic field names to the API's wire names.
//!
//! # Design
//! Each writable resource has one frozen [`FieldTable`]. Payloads are built by
//! walking the table, not the caller's input, so the table doubles as a
//! whitelist: names it does not list are dropped without error. Values are
//! copied as-is; `_links` maps to itself and carries already-built relation
//! objects.

use serde_json::{Map, Value};

/// Idiomatic name to wire name, for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTable {
    resource: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl FieldTable {
    pub const fn new(resource: &'static str, entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { resource, entries }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }

    pub fn wire_name(&self, idiomatic: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == idiomatic)
            .map(|(_, wire)| *wire)
    }
}

pub const WORK_PACKAGE_FIELDS: FieldTable = FieldTable::new(
    "work_packages",
    &[
        ("_links", "_links"),
        ("subject", "subject"),
        ("description", "description"),
        ("schedule_manually", "scheduleManually"),
        ("start_date", "startDate"),
        ("due_date", "dueDate"),
        ("estimated_time", "estimatedTime"),
        ("percentage_done", "percentageDone"),
        ("lock_version", "lockVersion"),
        ("custom_field_1", "customField1"),
        ("custom_field_2", "customField2"),
    ],
);

pub const PROJECT_FIELDS: FieldTable = FieldTable::new(
    "projects",
    &[
        ("_links", "_links"),
        ("name", "name"),
        ("identifier", "identifier"),
        ("description", "description"),
        ("public", "public"),
        ("active", "active"),
        ("status_explanation", "statusExplanation"),
    ],
);

/// Caller-supplied values keyed by idiomatic field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    values: Map<String, Value>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn set_opt<V: Into<Value>>(&mut self, name: &str, value: Option<V>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.set(name, value);
        }
        fields
    }
}

/// Wire-named payload for `table`'s resource, in table order.
pub fn build_payload(table: &FieldTable, supplied: &Fields) -> Map<String, Value> {
    table
        .entries()
        .iter()
        .filter_map(|(idiomatic, wire)| {
            supplied
                .get(idiomatic)
                .map(|value| (wire.to_string(), value.clone()))
        })
        .collect()
}
