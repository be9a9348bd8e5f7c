//! Caller-facing option records for writable resources.
//!
//! # Design
//! Every field is optional: a record lists what the caller wants to send and
//! nothing else. Records convert into [`Fields`] keyed by idiomatic names; the
//! field mapper then renames them to wire names and drops anything the
//! resource does not accept. Hyperlinked relations (`project`, `status`, ...)
//! travel in [`Links`] and are sent as `_links` unchanged.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::fields::Fields;

/// API version assumed when building relation hrefs.
pub const DEFAULT_API_VERSION: &str = "v3";

/// A project's numeric id or its textual identifier; the API accepts either
/// in paths. `Display` yields a percent-encoded path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
    Numeric(u64),
    Identifier(String),
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectId::Numeric(id) => write!(f, "{id}"),
            ProjectId::Identifier(identifier) => f.write_str(&urlencoding::encode(identifier)),
        }
    }
}

impl From<u64> for ProjectId {
    fn from(id: u64) -> Self {
        ProjectId::Numeric(id)
    }
}

impl From<&str> for ProjectId {
    fn from(identifier: &str) -> Self {
        ProjectId::Identifier(identifier.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(identifier: String) -> Self {
        ProjectId::Identifier(identifier)
    }
}

impl From<ProjectId> for Value {
    fn from(id: ProjectId) -> Self {
        match id {
            ProjectId::Numeric(id) => Value::from(id),
            ProjectId::Identifier(identifier) => Value::from(identifier),
        }
    }
}

/// Rich text as the API models it. Writes only need `raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formattable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl Formattable {
    pub fn markdown(raw: impl Into<String>) -> Self {
        Self {
            format: Some("markdown".to_string()),
            raw: raw.into(),
            html: None,
        }
    }
}

impl From<Formattable> for Value {
    fn from(text: Formattable) -> Self {
        let mut object = serde_json::Map::new();
        if let Some(format) = text.format {
            object.insert("format".to_string(), Value::String(format));
        }
        object.insert("raw".to_string(), Value::String(text.raw));
        if let Some(html) = text.html {
            object.insert("html".to_string(), Value::String(html));
        }
        Value::Object(object)
    }
}

/// A single hyperlink. `href: None` serializes as `null`, which the API reads
/// as "unset this relation".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            title: None,
        }
    }

    pub fn unset() -> Self {
        Self {
            href: None,
            title: None,
        }
    }

    /// Link to `/api/v3/{collection}/{id}`. The [`Links`] helpers use this;
    /// clients on another version should build links with
    /// [`Client::link`](crate::Client::link).
    pub fn resource(collection: &str, id: impl fmt::Display) -> Self {
        Self::versioned(DEFAULT_API_VERSION, collection, id)
    }

    /// Link to `/api/{api_version}/{collection}/{id}`.
    pub fn versioned(api_version: &str, collection: &str, id: impl fmt::Display) -> Self {
        Self::new(format!("/api/{api_version}/{collection}/{id}"))
    }
}

impl From<Link> for Value {
    fn from(link: Link) -> Self {
        let mut object = serde_json::Map::new();
        object.insert(
            "href".to_string(),
            link.href.map(Value::String).unwrap_or(Value::Null),
        );
        if let Some(title) = link.title {
            object.insert("title".to_string(), Value::String(title));
        }
        Value::Object(object)
    }
}

/// The `_links` collection of a write payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    relations: BTreeMap<String, Link>,
}

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, relation: impl Into<String>, link: Link) -> Self {
        self.relations.insert(relation.into(), link);
        self
    }

    pub fn project(self, id: impl Into<ProjectId>) -> Self {
        self.insert("project", Link::resource("projects", id.into()))
    }

    pub fn work_package_type(self, id: u64) -> Self {
        self.insert("type", Link::resource("types", id))
    }

    pub fn status(self, id: u64) -> Self {
        self.insert("status", Link::resource("statuses", id))
    }

    pub fn priority(self, id: u64) -> Self {
        self.insert("priority", Link::resource("priorities", id))
    }

    pub fn assignee(self, user_id: u64) -> Self {
        self.insert("assignee", Link::resource("users", user_id))
    }

    pub fn responsible(self, user_id: u64) -> Self {
        self.insert("responsible", Link::resource("users", user_id))
    }

    pub fn version(self, id: u64) -> Self {
        self.insert("version", Link::resource("versions", id))
    }

    pub fn parent(self, work_package_id: u64) -> Self {
        self.insert("parent", Link::resource("work_packages", work_package_id))
    }

    pub fn get(&self, relation: &str) -> Option<&Link> {
        self.relations.get(relation)
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl From<Links> for Value {
    fn from(links: Links) -> Self {
        let object = links
            .relations
            .into_iter()
            .map(|(relation, link)| (relation, Value::from(link)))
            .collect();
        Value::Object(object)
    }
}

/// Writable work package attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkPackageFields {
    pub subject: Option<String>,
    pub description: Option<Formattable>,
    pub schedule_manually: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// ISO 8601 duration, e.g. `PT2H`.
    pub estimated_time: Option<String>,
    pub percentage_done: Option<u8>,
    /// Required by the server on update to detect concurrent edits.
    pub lock_version: Option<u64>,
    /// Text custom field.
    pub custom_field_1: Option<String>,
    /// Integer custom field.
    pub custom_field_2: Option<i64>,
    pub links: Option<Links>,
}

impl From<WorkPackageFields> for Fields {
    fn from(record: WorkPackageFields) -> Self {
        let mut fields = Fields::new();
        fields.set_opt("subject", record.subject);
        fields.set_opt("description", record.description);
        fields.set_opt("schedule_manually", record.schedule_manually);
        fields.set_opt("start_date", record.start_date.map(iso_date));
        fields.set_opt("due_date", record.due_date.map(iso_date));
        fields.set_opt("estimated_time", record.estimated_time);
        fields.set_opt("percentage_done", record.percentage_done);
        fields.set_opt("lock_version", record.lock_version);
        fields.set_opt("custom_field_1", record.custom_field_1);
        fields.set_opt("custom_field_2", record.custom_field_2);
        fields.set_opt("_links", record.links);
        fields
    }
}

/// Writable project attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFields {
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub description: Option<Formattable>,
    pub public: Option<bool>,
    pub active: Option<bool>,
    pub status_explanation: Option<Formattable>,
    pub links: Option<Links>,
}

impl From<ProjectFields> for Fields {
    fn from(record: ProjectFields) -> Self {
        let mut fields = Fields::new();
        fields.set_opt("name", record.name);
        fields.set_opt("identifier", record.identifier);
        fields.set_opt("description", record.description);
        fields.set_opt("public", record.public);
        fields.set_opt("active", record.active);
        fields.set_opt("status_explanation", record.status_explanation);
        fields.set_opt("_links", record.links);
        fields
    }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Body of the single project filter accepted by the work package listing.
pub(crate) fn project_filter(project: ProjectId) -> Value {
    json!([{ "project": { "operator": "=", "values": project } }])
}
