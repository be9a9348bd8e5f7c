//! Blocking client for the OpenProject API v3.
//!
//! # Overview
//! Resource facades (`work_packages`, `projects`, `statuses`, `types`) turn
//! method calls into [`Endpoint`]s; the [`Client`] builds authenticated
//! [`HttpRequest`]s from them, a [`Transport`] executes them, and
//! [`normalize`] classifies each [`HttpResponse`] into an [`Outcome`] or an
//! [`ApiError`].
//!
//! # Design
//! - `Client` is immutable and `Send + Sync`; facades borrow it.
//! - Request and response are plain data, so everything except the
//!   transport is deterministic and testable offline.
//! - Write payloads go through per-resource field tables that rename
//!   idiomatic names to wire names and drop anything unknown.
//!
//! ```no_run
//! use openproject_client::{Client, ClientConfig, Links, WorkPackageFields};
//!
//! let client = Client::new(ClientConfig::from_env()?)?;
//! let created = client.work_packages().create(WorkPackageFields {
//!     subject: Some("Write release notes".to_string()),
//!     links: Some(Links::new().project(7u64).work_package_type(1)),
//!     ..Default::default()
//! })?;
//! println!("{created:?}");
//! # Ok::<(), openproject_client::ApiError>(())
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod fields;
pub mod http;
pub mod normalize;
pub mod resources;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use auth::{AuthScheme, Credential};
pub use client::Client;
pub use config::ClientConfig;
pub use endpoint::Endpoint;
pub use error::{ApiError, Result};
pub use fields::{build_payload, FieldTable, Fields, PROJECT_FIELDS, WORK_PACKAGE_FIELDS};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use normalize::{normalize, Outcome};
pub use resources::{Projects, Statuses, Types, WorkPackages};
pub use transport::{Transport, UreqTransport};
pub use types::{Formattable, Link, Links, ProjectFields, ProjectId, WorkPackageFields};
