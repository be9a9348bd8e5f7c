//! Client handle and request dispatch.
//!
//! # Design
//! `Client` is immutable after construction and shared by reference with the
//! resource facades. Dispatch is split the same way as the plain-data types:
//! [`Client::build_request`] turns an [`Endpoint`] into an [`HttpRequest`]
//! without touching the network, the [`Transport`] performs the exchange, and
//! [`normalize`] classifies the result. The dispatcher itself never looks at
//! status codes.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::auth::Credential;
use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{ApiError, Result};
use crate::http::HttpRequest;
use crate::normalize::{normalize, Outcome};
use crate::resources::{Projects, Statuses, Types, WorkPackages};
use crate::transport::{Transport, UreqTransport};
use crate::types::Link;

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// Connection settings plus the transport every request goes through.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    api_version: String,
    credential: Credential,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Client using [`UreqTransport`] with the configured timeout, and the
    /// canonical `apikey` Basic credential.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = UreqTransport::with_timeout(config.timeout);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self> {
        let credential = Credential::api_key(config.api_token);
        Self::from_parts(config.base_url, config.api_version, credential, Arc::new(transport))
    }

    /// Full control over every component, e.g. to use
    /// [`Credential::api_token`] or share one transport between clients.
    pub fn from_parts(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        credential: Credential,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        credential.validate()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        let api_version = api_version.into();
        if api_version.is_empty() {
            return Err(ApiError::Config("API version must not be empty".to_string()));
        }
        Ok(Self {
            base_url,
            api_version,
            credential,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// `{base}/api/{version}/{path}`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/api/{}/{path}", self.base_url, self.api_version)
    }

    /// `_links` entry pointing at `{collection}/{id}` under this client's API
    /// version.
    pub fn link(&self, collection: &str, id: impl fmt::Display) -> Link {
        Link::versioned(&self.api_version, collection, id)
    }

    /// Describe `endpoint` as an authenticated request without sending it.
    pub fn build_request(&self, endpoint: &Endpoint) -> Result<HttpRequest> {
        let body = endpoint
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;

        let mut request = HttpRequest {
            method: endpoint.method,
            url: self.url_for(&endpoint.path),
            query: endpoint.query.clone(),
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body,
        };
        self.credential.bind(&mut request);
        Ok(request)
    }

    /// Send `endpoint` and normalize the response.
    pub fn send(&self, endpoint: Endpoint) -> Result<Outcome> {
        let request = self.build_request(&endpoint)?;
        debug!(method = %request.method, url = %request.full_url(), "sending OpenProject request");

        let response = self.transport.execute(&request)?;
        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "received OpenProject response"
        );

        normalize(&response)
    }

    pub fn work_packages(&self) -> WorkPackages<'_> {
        WorkPackages::new(self)
    }

    pub fn projects(&self) -> Projects<'_> {
        Projects::new(self)
    }

    pub fn statuses(&self) -> Statuses<'_> {
        Statuses::new(self)
    }

    pub fn types(&self) -> Types<'_> {
        Types::new(self)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
