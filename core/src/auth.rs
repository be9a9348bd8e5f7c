//! Attaching credentials to outgoing requests.
//!
//! OpenProject accepts its API keys through HTTP Basic authentication with
//! the literal user name `apikey`. Two construction paths exist for the same
//! header: [`AuthScheme::Basic`] formats `principal:secret` as text, while
//! [`AuthScheme::ApiToken`] assembles the raw bytes directly. Both produce
//! byte-identical headers.

use std::fmt;

use base64::prelude::*;

use crate::error::{ApiError, Result};
use crate::http::HttpRequest;

/// User name OpenProject expects in front of an API key.
pub const API_KEY_PRINCIPAL: &str = "apikey";

const AUTHORIZATION: &str = "Authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    ApiToken,
}

/// Authentication material supplied once at client construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    scheme: AuthScheme,
    principal: String,
    secret: String,
}

impl Credential {
    /// Basic authentication with the `apikey` principal.
    pub fn api_key(secret: impl Into<String>) -> Self {
        Self::basic(API_KEY_PRINCIPAL, secret)
    }

    pub fn basic(principal: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::Basic,
            principal: principal.into(),
            secret: secret.into(),
        }
    }

    pub fn api_token(secret: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::ApiToken,
            principal: API_KEY_PRINCIPAL.to_string(),
            secret: secret.into(),
        }
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Reject credentials that could never authenticate.
    pub fn validate(&self) -> Result<()> {
        if self.secret.trim().is_empty() {
            return Err(ApiError::Config("API secret must not be empty".to_string()));
        }
        if self.principal.is_empty() {
            return Err(ApiError::Config("principal must not be empty".to_string()));
        }
        Ok(())
    }

    /// Value of the `Authorization` header for this credential.
    pub fn header_value(&self) -> String {
        let encoded = match self.scheme {
            AuthScheme::Basic => {
                BASE64_STANDARD.encode(format!("{}:{}", self.principal, self.secret))
            }
            AuthScheme::ApiToken => {
                let mut raw = Vec::with_capacity(self.principal.len() + self.secret.len() + 1);
                raw.extend_from_slice(self.principal.as_bytes());
                raw.push(b':');
                raw.extend_from_slice(self.secret.as_bytes());
                BASE64_STANDARD.encode(raw)
            }
        };
        format!("Basic {encoded}")
    }

    /// Set the request's `Authorization` header. Nothing else is touched.
    pub fn bind(&self, request: &mut HttpRequest) {
        request.set_header(AUTHORIZATION, self.header_value());
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("scheme", &self.scheme)
            .field("principal", &self.principal)
            .field("secret", &"<redacted>")
            .finish()
    }
}
