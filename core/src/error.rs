//! Error types for the OpenProject API client.
//!
//! # Design
//! A 401 gets its own `Authentication` variant because callers react to a bad
//! API key differently from any other failure. Every other status >= 400 lands
//! in `HttpError` with a best-effort message plus the raw response. Malformed
//! JSON on a success status is a protocol violation by the server and is kept
//! apart from both as `DeserializationError`.

use thiserror::Error;

use crate::http::HttpResponse;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by the client pipeline.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 401.
    #[error("Error code {status}, Error message: {message}")]
    Authentication { message: String, status: u16 },

    /// The server returned a status >= 400 other than 401.
    #[error("Error code {status}, Error message: {message}")]
    HttpError {
        message: String,
        status: u16,
        response: HttpResponse,
    },

    /// A success response body was not valid JSON, or did not match the
    /// requested type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The transport could not complete the exchange.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The client was constructed with unusable settings.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Status code of the response behind this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { status, .. } | ApiError::HttpError { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// The normalized message of an `Authentication` or `HttpError`.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Authentication { message, .. } | ApiError::HttpError { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }

    /// The raw response behind an `HttpError`.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::HttpError { response, .. } => Some(response),
            _ => None,
        }
    }
}
