//! Error types for hostel-admin.
//!
//! This module defines all error types used throughout the hostel-admin crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for hostel-admin operations.
#[derive(Error, Debug)]
pub enum Error {
    // === HTTP Errors ===
    /// The request could not be sent or the response could not be read.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        /// The endpoint path that was called.
        endpoint: String,
        /// The HTTP status code.
        status: u16,
        /// Message extracted from the response body, if any.
        message: String,
    },

    // === Token Errors ===
    /// No admin token is available for an authenticated call.
    #[error("no admin token available; run `hosteladm login` first")]
    MissingToken,

    /// The token is not a three-part dotted token.
    #[error("malformed token: {0}")]
    TokenFormat(String),

    /// The token payload could not be decoded.
    #[error("undecodable token payload: {0}")]
    TokenPayload(String),

    /// Login was rejected by the service.
    #[error("login rejected: {0}")]
    LoginRejected(String),

    // === Input Errors ===
    /// An unknown report range was requested.
    #[error("invalid report range '{0}' (expected weekly, monthly or yearly)")]
    InvalidRange(String),

    /// A teacher draft is missing required fields.
    #[error("incomplete teacher details: {0}")]
    IncompleteDraft(&'static str),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for hostel-admin operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a status error for the given endpoint.
    #[must_use]
    pub fn status(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a malformed token error.
    #[must_use]
    pub fn token_format(message: impl Into<String>) -> Self {
        Self::TokenFormat(message.into())
    }

    /// Create an undecodable payload error.
    #[must_use]
    pub fn token_payload(message: impl Into<String>) -> Self {
        Self::TokenPayload(message.into())
    }

    /// The HTTP status code, if this error came from a non-success response.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the service refused the call for lack of authorization.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401 | 403)) || matches!(self, Self::MissingToken)
    }
}
