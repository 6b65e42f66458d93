//! Error types for the push service helper.
//!
//! # Design
//! Only programming and configuration mistakes surface as `Err`. Anything
//! that happens on the wire (refused connections, timeouts, non-2xx
//! statuses) is reported through `Outcome` instead, so callers have a single
//! place to look for delivery failures.

use thiserror::Error;

/// Problems with the client configuration or with a path derived from it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A request was issued before `configure` was called.
    #[error("push service helper is not configured; call configure() first")]
    NotConfigured,

    /// The API root could not be parsed as an absolute URL.
    #[error("invalid api root {root:?}: {reason}")]
    InvalidApiRoot { root: String, reason: String },

    /// The API root parsed but is not something requests can be sent to.
    #[error("unsupported api root {root:?}: {reason}")]
    UnsupportedApiRoot { root: String, reason: String },

    /// The application name sent in `X-App-Name` was empty.
    #[error("application name must not be empty")]
    EmptyAppName,

    /// An operation path could not be joined onto the API root.
    #[error("invalid request path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A required environment variable was not set.
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

/// Errors returned by `PushClient` before a request reaches the transport.
#[derive(Debug, Error)]
pub enum PushError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A user id cannot be placed into a URL path segment as-is.
    #[error("invalid user id {0:?}")]
    InvalidUserId(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// `dispatch` was called outside of a Tokio runtime.
    #[error("no Tokio runtime is available to run the request on")]
    NoRuntime,
}

/// A failure reported by a `Transport` implementation: no response was
/// received at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("transport error: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
