//! Normalized result of a single push service call.
//!
//! # Design
//! Every delivery problem collapses into `is_error() == true`, whether the
//! transport never got a response or the service answered outside `2xx`.
//! `Failure` keeps the cause around for callers that want it, while `body`
//! is passed through untouched in both cases.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::{PushError, TransportError};
use crate::http::HttpResponse;

/// Why a call counts as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// No response was received.
    Transport(String),
    /// The service answered `401`: wrong application name, or this host is
    /// not on the application's IP allow-list.
    Unauthorized,
    /// Any other status outside `[200, 300)`.
    Status(u16),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Transport(message) => write!(f, "no response: {message}"),
            Failure::Unauthorized => write!(f, "HTTP 401: application name or IP address not accepted"),
            Failure::Status(status) => write!(f, "HTTP {status}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: Option<u16>,
    pub body: Option<String>,
    pub failure: Option<Failure>,
}

/// `true` for statuses in `[200, 300)`.
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

impl Outcome {
    pub fn from_response(response: HttpResponse) -> Self {
        let failure = match response.status {
            status if is_success(status) => None,
            401 => Some(Failure::Unauthorized),
            status => Some(Failure::Status(status)),
        };
        Self {
            status: Some(response.status),
            body: Some(response.body),
            failure,
        }
    }

    pub fn from_transport_error(error: TransportError) -> Self {
        Self {
            status: None,
            body: None,
            failure: Some(Failure::Transport(error.message().to_string())),
        }
    }

    pub fn is_error(&self) -> bool {
        self.failure.is_some()
    }

    /// Split into the `(is_error, body)` pair handed to callbacks.
    pub fn into_parts(self) -> (bool, Option<String>) {
        (self.is_error(), self.body)
    }

    /// Parse the body as JSON. Works for failed calls too, since the service
    /// may describe the error in the body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, PushError> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| PushError::Deserialization("no response body".to_string()))?;
        serde_json::from_str(body).map_err(|e| PushError::Deserialization(e.to_string()))
    }
}
