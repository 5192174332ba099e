//! Error types for request execution.
//!
//! # Design
//! `NetworkError` covers every way a call can fail before or instead of
//! decoding. A body that arrives with a 2xx status but does not fit the
//! caller's type is a different kind of failure, so `RequestError` keeps it
//! in its own `Decode` variant carrying the untouched `serde_json::Error`.
//!
//! `Display` on `NetworkError` is the human-readable description handed to
//! presentation layers: the server's `message` for status errors, a fixed
//! fallback for everything else.

use std::collections::HashMap;
use std::error::Error as StdError;

use thiserror::Error;

/// Description shown for every variant that has no server-supplied message.
pub const FALLBACK_DESCRIPTION: &str = "Something went wrong. Please try again.";

/// Key under which `user_info` exposes the description.
pub const USER_INFO_MESSAGE_KEY: &str = "message";

/// A low-level networking failure reported by a `Transport`.
#[derive(Debug, Error)]
#[error("transport failure: {inner}")]
pub struct TransportError {
    #[source]
    inner: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new(inner: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            inner: inner.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NetworkError {
    /// Scheme, host, path and query did not compose into a valid URL.
    #[error("{}", FALLBACK_DESCRIPTION)]
    InvalidUrl,

    /// The transport reported success but delivered no body.
    #[error("{}", FALLBACK_DESCRIPTION)]
    NoResponseData,

    /// The reply carried no HTTP status.
    #[error("{}", FALLBACK_DESCRIPTION)]
    InvalidResponseShape,

    #[error("{}", FALLBACK_DESCRIPTION)]
    TransportFailure(#[source] TransportError),

    /// Any status outside 200..=299. `code` is always the status received.
    #[error("{message}")]
    StatusCode {
        code: u16,
        message: String,
        user_message: Option<String>,
    },
}

impl NetworkError {
    pub fn description(&self) -> String {
        self.to_string()
    }

    /// Status code for `StatusCode`, 0 for every other variant.
    pub fn code(&self) -> i64 {
        match self {
            NetworkError::StatusCode { code, .. } => i64::from(*code),
            _ => 0,
        }
    }

    pub fn user_info(&self) -> HashMap<String, String> {
        HashMap::from([(USER_INFO_MESSAGE_KEY.to_string(), self.description())])
    }
}

impl From<TransportError> for NetworkError {
    fn from(e: TransportError) -> Self {
        NetworkError::TransportFailure(e)
    }
}

/// Everything `execute` can fail with.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// 2xx body that did not decode into the requested type.
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RequestError {
    pub fn as_network(&self) -> Option<&NetworkError> {
        match self {
            RequestError::Network(e) => Some(e),
            RequestError::Decode(_) => None,
        }
    }
}
