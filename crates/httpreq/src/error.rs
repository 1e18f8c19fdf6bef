//! Error types, split by the layer that failed.

use crate::response::ResponseHead;
use reqwest::StatusCode;
use std::time::Duration;

/// Failure reported by the transport; no response is available.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("invalid URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("invalid header {name:?}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("server error: {status}")]
    ServerError { status: u16 },

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<TransportError>,
    },
}

impl TransportError {
    /// Classify a reqwest failure from a single attempt.
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            TransportError::Timeout { timeout }
        } else if error.is_connect() {
            TransportError::Connect(error)
        } else {
            TransportError::Request(error)
        }
    }

    /// True for a timeout, including one that ended a retry sequence.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Timeout { .. } => true,
            TransportError::RetriesExhausted { last, .. } => last.is_timeout(),
            _ => false,
        }
    }

    /// True when the transport gave up after more than one attempt.
    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, TransportError::RetriesExhausted { .. })
    }

    /// Whether another attempt could succeed.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout { .. }
                | TransportError::Connect(_)
                | TransportError::Request(_)
                | TransportError::ServerError { .. }
        )
    }
}

/// Failure reading a response body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("failed to read response body: {0}")]
    Read(#[source] reqwest::Error),

    #[error("response body already consumed")]
    AlreadyConsumed,
}

/// Error returned by the decoding extractors.
///
/// Variants are ordered by layer: a transport failure always wins over a
/// body failure, which always wins over a decode failure.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{source} (status {})", head.status)]
    BodyRead {
        head: ResponseHead,
        #[source]
        source: BodyError,
    },

    #[error("failed to decode JSON (status {}): {source}", head.status)]
    Decode {
        head: ResponseHead,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    /// Response metadata, when a response arrived.
    pub fn head(&self) -> Option<&ResponseHead> {
        match self {
            RequestError::Transport(_) => None,
            RequestError::BodyRead { head, .. } | RequestError::Decode { head, .. } => Some(head),
        }
    }

    /// Response status, when a response arrived.
    pub fn status(&self) -> Option<StatusCode> {
        self.head().map(|head| head.status)
    }

    /// True when no response was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, RequestError::Transport(_))
    }

    /// True when the body could not be read.
    pub fn is_body_read(&self) -> bool {
        matches!(self, RequestError::BodyRead { .. })
    }

    /// True when the body was read but was not valid JSON for the target.
    pub fn is_decode(&self) -> bool {
        matches!(self, RequestError::Decode { .. })
    }
}
