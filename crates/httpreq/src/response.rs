//! Captured responses and their single-read bodies.

use crate::error::BodyError;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// Status line and headers of a response; stays usable after the body is read.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Final URL after redirects.
    pub url: String,
}

enum Body {
    Streaming(reqwest::Response),
    Buffered(Bytes),
    Consumed,
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Streaming(_) => f.write_str("Streaming"),
            Body::Buffered(bytes) => write!(f, "Buffered({} bytes)", bytes.len()),
            Body::Consumed => f.write_str("Consumed"),
        }
    }
}

/// A response returned by a [`Transport`](crate::Transport).
///
/// The body can be read successfully at most once; later reads fail with
/// [`BodyError::AlreadyConsumed`].
#[derive(Debug)]
pub struct Response {
    head: ResponseHead,
    body: Body,
}

impl Response {
    /// Wrap a live reqwest response; the body is read lazily.
    pub fn from_reqwest(response: reqwest::Response) -> Self {
        let head = ResponseHead {
            status: response.status(),
            headers: response.headers().clone(),
            url: response.url().to_string(),
        };
        Self {
            head,
            body: Body::Streaming(response),
        }
    }

    /// Build a response with an in-memory body, for custom transports.
    pub fn from_parts(
        status: StatusCode,
        headers: HeaderMap,
        url: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            head: ResponseHead {
                status,
                headers,
                url: url.into(),
            },
            body: Body::Buffered(body.into()),
        }
    }

    /// Response status code.
    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Final URL after redirects.
    pub fn url(&self) -> &str {
        &self.head.url
    }

    /// Status, headers and URL together.
    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    /// Whether the body has already been taken.
    pub fn is_consumed(&self) -> bool {
        matches!(self.body, Body::Consumed)
    }

    /// Read the whole body. The body is gone afterwards, even on error.
    pub async fn bytes(&mut self) -> Result<Bytes, BodyError> {
        match std::mem::replace(&mut self.body, Body::Consumed) {
            Body::Streaming(response) => response.bytes().await.map_err(BodyError::Read),
            Body::Buffered(bytes) => Ok(bytes),
            Body::Consumed => Err(BodyError::AlreadyConsumed),
        }
    }

    /// Split off the head; the body is dropped.
    pub fn into_head(self) -> ResponseHead {
        self.head
    }
}
