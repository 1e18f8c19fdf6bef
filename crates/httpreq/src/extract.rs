//! Terminal operations on an executed request.

use crate::error::{RequestError, TransportError};
use crate::response::{Response, ResponseHead};
use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;

/// Outcome of a sent request.
///
/// Only obtainable from a verb method on [`Request`](crate::Request). Every
/// extractor takes `self`, so exactly one of them runs per request. The
/// decoding extractors check for a transport failure before touching the
/// body; a body or decode error never hides it.
#[derive(Debug)]
#[must_use = "an executed request does nothing until an extractor reads it"]
pub struct Executed {
    method: Method,
    url: String,
    outcome: Result<Response, TransportError>,
}

impl Executed {
    pub(crate) fn new(method: Method, url: String, outcome: Result<Response, TransportError>) -> Self {
        Self {
            method,
            url,
            outcome,
        }
    }

    /// Method that was sent.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Composed URL that was sent.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The transport outcome as-is; the body is left unread.
    pub fn raw_response(self) -> Result<Response, TransportError> {
        self.outcome
    }

    /// Read the whole body.
    pub async fn decoded_bytes(self) -> Result<(Bytes, ResponseHead), RequestError> {
        let mut response = self.outcome?;
        match response.bytes().await {
            Ok(bytes) => Ok((bytes, response.into_head())),
            Err(source) => Err(RequestError::BodyRead {
                head: response.into_head(),
                source,
            }),
        }
    }

    /// Read the whole body as text. Invalid UTF-8 is replaced, not rejected.
    pub async fn decoded_string(self) -> Result<(String, ResponseHead), RequestError> {
        let (bytes, head) = self.decoded_bytes().await?;
        Ok((String::from_utf8_lossy(&bytes).into_owned(), head))
    }

    /// Read the whole body and decode it as JSON into `T`.
    pub async fn decoded_json<T: DeserializeOwned>(self) -> Result<(T, ResponseHead), RequestError> {
        let (bytes, head) = self.decoded_bytes().await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok((value, head)),
            Err(source) => Err(RequestError::Decode {
                head,
                body: String::from_utf8_lossy(&bytes).into_owned(),
                source,
            }),
        }
    }
}
