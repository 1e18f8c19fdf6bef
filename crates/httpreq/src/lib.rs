//! Fluent HTTP requests over a retrying transport.
//!
//! A [`Request`] accumulates headers, query parameters and a body, is sent
//! once with one of the verb methods, and the resulting [`Executed`] is read
//! with exactly one extractor:
//!
//! - [`Executed::raw_response`] hands back the transport outcome untouched,
//! - [`Executed::decoded_string`] / [`Executed::decoded_bytes`] read the body,
//! - [`Executed::decoded_json`] reads the body and deserializes it.
//!
//! Timeouts and retries belong to the [`Transport`]; the default
//! [`HttpTransport`] is built from [`RequestOptions`].

pub mod compose;
pub mod error;
pub mod extract;
pub mod options;
pub mod query;
pub mod request;
pub mod response;
pub mod transport;

pub use compose::compose_url;
pub use error::{BodyError, RequestError, TransportError};
pub use extract::Executed;
pub use httpreq_common_config::EnvError;
pub use options::RequestOptions;
pub use query::ParamValue;
pub use request::{headers, Request};
pub use response::{Response, ResponseHead};
pub use transport::{build_client, HttpTransport, OutboundRequest, Transport};

pub use reqwest::header::HeaderMap;
pub use reqwest::{Method, StatusCode};
