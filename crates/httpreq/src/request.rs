//! The fluent request builder.

use crate::compose::compose_url;
use crate::error::TransportError;
use crate::extract::Executed;
use crate::options::RequestOptions;
use crate::query::{self, ParamValue};
use crate::transport::{HttpTransport, OutboundRequest, Transport};
use bytes::Bytes;
use httpreq_common_log::spans;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::Span;

/// Common header names and values.
pub mod headers {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// An outbound HTTP call being configured.
///
/// Configuration calls consume and return the builder and never fail;
/// problems such as an unparsable URL or an illegal header name surface as
/// a [`TransportError`] once a verb method runs. A verb method consumes the
/// builder and yields an [`Executed`] result, so each request is sent at
/// most once. A `Request` belongs to a single owner and is not meant to be
/// shared between tasks.
///
/// ```no_run
/// # async fn demo() -> Result<(), httpreq::RequestError> {
/// let (body, head) = httpreq::Request::new("https://example.com/search")
///     .header("Accept", "text/plain")
///     .query_params([("q", "rust"), ("page", "2")])
///     .get()
///     .await
///     .decoded_string()
///     .await?;
/// println!("{} {}", head.status, body);
/// # Ok(())
/// # }
/// ```
pub struct Request {
    url: String,
    options: RequestOptions,
    transport: Option<Arc<dyn Transport>>,
    headers: Vec<(String, String)>,
    query: BTreeMap<String, String>,
    body: Option<Bytes>,
}

impl Request {
    /// Start a request with the default transport options.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_options(url, RequestOptions::default())
    }

    /// Start a request with explicit timeout and retry options.
    pub fn with_options(url: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            url: url.into(),
            options,
            transport: None,
            headers: Vec::new(),
            query: BTreeMap::new(),
            body: None,
        }
    }

    /// Start a request bound to a caller-supplied transport.
    pub fn with_transport(url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let mut request = Self::new(url);
        request.transport = Some(transport);
        request
    }

    /// Append a header value. Earlier values for the same name are kept.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append every header in `headers`, in iteration order.
    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |request, (name, value)| request.header(name, value))
    }

    /// Append `Authorization: Bearer <token>`.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header(headers::AUTHORIZATION, value)
    }

    /// Replace the whole query-parameter set.
    pub fn query_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.query = query::collect_params(params);
        self
    }

    /// Use a form-encoded body built from `params`.
    ///
    /// Replaces any earlier body. No `Content-Type` header is added.
    pub fn body_form_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let encoded = query::encode(&query::collect_params(params));
        self.body = Some(Bytes::from(encoded));
        self
    }

    /// Use `json` verbatim as the body and mark it `application/json`.
    ///
    /// The text is not validated. The content type is appended only when
    /// that exact value is not already present.
    pub fn body_json(mut self, json: impl Into<String>) -> Self {
        self.body = Some(Bytes::from(json.into()));
        let already_json = self
            .header_values(headers::CONTENT_TYPE)
            .any(|value| value == headers::CONTENT_TYPE_JSON);
        if already_json {
            self
        } else {
            self.header(headers::CONTENT_TYPE, headers::CONTENT_TYPE_JSON)
        }
    }

    /// Base URL given at construction.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Transport options given at construction.
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Values configured for `name` (case-insensitive), in insertion order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Current query parameters, sorted by key.
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Body configured so far, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// URL that a verb method would send to right now.
    pub fn composed_url(&self) -> String {
        compose_url(&self.url, &self.query)
    }

    /// Send as GET. A configured body is not transmitted.
    pub async fn get(self) -> Executed {
        self.dispatch(Method::GET).await
    }

    /// Send as POST.
    pub async fn post(self) -> Executed {
        self.dispatch(Method::POST).await
    }

    /// Send as PUT.
    pub async fn put(self) -> Executed {
        self.dispatch(Method::PUT).await
    }

    /// Send as DELETE. A configured body is not transmitted.
    pub async fn delete(self) -> Executed {
        self.dispatch(Method::DELETE).await
    }

    /// Send as PATCH.
    pub async fn patch(self) -> Executed {
        self.dispatch(Method::PATCH).await
    }

    async fn dispatch(self, method: Method) -> Executed {
        let url = self.composed_url();
        let span = spans::request_span(method.as_str(), &url);
        let outcome =
            spans::instrument_future(self.send(method.clone(), url.clone()), span.clone()).await;

        span.in_scope(|| match &outcome {
            Ok(response) => {
                Span::current().record("status", response.status().as_u16());
                tracing::debug!(status = %response.status(), "request completed");
            }
            Err(error) => {
                spans::record_error(error);
                tracing::debug!(error = %error, "request failed");
            }
        });

        Executed::new(method, url, outcome)
    }

    async fn send(
        self,
        method: Method,
        url: String,
    ) -> Result<crate::response::Response, TransportError> {
        let headers = wire_headers(&self.headers)?;
        let body = if carries_body(&method) { self.body } else { None };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.options)?),
        };

        tracing::debug!(header_count = headers.len(), has_body = body.is_some(), "dispatching");
        transport
            .send(OutboundRequest {
                method,
                url,
                headers,
                body,
            })
            .await
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url)
            .field("options", &self.options)
            .field("custom_transport", &self.transport.is_some())
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .finish()
    }
}

fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::DELETE)
}

fn wire_headers(pairs: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| TransportError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}
