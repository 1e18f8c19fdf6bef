//! An HTTP server that answers every request with a JSON description of it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// What the echo server saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoedRequest {
    pub method: String,
    pub path: String,
    /// Raw query string, without the leading `?`; `None` when absent.
    pub query: Option<String>,
    /// Every value received per lowercase header name, in arrival order.
    pub headers: BTreeMap<String, Vec<String>>,
    /// Body decoded lossily as UTF-8.
    pub body: String,
}

impl EchoedRequest {
    /// Decoded query parameters; a repeated key keeps its last value.
    pub fn query_map(&self) -> BTreeMap<String, String> {
        self.query
            .as_deref()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }

    /// Decoded form body pairs.
    pub fn form_map(&self) -> BTreeMap<String, String> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }

    /// Values received for `name` (case-insensitive).
    pub fn header(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl From<&Request> for EchoedRequest {
    fn from(request: &Request) -> Self {
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in request.headers.iter() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        Self {
            method: request.method.to_string(),
            path: request.url.path().to_string(),
            query: request.url.query().map(str::to_string),
            headers,
            body: String::from_utf8_lossy(&request.body).into_owned(),
        }
    }
}

struct EchoResponder;

impl Respond for EchoResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(EchoedRequest::from(request))
    }
}

/// Mock server echoing every request back as [`EchoedRequest`] JSON.
pub struct EchoServer {
    server: MockServer,
}

impl EchoServer {
    /// Start a new echo server.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(EchoResponder)
            .mount(&server)
            .await;
        Self { server }
    }

    /// Base URL of the server.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// URL for a specific path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Requests received so far.
    pub async fn received(&self) -> Vec<EchoedRequest> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(EchoedRequest::from)
            .collect()
    }
}
