//! Common response templates and single-route mounts.

use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 200 with a plain text body.
pub fn ok_text(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(body)
}

/// 500 with a JSON error body.
pub fn server_error() -> ResponseTemplate {
    ResponseTemplate::new(500).set_body_json(serde_json::json!({ "error": "Internal server error" }))
}

/// 200 with a body that is not valid JSON.
pub fn invalid_json() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "application/json")
        .set_body_string("{\"unterminated\": ")
}

/// 200 delivered only after `delay`.
pub fn delayed(delay: Duration) -> ResponseTemplate {
    ResponseTemplate::new(200).set_delay(delay)
}

/// Start a server that answers only `http_method` requests with `response`.
///
/// Any other method gets wiremock's default 404.
pub async fn serve_method(http_method: &str, response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method(http_method))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}
