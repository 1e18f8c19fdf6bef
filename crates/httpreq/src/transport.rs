//! The transport seam and its reqwest-backed implementation.

use crate::error::TransportError;
use crate::options::RequestOptions;
use crate::response::Response;
use async_trait::async_trait;
use bytes::Bytes;
use httpreq_common_log::spans::Timer;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, Method};
use std::time::Duration;
use url::Url;

/// Everything the transport needs to perform one logical call.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Performs the network call, including any timeout and retry policy.
///
/// Implementations return either a response whose body is still unread or
/// a terminal [`TransportError`]; callers never see individual attempts.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<Response, TransportError>;
}

/// Build a reqwest client honoring the timeout-related options.
pub fn build_client(options: &RequestOptions) -> Result<Client, TransportError> {
    let mut builder = ClientBuilder::new()
        .timeout(options.timeout)
        .user_agent(&options.user_agent);

    if let Some(connect_timeout) = options.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    builder.build().map_err(TransportError::ClientBuild)
}

/// [`Transport`] over a reqwest client with bounded retries.
///
/// An attempt fails on a network error, a timeout, or a 5xx status. Failed
/// attempts are retried `retry_count` times, sleeping `retry_backoff` before
/// the first retry and doubling the delay after each one.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
    retry_count: u32,
    retry_backoff: Duration,
}

impl HttpTransport {
    /// Create a transport with its own client.
    pub fn new(options: &RequestOptions) -> Result<Self, TransportError> {
        let client = build_client(options)?;
        Ok(Self::with_client(client, options))
    }

    /// Reuse an existing client; only the retry policy is read from `options`.
    pub fn with_client(client: Client, options: &RequestOptions) -> Self {
        Self {
            client,
            timeout: options.timeout,
            retry_count: options.retry_count,
            retry_backoff: options.retry_backoff,
        }
    }

    /// Get the inner reqwest client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    async fn attempt(&self, url: &Url, request: &OutboundRequest) -> Result<Response, TransportError> {
        let timer = Timer::start("http_attempt");

        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, self.timeout))?;
        let elapsed = timer.finish();

        let status = response.status();
        tracing::debug!(status = %status, ?elapsed, "response received");

        if status.is_server_error() {
            return Err(TransportError::ServerError {
                status: status.as_u16(),
            });
        }

        Ok(Response::from_reqwest(response))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<Response, TransportError> {
        let url = Url::parse(&request.url).map_err(|e| {
            tracing::Span::current().record("attempts", 0u32);
            TransportError::InvalidUrl {
                url: request.url.clone(),
                message: e.to_string(),
            }
        })?;

        let max_attempts = self.retry_count.saturating_add(1);
        let mut delay = self.retry_backoff;
        let mut attempt = 1;

        loop {
            match self.attempt(&url, &request).await {
                Ok(response) => {
                    tracing::Span::current().record("attempts", attempt);
                    return Ok(response);
                }
                Err(error) if !error.is_retryable() => {
                    tracing::Span::current().record("attempts", attempt);
                    return Err(error);
                }
                Err(error) if attempt >= max_attempts => {
                    tracing::Span::current().record("attempts", attempt);
                    if max_attempts == 1 {
                        return Err(error);
                    }
                    return Err(TransportError::RetriesExhausted {
                        attempts: max_attempts,
                        last: Box::new(error),
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        ?delay,
                        error = %error,
                        "attempt failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpreq_common_log::spans;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::span::{Id, Record};
    use tracing::Instrument;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Collects every value recorded into an `attempts` span field.
    #[derive(Clone, Default)]
    struct AttemptsLayer(Arc<Mutex<Vec<u64>>>);

    impl AttemptsLayer {
        fn recorded(&self) -> Vec<u64> {
            self.0.lock().unwrap().clone()
        }
    }

    struct AttemptsVisitor<'a>(&'a Mutex<Vec<u64>>);

    impl Visit for AttemptsVisitor<'_> {
        fn record_u64(&mut self, field: &Field, value: u64) {
            if field.name() == "attempts" {
                self.0.lock().unwrap().push(value);
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
    }

    impl<S: tracing::Subscriber> Layer<S> for AttemptsLayer {
        fn on_record(&self, _id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
            values.record(&mut AttemptsVisitor(&self.0));
        }
    }

    async fn send_in_span(transport: &HttpTransport, outbound: OutboundRequest) -> Vec<u64> {
        let layer = AttemptsLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let span = spans::request_span(outbound.method.as_str(), &outbound.url);
        let _ = transport.send(outbound).instrument(span).await;
        layer.recorded()
    }

    fn request(method: Method, url: String) -> OutboundRequest {
        OutboundRequest {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[test]
    fn test_client_creation() {
        let transport = HttpTransport::new(&RequestOptions::default());
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_sent() {
        let transport = HttpTransport::new(&RequestOptions::default()).unwrap();
        let result = transport.send(request(Method::GET, "not a url".to_string())).await;
        match result {
            Err(TransportError::InvalidUrl { url, .. }) => assert_eq!(url, "not a url"),
            other => panic!("Expected InvalidUrl, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_records_zero_attempts() {
        let transport = HttpTransport::new(&RequestOptions::default()).unwrap();
        let recorded =
            send_in_span(&transport, request(Method::GET, "not a url".to_string())).await;
        assert_eq!(recorded, [0]);
    }

    #[tokio::test]
    async fn test_attempts_recorded_on_success_and_exhaustion() {
        let server = MockServer::start().await;
        Mock::given(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&RequestOptions::default().with_retry_count(2)).unwrap();

        let ok = send_in_span(&transport, request(Method::GET, format!("{}/ok", server.uri()))).await;
        assert_eq!(ok, [1]);

        let down =
            send_in_span(&transport, request(Method::GET, format!("{}/down", server.uri()))).await;
        assert_eq!(down, [3]);
    }

    #[tokio::test]
    async fn test_sends_method_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/things/1"))
            .and(header("x-token", "abc"))
            .and(body_string("payload"))
            .respond_with(ResponseTemplate::new(201).set_body_string("made"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&RequestOptions::default()).unwrap();
        let mut outbound = request(Method::PUT, format!("{}/things/1", server.uri()));
        outbound.headers.insert("x-token", "abc".parse().unwrap());
        outbound.body = Some(Bytes::from_static(b"payload"));

        let mut response = transport.send(outbound).await.unwrap();
        assert_eq!(response.status().as_u16(), 201);
        assert_eq!(&response.bytes().await.unwrap()[..], b"made");
    }

    #[tokio::test]
    async fn test_server_error_retried_then_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let options = RequestOptions::default()
            .with_retry_count(2)
            .with_retry_backoff(Duration::from_millis(1));
        let transport = HttpTransport::new(&options).unwrap();

        let error = transport
            .send(request(Method::GET, server.uri()))
            .await
            .unwrap_err();
        match error {
            TransportError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, TransportError::ServerError { status: 503 }));
            }
            other => panic!("Expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .with_priority(2)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&RequestOptions::default().with_retry_count(1)).unwrap();
        let mut response = transport.send(request(Method::GET, server.uri())).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(&response.bytes().await.unwrap()[..], b"ok");
    }

    #[tokio::test]
    async fn test_single_attempt_timeout_is_plain_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let options = RequestOptions::default().with_timeout(Duration::from_millis(20));
        let transport = HttpTransport::new(&options).unwrap();

        let error = transport
            .send(request(Method::GET, server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(error, TransportError::Timeout { .. }));
        assert!(error.is_timeout());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port with nothing listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let transport = HttpTransport::new(&RequestOptions::default()).unwrap();
        let error = transport
            .send(request(Method::GET, format!("http://127.0.0.1:{port}/")))
            .await
            .unwrap_err();
        assert!(matches!(error, TransportError::Connect(_)), "got {:?}", error);
    }
}
