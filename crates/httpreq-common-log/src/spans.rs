//! Request spans and timing helpers.

use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{field, info_span, Instrument, Span};

/// Create the span a single outbound request runs inside.
///
/// `status`, `attempts` and `error` start empty and are filled in with
/// [`Span::record`] once the transport returns.
pub fn request_span(method: &str, url: &str) -> Span {
    info_span!(
        "request",
        method = %method,
        url = %url,
        status = field::Empty,
        attempts = field::Empty,
        error = field::Empty,
    )
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", field::display(error));
}

/// Timing utility for operations.
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Complete the timer, log and return the elapsed time.
    pub fn finish(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
        duration
    }
}
