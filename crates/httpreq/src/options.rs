//! Transport options fixed when a request is created.

use httpreq_common_config::{EnvError, HttpSettings};
use std::time::Duration;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout and retry policy handed to the transport.
///
/// A request takes at most one of these; [`Default`] selects the transport
/// defaults (30 s timeout, a single attempt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Whole-request timeout for each attempt.
    pub timeout: Duration,
    /// Retries after the first attempt; total attempts are `retry_count + 1`.
    pub retry_count: u32,
    /// Delay before the first retry, doubled after every failed attempt.
    pub retry_backoff: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Option<Duration>,
    /// User agent string.
    pub user_agent: String,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry_count: 0,
            retry_backoff: Duration::ZERO,
            connect_timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

impl RequestOptions {
    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of retries.
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Set the initial delay between attempts.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build options from file or environment settings.
    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self {
            timeout: Duration::from_millis(settings.timeout_ms),
            retry_count: settings.retry_count,
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
            connect_timeout: settings.connect_timeout_ms.map(Duration::from_millis),
            user_agent: settings
                .user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
        }
    }

    /// Build options from `HTTPREQ_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, EnvError> {
        let settings = HttpSettings::default().with_env_overrides()?;
        Ok(Self::from_settings(&settings))
    }
}

fn default_user_agent() -> String {
    format!("httpreq/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RequestOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert_eq!(options.retry_count, 0);
        assert_eq!(options.retry_backoff, Duration::ZERO);
        assert!(options.connect_timeout.is_none());
        assert!(options.user_agent.starts_with("httpreq/"));
    }

    #[test]
    fn test_builder_setters() {
        let options = RequestOptions::default()
            .with_timeout(Duration::from_millis(250))
            .with_retry_count(3)
            .with_retry_backoff(Duration::from_millis(10))
            .with_connect_timeout(Duration::from_millis(100))
            .with_user_agent("fetcher/2");

        assert_eq!(options.timeout, Duration::from_millis(250));
        assert_eq!(options.retry_count, 3);
        assert_eq!(options.retry_backoff, Duration::from_millis(10));
        assert_eq!(options.connect_timeout, Some(Duration::from_millis(100)));
        assert_eq!(options.user_agent, "fetcher/2");
    }

    #[test]
    fn test_from_settings() {
        let settings = HttpSettings {
            timeout_ms: 1500,
            retry_count: 2,
            retry_backoff_ms: 20,
            connect_timeout_ms: Some(300),
            user_agent: None,
            ..HttpSettings::default()
        };

        let options = RequestOptions::from_settings(&settings);
        assert_eq!(options.timeout, Duration::from_millis(1500));
        assert_eq!(options.retry_count, 2);
        assert_eq!(options.retry_backoff, Duration::from_millis(20));
        assert_eq!(options.connect_timeout, Some(Duration::from_millis(300)));
        assert!(options.user_agent.starts_with("httpreq/"));
    }

    #[test]
    fn test_from_env_reads_overrides() {
        std::env::set_var("HTTPREQ_RETRY_BACKOFF_MS", "75");
        let options = RequestOptions::from_env().unwrap();
        assert_eq!(options.retry_backoff, Duration::from_millis(75));
        std::env::remove_var("HTTPREQ_RETRY_BACKOFF_MS");
    }
}
