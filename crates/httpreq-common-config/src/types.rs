//! Configuration types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transport settings as written in `.httpreq/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Whole-request timeout per attempt (ms).
    pub timeout_ms: u64,
    /// Retries after the first attempt.
    pub retry_count: u32,
    /// Initial delay between attempts (ms), doubled after each failure.
    pub retry_backoff_ms: u64,
    /// Connection establishment timeout (ms).
    pub connect_timeout_ms: Option<u64>,
    /// User agent override.
    pub user_agent: Option<String>,
    /// Headers added to every request before caller-supplied ones.
    pub default_headers: BTreeMap<String, String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            retry_count: 0,
            retry_backoff_ms: 0,
            connect_timeout_ms: None,
            user_agent: None,
            default_headers: BTreeMap::new(),
        }
    }
}
