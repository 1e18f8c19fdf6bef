//! Environment variable handling.

use crate::types::HttpSettings;
use std::env;
use std::path::Path;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Transport
    pub const HTTPREQ_TIMEOUT_MS: &str = "HTTPREQ_TIMEOUT_MS";
    pub const HTTPREQ_RETRY_COUNT: &str = "HTTPREQ_RETRY_COUNT";
    pub const HTTPREQ_RETRY_BACKOFF_MS: &str = "HTTPREQ_RETRY_BACKOFF_MS";
    pub const HTTPREQ_CONNECT_TIMEOUT_MS: &str = "HTTPREQ_CONNECT_TIMEOUT_MS";
    pub const HTTPREQ_USER_AGENT: &str = "HTTPREQ_USER_AGENT";

    // Configuration
    pub const HTTPREQ_CONFIG: &str = "HTTPREQ_CONFIG";
    pub const HTTPREQ_ENV: &str = "HTTPREQ_ENV";
}

/// Environment configuration.
pub struct Environment {
    _guard: (), // Prevent construction outside module
}

impl Environment {
    /// Initialize environment from .env files in the working directory.
    pub fn init() -> Result<Self, EnvError> {
        Self::init_in(".")
    }

    /// Load `.env.local`, `.env` and `.env.<HTTPREQ_ENV>` from `dir`.
    ///
    /// Variables already set are never replaced, so earlier files win.
    /// Missing files are skipped; a malformed file is an error.
    pub fn init_in(dir: impl AsRef<Path>) -> Result<Self, EnvError> {
        let dir = dir.as_ref();
        load_optional(&dir.join(".env.local"))?;
        load_optional(&dir.join(".env"))?;

        if let Ok(name) = env::var(vars::HTTPREQ_ENV) {
            load_optional(&dir.join(format!(".env.{}", name)))?;
        }

        Ok(Self { _guard: () })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }

    /// Get an integer variable.
    pub fn get_int<T: std::str::FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match env::var(var) {
            Ok(v) => v.trim().parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: format!("expected integer, got {:?}", v),
            }),
            Err(_) => Ok(None),
        }
    }
}

fn load_optional(path: &Path) -> Result<(), EnvError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl HttpSettings {
    /// Overlay `HTTPREQ_*` transport variables onto these settings.
    ///
    /// Unset variables leave the current value alone; a set but unparsable
    /// numeric variable is an error.
    pub fn with_env_overrides(mut self) -> Result<Self, EnvError> {
        if let Some(timeout) = Environment::get_int(vars::HTTPREQ_TIMEOUT_MS)? {
            self.timeout_ms = timeout;
        }
        if let Some(retries) = Environment::get_int(vars::HTTPREQ_RETRY_COUNT)? {
            self.retry_count = retries;
        }
        if let Some(backoff) = Environment::get_int(vars::HTTPREQ_RETRY_BACKOFF_MS)? {
            self.retry_backoff_ms = backoff;
        }
        if let Some(connect) = Environment::get_int(vars::HTTPREQ_CONNECT_TIMEOUT_MS)? {
            self.connect_timeout_ms = Some(connect);
        }
        if let Some(agent) = Environment::get(vars::HTTPREQ_USER_AGENT) {
            self.user_agent = Some(agent);
        }
        Ok(self)
    }
}
