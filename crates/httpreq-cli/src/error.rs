//! CLI error handling.

use std::io;

use httpreq::{RequestError, TransportError};
use httpreq_common_config::{ConfigError, EnvError};
use thiserror::Error;

use crate::Exit;

/// Everything that can end a CLI run early.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("environment error: {0}")]
    Env(#[from] EnvError),

    #[error("{0}")]
    Usage(String),

    #[error("request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to read response from {url} ({status}): {source}")]
    Response {
        url: String,
        status: String,
        #[source]
        source: RequestError,
    },

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl From<RequestError> for CliError {
    fn from(error: RequestError) -> Self {
        if let RequestError::Transport(e) = error {
            return CliError::Transport(e);
        }

        let (url, status) = match error.head() {
            Some(head) => (head.url.clone(), head.status.to_string()),
            None => (String::new(), "unknown status".to_string()),
        };
        CliError::Response {
            url,
            status,
            source: error,
        }
    }
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> Exit {
        match self {
            CliError::Config(_) | CliError::Env(_) => Exit::ConfigError,
            CliError::Usage(_) => Exit::ValidationError,
            CliError::Transport(TransportError::InvalidUrl { .. })
            | CliError::Transport(TransportError::InvalidHeader { .. }) => Exit::ValidationError,
            CliError::Transport(_) => Exit::NetworkError,
            CliError::Response { .. } => Exit::ResponseError,
            CliError::Io(_) => Exit::IoError,
        }
    }
}
