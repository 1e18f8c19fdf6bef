//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use httpreq::{Executed, Request, RequestOptions};
use httpreq_common_config::{vars, ConfigLoader, HttpSettings};

use crate::error::CliError;

/// httpreq - send one HTTP request and print the response body
#[derive(Debug, Parser)]
#[command(
    name = "httpreq",
    author,
    version,
    about,
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// HTTP method
    #[arg(value_enum, ignore_case = true)]
    pub method: HttpMethod,

    /// Target URL; `-q` parameters are appended to it
    #[arg(value_hint = ValueHint::Url)]
    pub url: String,

    /// Request header, repeatable (`-H 'Name: value'`)
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Query parameter, repeatable (`-q key=value`)
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,

    /// Raw JSON request body
    #[arg(long, value_name = "TEXT", conflicts_with = "form")]
    pub json: Option<String>,

    /// Form body field, repeatable (`--form key=value`)
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub form: Vec<(String, String)>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Number of retries after the first attempt
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Delay before the first retry in milliseconds, doubled per retry
    #[arg(long, value_name = "MS")]
    pub backoff_ms: Option<u64>,

    /// Path to configuration file
    #[arg(
        short,
        long,
        env = vars::HTTPREQ_CONFIG,
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Print the status line and response headers before the body
    #[arg(short, long)]
    pub include: bool,

    /// Re-indent a JSON response body
    #[arg(long)]
    pub pretty: bool,

    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output except errors
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Supported request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Cli {
    /// Resolve settings: defaults, then config file, then environment, then flags.
    pub fn settings(&self) -> Result<HttpSettings, CliError> {
        let from_file = match &self.config {
            Some(path) => ConfigLoader::load_file(path)?,
            None => {
                let cwd = std::env::current_dir().map_err(CliError::Io)?;
                ConfigLoader::new(cwd).load()?
            }
        };

        let mut settings = from_file.with_env_overrides()?;

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms == 0 {
                return Err(CliError::Usage("--timeout-ms must be greater than 0".into()));
            }
            settings.timeout_ms = timeout_ms;
        }
        if let Some(retries) = self.retries {
            settings.retry_count = retries;
        }
        if let Some(backoff_ms) = self.backoff_ms {
            settings.retry_backoff_ms = backoff_ms;
        }

        Ok(settings)
    }

    /// Build the configured request.
    pub fn request(&self, settings: &HttpSettings) -> Request {
        let mut request = Request::with_options(&self.url, RequestOptions::from_settings(settings))
            .headers(settings.default_headers.clone())
            .headers(self.headers.iter().cloned());

        if !self.query.is_empty() {
            request = request.query_params(self.query.iter().cloned());
        }
        if let Some(json) = &self.json {
            request = request.body_json(json.as_str());
        } else if !self.form.is_empty() {
            request = request.body_form_params(self.form.iter().cloned());
        }

        request
    }

    /// Send the request with the chosen method.
    pub async fn send(&self, request: Request) -> Executed {
        match self.method {
            HttpMethod::Get => request.get().await,
            HttpMethod::Post => request.post().await,
            HttpMethod::Put => request.put().await,
            HttpMethod::Delete => request.delete().await,
            HttpMethod::Patch => request.patch().await,
        }
    }
}

/// Parse a `Name: value` header.
pub fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid header (expected 'Name: value'): {s}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Header name cannot be empty: {s}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse a key=value pair
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid key=value pair: {s}"))?;
    Ok((key.to_string(), value.to_string()))
}
