//! httpreq CLI
//!
//! Main entry point for the `httpreq` binary.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use httpreq::ResponseHead;
use httpreq_common_config::{EnvError, Environment};
use httpreq_common_log::{LogConfig, LogLevel};
use tracing::{debug, error};

mod cli;
mod error;

use cli::Cli;
use error::CliError;

/// Application exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    NetworkError = 4,
    ValidationError = 5,
    ResponseError = 6,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    // Before parsing, so clap `env` defaults and log settings see `.env` values.
    let dotenv = Environment::init().map(|_| ());

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                Exit::ValidationError.into()
            } else {
                Exit::Success.into()
            };
        }
    };

    init_logging(&cli);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to create Tokio runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(run(cli, dotenv)) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error!("{e}");
            e.exit_code().into()
        }
    }
}

async fn run(cli: Cli, dotenv: Result<(), EnvError>) -> Result<(), CliError> {
    dotenv?;
    let settings = cli.settings()?;
    debug!(?settings, "resolved settings");

    let executed = cli.send(cli.request(&settings)).await;

    let (body, head) = if cli.pretty {
        let (value, head) = executed.decoded_json::<serde_json::Value>().await?;
        let body = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::Usage(format!("cannot pretty-print response: {e}")))?;
        (body, head)
    } else {
        executed.decoded_string().await?
    };

    print_response(&cli, &head, &body).map_err(CliError::Io)
}

fn print_response(cli: &Cli, head: &ResponseHead, body: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();

    if cli.include {
        writeln!(out, "HTTP {}", head.status)?;
        for (name, value) in head.headers.iter() {
            writeln!(out, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()))?;
        }
        writeln!(out)?;
    }

    out.write_all(body.as_bytes())?;
    if !body.is_empty() && !body.ends_with('\n') {
        writeln!(out)?;
    }
    out.flush()
}

fn init_logging(cli: &Cli) {
    let mut config = LogConfig::from_env();
    config.level = LogLevel::from_verbosity(cli.verbose, cli.quiet);

    if let Err(e) = httpreq_common_log::init(config) {
        eprintln!("warning: {e}");
    }
}
