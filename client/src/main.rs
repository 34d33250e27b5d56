// NoteOnline - command-line client for the NoteOnline notes service
// Entry point and application setup

use anyhow::Context;
use noteonline::app::{default_data_dir, AppState};
use noteonline::commands::{self, Command};
use noteonline::config::{API_URL_ENV, DATA_DIR_ENV};
use noteonline::error::AppError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "noteonline=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::from(2));
        }
    };

    let data_dir = std::env::var(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_data_dir());
    let api_url = std::env::var(API_URL_ENV).ok();

    tracing::info!("Starting NoteOnline client");

    let state = AppState::initialize(data_dir, api_url)
        .await
        .context("Failed to initialize client")?;

    match commands::execute(&state, command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output.body)?);
            Ok(if output.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(AppError::Validation(errors)) => {
            eprintln!("{}", errors);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
