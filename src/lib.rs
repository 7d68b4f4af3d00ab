pub mod api;
pub mod app;
pub mod auth;
pub mod commands;
pub mod config;
pub mod draft;
pub mod errors;
pub mod note;
pub mod notes;
pub mod session;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::app::NotesApp;
use crate::commands::Command;
use crate::config::AppConfig;
use crate::errors::NotesResult;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Runs the interactive client on stdin/stdout until `quit` or end of input.
pub async fn run() -> NotesResult<()> {
    init_tracing();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config; using defaults");
            let mut cfg = AppConfig::default();
            cfg.apply_env_overrides();
            cfg
        }
    };

    let mut app = NotesApp::from_config(&config)?;
    tracing::info!(base_url = %config.api.base_url, view = ?app.view(), "notecards starting");
    app.start().await;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(commands::render(&app).as_bytes()).await?;
    stdout.write_all(b"> ").await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let output = match commands::parse_command(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => commands::execute(&mut app, command).await,
            Ok(None) => String::new(),
            Err(e) => format!("error: {e}\n"),
        };
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    tracing::info!("notecards exited");
    Ok(())
}
