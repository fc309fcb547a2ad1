//! KI-Assistent command-line entry point.
//!
//! Loads settings, sets up file logging, picks the response engine once and
//! hands control to the read loop. Type `exit` or press Ctrl+C to quit.

use anyhow::Result;
use assistant::{select_engine, ActionRunner, ChatSession, ReplyDispatcher, SystemLauncher, ThinkingDelay};
use providers::OllamaBackend;
use shared::settings::{AppSettings, EnginePreference};
use shared::ChatHistory;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

mod ascii_art;
mod cli;
mod utils;

/// `RUST_LOG` when set and valid, otherwise `default`
fn log_filter(env_value: Option<&str>, default: &str) -> EnvFilter {
    env_value
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

fn init_logging() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let log_file = utils::log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok()?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(log_filter(rust_log.as_deref(), "info"))
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init(),
        // Keep the chat readable: warnings only unless RUST_LOG says otherwise
        None => tracing_subscriber::fmt()
            .with_env_filter(log_filter(rust_log.as_deref(), "warn"))
            .with_writer(io::stderr)
            .init(),
    }
}

fn main() -> Result<()> {
    init_logging();

    let (mut settings, from_disk) = utils::load_settings_or_default();
    if !from_disk {
        utils::save_settings(&settings);
    }
    utils::apply_env_overrides(&mut settings);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(settings));
    if let Err(e) = &result {
        tracing::error!("unexpected error: {:#}", e);
        eprintln!("\nEs ist ein unerwarteter Fehler aufgetreten: {}", e);
    }
    result
}

async fn run(settings: AppSettings) -> Result<()> {
    let mut out = io::stdout();
    writeln!(out, "{}", ascii_art::banner())?;
    for line in ascii_art::welcome_lines() {
        writeln!(out, "{}", line)?;
    }
    writeln!(out)?;

    let wants_model = settings.engine.preference != EnginePreference::RuleBased;
    if wants_model {
        writeln!(out, "Lade KI-Modell, bitte warten...")?;
        out.flush()?;
    }

    let backend = Arc::new(OllamaBackend::new(
        settings.engine.local_model.clone(),
        settings.engine.base_url.clone(),
    ));
    let selection = select_engine(&settings.engine, backend).await;
    if wants_model {
        if selection.fallback_reason.is_some() {
            writeln!(out, "Konnte KI-Modell nicht laden, verwende einfache Antworten.\n")?;
        } else {
            writeln!(out, "KI-Modell erfolgreich geladen!\n")?;
        }
    }
    let dispatcher = ReplyDispatcher::new(selection.engine)
        .with_delay(ThinkingDelay::from(&settings.thinking_delay))
        .with_timeout(settings.response_timeout_secs.map(Duration::from_secs));
    tracing::info!(engine = dispatcher.engine_name(), "assistant ready");
    let actions = ActionRunner::new(Arc::new(SystemLauncher), settings.search_url.clone());
    let session = ChatSession::new(ChatHistory::bounded(settings.history_limit));

    let mut repl = cli::Repl::new(session, dispatcher, actions, out);
    repl.run(BufReader::new(tokio::io::stdin())).await?;
    tracing::info!(lines = repl.session().history().len(), "chat ended");
    Ok(())
}
