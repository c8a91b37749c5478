use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use folio_chat_core::{ChatSession, FileStore, OpenAIClient};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod input;
mod settings;
mod tui;
mod ui;

use app::App;
use settings::Settings;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "folio-chat")]
#[command(about = "Chat with an LLM using your own API key")]
struct Cli {
    /// Where the provider and API key are saved
    #[arg(long)]
    storage: Option<PathBuf>,
    /// Chat-completions URL to send requests to
    #[arg(long)]
    endpoint: Option<String>,
    /// Log file (the terminal is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Settings::load();
    let settings = loaded
        .as_ref()
        .map(Clone::clone)
        .unwrap_or_default()
        .merge(cli.storage, cli.endpoint, cli.log_file);

    init_logging(&settings.log_file_or_default()?)?;
    if let Err(err) = &loaded {
        tracing::warn!(error = %err, "ignoring unreadable settings file");
    }

    let storage_path = match &settings.storage_path {
        Some(path) => path.clone(),
        None => FileStore::default_path()?,
    };
    let store = FileStore::open(&storage_path)?;
    let session = ChatSession::mount(store);

    let backend = match &settings.endpoint {
        Some(endpoint) => OpenAIClient::with_endpoint(endpoint),
        None => OpenAIClient::new(),
    };
    tracing::info!(endpoint = backend.endpoint(), storage = %storage_path.display(), "starting folio-chat");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(session, backend, events.sender());

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
