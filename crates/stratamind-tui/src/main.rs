use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use stratamind_core::{ChatController, ChatError, Config, ConnectionState, HttpBackend};
use tokio::sync::mpsc;
use tracing::{info, warn};

mod app;
mod console;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use console::ConsoleSink;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "stratamind")]
#[command(version, about = "Chat with a StrataMind knowledge backend from the terminal")]
struct Cli {
    /// Backend base address (overrides the config file)
    #[arg(long, global = true, env = "STRATAMIND_BACKEND_URL")]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the backend is reachable
    Health,
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        question: String,
    },
    /// Upload knowledge text, inline or from a file
    Upload {
        /// Knowledge text
        text: Option<String>,
        /// Read the knowledge text from a file instead
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let _log_guard = logging::init_file();
            let config = load_config(cli.backend_url);
            run_tui(config).await
        }
        Some(command) => {
            logging::init_stderr();
            let config = load_config(cli.backend_url);
            run_command(command, config).await
        }
    }
}

fn load_config(backend_url: Option<String>) -> Config {
    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read config file, using defaults");
        Config::new()
    });
    config.with_backend_override(backend_url)
}

async fn run_tui(config: Config) -> Result<()> {
    info!(backend = config.base_url(), "starting terminal UI");

    let (ui_tx, ui_rx) = mpsc::unbounded_channel();
    let backend = Arc::new(HttpBackend::from_config(&config));
    let controller = ChatController::new(backend, Arc::new(ui_tx), &config);

    let mut app = App::new(controller.clone(), config.base_url());
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(ui_rx);
    let monitor = controller.spawn_monitor();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    monitor.abort();
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    let backend = Arc::new(HttpBackend::from_config(&config));
    let controller = ChatController::new(backend, Arc::new(ConsoleSink), &config);

    let state = controller.check_health().await;
    if matches!(command, Commands::Health) {
        println!("{}: {}", config.base_url(), state.label());
    }
    if state == ConnectionState::Offline {
        bail!("backend at {} is offline", config.base_url());
    }

    match command {
        Commands::Health => Ok(()),
        Commands::Ask { question } => controller
            .ask(&question)
            .await
            .map(|_| ())
            .map_err(|e| command_error(e, "question is empty")),
        Commands::Upload { text, file } => {
            let text = match (text, file) {
                (_, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("could not read {}", path.display()))?,
                (Some(text), None) => text,
                (None, None) => String::new(),
            };
            controller
                .upload(&text)
                .await
                .map(|_| ())
                .map_err(|e| command_error(e, "knowledge text is empty"))
        }
    }
}

fn command_error(err: ChatError, empty_message: &str) -> anyhow::Error {
    match err {
        ChatError::EmptyInput => anyhow!("{}", empty_message),
        other => anyhow!(other),
    }
}
