use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use harbor_watch_core::{build_adapter, telemetry, Config};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "harbor-watch")]
#[command(about = "Harbor Watch coastal-monitoring dashboard with an AI chat assistant")]
struct Cli {
    /// Path to config.json (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chat backend: "proxy" or "direct"
    #[arg(short, long)]
    backend: Option<String>,

    /// Monitoring context handed to the assistant
    #[arg(long, conflicts_with = "context_file")]
    context: Option<String>,

    /// Read the monitoring context from a file
    #[arg(long)]
    context_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(backend) = cli.backend {
        config.backend = Some(backend);
    }

    let log_path = Config::get_config_dir()?.join("harbor-watch.log");
    if let Err(e) = telemetry::init_file_logging(&log_path) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let context = match cli.context_file {
        Some(path) => Some(
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read context file {}", path.display()))?,
        ),
        None => cli.context.or_else(|| config.context.clone()),
    };

    let backend = config.backend_kind()?;
    let adapter = build_adapter(&config)?;
    tracing::info!(
        backend = backend.as_str(),
        has_context = context.is_some(),
        "starting harbor-watch"
    );

    let mut app = App::new(adapter, backend, config.greeting(), context);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
