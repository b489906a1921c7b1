//! Cyber Guardians
//!
//! A narrative cybersecurity quiz for the terminal: spot phishing,
//! weak passwords and scams across a seven-level campaign.

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use cyber_guardians::config::resolve_config;
use cyber_guardians::game::GameMessage;
use cyber_guardians::persist::{FileStore, SnapshotAdapter, SnapshotStore, SystemClock};
use cyber_guardians::tui::App;
use cyber_guardians::{Catalog, Game, Result};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::OpenOptions;
use std::io::{self, stdout, Stdout};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Longest wait for input before the timeline is ticked again
const FRAME_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(author, version, about = "A narrative cybersecurity quiz for the terminal", long_about = None)]
struct Cli {
    /// TOML config file (defaults to ./cyber-guardians.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for saved progress and the log file.
    #[arg(long)]
    save_dir: Option<PathBuf>,
    /// Discard saved progress and start over.
    #[arg(long)]
    fresh: bool,
    /// Seed for scenario shuffling, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = resolve_config(cli.config.as_deref())?;
    if let Some(dir) = cli.save_dir {
        config.storage.save_dir = dir;
    }
    let log_error = init_logging(&config.storage.save_dir);
    info!(version = cyber_guardians::VERSION, "starting");

    let catalog = Catalog::standard();
    catalog.validate()?;
    let catalog = Arc::new(catalog);

    let mut store = SnapshotAdapter::new(FileStore::new(&config.storage.save_dir), SystemClock);
    let discard_warning = if cli.fresh { discard_progress(&mut store) } else { None };

    let mut game = match cli.seed {
        Some(seed) => Game::with_seed(catalog, config, seed),
        None => Game::new(catalog, config),
    }
    .with_store(Box::new(store));
    if log_error.is_some() {
        game.add_message(GameMessage::warning("Log file unavailable; logging is off."));
    }
    if let Some(message) = discard_warning {
        game.add_message(message);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(game);
    let outcome = run(&mut terminal, &mut app);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome?;

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  Thanks for playing Cyber Guardians!                   ║");
    println!("║  Your progress has been saved.                         ║");
    println!("║                                                        ║");
    println!("║  Think before you click.                               ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    info!("exiting");
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    while app.running {
        terminal.draw(|frame| {
            app.render(frame);
        })?;

        if !app.handle_input(FRAME_TIMEOUT)? {
            break;
        }

        let now = Instant::now();
        app.tick(now - last_tick);
        last_tick = now;
    }
    Ok(())
}

/// Drop saved progress for `--fresh`; a failure only costs a warning
fn discard_progress(store: &mut dyn SnapshotStore) -> Option<GameMessage> {
    match store.clear() {
        Ok(()) => {
            info!("saved progress discarded");
            None
        }
        Err(e) => {
            warn!(error = %e, "failed to discard saved progress");
            Some(GameMessage::warning("Saved progress could not be discarded."))
        }
    }
}

/// Log file in the save dir, or a sink when it cannot be opened
fn log_writer(dir: &Path) -> (BoxMakeWriter, Option<anyhow::Error>) {
    let opened = std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create save dir: {}", dir.display()))
        .and_then(|()| {
            let path = dir.join("cyber-guardians.log");
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))
        });
    match opened {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), None),
        Err(e) => (BoxMakeWriter::new(io::sink), Some(e)),
    }
}

/// Log to a file in the save dir; the terminal belongs to the UI
fn init_logging(dir: &Path) -> Option<anyhow::Error> {
    let (writer, error) = log_writer(dir);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cyber_guardians=info")),
        )
        .with_ansi(false)
        .with_writer(writer)
        .init();
    error
}
