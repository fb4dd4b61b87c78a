//! quakecache - a terminal dashboard for USGS earthquake feeds.
//!
//! Fetches the monthly feed into a local store and shows it as a magType
//! summary, the full record table, or the records of one magType.

mod app;
mod cli;
mod ui;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quakecache_core::render::dashboard_page;
use quakecache_core::{Config, Dashboard, FeedClient, QuakeStore};

use app::{App, AppState};
use cli::{Command, USAGE};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside the log directory
const LOG_FILE_PREFIX: &str = "quakecache.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr, for the non-interactive commands
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Daily-rotated log file in `log_dir`; fails if the directory can't be created
fn log_file_appender(log_dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)
}

/// Log to a daily file while the alternate screen owns the terminal.
/// Falls back to stderr when the log directory is unusable.
fn init_file_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    let appender = match log_file_appender(log_dir) {
        Ok(appender) => appender,
        Err(e) => {
            init_stderr_tracing();
            warn!(error = %e, log_dir = %log_dir.display(), "Cannot write log files, logging to stderr");
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match cli::parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let config_result = Config::load();

    let _log_guard = match command {
        Command::Tui => {
            let log_dir = config_result
                .as_ref()
                .ok()
                .and_then(|c| c.data_dir().ok())
                .unwrap_or_else(std::env::temp_dir)
                .join("logs");
            init_file_tracing(&log_dir)
        }
        _ => {
            init_stderr_tracing();
            None
        }
    };

    let config = config_result.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });

    match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::InitConfig => {
            config.save()?;
            eprintln!("Wrote default configuration");
            Ok(())
        }
        Command::Daily => print_daily(&config).await,
        Command::DumpHtml(action) => dump_html(&config, action).await,
        Command::Tui => run_tui(config).await,
    }
}

/// Print the past day's display rows as JSON
async fn print_daily(config: &Config) -> Result<()> {
    let client = FeedClient::with_base_url(&config.feed_base_url, config.request_timeout())?;
    let rows = client.refresh_earthquake_data(1).await.unwrap_or_default();
    eprintln!("{} earthquakes in the past day", rows.len());
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Print the dashboard page with the container rendered from the local store
async fn dump_html(config: &Config, action: quakecache_core::Action) -> Result<()> {
    let data_dir = config.data_dir()?;
    let store = QuakeStore::open(&data_dir)
        .with_context(|| format!("Failed to open local store in {}", data_dir.display()))?;
    let client = FeedClient::with_base_url(&config.feed_base_url, config.request_timeout())?;
    let dashboard = Dashboard::new(Arc::new(store), client, config.fetch_feed);

    let outcome = dashboard.run(action).await?;
    print!("{}", dashboard_page(&outcome.view.to_html(&Local)));
    Ok(())
}

async fn run_tui(config: Config) -> Result<()> {
    info!("quakecache starting");

    // Static UI and button wiring happen before the terminal is taken over
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("quakecache shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Apply results of finished button actions
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
