mod api;
mod app;
mod calendar;
mod components;
mod config;
mod fetch;
mod models;
mod session;
mod tui;
mod validate;

use anyhow::{Context, Result};
use app::App;
use config::ApiConfig;
use crossterm::{
    event::DisableMouseCapture,
    terminal::{self, LeaveAlternateScreen},
};
use ratatui::prelude::{CrosstermBackend, Terminal};
use session::SessionStore;
use std::io;
use tracing_subscriber::EnvFilter;
use tui::Tui;

fn main() -> Result<()> {
    let _guard = CleanupGuard;

    init_logging()?;

    let config = ApiConfig::from_env();
    let store = SessionStore::from_env();
    let session = store.load();
    let api = api::ApiClient::new(&config, session.auth_token.clone());

    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let mut tui = Tui::new(terminal);
    tui.init()?;

    let mut app = App::new(api, store, session);
    let res = app.run(&mut tui);

    tui.exit()?;

    if let Err(e) = res {
        eprintln!("Application Error: {e}");
    }
    Ok(())
}

/// Logs go to a file; stdout belongs to the terminal UI.
fn init_logging() -> Result<()> {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("ehreezy.log")
        .context("failed to open ehreezy.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

struct CleanupGuard;

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        // Ignore errors during cleanup
        let _ = terminal::disable_raw_mode();
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}
