//! Terminal lifecycle and the input/tick event source.
//!
//! Input is polled with a timeout derived from the tick rate; when the
//! poll expires a `Tick` is delivered instead, which drives message
//! timeouts and background-fetch draining.

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};

/// Ticks per second while idle.
const TICK_RATE: f64 = 30.0;

/// The clinic pages need room for their tables and forms.
const MIN_WIDTH: u16 = 100;
const MIN_HEIGHT: u16 = 32;

#[derive(Debug, Clone)]
pub enum Event {
    Input(event::Event),
    Tick,
}

pub type Frame<'a> = ratatui::Frame<'a>;

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    tick_rate: f64,
}

impl Tui {
    pub fn new(terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Self {
        Self {
            terminal,
            tick_rate: TICK_RATE,
        }
    }

    pub fn init(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        self.ensure_min_size(MIN_WIDTH, MIN_HEIGHT)?;
        Ok(())
    }

    fn ensure_min_size(&self, width: u16, height: u16) -> Result<()> {
        let (current_width, current_height) = terminal::size()?;
        if current_width < width || current_height < height {
            io::stdout().execute(terminal::SetSize(width, height))?;
        }
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.terminal.show_cursor()?;
        terminal::disable_raw_mode()?;
        crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
        Ok(())
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    pub fn next_event(&self) -> Result<Event> {
        let timeout = Duration::from_secs_f64(1.0 / self.tick_rate);
        if event::poll(timeout)? {
            return Ok(Event::Input(event::read()?));
        }
        Ok(Event::Tick)
    }
}
