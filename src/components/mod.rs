use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};
use std::time::{Duration, Instant};

pub mod clinic;
pub mod home;
pub mod login;
pub mod register;

pub trait Component {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<crate::app::SelectedPage>>;
    fn render(&self, frame: &mut Frame);
    /// Called on every UI tick; pages use it to expire status messages
    /// and drain background fetch results.
    fn tick(&mut self) {}
}

/// Shared palette; the whole app stays on one dark scheme.
pub mod palette {
    use ratatui::style::Color;

    pub const BG: Color = Color::Rgb(16, 16, 28);
    pub const PANEL: Color = Color::Rgb(22, 22, 35);
    pub const INPUT_BG: Color = Color::Rgb(26, 26, 36);
    pub const BORDER: Color = Color::Rgb(75, 75, 120);
    pub const BORDER_IDLE: Color = Color::Rgb(140, 140, 200);
    pub const FOCUS: Color = Color::Rgb(250, 250, 110);
    pub const TEXT: Color = Color::Rgb(230, 230, 250);
    pub const TEXT_DIM: Color = Color::Rgb(140, 140, 170);
    pub const SUCCESS: Color = Color::Rgb(140, 219, 140);
    pub const ERROR: Color = Color::Rgb(255, 100, 100);
    pub const INFO: Color = Color::Rgb(129, 199, 245);
}

const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Success,
    Error,
    Info,
}

/// A transient status line: the toast analogue. Set on an action's
/// outcome, cleared on input or after five seconds of ticks.
#[derive(Debug, Default)]
pub struct StatusMessage {
    current: Option<(StatusKind, String)>,
    since: Option<Instant>,
}

impl StatusMessage {
    pub fn success(&mut self, text: impl Into<String>) {
        self.set(StatusKind::Success, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set(StatusKind::Error, text.into());
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.set(StatusKind::Info, text.into());
    }

    fn set(&mut self, kind: StatusKind, text: String) {
        self.current = Some((kind, text));
        self.since = Some(Instant::now());
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.since = None;
    }

    /// Expires the message after the timeout. Call from `tick`.
    pub fn tick(&mut self) {
        if let Some(since) = self.since {
            if since.elapsed() >= STATUS_TIMEOUT {
                self.clear();
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some((kind, text)) = &self.current else {
            return;
        };
        let (prefix, color) = match kind {
            StatusKind::Success => ("\u{2713} ", palette::SUCCESS),
            StatusKind::Error => ("\u{26a0} ", palette::ERROR),
            StatusKind::Info => ("", palette::INFO),
        };
        let paragraph = Paragraph::new(format!("{prefix}{text}"))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }
}

/// Helper to create a centered rectangle, used by every dialog.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Renders one bordered input field, highlighted when focused.
pub fn render_input(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border = if focused {
        Style::default().fg(palette::FOCUS)
    } else {
        Style::default().fg(palette::BORDER_IDLE)
    };
    let input = Paragraph::new(value.to_string())
        .style(Style::default().fg(palette::TEXT).bg(palette::INPUT_BG))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(Span::styled(
                    format!(" {title} "),
                    Style::default().fg(palette::TEXT),
                ))
                .border_style(border)
                .style(Style::default().bg(palette::INPUT_BG)),
        );
    frame.render_widget(input, area);
}

/// Page header bar with a bottom border, shared by every clinic page.
pub fn render_header(frame: &mut Frame, area: Rect, title: &str) {
    let header = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(palette::BORDER))
        .style(Style::default().bg(palette::BG));
    frame.render_widget(header, area);

    let title = Paragraph::new(title.to_string())
        .style(
            Style::default()
                .fg(palette::TEXT)
                .add_modifier(Modifier::BOLD)
                .bg(palette::BG),
        )
        .alignment(Alignment::Center);
    frame.render_widget(title, area);
}

/// Footer help line.
pub fn render_help(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text.to_string())
        .style(Style::default().fg(palette::TEXT_DIM).bg(palette::BG))
        .alignment(Alignment::Center);
    frame.render_widget(help, area);
}

/// One-line inline field error, rendered under its input.
pub fn render_field_error(frame: &mut Frame, area: Rect, message: Option<&str>) {
    if let Some(message) = message {
        let error = Paragraph::new(message.to_string())
            .style(Style::default().fg(palette::ERROR))
            .alignment(Alignment::Left);
        frame.render_widget(error, area);
    }
}

/// Fills the frame with the app background.
pub fn fill_background(frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette::BG)),
        area,
    );
}
