//! Upcoming telehealth sessions. Joining is gated by the server's
//! `join_ready` flag, not by local clock math.

use crate::api::{ApiClient, ApiResult};
use crate::components::clinic::telehealth::TelehealthAction;
use crate::components::{palette, render_header, render_help, StatusMessage};
use crate::models::TelehealthSession;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::warn;

pub struct SessionList {
    api: ApiClient,
    sessions: Vec<TelehealthSession>,
    table_state: TableState,
    status: StatusMessage,
}

impl SessionList {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            sessions: Vec::new(),
            table_state: TableState::default(),
            status: StatusMessage::default(),
        }
    }

    pub fn refresh(&mut self) -> ApiResult<()> {
        match self.api.list_telehealth_sessions() {
            Ok(sessions) => {
                self.sessions = sessions;
                if self.table_state.selected().is_none() && !self.sessions.is_empty() {
                    self.table_state.select(Some(0));
                }
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch telehealth sessions");
                self.status.error(format!("Failed to load sessions: {e}"));
                Ok(())
            }
        }
    }

    fn move_selection(&mut self, delta: i64) {
        if self.sessions.is_empty() {
            return;
        }
        let len = self.sessions.len() as i64;
        let current = self.table_state.selected().unwrap_or(0) as i64;
        self.table_state
            .select(Some(((current + delta).rem_euclid(len)) as usize));
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<TelehealthAction>> {
        match key.code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter | KeyCode::Char('j') | KeyCode::Char('J') => {
                if let Some(session) = self
                    .table_state
                    .selected()
                    .and_then(|i| self.sessions.get(i))
                {
                    if session.join_ready {
                        return Ok(Some(TelehealthAction::Join(Box::new(session.clone()))));
                    }
                    self.status
                        .info("This session is not open yet. Try closer to the start time.");
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Err(e) = self.refresh() {
                    if e.is_unauthorized() {
                        return Ok(Some(TelehealthAction::SessionExpired));
                    }
                }
            }
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc => {
                return Ok(Some(TelehealthAction::BackToHome))
            }
            _ => {}
        }
        Ok(None)
    }

    pub fn tick(&mut self) {
        self.status.tick();
    }

    pub fn render(&self, frame: &mut Frame) {
        crate::components::fill_background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], "TELEHEALTH");

        let rows: Vec<Row> = self
            .sessions
            .iter()
            .map(|s| {
                let join = if s.join_ready {
                    Span::styled(
                        "Ready",
                        Style::default().fg(palette::SUCCESS).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled("Waiting", Style::default().fg(palette::TEXT_DIM))
                };
                Row::new(vec![
                    Cell::from(s.scheduled_date.to_string()),
                    Cell::from(s.start_time.clone()),
                    Cell::from(s.patient_name.clone()),
                    Cell::from(s.staff_name.clone()),
                    Cell::from(s.status.to_string()),
                    Cell::from(join),
                ])
                .style(Style::default().fg(palette::TEXT))
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Length(7),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Length(12),
                Constraint::Length(9),
            ],
        )
        .header(
            Row::new(vec!["Date", "Time", "Patient", "Provider", "Status", "Join"])
                .style(Style::default().fg(palette::INFO).add_modifier(Modifier::BOLD)),
        )
        .row_highlight_style(
            Style::default()
                .fg(palette::FOCUS)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("\u{25ba} ")
        .block(
            Block::default()
                .title(" Video Sessions ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette::BORDER))
                .style(Style::default().bg(palette::PANEL)),
        );
        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, layout[1], &mut state);

        self.status.render(frame, layout[2]);
        render_help(
            frame,
            layout[3],
            "\u{2191}\u{2193}: Select | Enter/J: Join | R: Refresh | B: Back",
        );
    }
}
