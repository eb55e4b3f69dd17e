//! Staff directory table.

use crate::api::{ApiClient, ApiResult};
use crate::components::clinic::staff::StaffAction;
use crate::components::{palette, render_header, render_help, StatusMessage};
use crate::models::StaffMember;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::warn;

pub struct StaffList {
    api: ApiClient,
    members: Vec<StaffMember>,
    table_state: TableState,
    status: StatusMessage,
}

impl StaffList {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            members: Vec::new(),
            table_state: TableState::default(),
            status: StatusMessage::default(),
        }
    }

    pub fn refresh(&mut self) -> ApiResult<()> {
        match self.api.list_staff() {
            Ok(members) => {
                self.members = members;
                if self.table_state.selected().is_none() && !self.members.is_empty() {
                    self.table_state.select(Some(0));
                }
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch staff");
                self.status.error(format!("Failed to load staff: {e}"));
                Ok(())
            }
        }
    }

    fn move_selection(&mut self, delta: i64) {
        if self.members.is_empty() {
            return;
        }
        let len = self.members.len() as i64;
        let current = self.table_state.selected().unwrap_or(0) as i64;
        self.table_state
            .select(Some(((current + delta).rem_euclid(len)) as usize));
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<StaffAction>> {
        match key.code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('a') | KeyCode::Char('A') => return Ok(Some(StaffAction::OpenAdd)),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Err(e) = self.refresh() {
                    if e.is_unauthorized() {
                        return Ok(Some(StaffAction::SessionExpired));
                    }
                }
            }
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc => {
                return Ok(Some(StaffAction::BackToHome))
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

        render_header(frame, layout[0], "STAFF");

        let rows: Vec<Row> = self
            .members
            .iter()
            .map(|m| {
                let role_style = if m.role.is_provider() {
                    Style::default().fg(palette::SUCCESS)
                } else {
                    Style::default().fg(palette::TEXT)
                };
                Row::new(vec![
                    Cell::from(m.name.clone()),
                    Cell::from(Span::styled(m.role.to_string(), role_style)),
                    Cell::from(m.email.clone()),
                    Cell::from(m.phone.clone().unwrap_or_default()),
                ])
                .style(Style::default().fg(palette::TEXT))
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(30),
                Constraint::Length(14),
                Constraint::Percentage(35),
                Constraint::Percentage(20),
            ],
        )
        .header(
            Row::new(vec!["Name", "Role", "Email", "Phone"])
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
                .title(format!(" Team ({}) ", self.members.len()))
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
            "\u{2191}\u{2193}: Select | A: Add | R: Refresh | B: Back",
        );
    }
}
