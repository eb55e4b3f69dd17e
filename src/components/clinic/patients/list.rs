//! Patient list with client-side search.

use crate::api::{ApiClient, ApiResult};
use crate::components::clinic::patients::PatientAction;
use crate::components::{palette, render_header, render_help, render_input, StatusMessage};
use crate::models::Patient;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::warn;

pub struct PatientList {
    api: ApiClient,
    patients: Vec<Patient>,
    search: String,
    search_focused: bool,
    table_state: TableState,
    show_details: bool,
    status: StatusMessage,
}

impl PatientList {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            patients: Vec::new(),
            search: String::new(),
            search_focused: false,
            table_state: TableState::default(),
            show_details: false,
            status: StatusMessage::default(),
        }
    }

    /// Replaces the list from the server. A network failure keeps the
    /// previous list and shows a status message; only a 401 escapes.
    pub fn refresh(&mut self) -> ApiResult<()> {
        match self.api.list_patients() {
            Ok(patients) => {
                self.patients = patients;
                self.clamp_selection();
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch patients");
                self.status.error(format!("Failed to fetch patients: {e}"));
                Ok(())
            }
        }
    }

    /// Case-insensitive filter over name, email and phone. Runs on every
    /// keystroke; the lists here are small enough that this is fine.
    fn filtered(&self) -> Vec<&Patient> {
        if self.search.is_empty() {
            return self.patients.iter().collect();
        }
        let needle = self.search.to_lowercase();
        self.patients
            .iter()
            .filter(|p| {
                p.full_name().to_lowercase().contains(&needle)
                    || p.email
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(&needle))
                    || p.phone.as_deref().is_some_and(|ph| ph.contains(&needle))
            })
            .collect()
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered().len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            let selection = self.table_state.selected().unwrap_or(0).min(len - 1);
            self.table_state.select(Some(selection));
        }
    }

    fn select_next(&mut self) {
        let len = self.filtered().len();
        if len == 0 {
            return;
        }
        let i = self.table_state.selected().map_or(0, |i| (i + 1) % len);
        self.table_state.select(Some(i));
    }

    fn select_previous(&mut self) {
        let len = self.filtered().len();
        if len == 0 {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map_or(0, |i| (i + len - 1) % len);
        self.table_state.select(Some(i));
    }

    fn selected_patient(&self) -> Option<&Patient> {
        let filtered = self.filtered();
        self.table_state
            .selected()
            .and_then(|i| filtered.get(i).copied())
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<PatientAction>> {
        if self.search_focused {
            match key.code {
                KeyCode::Char(c) => {
                    self.search.push(c);
                    self.clamp_selection();
                }
                KeyCode::Backspace => {
                    self.search.pop();
                    self.clamp_selection();
                }
                KeyCode::Esc | KeyCode::Enter | KeyCode::Down => self.search_focused = false,
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('/') => self.search_focused = true,
            KeyCode::Down => self.select_next(),
            KeyCode::Up => self.select_previous(),
            KeyCode::Enter => {
                if self.selected_patient().is_some() {
                    self.show_details = !self.show_details;
                }
            }
            KeyCode::Char('a') | KeyCode::Char('A') => return Ok(Some(PatientAction::OpenAdd)),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if self.refresh().is_err() {
                    return Ok(Some(PatientAction::SessionExpired));
                }
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                return Ok(Some(PatientAction::BackToHome))
            }
            KeyCode::Esc => {
                if self.show_details {
                    self.show_details = false;
                } else {
                    return Ok(Some(PatientAction::BackToHome));
                }
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
                Constraint::Length(3), // Header
                Constraint::Length(3), // Search
                Constraint::Min(10),   // Table
                Constraint::Length(1), // Status
                Constraint::Length(2), // Help
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], "PATIENTS");
        render_input(
            frame,
            layout[1],
            "Search (name, email, phone)",
            &self.search,
            self.search_focused,
        );

        let filtered = self.filtered();
        let rows: Vec<Row> = filtered
            .iter()
            .map(|p| {
                Row::new(vec![
                    p.full_name(),
                    p.age.map_or(String::from("-"), |a| a.to_string()),
                    p.phone.clone().unwrap_or_else(|| "-".to_string()),
                    p.email.clone().unwrap_or_else(|| "-".to_string()),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(30),
                Constraint::Percentage(10),
                Constraint::Percentage(25),
                Constraint::Percentage(35),
            ],
        )
        .header(
            Row::new(vec!["Name", "Age", "Phone", "Email"]).style(
                Style::default()
                    .fg(palette::FOCUS)
                    .add_modifier(Modifier::BOLD),
            ),
        )
        .block(
            Block::default()
                .title(format!(" {} patient(s) ", filtered.len()))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette::BORDER))
                .style(Style::default().bg(palette::PANEL)),
        )
        .style(Style::default().fg(palette::TEXT))
        .row_highlight_style(
            Style::default()
                .fg(palette::FOCUS)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("\u{25ba} ");

        let mut table_state = self.table_state.clone();
        frame.render_stateful_widget(table, layout[2], &mut table_state);

        self.status.render(frame, layout[3]);
        render_help(
            frame,
            layout[4],
            "/: Search | \u{2191}\u{2193}: Select | Enter: Details | A: Add | R: Refresh | Esc: Back",
        );

        if self.show_details {
            if let Some(patient) = self.selected_patient() {
                let area = crate::components::centered_rect(60, 50, frame.area());
                let dob = patient
                    .date_of_birth
                    .map_or(String::from("-"), |d| d.to_string());
                let lines = vec![
                    Line::from(vec![
                        Span::styled("Name: ", Style::default().fg(palette::TEXT_DIM)),
                        Span::raw(patient.full_name()),
                    ]),
                    Line::from(vec![
                        Span::styled("Date of birth: ", Style::default().fg(palette::TEXT_DIM)),
                        Span::raw(dob),
                    ]),
                    Line::from(vec![
                        Span::styled("Phone: ", Style::default().fg(palette::TEXT_DIM)),
                        Span::raw(patient.phone.clone().unwrap_or_else(|| "-".into())),
                    ]),
                    Line::from(vec![
                        Span::styled("Email: ", Style::default().fg(palette::TEXT_DIM)),
                        Span::raw(patient.email.clone().unwrap_or_else(|| "-".into())),
                    ]),
                    Line::from(vec![
                        Span::styled("Address: ", Style::default().fg(palette::TEXT_DIM)),
                        Span::raw(patient.address.clone().unwrap_or_else(|| "-".into())),
                    ]),
                ];
                let details = Paragraph::new(lines)
                    .block(
                        Block::default()
                            .title(" Patient Details ")
                            .borders(Borders::ALL)
                            .border_type(BorderType::Rounded)
                            .style(Style::default().bg(palette::PANEL)),
                    )
                    .style(Style::default().fg(palette::TEXT))
                    .wrap(Wrap { trim: true });
                frame.render_widget(Clear, area);
                frame.render_widget(details, area);
            }
        }
    }
}
