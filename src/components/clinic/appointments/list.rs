//! Appointment list with status filtering and server-gated actions.

use crate::api::{ApiClient, ApiResult};
use crate::components::clinic::appointments::AppointmentAction;
use crate::components::{palette, render_header, render_help, StatusMessage};
use crate::models::{Appointment, AppointmentStatus};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::warn;

/// Status filter cycle: everything, then each status in turn.
const FILTERS: [Option<AppointmentStatus>; 7] = [
    None,
    Some(AppointmentStatus::Scheduled),
    Some(AppointmentStatus::Confirmed),
    Some(AppointmentStatus::InProgress),
    Some(AppointmentStatus::Completed),
    Some(AppointmentStatus::Cancelled),
    Some(AppointmentStatus::NoShow),
];

pub struct AppointmentList {
    api: ApiClient,
    appointments: Vec<Appointment>,
    filter_index: usize,
    table_state: TableState,
    status: StatusMessage,
    confirm_delete: bool,
}

impl AppointmentList {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            appointments: Vec::new(),
            filter_index: 0,
            table_state: TableState::default(),
            status: StatusMessage::default(),
            confirm_delete: false,
        }
    }

    /// Replaces the list from the server; failures keep the previous
    /// list and surface a status message.
    pub fn refresh(&mut self) -> ApiResult<()> {
        match self.api.list_appointments(None) {
            Ok(appointments) => {
                self.appointments = appointments;
                self.clamp_selection();
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch appointments");
                self.status
                    .error(format!("Failed to fetch appointments: {e}"));
                Ok(())
            }
        }
    }

    fn filter(&self) -> Option<AppointmentStatus> {
        FILTERS[self.filter_index]
    }

    fn filtered(&self) -> Vec<&Appointment> {
        match self.filter() {
            None => self.appointments.iter().collect(),
            Some(status) => self
                .appointments
                .iter()
                .filter(|a| a.status == status)
                .collect(),
        }
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

    fn selected(&self) -> Option<&Appointment> {
        let filtered = self.filtered();
        self.table_state
            .selected()
            .and_then(|i| filtered.get(i).copied())
    }

    /// Requests a status transition; whether it is legal is decided
    /// server-side. The row is replaced with the server's answer.
    fn change_status(
        &mut self,
        id: u64,
        status: AppointmentStatus,
    ) -> Result<Option<AppointmentAction>> {
        match self.api.set_appointment_status(id, status) {
            Ok(updated) => {
                if let Some(slot) = self.appointments.iter_mut().find(|a| a.id == id) {
                    *slot = updated;
                }
                self.status.success(format!("Appointment {status}."));
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => Ok(Some(AppointmentAction::SessionExpired)),
            Err(e) => {
                warn!(error = %e, appointment = id, "status change failed");
                self.status.error(format!("Status change failed: {e}"));
                Ok(None)
            }
        }
    }

    fn delete_selected(&mut self) -> Result<Option<AppointmentAction>> {
        let Some(id) = self.selected().map(|a| a.id) else {
            return Ok(None);
        };
        match self.api.delete_appointment(id) {
            Ok(()) => {
                self.appointments.retain(|a| a.id != id);
                self.clamp_selection();
                self.status.success("Appointment deleted.");
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => Ok(Some(AppointmentAction::SessionExpired)),
            Err(e) => {
                warn!(error = %e, appointment = id, "delete failed");
                self.status.error(format!("Delete failed: {e}"));
                Ok(None)
            }
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<AppointmentAction>> {
        if self.confirm_delete {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.confirm_delete = false;
                    return self.delete_selected();
                }
                _ => self.confirm_delete = false,
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Down => self.select_next(),
            KeyCode::Up => self.select_previous(),
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.filter_index = (self.filter_index + 1) % FILTERS.len();
                self.clamp_selection();
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                return Ok(Some(AppointmentAction::OpenNew))
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(appointment) = self.selected().cloned() {
                    return Ok(Some(AppointmentAction::Edit(Box::new(appointment))));
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                // Only offered when the server says so.
                if let Some(a) = self.selected().filter(|a| a.can_cancel) {
                    let id = a.id;
                    return self.change_status(id, AppointmentStatus::Cancelled);
                }
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                if let Some(a) = self.selected().filter(|a| a.can_complete) {
                    let id = a.id;
                    return self.change_status(id, AppointmentStatus::Completed);
                }
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                if self.selected().is_some() {
                    self.confirm_delete = true;
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if self.refresh().is_err() {
                    return Ok(Some(AppointmentAction::SessionExpired));
                }
            }
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc => {
                return Ok(Some(AppointmentAction::BackToHome))
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
                Constraint::Length(1), // Filter line
                Constraint::Min(10),   // Table
                Constraint::Length(1), // Status
                Constraint::Length(2), // Help
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], "APPOINTMENTS");

        let filter_label = match self.filter() {
            None => "All".to_string(),
            Some(status) => status.to_string(),
        };
        let filter = Paragraph::new(format!("Filter: {filter_label}  (S to cycle)"))
            .style(Style::default().fg(palette::INFO).bg(palette::BG));
        frame.render_widget(filter, layout[1]);

        let filtered = self.filtered();
        let rows: Vec<Row> = filtered
            .iter()
            .map(|a| {
                let mut actions = String::new();
                if a.can_cancel {
                    actions.push_str("C ");
                }
                if a.can_complete {
                    actions.push_str("M");
                }
                Row::new(vec![
                    a.appointment_date.to_string(),
                    a.start_time.clone(),
                    a.patient_name.clone(),
                    a.staff_name.clone(),
                    a.appointment_type.to_string(),
                    a.status.to_string(),
                    actions,
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Length(7),
                Constraint::Percentage(24),
                Constraint::Percentage(24),
                Constraint::Length(11),
                Constraint::Length(13),
                Constraint::Length(7),
            ],
        )
        .header(
            Row::new(vec!["Date", "Time", "Patient", "Provider", "Type", "Status", "Actions"])
                .style(
                    Style::default()
                        .fg(palette::FOCUS)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .block(
            Block::default()
                .title(format!(" {} appointment(s) ", filtered.len()))
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

        if self.confirm_delete {
            let prompt = Paragraph::new("Delete selected appointment? (Y/N)")
                .style(Style::default().fg(palette::ERROR).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center);
            frame.render_widget(prompt, layout[3]);
        } else {
            self.status.render(frame, layout[3]);
        }

        render_help(
            frame,
            layout[4],
            "N: New | E: Edit | C: Cancel | M: Complete | D: Delete | S: Filter | R: Refresh | Esc: Back",
        );
    }
}
