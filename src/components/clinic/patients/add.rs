//! Patient registration form.

use crate::api::{ApiClient, ApiError};
use crate::components::clinic::patients::PatientAction;
use crate::components::{
    palette, render_field_error, render_header, render_help, render_input, StatusMessage,
};
use crate::models::NewPatient;
use crate::tui::Frame;
use crate::validate::FieldErrors;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::Paragraph};
use tracing::warn;

const FIELD_FIRST: usize = 0;
const FIELD_LAST: usize = 1;
const FIELD_EMAIL: usize = 2;
const FIELD_PHONE: usize = 3;
const FIELD_DOB: usize = 4;
const FIELD_ADDRESS: usize = 5;
const INPUT_FIELDS: usize = 6;

pub struct AddPatient {
    api: ApiClient,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    dob: String,
    address: String,
    focus_index: usize,
    errors: FieldErrors,
    status: StatusMessage,
}

impl AddPatient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            dob: String::new(),
            address: String::new(),
            focus_index: 0,
            errors: FieldErrors::default(),
            status: StatusMessage::default(),
        }
    }

    pub fn reset(&mut self) {
        self.first_name.clear();
        self.last_name.clear();
        self.email.clear();
        self.phone.clear();
        self.dob.clear();
        self.address.clear();
        self.focus_index = 0;
        self.errors = FieldErrors::default();
        self.status = StatusMessage::default();
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            FIELD_FIRST => Some(&mut self.first_name),
            FIELD_LAST => Some(&mut self.last_name),
            FIELD_EMAIL => Some(&mut self.email),
            FIELD_PHONE => Some(&mut self.phone),
            FIELD_DOB => Some(&mut self.dob),
            FIELD_ADDRESS => Some(&mut self.address),
            _ => None,
        }
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if self.first_name.trim().is_empty() {
            errors.add("first_name", "First name is required.");
        }
        if self.last_name.trim().is_empty() {
            errors.add("last_name", "Last name is required.");
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            errors.add("email", "Email does not look valid.");
        }
        errors
    }

    fn opt(value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn submit(&mut self) -> Result<Option<PatientAction>> {
        self.errors = self.validate();
        if !self.errors.is_empty() {
            return Ok(None);
        }

        let new_patient = NewPatient {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: Self::opt(&self.email),
            phone: Self::opt(&self.phone),
            date_of_birth: Self::opt(&self.dob),
            address: Self::opt(&self.address),
        };

        match self.api.create_patient(&new_patient) {
            Ok(patient) => {
                self.reset();
                self.status
                    .success(format!("Patient {} added.", patient.full_name()));
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => Ok(Some(PatientAction::SessionExpired)),
            Err(ApiError::Validation { message, errors }) => {
                self.errors.merge_server(errors);
                self.status.error(message);
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "failed to create patient");
                self.status.error(format!("Failed to add patient: {e}"));
                Ok(None)
            }
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<PatientAction>> {
        match key.code {
            KeyCode::Char(c) => {
                let index = self.focus_index;
                if let Some(field) = self.field_mut(index) {
                    field.push(c);
                }
            }
            KeyCode::Backspace => {
                let index = self.focus_index;
                if let Some(field) = self.field_mut(index) {
                    field.pop();
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus_index = (self.focus_index + 1) % (INPUT_FIELDS + 2);
            }
            KeyCode::Up => {
                self.focus_index = (self.focus_index + INPUT_FIELDS + 1) % (INPUT_FIELDS + 2);
            }
            KeyCode::Esc => return Ok(Some(PatientAction::BackToList)),
            KeyCode::Enter => {
                if self.focus_index == INPUT_FIELDS + 1 {
                    return Ok(Some(PatientAction::BackToList));
                }
                return self.submit();
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
                Constraint::Length(4), // First name + error
                Constraint::Length(4), // Last name + error
                Constraint::Length(4), // Email + error
                Constraint::Length(3), // Phone
                Constraint::Length(3), // DOB
                Constraint::Length(3), // Address
                Constraint::Length(1), // Status
                Constraint::Length(1), // Submit
                Constraint::Length(1), // Back
                Constraint::Min(0),    // Help
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], "NEW PATIENT");

        fn split_field(area: Rect) -> (Rect, Rect) {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Length(1)])
                .split(area);
            (parts[0], parts[1])
        }

        let (input, error) = split_field(layout[1]);
        render_input(frame, input, "First Name*", &self.first_name, self.focus_index == FIELD_FIRST);
        render_field_error(frame, error, self.errors.first("first_name"));

        let (input, error) = split_field(layout[2]);
        render_input(frame, input, "Last Name*", &self.last_name, self.focus_index == FIELD_LAST);
        render_field_error(frame, error, self.errors.first("last_name"));

        let (input, error) = split_field(layout[3]);
        render_input(frame, input, "Email", &self.email, self.focus_index == FIELD_EMAIL);
        render_field_error(frame, error, self.errors.first("email"));

        render_input(frame, layout[4], "Phone", &self.phone, self.focus_index == FIELD_PHONE);
        render_input(
            frame,
            layout[5],
            "Date of Birth (YYYY-MM-DD)",
            &self.dob,
            self.focus_index == FIELD_DOB,
        );
        render_input(frame, layout[6], "Address", &self.address, self.focus_index == FIELD_ADDRESS);

        self.status.render(frame, layout[7]);

        let submit = Paragraph::new(Span::styled(
            if self.focus_index == INPUT_FIELDS {
                "\u{25ba} Save Patient \u{25c4}"
            } else {
                "  Save Patient  "
            },
            Style::default()
                .fg(if self.focus_index == INPUT_FIELDS {
                    palette::SUCCESS
                } else {
                    palette::TEXT_DIM
                })
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(submit, layout[8]);

        let back = Paragraph::new(Span::styled(
            if self.focus_index == INPUT_FIELDS + 1 {
                "\u{25ba} Back \u{25c4}"
            } else {
                "  Back  "
            },
            Style::default()
                .fg(if self.focus_index == INPUT_FIELDS + 1 {
                    palette::INFO
                } else {
                    palette::TEXT_DIM
                })
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(back, layout[9]);

        render_help(
            frame,
            layout[10],
            "Tab/\u{2191}\u{2193}: Switch Fields | Enter: Save | Esc: Back to List",
        );
    }
}
