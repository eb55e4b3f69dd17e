//! New staff member form.

use crate::api::{ApiClient, ApiError};
use crate::components::clinic::staff::StaffAction;
use crate::components::{
    palette, render_field_error, render_header, render_help, render_input, StatusMessage,
};
use crate::models::{NewStaffMember, Role};
use crate::tui::Frame;
use crate::validate::FieldErrors;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::warn;

const FIELD_NAME: usize = 0;
const FIELD_EMAIL: usize = 1;
const FIELD_ROLE: usize = 2;
const FIELD_PHONE: usize = 3;
const FIELD_SUBMIT: usize = 4;
const FIELD_BACK: usize = 5;
const FIELD_COUNT: usize = 6;

const ROLES: [Role; 5] = [
    Role::Doctor,
    Role::Nurse,
    Role::Therapist,
    Role::Receptionist,
    Role::Admin,
];

pub struct AddStaff {
    api: ApiClient,
    name: String,
    email: String,
    role_index: usize,
    phone: String,
    focus_index: usize,
    errors: FieldErrors,
    status: StatusMessage,
}

impl AddStaff {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            name: String::new(),
            email: String::new(),
            role_index: 0,
            phone: String::new(),
            focus_index: 0,
            errors: FieldErrors::default(),
            status: StatusMessage::default(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.api.clone());
    }

    fn validate(&mut self) -> bool {
        self.errors = FieldErrors::default();
        if self.name.trim().is_empty() {
            self.errors.add("name", "Name is required.");
        }
        let email = self.email.trim();
        if email.is_empty() {
            self.errors.add("email", "Email is required.");
        } else if !email.contains('@') {
            self.errors.add("email", "Enter a valid email address.");
        }
        self.errors.is_empty()
    }

    fn submit(&mut self) -> Result<Option<StaffAction>> {
        if !self.validate() {
            return Ok(None);
        }
        let phone = self.phone.trim();
        let member = NewStaffMember {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            role: ROLES[self.role_index],
            phone: if phone.is_empty() {
                None
            } else {
                Some(phone.to_string())
            },
        };
        match self.api.create_staff(&member) {
            Ok(created) => {
                self.status
                    .success(format!("{} added to the team.", created.name));
                Ok(Some(StaffAction::BackToList))
            }
            Err(e) if e.is_unauthorized() => Ok(Some(StaffAction::SessionExpired)),
            Err(ApiError::Validation { message, errors }) => {
                self.errors.merge_server(errors);
                self.status.error(message);
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "failed to create staff member");
                self.status.error(format!("Failed to add staff: {e}"));
                Ok(None)
            }
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<StaffAction>> {
        match key.code {
            KeyCode::Char(c) => match self.focus_index {
                FIELD_NAME => self.name.push(c),
                FIELD_EMAIL => self.email.push(c),
                FIELD_PHONE => self.phone.push(c),
                _ => {}
            },
            KeyCode::Backspace => match self.focus_index {
                FIELD_NAME => {
                    self.name.pop();
                }
                FIELD_EMAIL => {
                    self.email.pop();
                }
                FIELD_PHONE => {
                    self.phone.pop();
                }
                _ => {}
            },
            KeyCode::Left if self.focus_index == FIELD_ROLE => {
                self.role_index = (self.role_index + ROLES.len() - 1) % ROLES.len();
            }
            KeyCode::Right if self.focus_index == FIELD_ROLE => {
                self.role_index = (self.role_index + 1) % ROLES.len();
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus_index = (self.focus_index + 1) % FIELD_COUNT;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_index = (self.focus_index + FIELD_COUNT - 1) % FIELD_COUNT;
            }
            KeyCode::Esc => return Ok(Some(StaffAction::BackToList)),
            KeyCode::Enter => match self.focus_index {
                FIELD_BACK => return Ok(Some(StaffAction::BackToList)),
                FIELD_SUBMIT => return self.submit(),
                _ => self.focus_index = (self.focus_index + 1) % FIELD_COUNT,
            },
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
                Constraint::Length(3),  // Header
                Constraint::Length(4),  // Name
                Constraint::Length(4),  // Email
                Constraint::Length(3),  // Role
                Constraint::Length(3),  // Phone
                Constraint::Length(1),  // Status
                Constraint::Length(1),  // Submit
                Constraint::Length(1),  // Back
                Constraint::Length(2),  // Help
                Constraint::Min(0),
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], "ADD STAFF MEMBER");

        let inset = |area: Rect| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(20),
                    Constraint::Percentage(60),
                    Constraint::Percentage(20),
                ])
                .split(area)[1]
        };

        let (name_area, name_err) = split_field(inset(layout[1]));
        render_input(frame, name_area, "Name*", &self.name, self.focus_index == FIELD_NAME);
        render_field_error(frame, name_err, self.errors.first("name"));

        let (email_area, email_err) = split_field(inset(layout[2]));
        render_input(frame, email_area, "Email*", &self.email, self.focus_index == FIELD_EMAIL);
        render_field_error(frame, email_err, self.errors.first("email"));

        render_input(
            frame,
            inset(layout[3]),
            "Role (\u{2190}/\u{2192})",
            &ROLES[self.role_index].to_string(),
            self.focus_index == FIELD_ROLE,
        );
        render_input(frame, inset(layout[4]), "Phone", &self.phone, self.focus_index == FIELD_PHONE);

        self.status.render(frame, layout[5]);

        let submit = Paragraph::new(Span::styled(
            if self.focus_index == FIELD_SUBMIT {
                "\u{25ba} Add Member \u{25c4}"
            } else {
                "  Add Member  "
            },
            Style::default()
                .fg(if self.focus_index == FIELD_SUBMIT {
                    palette::SUCCESS
                } else {
                    palette::TEXT_DIM
                })
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(submit, layout[6]);

        let back = Paragraph::new(Span::styled(
            if self.focus_index == FIELD_BACK {
                "\u{25ba} Back \u{25c4}"
            } else {
                "  Back  "
            },
            Style::default()
                .fg(if self.focus_index == FIELD_BACK {
                    palette::INFO
                } else {
                    palette::TEXT_DIM
                })
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(back, layout[7]);

        render_help(
            frame,
            layout[8],
            "Tab/\u{2191}\u{2193}: Fields | \u{2190}\u{2192}: Role | Enter: Save | Esc: Back",
        );
    }
}

fn split_field(area: Rect) -> (Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);
    (rows[0], rows[1])
}
