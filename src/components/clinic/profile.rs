//! Account profile: name and email edits pushed to `PUT /auth/me`.

use crate::api::{ApiClient, ApiError, ProfileUpdate};
use crate::app::SelectedPage;
use crate::components::{
    palette, render_field_error, render_header, render_help, render_input, Component,
    StatusMessage,
};
use crate::models::User;
use crate::tui::Frame;
use crate::validate::FieldErrors;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::warn;

const FIELD_NAME: usize = 0;
const FIELD_EMAIL: usize = 1;
const FIELD_SUBMIT: usize = 2;
const FIELD_BACK: usize = 3;
const FIELD_COUNT: usize = 4;

pub struct Profile {
    api: ApiClient,
    user: User,
    name: String,
    email: String,
    focus_index: usize,
    errors: FieldErrors,
    status: StatusMessage,
    updated: Option<User>,
}

impl Profile {
    pub fn new(api: ApiClient, user: User) -> Self {
        let name = user.name.clone();
        let email = user.email.clone();
        Self {
            api,
            user,
            name,
            email,
            focus_index: 0,
            errors: FieldErrors::default(),
            status: StatusMessage::default(),
            updated: None,
        }
    }

    /// Hands the server-confirmed account to the app after a successful
    /// save, so the session and its on-disk copy pick up the change.
    pub fn take_updated(&mut self) -> Option<User> {
        self.updated.take()
    }

    /// Resets edits back to the saved account values.
    pub fn open(&mut self) {
        self.name = self.user.name.clone();
        self.email = self.user.email.clone();
        self.focus_index = 0;
        self.errors = FieldErrors::default();
        self.status = StatusMessage::default();
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

    fn submit(&mut self) -> Result<Option<SelectedPage>> {
        if !self.validate() {
            return Ok(None);
        }
        let update = ProfileUpdate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        };
        match self.api.update_profile(&update) {
            Ok(user) => {
                self.user = user.clone();
                self.updated = Some(user);
                self.open();
                self.status.success("Profile updated.");
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
            Err(ApiError::Validation { message, errors }) => {
                self.errors.merge_server(errors);
                self.status.error(message);
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "failed to update profile");
                self.status.error(format!("Failed to update profile: {e}"));
                Ok(None)
            }
        }
    }
}

impl Component for Profile {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        match event.code {
            KeyCode::Char(c) => match self.focus_index {
                FIELD_NAME => self.name.push(c),
                FIELD_EMAIL => self.email.push(c),
                _ => {}
            },
            KeyCode::Backspace => match self.focus_index {
                FIELD_NAME => {
                    self.name.pop();
                }
                FIELD_EMAIL => {
                    self.email.pop();
                }
                _ => {}
            },
            KeyCode::Tab | KeyCode::Down => {
                self.focus_index = (self.focus_index + 1) % FIELD_COUNT;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_index = (self.focus_index + FIELD_COUNT - 1) % FIELD_COUNT;
            }
            KeyCode::Esc => return Ok(Some(SelectedPage::None)),
            KeyCode::Enter => match self.focus_index {
                FIELD_BACK => return Ok(Some(SelectedPage::None)),
                FIELD_SUBMIT => return self.submit(),
                _ => self.focus_index = (self.focus_index + 1) % FIELD_COUNT,
            },
            _ => {}
        }
        Ok(None)
    }

    fn tick(&mut self) {
        self.status.tick();
    }

    fn render(&self, frame: &mut Frame) {
        crate::components::fill_background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Header
                Constraint::Length(2),  // Account summary
                Constraint::Length(4),  // Name
                Constraint::Length(4),  // Email
                Constraint::Length(1),  // Status
                Constraint::Length(1),  // Submit
                Constraint::Length(1),  // Back
                Constraint::Length(2),  // Help
                Constraint::Min(0),
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], "MY PROFILE");

        let summary = Paragraph::new(Line::from(vec![
            Span::styled(
                self.user.name.clone(),
                Style::default().fg(palette::TEXT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", self.user.role),
                Style::default().fg(palette::INFO),
            ),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(summary, layout[1]);

        let inset = |area: Rect| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(25),
                    Constraint::Percentage(50),
                    Constraint::Percentage(25),
                ])
                .split(area)[1]
        };

        let (name_area, name_err) = split_field(inset(layout[2]));
        render_input(frame, name_area, "Name", &self.name, self.focus_index == FIELD_NAME);
        render_field_error(frame, name_err, self.errors.first("name"));

        let (email_area, email_err) = split_field(inset(layout[3]));
        render_input(frame, email_area, "Email", &self.email, self.focus_index == FIELD_EMAIL);
        render_field_error(frame, email_err, self.errors.first("email"));

        self.status.render(frame, layout[4]);

        let submit = Paragraph::new(Span::styled(
            if self.focus_index == FIELD_SUBMIT {
                "\u{25ba} Save Changes \u{25c4}"
            } else {
                "  Save Changes  "
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
        frame.render_widget(submit, layout[5]);

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
        frame.render_widget(back, layout[6]);

        render_help(
            frame,
            layout[7],
            "Tab/\u{2191}\u{2193}: Fields | Enter: Save | Esc: Back",
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
