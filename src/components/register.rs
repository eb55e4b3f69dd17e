//! Practice registration screen.

use crate::components::{palette, render_input, Component};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::Paragraph};
use std::time::{Duration, Instant};

const FIELD_NAME: usize = 0;
const FIELD_EMAIL: usize = 1;
const FIELD_PASSWORD: usize = 2;
const FIELD_CONFIRM: usize = 3;
const FIELD_BUSINESS: usize = 4;
const FIELD_SUBMIT: usize = 5;
const FIELD_BACK: usize = 6;
const FIELD_COUNT: usize = 7;

/// New-practice signup form. The actual API call happens in `App`; on
/// success `registration_success` is set and the app returns to the
/// login screen with a confirmation message.
#[derive(Debug, Default)]
pub struct Register {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub business_name: String,
    pub selected_index: usize,
    pub error_message: Option<String>,
    pub registration_success: bool,
    error_time: Option<Instant>,
}

impl Register {
    pub fn new() -> Self {
        Self::default()
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            FIELD_NAME => Some(&mut self.name),
            FIELD_EMAIL => Some(&mut self.email),
            FIELD_PASSWORD => Some(&mut self.password),
            FIELD_CONFIRM => Some(&mut self.confirm_password),
            FIELD_BUSINESS => Some(&mut self.business_name),
            _ => None,
        }
    }

    pub fn set_error_message(&mut self, message: String) {
        self.error_message = Some(message);
        self.error_time = Some(Instant::now());
    }

    fn clear_error(&mut self) {
        self.error_message = None;
        self.error_time = None;
    }

    pub fn check_error_timeout(&mut self) {
        if let Some(time) = self.error_time {
            if time.elapsed() >= Duration::from_secs(5) {
                self.clear_error();
            }
        }
    }

    /// Pre-submit checks; the server still validates everything again.
    fn validate(&mut self) -> bool {
        if self.name.is_empty() {
            self.set_error_message("Name cannot be empty.".to_string());
            return false;
        }
        if self.email.is_empty() || !self.email.contains('@') {
            self.set_error_message("A valid email is required.".to_string());
            return false;
        }
        if self.password.len() < 8 {
            self.set_error_message("Password must be at least 8 characters.".to_string());
            return false;
        }
        if self.password != self.confirm_password {
            self.set_error_message("Passwords do not match.".to_string());
            return false;
        }
        if self.business_name.is_empty() {
            self.set_error_message("Practice name cannot be empty.".to_string());
            return false;
        }
        true
    }
}

impl Component for Register {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<crate::app::SelectedPage>> {
        match event.code {
            KeyCode::Char(c) => {
                if let Some(field) = self.field_mut(self.selected_index) {
                    field.push(c);
                }
                self.clear_error();
            }
            KeyCode::Backspace => {
                if let Some(field) = self.field_mut(self.selected_index) {
                    field.pop();
                }
                self.clear_error();
            }
            KeyCode::Tab | KeyCode::Down => {
                self.selected_index = (self.selected_index + 1) % FIELD_COUNT;
            }
            KeyCode::Up => {
                self.selected_index = (self.selected_index + FIELD_COUNT - 1) % FIELD_COUNT;
            }
            KeyCode::Esc => return Ok(Some(crate::app::SelectedPage::None)),
            KeyCode::Enter => match self.selected_index {
                FIELD_BACK => return Ok(Some(crate::app::SelectedPage::None)),
                _ => {
                    if self.validate() {
                        // Signal the registration attempt.
                        return Ok(Some(crate::app::SelectedPage::Register));
                    }
                }
            },
            _ => {}
        }
        Ok(None)
    }

    fn tick(&mut self) {
        self.check_error_timeout();
    }

    fn render(&self, frame: &mut Frame) {
        crate::components::fill_background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1), // Title
                Constraint::Length(1),
                Constraint::Length(3), // Name
                Constraint::Length(3), // Email
                Constraint::Length(3), // Password
                Constraint::Length(3), // Confirm
                Constraint::Length(3), // Practice name
                Constraint::Length(2), // Error
                Constraint::Length(1), // Submit
                Constraint::Length(1), // Back
                Constraint::Min(0),
            ])
            .margin(1)
            .split(frame.area());

        let title = Paragraph::new(Span::styled(
            "Create your EHReezy practice account",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(title, layout[1]);

        let quarter = frame.area().width / 4;
        let field_area = |area: Rect| area.inner(Margin {
            vertical: 0,
            horizontal: quarter,
        });

        render_input(frame, field_area(layout[3]), "Your Name", &self.name, self.selected_index == FIELD_NAME);
        render_input(frame, field_area(layout[4]), "Email", &self.email, self.selected_index == FIELD_EMAIL);
        render_input(
            frame,
            field_area(layout[5]),
            "Password",
            &"\u{2022}".repeat(self.password.len()),
            self.selected_index == FIELD_PASSWORD,
        );
        render_input(
            frame,
            field_area(layout[6]),
            "Confirm Password",
            &"\u{2022}".repeat(self.confirm_password.len()),
            self.selected_index == FIELD_CONFIRM,
        );
        render_input(
            frame,
            field_area(layout[7]),
            "Practice Name",
            &self.business_name,
            self.selected_index == FIELD_BUSINESS,
        );

        if let Some(error) = &self.error_message {
            let paragraph = Paragraph::new(error.as_str())
                .style(Style::default().fg(palette::ERROR))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, layout[8]);
        }

        let submit = Paragraph::new(Span::styled(
            if self.selected_index == FIELD_SUBMIT {
                "\u{25ba} Create Account \u{25c4}"
            } else {
                "  Create Account  "
            },
            Style::default()
                .fg(if self.selected_index == FIELD_SUBMIT {
                    palette::SUCCESS
                } else {
                    Color::Gray
                })
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(submit, layout[9]);

        let back = Paragraph::new(Span::styled(
            "Back to Login",
            Style::default()
                .fg(if self.selected_index == FIELD_BACK {
                    palette::INFO
                } else {
                    Color::Gray
                })
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(back, layout[10]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn renders_the_signup_form_with_typed_values() {
        let mut register = Register::new();
        register.business_name = "Lakeside Family Clinic".to_string();

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| register.render(frame)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Lakeside Family Clinic"));
    }
}
