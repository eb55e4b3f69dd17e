//! Login screen for the EHReezy client.

use crate::components::{centered_rect, palette, render_input, Component};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::time::{Duration, Instant};

const FIELD_EMAIL: usize = 0;
const FIELD_PASSWORD: usize = 1;
const FIELD_REGISTER: usize = 2;
const FIELD_EXIT: usize = 3;

/// Credential form. Submission itself happens in `App`, which calls the
/// API and either stores the session or pushes an error back in here.
#[derive(Debug, Default)]
pub struct Login {
    pub email: String,
    pub password: String,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub selected_index: usize,
    pub show_exit_dialog: bool,
    pub exit_dialog_selected: usize,
    message_time: Option<Instant>,
}

impl Login {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_messages(&mut self) {
        self.error_message = None;
        self.success_message = None;
        self.message_time = None;
    }

    pub fn set_error_message(&mut self, message: String) {
        self.error_message = Some(message);
        self.success_message = None;
        self.message_time = Some(Instant::now());
    }

    /// Shown after registration ("Registration successful! Please log
    /// in.") or a forced logout.
    pub fn set_success_message(&mut self, message: String) {
        self.success_message = Some(message);
        self.error_message = None;
        self.message_time = Some(Instant::now());
    }

    pub fn check_message_timeout(&mut self) {
        if let Some(time) = self.message_time {
            if time.elapsed() >= Duration::from_secs(5) {
                self.clear_messages();
            }
        }
    }
}

impl Component for Login {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<crate::app::SelectedPage>> {
        if self.show_exit_dialog {
            match event.code {
                KeyCode::Left | KeyCode::Right => {
                    self.exit_dialog_selected = 1 - self.exit_dialog_selected;
                }
                KeyCode::Enter => {
                    if self.exit_dialog_selected == 0 {
                        return Ok(Some(crate::app::SelectedPage::Quit));
                    }
                    self.show_exit_dialog = false;
                }
                KeyCode::Esc => self.show_exit_dialog = false,
                _ => {}
            }
            return Ok(None);
        }

        match event.code {
            KeyCode::Char(c) => {
                match self.selected_index {
                    FIELD_EMAIL => self.email.push(c),
                    FIELD_PASSWORD => self.password.push(c),
                    _ => {}
                }
                self.clear_messages();
            }
            KeyCode::Backspace => {
                match self.selected_index {
                    FIELD_EMAIL => {
                        self.email.pop();
                    }
                    FIELD_PASSWORD => {
                        self.password.pop();
                    }
                    _ => {}
                }
                self.clear_messages();
            }
            KeyCode::Tab | KeyCode::Down => {
                self.selected_index = (self.selected_index + 1) % 4;
            }
            KeyCode::Up => {
                self.selected_index = (self.selected_index + 3) % 4;
            }
            KeyCode::Enter => match self.selected_index {
                FIELD_REGISTER => return Ok(Some(crate::app::SelectedPage::Register)),
                FIELD_EXIT => self.show_exit_dialog = true,
                _ => {
                    if self.email.is_empty() {
                        self.set_error_message("Email cannot be empty.".to_string());
                        return Ok(None);
                    }
                    if self.password.is_empty() {
                        self.set_error_message("Password cannot be empty.".to_string());
                        return Ok(None);
                    }
                    // Signal the login attempt.
                    return Ok(Some(crate::app::SelectedPage::None));
                }
            },
            KeyCode::Esc => self.show_exit_dialog = true,
            _ => {}
        }
        Ok(None)
    }

    fn tick(&mut self) {
        self.check_message_timeout();
    }

    fn render(&self, frame: &mut Frame) {
        crate::components::fill_background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Title
                Constraint::Length(1), // Slogan
                Constraint::Length(2),
                Constraint::Length(1), // "Sign in"
                Constraint::Length(1),
                Constraint::Length(3), // Email
                Constraint::Length(3), // Password
                Constraint::Length(3), // Message
                Constraint::Length(1), // Register link
                Constraint::Length(2),
                Constraint::Length(1), // Exit
                Constraint::Min(0),
            ])
            .margin(1)
            .split(frame.area());

        let title = Paragraph::new(Text::from(vec![
            Line::from("β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—β–ˆβ–ˆβ•—  β–ˆβ–ˆβ•—β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•— β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—β–ˆβ–ˆβ•—   β–ˆβ–ˆβ•—"),
            Line::from("β–ˆβ–ˆβ•”β•β•β•β•β•β–ˆβ–ˆβ•‘  β–ˆβ–ˆβ•‘β–ˆβ–ˆβ•”β•β•β–ˆβ–ˆβ•—β–ˆβ–ˆβ•”β•β•β•β•β•β–ˆβ–ˆβ•”β•β•β•β•β•β•šβ•β•β•β–ˆβ–ˆβ•”β•β•šβ•β•β•β–ˆβ–ˆβ•”β•β•šβ–ˆβ–ˆβ•— β–ˆβ–ˆβ•”β•"),
            Line::from("β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—  β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•‘β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•”β•β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—  β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—    β–ˆβ–ˆβ•”β•    β–ˆβ–ˆβ•”β•  β•šβ–ˆβ–ˆβ–ˆβ–ˆβ•”β• "),
            Line::from("β–ˆβ–ˆβ•”β•β•β•  β–ˆβ–ˆβ•”β•β•β–ˆβ–ˆβ•‘β–ˆβ–ˆβ•”β•β•β–ˆβ–ˆβ•—β–ˆβ–ˆβ•”β•β•β•  β–ˆβ–ˆβ•”β•β•β•   β–ˆβ–ˆβ•”β•    β–ˆβ–ˆβ•”β•    β•šβ–ˆβ–ˆβ•”β•  "),
            Line::from("β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—β–ˆβ–ˆβ•‘  β–ˆβ–ˆβ•‘β–ˆβ–ˆβ•‘  β–ˆβ–ˆβ•‘β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•—β–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ–ˆβ•— β–ˆβ–ˆβ•‘   "),
            Line::from("β•šβ•β•β•β•β•β•β•β•šβ•β•  β•šβ•β•β•šβ•β•  β•šβ•β•β•šβ•β•β•β•β•β•β•β•šβ•β•β•β•β•β•β•β•šβ•β•β•β•β•β•β•β•šβ•β•β•β•β•β•β• β•šβ•β•   "),
        ]))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan));
        frame.render_widget(title, layout[0]);

        let slogan = Paragraph::new(Span::styled(
            "Care, scheduling and billing in one place",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(slogan, layout[1]);

        let subtitle = Paragraph::new(Span::styled(
            "Sign in to EHReezy",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(subtitle, layout[3]);

        let quarter = frame.area().width / 4;
        let field_area = |area: Rect| area.inner(Margin {
            vertical: 0,
            horizontal: quarter,
        });

        render_input(
            frame,
            field_area(layout[5]),
            "Email",
            &self.email,
            self.selected_index == FIELD_EMAIL,
        );
        render_input(
            frame,
            field_area(layout[6]),
            "Password",
            &"\u{2022}".repeat(self.password.len()),
            self.selected_index == FIELD_PASSWORD,
        );

        if let Some(error) = &self.error_message {
            let paragraph = Paragraph::new(error.as_str())
                .style(Style::default().fg(palette::ERROR))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, layout[7]);
        } else if let Some(success) = &self.success_message {
            let paragraph = Paragraph::new(success.as_str())
                .style(Style::default().fg(palette::SUCCESS))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, layout[7]);
        }

        let register = Paragraph::new(Span::styled(
            "New practice? Register",
            Style::default()
                .fg(if self.selected_index == FIELD_REGISTER {
                    palette::FOCUS
                } else {
                    Color::Gray
                })
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(register, layout[8]);

        let exit = Paragraph::new(Span::styled(
            "Exit",
            Style::default()
                .fg(if self.selected_index == FIELD_EXIT {
                    Color::Yellow
                } else {
                    Color::Gray
                })
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(exit, layout[10]);

        if self.show_exit_dialog {
            let dialog_area = centered_rect(60, 20, frame.area());
            let dialog_block = Block::default()
                .title("Confirm Exit")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded);

            let text = vec![
                Line::from("Are you sure you want to quit?"),
                Line::from(""),
                Line::from(vec![
                    Span::styled(
                        " Yes ",
                        Style::default().fg(if self.exit_dialog_selected == 0 {
                            Color::Green
                        } else {
                            Color::DarkGray
                        }),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        " No ",
                        Style::default().fg(if self.exit_dialog_selected == 1 {
                            Color::Red
                        } else {
                            Color::DarkGray
                        }),
                    ),
                ]),
            ];

            let dialog = Paragraph::new(text)
                .block(dialog_block)
                .alignment(Alignment::Center);

            frame.render_widget(Clear, dialog_area);
            frame.render_widget(dialog, dialog_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn renders_credentials_inside_the_inset_fields() {
        let mut login = Login::new();
        login.email = "drlee@ehreezy.com".to_string();

        let mut terminal = Terminal::new(TestBackend::new(100, 35)).unwrap();
        terminal.draw(|frame| login.render(frame)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("drlee@ehreezy.com"));
    }
}
