//! Patient portal invitations: send, resend and cancel.

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::app::SelectedPage;
use crate::components::{palette, render_header, render_help, Component, StatusMessage};
use crate::models::{Invitation, InvitationStatus};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::warn;

pub struct Invitations {
    api: ApiClient,
    invitations: Vec<Invitation>,
    table_state: TableState,
    email_input: Option<String>,
    status: StatusMessage,
}

impl Invitations {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            invitations: Vec::new(),
            table_state: TableState::default(),
            email_input: None,
            status: StatusMessage::default(),
        }
    }

    pub fn refresh(&mut self) -> ApiResult<()> {
        match self.api.list_invitations() {
            Ok(invitations) => {
                self.invitations = invitations;
                if self.table_state.selected().is_none() && !self.invitations.is_empty() {
                    self.table_state.select(Some(0));
                }
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch invitations");
                self.status
                    .error(format!("Failed to load invitations: {e}"));
                Ok(())
            }
        }
    }

    fn selected(&self) -> Option<&Invitation> {
        self.table_state
            .selected()
            .and_then(|i| self.invitations.get(i))
    }

    fn move_selection(&mut self, delta: i64) {
        if self.invitations.is_empty() {
            return;
        }
        let len = self.invitations.len() as i64;
        let current = self.table_state.selected().unwrap_or(0) as i64;
        self.table_state
            .select(Some(((current + delta).rem_euclid(len)) as usize));
    }

    fn send(&mut self, email: &str) -> Result<Option<SelectedPage>> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            self.status.error("Enter a valid email address.");
            return Ok(None);
        }
        match self.api.send_invitation(email) {
            Ok(invitation) => {
                self.status
                    .success(format!("Invitation sent to {}.", invitation.email));
                self.invitations.insert(0, invitation);
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
            Err(ApiError::Validation { message, .. }) => {
                self.status.error(message);
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "failed to send invitation");
                self.status.error(format!("Failed to send invitation: {e}"));
                Ok(None)
            }
        }
    }

    fn resend(&mut self) -> Result<Option<SelectedPage>> {
        let Some(invitation) = self.selected() else {
            return Ok(None);
        };
        if invitation.status != InvitationStatus::Sent
            && invitation.status != InvitationStatus::Expired
        {
            self.status.info("Only pending invitations can be resent.");
            return Ok(None);
        }
        let id = invitation.id;
        match self.api.resend_invitation(id) {
            Ok(updated) => {
                self.status
                    .success(format!("Invitation resent to {}.", updated.email));
                if let Some(row) = self.invitations.iter_mut().find(|i| i.id == id) {
                    *row = updated;
                }
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
            Err(e) => {
                warn!(error = %e, id, "failed to resend invitation");
                self.status.error(format!("Failed to resend: {e}"));
                Ok(None)
            }
        }
    }

    fn cancel(&mut self) -> Result<Option<SelectedPage>> {
        let Some(invitation) = self.selected() else {
            return Ok(None);
        };
        if invitation.status != InvitationStatus::Sent {
            self.status.info("Only pending invitations can be cancelled.");
            return Ok(None);
        }
        let id = invitation.id;
        match self.api.cancel_invitation(id) {
            Ok(updated) => {
                self.status.success("Invitation cancelled.");
                if let Some(row) = self.invitations.iter_mut().find(|i| i.id == id) {
                    *row = updated;
                }
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
            Err(e) => {
                warn!(error = %e, id, "failed to cancel invitation");
                self.status.error(format!("Failed to cancel: {e}"));
                Ok(None)
            }
        }
    }
}

impl Component for Invitations {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        if let Some(mut input) = self.email_input.take() {
            match event.code {
                KeyCode::Char(c) => {
                    input.push(c);
                    self.email_input = Some(input);
                }
                KeyCode::Backspace => {
                    input.pop();
                    self.email_input = Some(input);
                }
                KeyCode::Enter => return self.send(&input),
                KeyCode::Esc => {}
                _ => self.email_input = Some(input),
            }
            return Ok(None);
        }

        match event.code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.email_input = Some(String::new());
            }
            KeyCode::Char('s') | KeyCode::Char('S') => return self.resend(),
            KeyCode::Char('c') | KeyCode::Char('C') => return self.cancel(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Err(e) = self.refresh() {
                    if e.is_unauthorized() {
                        return Ok(Some(SelectedPage::Logout));
                    }
                }
            }
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc => {
                return Ok(Some(SelectedPage::None))
            }
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
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], "PATIENT INVITATIONS");

        let rows: Vec<Row> = self
            .invitations
            .iter()
            .map(|i| {
                let status_style = match i.status {
                    InvitationStatus::Registered => Style::default().fg(palette::SUCCESS),
                    InvitationStatus::Cancelled | InvitationStatus::Expired => {
                        Style::default().fg(palette::TEXT_DIM)
                    }
                    InvitationStatus::Sent => Style::default().fg(palette::INFO),
                };
                Row::new(vec![
                    Cell::from(i.email.clone()),
                    Cell::from(i.patient_name.clone().unwrap_or_default()),
                    Cell::from(i.sent_on.to_string()),
                    Cell::from(Span::styled(i.status.to_string(), status_style)),
                ])
                .style(Style::default().fg(palette::TEXT))
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(35),
                Constraint::Percentage(30),
                Constraint::Length(12),
                Constraint::Length(12),
            ],
        )
        .header(
            Row::new(vec!["Email", "Patient", "Sent", "Status"])
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
                .title(" Invitations ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette::BORDER))
                .style(Style::default().bg(palette::PANEL)),
        );
        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, layout[1], &mut state);

        if let Some(input) = &self.email_input {
            self.render_email_popup(frame, input);
        }

        self.status.render(frame, layout[2]);
        render_help(
            frame,
            layout[3],
            "\u{2191}\u{2193}: Select | N: New | S: Resend | C: Cancel | R: Refresh | B: Back",
        );
    }
}

impl Invitations {
    fn render_email_popup(&self, frame: &mut Frame, input: &str) {
        let area = crate::components::centered_rect(40, 18, frame.area());
        frame.render_widget(Clear, area);
        let text = vec![
            Line::from(Span::styled(
                "Invite a patient to the portal",
                Style::default().fg(palette::TEXT),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Email: ", Style::default().fg(palette::TEXT_DIM)),
                Span::styled(
                    format!("{input}\u{2588}"),
                    Style::default().fg(palette::FOCUS),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter: Send | Esc: Cancel",
                Style::default().fg(palette::TEXT_DIM),
            )),
        ];
        let popup = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(" Send Invitation ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette::FOCUS))
                    .style(Style::default().bg(palette::PANEL)),
            );
        frame.render_widget(popup, area);
    }
}
