//! Home screen: greeting, tenant context, and the navigation menu.
//!
//! The menu is the routing surface. Which entries appear depends on the
//! logged-in role: staff see the full clinic suite, patients see the
//! portal subset, pharmacies see prescriptions and their profile.

use crate::app::SelectedPage;
use crate::components::{centered_rect, palette, Component};
use crate::models::{Role, User};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Padding, Paragraph},
};

pub struct Home {
    user: Option<User>,
    business_name: Option<String>,
    entries: Vec<(&'static str, SelectedPage)>,
    list_state: ListState,
    show_logout_dialog: bool,
    logout_dialog_selected: usize,
}

/// Menu entries visible to a role, in display order.
fn entries_for(role: Role) -> Vec<(&'static str, SelectedPage)> {
    if role.is_staff() {
        return vec![
            ("Patients", SelectedPage::Patients),
            ("Appointments", SelectedPage::Appointments),
            ("Calendar", SelectedPage::Calendar),
            ("Medical Records", SelectedPage::MedicalRecords),
            ("Billing", SelectedPage::Billing),
            ("Messages", SelectedPage::Messages),
            ("Telehealth", SelectedPage::Telehealth),
            ("Staff", SelectedPage::Staff),
            ("Patient Invitations", SelectedPage::Invitations),
            ("Profile", SelectedPage::Profile),
        ];
    }
    match role {
        Role::Patient => vec![
            ("My Appointments", SelectedPage::Appointments),
            ("My Records", SelectedPage::MedicalRecords),
            ("Messages", SelectedPage::Messages),
            ("Telehealth", SelectedPage::Telehealth),
            ("Profile", SelectedPage::Profile),
        ],
        _ => vec![
            ("Prescriptions", SelectedPage::MedicalRecords),
            ("Messages", SelectedPage::Messages),
            ("Profile", SelectedPage::Profile),
        ],
    }
}

impl Home {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            user: None,
            business_name: None,
            entries: Vec::new(),
            list_state,
            show_logout_dialog: false,
            logout_dialog_selected: 0,
        }
    }

    /// Installs the logged-in user and rebuilds the menu for their role.
    pub fn set_user(&mut self, user: User, business_name: Option<String>) {
        self.entries = entries_for(user.role);
        self.user = Some(user);
        self.business_name = business_name;
        self.list_state.select(Some(0));
    }

    fn select_next(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % len);
        self.list_state.select(Some(i));
    }

    fn select_previous(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + len - 1) % len);
        self.list_state.select(Some(i));
    }

    fn handle_logout_dialog_input(&mut self, key: KeyEvent) -> Result<Option<SelectedPage>> {
        match key.code {
            KeyCode::Left | KeyCode::Right => {
                self.logout_dialog_selected = 1 - self.logout_dialog_selected;
            }
            KeyCode::Enter => {
                self.show_logout_dialog = false;
                if self.logout_dialog_selected == 0 {
                    return Ok(Some(SelectedPage::Logout));
                }
            }
            KeyCode::Esc => self.show_logout_dialog = false,
            _ => {}
        }
        Ok(None)
    }
}

impl Component for Home {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        if self.show_logout_dialog {
            return self.handle_logout_dialog_input(event);
        }

        match event.code {
            KeyCode::Down | KeyCode::Tab => self.select_next(),
            KeyCode::Up => self.select_previous(),
            KeyCode::Enter => {
                if let Some(i) = self.list_state.selected() {
                    if let Some((_, page)) = self.entries.get(i) {
                        return Ok(Some(*page));
                    }
                }
            }
            KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Esc => {
                self.show_logout_dialog = true;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame) {
        crate::components::fill_background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Greeting
                Constraint::Min(10),   // Menu
                Constraint::Length(2), // Help
            ])
            .margin(1)
            .split(frame.area());

        let greeting = match (&self.user, &self.business_name) {
            (Some(user), Some(business)) => {
                format!("Welcome, {} ({}) \u{2014} {}", user.name, user.role, business)
            }
            (Some(user), None) => format!("Welcome, {} ({})", user.name, user.role),
            _ => "Welcome".to_string(),
        };
        let header = Paragraph::new(greeting)
            .style(
                Style::default()
                    .fg(palette::TEXT)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(palette::BORDER)),
            );
        frame.render_widget(header, layout[0]);

        let menu_area = centered_rect(50, 90, layout[1]);
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|(label, _)| ListItem::new(Line::from(*label)))
            .collect();
        let menu = List::new(items)
            .block(
                Block::default()
                    .title(" Navigate ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette::BORDER))
                    .padding(Padding::horizontal(2))
                    .style(Style::default().bg(palette::PANEL)),
            )
            .style(Style::default().fg(palette::TEXT))
            .highlight_style(
                Style::default()
                    .fg(palette::FOCUS)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("\u{25ba} ");
        let mut list_state = self.list_state.clone();
        frame.render_stateful_widget(menu, menu_area, &mut list_state);

        let help = Paragraph::new("\u{2191}\u{2193}: Navigate | Enter: Open | L/Esc: Log out | Ctrl+Q: Quit")
            .style(Style::default().fg(palette::TEXT_DIM))
            .alignment(Alignment::Center);
        frame.render_widget(help, layout[2]);

        if self.show_logout_dialog {
            let dialog_area = centered_rect(60, 20, frame.area());
            let dialog = Paragraph::new(vec![
                Line::from("Log out of EHReezy?"),
                Line::from(""),
                Line::from(vec![
                    Span::styled(
                        " Yes ",
                        Style::default().fg(if self.logout_dialog_selected == 0 {
                            Color::Green
                        } else {
                            Color::DarkGray
                        }),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        " No ",
                        Style::default().fg(if self.logout_dialog_selected == 1 {
                            Color::Red
                        } else {
                            Color::DarkGray
                        }),
                    ),
                ]),
            ])
            .block(
                Block::default()
                    .title("Confirm Logout")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            )
            .alignment(Alignment::Center);
            frame.render_widget(Clear, dialog_area);
            frame.render_widget(dialog, dialog_area);
        }
    }
}
