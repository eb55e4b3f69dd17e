//! Secure messaging: thread list on the left, the open conversation on
//! the right, with a single-line composer underneath.

use crate::api::{ApiClient, ApiResult};
use crate::app::SelectedPage;
use crate::components::{palette, render_header, render_help, Component, StatusMessage};
use crate::models::{Message, MessageThread};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Threads,
    Compose,
}

pub struct Messages {
    api: ApiClient,
    threads: Vec<MessageThread>,
    thread_state: ListState,
    conversation: Vec<Message>,
    open_thread: Option<u64>,
    pane: Pane,
    draft: String,
    status: StatusMessage,
}

impl Messages {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            threads: Vec::new(),
            thread_state: ListState::default(),
            conversation: Vec::new(),
            open_thread: None,
            pane: Pane::Threads,
            draft: String::new(),
            status: StatusMessage::default(),
        }
    }

    pub fn refresh(&mut self) -> ApiResult<()> {
        match self.api.list_threads() {
            Ok(threads) => {
                self.threads = threads;
                if self.thread_state.selected().is_none() && !self.threads.is_empty() {
                    self.thread_state.select(Some(0));
                }
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch message threads");
                self.status.error(format!("Failed to load messages: {e}"));
                Ok(())
            }
        }
    }

    fn open_selected(&mut self) -> ApiResult<()> {
        let Some(thread) = self
            .thread_state
            .selected()
            .and_then(|i| self.threads.get(i))
        else {
            return Ok(());
        };
        let thread_id = thread.id;
        match self.api.list_messages(thread_id) {
            Ok(messages) => {
                self.conversation = messages;
                self.open_thread = Some(thread_id);
                // Reading a thread clears its badge locally; the server
                // does the same on fetch.
                if let Some(t) = self.threads.iter_mut().find(|t| t.id == thread_id) {
                    t.unread_count = 0;
                }
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, thread_id, "failed to fetch conversation");
                self.status
                    .error(format!("Failed to load conversation: {e}"));
                Ok(())
            }
        }
    }

    fn send(&mut self) -> Result<Option<SelectedPage>> {
        let Some(thread_id) = self.open_thread else {
            self.status.error("Open a thread before sending.");
            return Ok(None);
        };
        let body = self.draft.trim().to_string();
        if body.is_empty() {
            return Ok(None);
        }
        match self.api.send_message(thread_id, &body) {
            Ok(message) => {
                self.conversation.push(message);
                self.draft.clear();
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
            Err(e) => {
                warn!(error = %e, thread_id, "failed to send message");
                self.status.error(format!("Failed to send: {e}"));
                Ok(None)
            }
        }
    }

    fn move_thread(&mut self, delta: i64) {
        if self.threads.is_empty() {
            return;
        }
        let len = self.threads.len() as i64;
        let current = self.thread_state.selected().unwrap_or(0) as i64;
        self.thread_state
            .select(Some(((current + delta).rem_euclid(len)) as usize));
    }
}

impl Component for Messages {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        match self.pane {
            Pane::Threads => match event.code {
                KeyCode::Up => self.move_thread(-1),
                KeyCode::Down => self.move_thread(1),
                KeyCode::Enter => {
                    if let Err(e) = self.open_selected() {
                        if e.is_unauthorized() {
                            return Ok(Some(SelectedPage::Logout));
                        }
                    }
                }
                KeyCode::Tab | KeyCode::Char('c') | KeyCode::Char('C') => {
                    if self.open_thread.is_some() {
                        self.pane = Pane::Compose;
                    }
                }
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
            },
            Pane::Compose => match event.code {
                KeyCode::Char(c) => self.draft.push(c),
                KeyCode::Backspace => {
                    self.draft.pop();
                }
                KeyCode::Enter => return self.send(),
                KeyCode::Tab | KeyCode::Esc => self.pane = Pane::Threads,
                _ => {}
            },
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
                Constraint::Min(10),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], "MESSAGES");

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(layout[1]);

        self.render_threads(frame, panes[0]);
        self.render_conversation(frame, panes[1]);

        self.status.render(frame, layout[2]);
        let help = match self.pane {
            Pane::Threads => {
                "\u{2191}\u{2193}: Select | Enter: Open | C: Compose | R: Refresh | B: Back"
            }
            Pane::Compose => "Enter: Send | Esc: Threads",
        };
        render_help(frame, layout[3], help);
    }
}

impl Messages {
    fn render_threads(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .threads
            .iter()
            .map(|t| {
                let mut spans = vec![Span::styled(
                    t.participant_name.clone(),
                    Style::default().fg(palette::TEXT).add_modifier(Modifier::BOLD),
                )];
                if t.unread_count > 0 {
                    spans.push(Span::styled(
                        format!(" ({})", t.unread_count),
                        Style::default().fg(palette::FOCUS).add_modifier(Modifier::BOLD),
                    ));
                }
                let lines = vec![
                    Line::from(spans),
                    Line::from(Span::styled(
                        format!("  {}", t.subject),
                        Style::default().fg(palette::TEXT_DIM),
                    )),
                ];
                ListItem::new(lines)
            })
            .collect();

        let focused = self.pane == Pane::Threads;
        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Threads ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(if focused {
                        palette::FOCUS
                    } else {
                        palette::BORDER
                    }))
                    .style(Style::default().bg(palette::PANEL)),
            )
            .highlight_style(
                Style::default()
                    .fg(palette::FOCUS)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("\u{25ba} ");
        let mut state = self.thread_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_conversation(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(7), Constraint::Length(3)])
            .split(area);

        let title = self
            .open_thread
            .and_then(|id| self.threads.iter().find(|t| t.id == id))
            .map(|t| format!(" {} ", t.subject))
            .unwrap_or_else(|| " Conversation ".to_string());

        let items: Vec<ListItem> = self
            .conversation
            .iter()
            .map(|m| {
                let name_style = if m.is_mine {
                    Style::default().fg(palette::SUCCESS).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette::INFO).add_modifier(Modifier::BOLD)
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(m.sender_name.clone(), name_style),
                        Span::styled(
                            format!("  {}", m.sent_at),
                            Style::default().fg(palette::TEXT_DIM),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!("  {}", m.body),
                        Style::default().fg(palette::TEXT),
                    )),
                ])
            })
            .collect();
        let conversation = if items.is_empty() {
            List::new(vec![ListItem::new(Span::styled(
                "Select a thread to read messages.",
                Style::default().fg(palette::TEXT_DIM),
            ))])
        } else {
            List::new(items)
        };
        frame.render_widget(
            conversation.block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette::BORDER))
                    .style(Style::default().bg(palette::PANEL)),
            ),
            rows[0],
        );

        let composing = self.pane == Pane::Compose;
        let draft = Paragraph::new(if composing {
            format!("{}\u{2588}", self.draft)
        } else {
            self.draft.clone()
        })
        .style(Style::default().fg(palette::TEXT))
        .block(
            Block::default()
                .title(" New Message ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(if composing {
                    palette::FOCUS
                } else {
                    palette::BORDER_IDLE
                }))
                .style(Style::default().bg(palette::INPUT_BG)),
        );
        frame.render_widget(draft, rows[1]);
    }
}
