//! In-call screen: a terminal stand-in for the video surface with
//! mic/camera toggles and a running call timer.

use crate::components::clinic::telehealth::TelehealthAction;
use crate::components::{palette, render_help};
use crate::models::TelehealthSession;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use std::time::Instant;

pub struct VideoCall {
    session: TelehealthSession,
    joined_at: Instant,
    mic_on: bool,
    camera_on: bool,
}

impl VideoCall {
    pub fn new(session: TelehealthSession) -> Self {
        Self {
            session,
            joined_at: Instant::now(),
            mic_on: true,
            camera_on: true,
        }
    }

    fn elapsed_label(&self) -> String {
        let secs = self.joined_at.elapsed().as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<TelehealthAction>> {
        match key.code {
            KeyCode::Char('m') | KeyCode::Char('M') => self.mic_on = !self.mic_on,
            KeyCode::Char('c') | KeyCode::Char('C') => self.camera_on = !self.camera_on,
            KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Esc => {
                return Ok(Some(TelehealthAction::LeaveCall))
            }
            _ => {}
        }
        Ok(None)
    }

    // The timer redraws on the regular tick; no state to advance.
    pub fn tick(&mut self) {}

    pub fn render(&self, frame: &mut Frame) {
        crate::components::fill_background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Timer
                Constraint::Min(10),   // Video area
                Constraint::Length(3), // Controls
                Constraint::Length(2), // Help
            ])
            .margin(1)
            .split(frame.area());

        let timer = Paragraph::new(Line::from(vec![
            Span::styled(
                "\u{25cf} LIVE ",
                Style::default().fg(palette::ERROR).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.elapsed_label(),
                Style::default().fg(palette::TEXT).add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(timer, layout[0]);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(layout[1]);

        let remote = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("\u{1f464} {}", self.session.patient_name),
                Style::default().fg(palette::TEXT).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Connected",
                Style::default().fg(palette::SUCCESS),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(" Patient ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette::BORDER))
                .style(Style::default().bg(palette::PANEL)),
        );
        frame.render_widget(remote, panes[0]);

        let self_view = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("\u{1f464} {}", self.session.staff_name),
                Style::default().fg(palette::TEXT),
            )),
            Line::from(Span::styled(
                if self.camera_on { "Camera on" } else { "Camera off" },
                Style::default().fg(if self.camera_on {
                    palette::SUCCESS
                } else {
                    palette::TEXT_DIM
                }),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(" You ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette::BORDER))
                .style(Style::default().bg(palette::PANEL)),
        );
        frame.render_widget(self_view, panes[1]);

        let control = |label: &str, on: bool| {
            Span::styled(
                format!("  {label}: {}  ", if on { "On" } else { "Off" }),
                Style::default()
                    .fg(if on { palette::SUCCESS } else { palette::ERROR })
                    .add_modifier(Modifier::BOLD),
            )
        };
        let controls = Paragraph::new(Line::from(vec![
            control("Mic", self.mic_on),
            control("Camera", self.camera_on),
            Span::styled(
                "  End Call (E)  ",
                Style::default().fg(palette::ERROR).add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette::BORDER)),
        );
        frame.render_widget(controls, layout[2]);

        render_help(
            frame,
            layout[3],
            "M: Toggle Mic | C: Toggle Camera | E/Esc: End Call",
        );
    }
}
