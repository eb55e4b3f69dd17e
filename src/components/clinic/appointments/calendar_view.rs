//! Month / week / day calendar over the appointment list.
//!
//! Every view change or navigation step refetches exactly the visible
//! date range, so the page never holds more appointments than it shows.

use crate::api::{ApiClient, ApiResult};
use crate::calendar::{self, CalendarView};
use crate::components::clinic::appointments::AppointmentAction;
use crate::components::{palette, render_header, render_help, StatusMessage};
use crate::models::Appointment;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{calendar::{CalendarEventStore, Monthly}, *},
};
use time::Date;
use tracing::warn;

pub struct CalendarPage {
    api: ApiClient,
    view: CalendarView,
    anchor: Date,
    appointments: Vec<Appointment>,
    status: StatusMessage,
}

impl CalendarPage {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            view: CalendarView::Month,
            anchor: calendar::today(),
            appointments: Vec::new(),
            status: StatusMessage::default(),
        }
    }

    /// Fetches appointments for the currently visible range. Stale data
    /// is kept on transient failures so the grid does not blank out.
    pub fn refresh(&mut self) -> ApiResult<()> {
        let range = calendar::visible_range(self.view, self.anchor);
        match self.api.list_appointments(Some(range)) {
            Ok(appointments) => {
                self.appointments = appointments;
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch calendar appointments");
                self.status.error(format!("Failed to load calendar: {e}"));
                Ok(())
            }
        }
    }

    fn step(&mut self, forward: bool) -> ApiResult<()> {
        self.anchor = calendar::step(self.view, self.anchor, forward);
        self.refresh()
    }

    fn set_view(&mut self, view: CalendarView) -> ApiResult<()> {
        if self.view == view {
            return Ok(());
        }
        self.view = view;
        self.refresh()
    }

    fn on_date(&self, date: Date) -> impl Iterator<Item = &Appointment> {
        self.appointments
            .iter()
            .filter(move |a| a.appointment_date == date)
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<AppointmentAction>> {
        let outcome = match key.code {
            KeyCode::Char('m') | KeyCode::Char('M') => self.set_view(CalendarView::Month),
            KeyCode::Char('w') | KeyCode::Char('W') => self.set_view(CalendarView::Week),
            KeyCode::Char('d') | KeyCode::Char('D') => self.set_view(CalendarView::Day),
            KeyCode::Left => self.step(false),
            KeyCode::Right => self.step(true),
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.anchor = calendar::today();
                self.refresh()
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                return Ok(Some(AppointmentAction::OpenNew))
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh(),
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc => {
                return Ok(Some(AppointmentAction::BackToHome))
            }
            _ => Ok(()),
        };
        match outcome {
            Err(e) if e.is_unauthorized() => Ok(Some(AppointmentAction::SessionExpired)),
            _ => Ok(None),
        }
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
                Constraint::Length(1), // Title line
                Constraint::Min(10),   // Body
                Constraint::Length(1), // Status
                Constraint::Length(2), // Help
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], "CALENDAR");

        let title = match self.view {
            CalendarView::Month => calendar::month_title(self.anchor),
            CalendarView::Week => {
                let (from, to) = calendar::week_range(self.anchor);
                format!("Week of {from} \u{2013} {to}")
            }
            CalendarView::Day => self.anchor.to_string(),
        };
        let title_line = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", self.view.label()),
                Style::default()
                    .fg(palette::BG)
                    .bg(palette::INFO)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                title,
                Style::default().fg(palette::TEXT).add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(title_line, layout[1]);

        match self.view {
            CalendarView::Month => self.render_month(frame, layout[2]),
            CalendarView::Week => self.render_week(frame, layout[2]),
            CalendarView::Day => self.render_day(frame, layout[2]),
        }

        self.status.render(frame, layout[3]);
        render_help(
            frame,
            layout[4],
            "M/W/D: View | \u{2190}\u{2192}: Navigate | T: Today | N: New | R: Refresh | B: Back",
        );
    }

    fn render_month(&self, frame: &mut Frame, area: Rect) {
        let mut events = CalendarEventStore::default();
        events.add(
            calendar::today(),
            Style::default()
                .fg(palette::FOCUS)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
        for appointment in &self.appointments {
            events.add(
                appointment.appointment_date,
                Style::default()
                    .fg(palette::SUCCESS)
                    .add_modifier(Modifier::BOLD),
            );
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(26), Constraint::Min(30)])
            .split(area);

        let monthly = Monthly::new(self.anchor, events)
            .show_weekdays_header(Style::default().fg(palette::INFO))
            .default_style(Style::default().fg(palette::TEXT).bg(palette::PANEL))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette::BORDER)),
            );
        frame.render_widget(monthly, columns[0]);

        // Day detail beside the grid, for the anchored date.
        self.render_day_listing(frame, columns[1], self.anchor);
    }

    fn render_week(&self, frame: &mut Frame, area: Rect) {
        let days = calendar::week_days(self.anchor);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100 / 7); 7])
            .split(area);

        for (day, column) in days.iter().zip(columns.iter()) {
            let is_today = *day == calendar::today();
            let block = Block::default()
                .title(format!(" {} {} ", weekday_abbrev(*day), day.day()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if is_today {
                    palette::FOCUS
                } else {
                    palette::BORDER
                }))
                .style(Style::default().bg(palette::PANEL));

            let items: Vec<ListItem> = self
                .on_date(*day)
                .map(|a| {
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            format!("{} ", a.start_time),
                            Style::default().fg(palette::INFO),
                        ),
                        Span::styled(
                            a.patient_name.clone(),
                            Style::default().fg(palette::TEXT),
                        ),
                    ]))
                })
                .collect();
            frame.render_widget(List::new(items).block(block), *column);
        }
    }

    fn render_day(&self, frame: &mut Frame, area: Rect) {
        self.render_day_listing(frame, area, self.anchor);
    }

    fn render_day_listing(&self, frame: &mut Frame, area: Rect, date: Date) {
        let block = Block::default()
            .title(format!(" Appointments on {date} "))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette::BORDER))
            .style(Style::default().bg(palette::PANEL));

        let mut todays: Vec<&Appointment> = self.on_date(date).collect();
        todays.sort_by(|a, b| a.start_time.cmp(&b.start_time));

        if todays.is_empty() {
            let empty = Paragraph::new("No appointments scheduled.")
                .style(Style::default().fg(palette::TEXT_DIM))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = todays
            .iter()
            .map(|a| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{}\u{2013}{} ", a.start_time, a.end_time),
                        Style::default().fg(palette::INFO),
                    ),
                    Span::styled(
                        format!("{} ", a.patient_name),
                        Style::default().fg(palette::TEXT).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("with {} ", a.staff_name),
                        Style::default().fg(palette::TEXT_DIM),
                    ),
                    Span::styled(
                        format!("[{}]", a.status),
                        Style::default().fg(palette::SUCCESS),
                    ),
                ]))
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }
}

fn weekday_abbrev(date: Date) -> &'static str {
    match date.weekday() {
        time::Weekday::Sunday => "Sun",
        time::Weekday::Monday => "Mon",
        time::Weekday::Tuesday => "Tue",
        time::Weekday::Wednesday => "Wed",
        time::Weekday::Thursday => "Thu",
        time::Weekday::Friday => "Fri",
        time::Weekday::Saturday => "Sat",
    }
}
