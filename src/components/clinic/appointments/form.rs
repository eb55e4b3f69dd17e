//! Appointment booking/edit form with live availability.
//!
//! Changing the provider, date or duration fires an availability check
//! through `fetch::SlotFetcher`; the slot picker only ever shows the
//! result of the most recent request. Submission is blocked while the
//! slot list is empty, and the chosen start time must be one of the
//! fetched slots.

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::calendar;
use crate::components::clinic::appointments::AppointmentAction;
use crate::components::{
    palette, render_header, render_help, render_input, StatusMessage,
};
use crate::fetch::SlotFetcher;
use crate::models::{
    Appointment, AppointmentRequest, AppointmentType, AvailabilityQuery, AvailabilitySlot,
    Patient, StaffMember,
};
use crate::tui::Frame;
use crate::validate::{validate_appointment, FieldErrors};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use time::macros::format_description;
use time::Date;
use tracing::warn;

const FIELD_PATIENT: usize = 0;
const FIELD_PROVIDER: usize = 1;
const FIELD_DATE: usize = 2;
const FIELD_DURATION: usize = 3;
const FIELD_TYPE: usize = 4;
const FIELD_SLOT: usize = 5;
const FIELD_REASON: usize = 6;
const FIELD_FEE: usize = 7;
const FIELD_REMINDER: usize = 8;
const FIELD_SUBMIT: usize = 9;
const FIELD_BACK: usize = 10;
const FIELD_COUNT: usize = 11;

const DURATIONS: [u32; 5] = [15, 30, 45, 60, 90];

pub struct AppointmentForm {
    api: ApiClient,
    editing: Option<u64>,

    patients: Vec<Patient>,
    providers: Vec<StaffMember>,
    patient_index: Option<usize>,
    provider_index: Option<usize>,
    date_text: String,
    duration_index: usize,
    appointment_type: AppointmentType,
    reason: String,
    fee_text: String,
    reminder_enabled: bool,

    slots: Vec<AvailabilitySlot>,
    slot_index: Option<usize>,
    fetcher: SlotFetcher,
    availability_checked: bool,

    focus_index: usize,
    errors: FieldErrors,
    status: StatusMessage,
    session_expired: bool,
}

impl AppointmentForm {
    pub fn new(api: ApiClient, editing: Option<Appointment>) -> Self {
        let mut form = Self {
            api,
            editing: None,
            patients: Vec::new(),
            providers: Vec::new(),
            patient_index: None,
            provider_index: None,
            date_text: String::new(),
            duration_index: 1, // 30 minutes
            appointment_type: AppointmentType::InPerson,
            reason: String::new(),
            fee_text: String::new(),
            reminder_enabled: true,
            slots: Vec::new(),
            slot_index: None,
            fetcher: SlotFetcher::new(),
            availability_checked: false,
            focus_index: 0,
            errors: FieldErrors::default(),
            status: StatusMessage::default(),
            session_expired: false,
        };

        if let Some(appointment) = editing {
            form.editing = Some(appointment.id);
            form.date_text = appointment.appointment_date.to_string();
            form.duration_index = DURATIONS
                .iter()
                .position(|&d| d == appointment.duration_minutes)
                .unwrap_or(1);
            form.appointment_type = appointment.appointment_type;
            form.reason = appointment.reason_for_visit.clone();
            form.fee_text = appointment.fee.map(|f| f.to_string()).unwrap_or_default();
            form.reminder_enabled = appointment.reminder_enabled;
            // Seed the slot list with the booked time so the current
            // choice stays valid until a fresh availability check lands.
            form.slots = vec![AvailabilitySlot {
                start_time: appointment.start_time.clone(),
                end_time: appointment.end_time.clone(),
            }];
            form.slot_index = Some(0);
            form.availability_checked = true;
            // Indices are resolved against the fetched lists in
            // `load_choices`.
            form.patient_index = Some(appointment.patient_id as usize);
            form.provider_index = Some(appointment.staff_id as usize);
        }

        form
    }

    /// Fetches the patient and provider choice lists. Until this runs,
    /// edit-mode indices are raw IDs; afterwards they are list offsets.
    pub fn load_choices(&mut self) -> ApiResult<()> {
        let patient_id = self.patient_index.take();
        let provider_id = self.provider_index.take();

        match self.api.list_patients() {
            Ok(patients) => self.patients = patients,
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch patients for form");
                self.status.error(format!("Failed to load patients: {e}"));
            }
        }
        match self.api.list_staff() {
            Ok(staff) => {
                self.providers = staff.into_iter().filter(|s| s.role.is_provider()).collect()
            }
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch staff for form");
                self.status.error(format!("Failed to load providers: {e}"));
            }
        }

        if self.editing.is_some() {
            self.patient_index = patient_id
                .and_then(|id| self.patients.iter().position(|p| p.id == id as u64));
            self.provider_index = provider_id
                .and_then(|id| self.providers.iter().position(|s| s.id == id as u64));
        }
        Ok(())
    }

    fn parsed_date(&self) -> Option<Date> {
        Date::parse(
            self.date_text.trim(),
            format_description!("[year]-[month]-[day]"),
        )
        .ok()
    }

    fn duration(&self) -> u32 {
        DURATIONS[self.duration_index]
    }

    /// Fires an availability check when provider, date and duration are
    /// all usable. Older in-flight responses become stale immediately.
    fn request_availability(&mut self) {
        self.slots.clear();
        self.slot_index = None;
        self.availability_checked = false;

        let Some(provider) = self.provider_index.and_then(|i| self.providers.get(i)) else {
            return;
        };
        let Some(date) = self.parsed_date() else {
            return;
        };
        self.fetcher.request(
            self.api.clone(),
            AvailabilityQuery {
                staff_id: provider.id,
                date,
                duration_minutes: self.duration(),
            },
        );
    }

    fn cycle(&mut self, forward: bool) {
        match self.focus_index {
            FIELD_PATIENT => {
                self.patient_index = cycle_option(self.patient_index, self.patients.len(), forward);
            }
            FIELD_PROVIDER => {
                self.provider_index =
                    cycle_option(self.provider_index, self.providers.len(), forward);
                self.request_availability();
            }
            FIELD_DURATION => {
                self.duration_index = if forward {
                    (self.duration_index + 1) % DURATIONS.len()
                } else {
                    (self.duration_index + DURATIONS.len() - 1) % DURATIONS.len()
                };
                self.request_availability();
            }
            FIELD_TYPE => {
                self.appointment_type = match self.appointment_type {
                    AppointmentType::InPerson => AppointmentType::Telehealth,
                    AppointmentType::Telehealth => AppointmentType::InPerson,
                };
            }
            FIELD_SLOT => {
                self.slot_index = cycle_option(self.slot_index, self.slots.len(), forward);
            }
            FIELD_REMINDER => self.reminder_enabled = !self.reminder_enabled,
            _ => {}
        }
    }

    fn build_request(&self) -> AppointmentRequest {
        AppointmentRequest {
            patient_id: self
                .patient_index
                .and_then(|i| self.patients.get(i))
                .map(|p| p.id),
            staff_id: self
                .provider_index
                .and_then(|i| self.providers.get(i))
                .map(|s| s.id),
            appointment_date: self.parsed_date(),
            start_time: self
                .slot_index
                .and_then(|i| self.slots.get(i))
                .map(|s| s.start_time.clone())
                .unwrap_or_default(),
            duration_minutes: self.duration(),
            appointment_type: Some(self.appointment_type),
            reason_for_visit: self.reason.trim().to_string(),
            fee: self.fee_text.trim().parse().ok(),
            reminder_enabled: self.reminder_enabled,
        }
    }

    fn submit(&mut self) -> Result<Option<AppointmentAction>> {
        if self.slots.is_empty() {
            self.status
                .error("No available slots for the selected provider and date.");
            return Ok(None);
        }

        let request = self.build_request();
        self.errors = validate_appointment(&request, calendar::today(), &self.slots);
        if !self.errors.is_empty() {
            return Ok(None);
        }

        let outcome = match self.editing {
            Some(id) => self.api.update_appointment(id, &request),
            None => self.api.create_appointment(&request),
        };
        match outcome {
            Ok(_) => Ok(Some(AppointmentAction::BackToList)),
            Err(e) if e.is_unauthorized() => Ok(Some(AppointmentAction::SessionExpired)),
            Err(ApiError::Validation { message, errors }) => {
                self.errors.merge_server(errors);
                self.status.error(message);
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "failed to save appointment");
                self.status.error(format!("Failed to save: {e}"));
                Ok(None)
            }
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<AppointmentAction>> {
        if self.session_expired {
            return Ok(Some(AppointmentAction::SessionExpired));
        }

        match key.code {
            KeyCode::Char(c) => match self.focus_index {
                FIELD_DATE => {
                    self.date_text.push(c);
                    self.request_availability();
                }
                FIELD_REASON => self.reason.push(c),
                FIELD_FEE => {
                    if c.is_ascii_digit() || c == '.' {
                        self.fee_text.push(c);
                    }
                }
                _ => {}
            },
            KeyCode::Backspace => match self.focus_index {
                FIELD_DATE => {
                    self.date_text.pop();
                    self.request_availability();
                }
                FIELD_REASON => {
                    self.reason.pop();
                }
                FIELD_FEE => {
                    self.fee_text.pop();
                }
                _ => {}
            },
            KeyCode::Left => self.cycle(false),
            KeyCode::Right => self.cycle(true),
            KeyCode::Tab | KeyCode::Down => {
                self.focus_index = (self.focus_index + 1) % FIELD_COUNT;
            }
            KeyCode::Up => {
                self.focus_index = (self.focus_index + FIELD_COUNT - 1) % FIELD_COUNT;
            }
            KeyCode::Esc => return Ok(Some(AppointmentAction::BackToList)),
            KeyCode::Enter => match self.focus_index {
                FIELD_BACK => return Ok(Some(AppointmentAction::BackToList)),
                FIELD_SUBMIT => return self.submit(),
                _ => self.focus_index = (self.focus_index + 1) % FIELD_COUNT,
            },
            _ => {}
        }
        Ok(None)
    }

    /// Drains availability responses; only the freshest is applied.
    pub fn tick(&mut self) {
        self.status.tick();
        if let Some(outcome) = self.fetcher.poll() {
            self.availability_checked = true;
            match outcome {
                Ok(slots) => {
                    self.slots = slots;
                    self.slot_index = if self.slots.is_empty() { None } else { Some(0) };
                }
                Err(e) if e.is_unauthorized() => {
                    self.session_expired = true;
                }
                Err(e) => {
                    warn!(error = %e, "availability check failed");
                    self.slots.clear();
                    self.slot_index = None;
                    self.status.error(format!("Availability check failed: {e}"));
                }
            }
        }
    }

    fn choice_text(&self, field: usize) -> String {
        match field {
            FIELD_PATIENT => self
                .patient_index
                .and_then(|i| self.patients.get(i))
                .map(|p| p.full_name())
                .unwrap_or_else(|| "\u{2190}/\u{2192} to choose".to_string()),
            FIELD_PROVIDER => self
                .provider_index
                .and_then(|i| self.providers.get(i))
                .map(|s| format!("{} ({})", s.name, s.role))
                .unwrap_or_else(|| "\u{2190}/\u{2192} to choose".to_string()),
            _ => String::new(),
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        crate::components::fill_background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Header
                Constraint::Min(19),    // Body
                Constraint::Length(3),  // Errors
                Constraint::Length(1),  // Status
                Constraint::Length(1),  // Submit
                Constraint::Length(1),  // Back
                Constraint::Length(2),  // Help
            ])
            .margin(1)
            .split(frame.area());

        let title = if self.editing.is_some() {
            "EDIT APPOINTMENT"
        } else {
            "BOOK APPOINTMENT"
        };
        render_header(frame, layout[0], title);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(body[0]);

        render_input(
            frame,
            left[0],
            "Patient*",
            &self.choice_text(FIELD_PATIENT),
            self.focus_index == FIELD_PATIENT,
        );
        render_input(
            frame,
            left[1],
            "Provider*",
            &self.choice_text(FIELD_PROVIDER),
            self.focus_index == FIELD_PROVIDER,
        );
        render_input(
            frame,
            left[2],
            "Date* (YYYY-MM-DD)",
            &self.date_text,
            self.focus_index == FIELD_DATE,
        );
        render_input(
            frame,
            left[3],
            "Duration (minutes)",
            &self.duration().to_string(),
            self.focus_index == FIELD_DURATION,
        );
        render_input(
            frame,
            left[4],
            "Type",
            &self.appointment_type.to_string(),
            self.focus_index == FIELD_TYPE,
        );

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Slot picker
                Constraint::Length(3), // Reason
                Constraint::Length(3), // Fee
                Constraint::Length(3), // Reminder
                Constraint::Min(0),
            ])
            .split(body[1]);

        self.render_slots(frame, right[0]);
        render_input(
            frame,
            right[1],
            "Reason for Visit*",
            &self.reason,
            self.focus_index == FIELD_REASON,
        );
        render_input(frame, right[2], "Fee ($)", &self.fee_text, self.focus_index == FIELD_FEE);
        render_input(
            frame,
            right[3],
            "Reminder",
            if self.reminder_enabled { "On" } else { "Off" },
            self.focus_index == FIELD_REMINDER,
        );

        // Inline validation errors, client-side and server 422 merged.
        let error_lines: Vec<Line> = self
            .errors
            .iter()
            .flat_map(|(_, msgs)| msgs.iter())
            .take(3)
            .map(|m| Line::from(m.as_str()))
            .collect();
        let errors = Paragraph::new(error_lines)
            .style(Style::default().fg(palette::ERROR).bg(palette::BG))
            .alignment(Alignment::Center);
        frame.render_widget(errors, layout[2]);

        self.status.render(frame, layout[3]);

        let submit_enabled = !self.slots.is_empty();
        let submit_color = if !submit_enabled {
            Color::DarkGray
        } else if self.focus_index == FIELD_SUBMIT {
            palette::SUCCESS
        } else {
            palette::TEXT_DIM
        };
        let submit = Paragraph::new(Span::styled(
            if self.focus_index == FIELD_SUBMIT {
                "\u{25ba} Save Appointment \u{25c4}"
            } else {
                "  Save Appointment  "
            },
            Style::default().fg(submit_color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(submit, layout[4]);

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
        frame.render_widget(back, layout[5]);

        render_help(
            frame,
            layout[6],
            "Tab/\u{2191}\u{2193}: Fields | \u{2190}\u{2192}: Choose | Enter: Save | Esc: Back",
        );
    }

    fn render_slots(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus_index == FIELD_SLOT;
        let block = Block::default()
            .title(" Available Slots* ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if focused {
                Style::default().fg(palette::FOCUS)
            } else {
                Style::default().fg(palette::BORDER_IDLE)
            })
            .style(Style::default().bg(palette::INPUT_BG));

        let content: Paragraph = if self.fetcher.in_flight() {
            Paragraph::new("Checking availability...")
                .style(Style::default().fg(palette::INFO))
        } else if !self.availability_checked {
            Paragraph::new("Choose a provider and date to see open slots.")
                .style(Style::default().fg(palette::TEXT_DIM))
        } else if self.slots.is_empty() {
            Paragraph::new("No available slots")
                .style(Style::default().fg(palette::ERROR).add_modifier(Modifier::BOLD))
        } else {
            let spans: Vec<Span> = self
                .slots
                .iter()
                .enumerate()
                .flat_map(|(i, slot)| {
                    let style = if Some(i) == self.slot_index {
                        Style::default()
                            .fg(palette::FOCUS)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(palette::TEXT)
                    };
                    vec![
                        Span::styled(format!(" {} ", slot.start_time), style),
                        Span::raw(" "),
                    ]
                })
                .collect();
            Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true })
        };

        frame.render_widget(content.block(block), area);
    }
}

/// Cycles an optional index through `len` entries.
fn cycle_option(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        None => 0,
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
    })
}
