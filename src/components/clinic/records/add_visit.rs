//! Visit entry form with vital-sign capture.
//!
//! Out-of-range vitals produce warnings only; clinically implausible
//! values still save, since the chart is the source of truth, not this
//! client. BMI is derived from weight and height as they are typed.

use crate::api::{ApiClient, ApiError};
use crate::calendar;
use crate::components::{palette, render_header, render_help, render_input, StatusMessage};
use crate::models::{NewVisit, VitalSigns};
use crate::validate::{self, FieldErrors};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use time::macros::format_description;
use time::Date;
use tracing::warn;

pub enum VisitAction {
    Saved,
    Back,
    SessionExpired,
}

const FIELD_DATE: usize = 0;
const FIELD_COMPLAINT: usize = 1;
const FIELD_DIAGNOSIS: usize = 2;
const FIELD_NOTES: usize = 3;
const FIELD_SYSTOLIC: usize = 4;
const FIELD_DIASTOLIC: usize = 5;
const FIELD_HEART_RATE: usize = 6;
const FIELD_TEMPERATURE: usize = 7;
const FIELD_WEIGHT: usize = 8;
const FIELD_HEIGHT: usize = 9;
const FIELD_SUBMIT: usize = 10;
const FIELD_BACK: usize = 11;
const FIELD_COUNT: usize = 12;

pub struct AddVisit {
    api: ApiClient,
    patient_id: u64,
    patient_name: String,
    date_text: String,
    chief_complaint: String,
    diagnosis: String,
    notes: String,
    systolic: String,
    diastolic: String,
    heart_rate: String,
    temperature: String,
    weight: String,
    height: String,
    focus_index: usize,
    errors: FieldErrors,
    status: StatusMessage,
}

impl AddVisit {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            patient_id: 0,
            patient_name: String::new(),
            date_text: String::new(),
            chief_complaint: String::new(),
            diagnosis: String::new(),
            notes: String::new(),
            systolic: String::new(),
            diastolic: String::new(),
            heart_rate: String::new(),
            temperature: String::new(),
            weight: String::new(),
            height: String::new(),
            focus_index: 0,
            errors: FieldErrors::default(),
            status: StatusMessage::default(),
        }
    }

    pub fn reset(&mut self, patient_id: u64, patient_name: String) {
        *self = Self::new(self.api.clone());
        self.patient_id = patient_id;
        self.patient_name = patient_name;
        self.date_text = calendar::today().to_string();
    }

    fn vitals(&self) -> Option<VitalSigns> {
        let weight_lbs: Option<f64> = self.weight.trim().parse().ok();
        let height_inches: Option<f64> = self.height.trim().parse().ok();
        let vitals = VitalSigns {
            systolic_bp: self.systolic.trim().parse().ok(),
            diastolic_bp: self.diastolic.trim().parse().ok(),
            heart_rate: self.heart_rate.trim().parse().ok(),
            temperature: self.temperature.trim().parse().ok(),
            weight_lbs,
            height_inches,
            bmi: weight_lbs
                .zip(height_inches)
                .and_then(|(w, h)| validate::compute_bmi(w, h)),
        };
        if vitals == VitalSigns::default() {
            None
        } else {
            Some(vitals)
        }
    }

    fn parsed_date(&self) -> Option<Date> {
        Date::parse(
            self.date_text.trim(),
            format_description!("[year]-[month]-[day]"),
        )
        .ok()
    }

    fn validate(&mut self) -> bool {
        self.errors = FieldErrors::default();
        if self.parsed_date().is_none() {
            self.errors
                .add("visit_date", "Enter the visit date as YYYY-MM-DD.");
        }
        if self.chief_complaint.trim().is_empty() {
            self.errors
                .add("chief_complaint", "Chief complaint is required.");
        }
        self.errors.is_empty()
    }

    fn submit(&mut self) -> Result<Option<VisitAction>> {
        if !self.validate() {
            return Ok(None);
        }
        let Some(visit_date) = self.parsed_date() else {
            return Ok(None);
        };
        let visit = NewVisit {
            patient_id: self.patient_id,
            visit_date,
            chief_complaint: self.chief_complaint.trim().to_string(),
            diagnosis: non_empty(&self.diagnosis),
            notes: non_empty(&self.notes),
            vitals: self.vitals(),
        };
        match self.api.create_visit(&visit) {
            Ok(_) => Ok(Some(VisitAction::Saved)),
            Err(e) if e.is_unauthorized() => Ok(Some(VisitAction::SessionExpired)),
            Err(ApiError::Validation { message, errors }) => {
                self.errors.merge_server(errors);
                self.status.error(message);
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "failed to save visit");
                self.status.error(format!("Failed to save visit: {e}"));
                Ok(None)
            }
        }
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus_index {
            FIELD_DATE => Some(&mut self.date_text),
            FIELD_COMPLAINT => Some(&mut self.chief_complaint),
            FIELD_DIAGNOSIS => Some(&mut self.diagnosis),
            FIELD_NOTES => Some(&mut self.notes),
            FIELD_SYSTOLIC => Some(&mut self.systolic),
            FIELD_DIASTOLIC => Some(&mut self.diastolic),
            FIELD_HEART_RATE => Some(&mut self.heart_rate),
            FIELD_TEMPERATURE => Some(&mut self.temperature),
            FIELD_WEIGHT => Some(&mut self.weight),
            FIELD_HEIGHT => Some(&mut self.height),
            _ => None,
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Option<VisitAction>> {
        match key.code {
            KeyCode::Char(c) => {
                let numeric = matches!(
                    self.focus_index,
                    FIELD_SYSTOLIC
                        | FIELD_DIASTOLIC
                        | FIELD_HEART_RATE
                        | FIELD_TEMPERATURE
                        | FIELD_WEIGHT
                        | FIELD_HEIGHT
                );
                if let Some(field) = self.field_mut() {
                    if !numeric || c.is_ascii_digit() || c == '.' {
                        field.push(c);
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.field_mut() {
                    field.pop();
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus_index = (self.focus_index + 1) % FIELD_COUNT;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_index = (self.focus_index + FIELD_COUNT - 1) % FIELD_COUNT;
            }
            KeyCode::Esc => return Ok(Some(VisitAction::Back)),
            KeyCode::Enter => match self.focus_index {
                FIELD_BACK => return Ok(Some(VisitAction::Back)),
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
                Constraint::Min(15),    // Body
                Constraint::Length(3),  // Warnings + errors
                Constraint::Length(1),  // Status
                Constraint::Length(1),  // Submit
                Constraint::Length(1),  // Back
                Constraint::Length(2),  // Help
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], &format!("NEW VISIT \u{2014} {}", self.patient_name));

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
                Constraint::Min(0),
            ])
            .split(body[0]);
        render_input(frame, left[0], "Visit Date* (YYYY-MM-DD)", &self.date_text, self.focus_index == FIELD_DATE);
        render_input(frame, left[1], "Chief Complaint*", &self.chief_complaint, self.focus_index == FIELD_COMPLAINT);
        render_input(frame, left[2], "Diagnosis", &self.diagnosis, self.focus_index == FIELD_DIAGNOSIS);
        render_input(frame, left[3], "Notes", &self.notes, self.focus_index == FIELD_NOTES);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(body[1]);
        let bp_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(right[0]);
        render_input(frame, bp_row[0], "Systolic BP", &self.systolic, self.focus_index == FIELD_SYSTOLIC);
        render_input(frame, bp_row[1], "Diastolic BP", &self.diastolic, self.focus_index == FIELD_DIASTOLIC);
        let hr_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(right[1]);
        render_input(frame, hr_row[0], "Heart Rate (bpm)", &self.heart_rate, self.focus_index == FIELD_HEART_RATE);
        render_input(frame, hr_row[1], "Temp (\u{00b0}F)", &self.temperature, self.focus_index == FIELD_TEMPERATURE);
        let size_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(right[2]);
        render_input(frame, size_row[0], "Weight (lbs)", &self.weight, self.focus_index == FIELD_WEIGHT);
        render_input(frame, size_row[1], "Height (in)", &self.height, self.focus_index == FIELD_HEIGHT);

        let bmi_text = self
            .vitals()
            .and_then(|v| v.bmi)
            .map(|b| format!("{b:.1}"))
            .unwrap_or_else(|| "\u{2014}".to_string());
        render_input(frame, right[3], "BMI (computed)", &bmi_text, false);

        // Warnings are advisory; errors block submission.
        let mut lines: Vec<Line> = Vec::new();
        if let Some(vitals) = self.vitals() {
            for warning in validate::vital_warnings(&vitals) {
                lines.push(Line::from(Span::styled(
                    format!("\u{26a0} {warning}"),
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
        for (_, msgs) in self.errors.iter() {
            for msg in msgs {
                lines.push(Line::from(Span::styled(
                    msg.clone(),
                    Style::default().fg(palette::ERROR),
                )));
            }
        }
        lines.truncate(3);
        let notices = Paragraph::new(lines)
            .style(Style::default().bg(palette::BG))
            .alignment(Alignment::Center);
        frame.render_widget(notices, layout[2]);

        self.status.render(frame, layout[3]);

        let submit = Paragraph::new(Span::styled(
            if self.focus_index == FIELD_SUBMIT {
                "\u{25ba} Save Visit \u{25c4}"
            } else {
                "  Save Visit  "
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
            "Tab/\u{2191}\u{2193}: Fields | Enter: Save | Esc: Back",
        );
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
