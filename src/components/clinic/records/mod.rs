//! Medical records: per-patient chart with visit, lab, prescription,
//! vitals and document tabs.
//!
//! Staff pick a patient first; for portal and pharmacy logins the
//! server already scopes the patient list, so the picker simply shows
//! what the caller may see. Pharmacy users land on the Prescriptions
//! tab.

use crate::api::{ApiClient, ApiResult};
use crate::app::SelectedPage;
use crate::components::{palette, render_header, render_help, Component, StatusMessage};
use crate::models::{Document, LabResult, Patient, Prescription, Role, Visit};
use crate::tui::Frame;
use crate::validate;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::warn;

pub mod add_visit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordsTab {
    Visits,
    Labs,
    Prescriptions,
    Vitals,
    Documents,
}

const TABS: [RecordsTab; 5] = [
    RecordsTab::Visits,
    RecordsTab::Labs,
    RecordsTab::Prescriptions,
    RecordsTab::Vitals,
    RecordsTab::Documents,
];

impl RecordsTab {
    fn label(&self) -> &'static str {
        match self {
            RecordsTab::Visits => "Visits",
            RecordsTab::Labs => "Lab Results",
            RecordsTab::Prescriptions => "Prescriptions",
            RecordsTab::Vitals => "Vitals",
            RecordsTab::Documents => "Documents",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordsState {
    PickPatient,
    Chart,
    AddVisit,
}

pub struct Records {
    api: ApiClient,
    role: Role,
    state: RecordsState,
    patients: Vec<Patient>,
    picker_state: ListState,
    patient: Option<Patient>,
    tab: RecordsTab,
    visits: Vec<Visit>,
    labs: Vec<LabResult>,
    prescriptions: Vec<Prescription>,
    documents: Vec<Document>,
    add_visit: add_visit::AddVisit,
    status: StatusMessage,
}

impl Records {
    pub fn new(api: ApiClient, role: Role) -> Self {
        Self {
            api: api.clone(),
            role,
            state: RecordsState::PickPatient,
            patients: Vec::new(),
            picker_state: ListState::default(),
            patient: None,
            tab: if role == Role::Pharmacy {
                RecordsTab::Prescriptions
            } else {
                RecordsTab::Visits
            },
            visits: Vec::new(),
            labs: Vec::new(),
            prescriptions: Vec::new(),
            documents: Vec::new(),
            add_visit: add_visit::AddVisit::new(api),
            status: StatusMessage::default(),
        }
    }

    /// Fetch-on-activation: refreshes the patient picker.
    pub fn open(&mut self) -> ApiResult<()> {
        self.state = RecordsState::PickPatient;
        match self.api.list_patients() {
            Ok(patients) => {
                self.patients = patients;
                if self.picker_state.selected().is_none() && !self.patients.is_empty() {
                    self.picker_state.select(Some(0));
                }
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch patients for records");
                self.status.error(format!("Failed to load patients: {e}"));
                Ok(())
            }
        }
    }

    fn load_tab(&mut self) -> ApiResult<()> {
        let Some(patient_id) = self.patient.as_ref().map(|p| p.id) else {
            return Ok(());
        };
        let outcome = match self.tab {
            // The vitals tab is a projection over visits.
            RecordsTab::Visits | RecordsTab::Vitals => self
                .api
                .list_visits(patient_id)
                .map(|v| self.visits = v),
            RecordsTab::Labs => self.api.list_lab_results(patient_id).map(|l| self.labs = l),
            RecordsTab::Prescriptions => self
                .api
                .list_prescriptions(patient_id)
                .map(|p| self.prescriptions = p),
            RecordsTab::Documents => self
                .api
                .list_documents(patient_id)
                .map(|d| self.documents = d),
        };
        match outcome {
            Ok(()) => Ok(()),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, tab = self.tab.label(), "failed to fetch records tab");
                self.status
                    .error(format!("Failed to load {}: {e}", self.tab.label()));
                Ok(())
            }
        }
    }

    fn switch_tab(&mut self, forward: bool) -> ApiResult<()> {
        let current = TABS.iter().position(|t| *t == self.tab).unwrap_or(0);
        self.tab = if forward {
            TABS[(current + 1) % TABS.len()]
        } else {
            TABS[(current + TABS.len() - 1) % TABS.len()]
        };
        self.load_tab()
    }

    fn select_patient(&mut self) -> ApiResult<()> {
        if let Some(patient) = self
            .picker_state
            .selected()
            .and_then(|i| self.patients.get(i))
            .cloned()
        {
            self.patient = Some(patient);
            self.state = RecordsState::Chart;
            self.load_tab()
        } else {
            Ok(())
        }
    }

    fn handle_picker(&mut self, key: KeyEvent) -> Result<Option<SelectedPage>> {
        match key.code {
            KeyCode::Up => self.move_picker(-1),
            KeyCode::Down => self.move_picker(1),
            KeyCode::Enter => {
                if let Err(e) = self.select_patient() {
                    if e.is_unauthorized() {
                        return Ok(Some(SelectedPage::Logout));
                    }
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Err(e) = self.open() {
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

    fn move_picker(&mut self, delta: i64) {
        if self.patients.is_empty() {
            return;
        }
        let len = self.patients.len() as i64;
        let current = self.picker_state.selected().unwrap_or(0) as i64;
        self.picker_state
            .select(Some(((current + delta).rem_euclid(len)) as usize));
    }

    fn handle_chart(&mut self, key: KeyEvent) -> Result<Option<SelectedPage>> {
        match key.code {
            KeyCode::Tab | KeyCode::Right => {
                if let Err(e) = self.switch_tab(true) {
                    if e.is_unauthorized() {
                        return Ok(Some(SelectedPage::Logout));
                    }
                }
            }
            KeyCode::BackTab | KeyCode::Left => {
                if let Err(e) = self.switch_tab(false) {
                    if e.is_unauthorized() {
                        return Ok(Some(SelectedPage::Logout));
                    }
                }
            }
            KeyCode::Char('v') | KeyCode::Char('V') if self.role.is_staff() => {
                if let Some(patient) = &self.patient {
                    self.add_visit.reset(patient.id, patient.full_name());
                    self.state = RecordsState::AddVisit;
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Err(e) = self.load_tab() {
                    if e.is_unauthorized() {
                        return Ok(Some(SelectedPage::Logout));
                    }
                }
            }
            KeyCode::Esc => self.state = RecordsState::PickPatient,
            KeyCode::Char('b') | KeyCode::Char('B') => return Ok(Some(SelectedPage::None)),
            _ => {}
        }
        Ok(None)
    }
}

impl Component for Records {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        match self.state {
            RecordsState::PickPatient => self.handle_picker(event),
            RecordsState::Chart => self.handle_chart(event),
            RecordsState::AddVisit => match self.add_visit.handle_input(event)? {
                Some(add_visit::VisitAction::Saved) | Some(add_visit::VisitAction::Back) => {
                    self.state = RecordsState::Chart;
                    match self.load_tab() {
                        Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
                        _ => Ok(None),
                    }
                }
                Some(add_visit::VisitAction::SessionExpired) => Ok(Some(SelectedPage::Logout)),
                None => Ok(None),
            },
        }
    }

    fn tick(&mut self) {
        self.status.tick();
        self.add_visit.tick();
    }

    fn render(&self, frame: &mut Frame) {
        match self.state {
            RecordsState::PickPatient => self.render_picker(frame),
            RecordsState::Chart => self.render_chart(frame),
            RecordsState::AddVisit => self.add_visit.render(frame),
        }
    }
}

impl Records {
    fn render_picker(&self, frame: &mut Frame) {
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

        render_header(frame, layout[0], "MEDICAL RECORDS");

        let items: Vec<ListItem> = self
            .patients
            .iter()
            .map(|p| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        p.full_name(),
                        Style::default().fg(palette::TEXT).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", p.email.clone().unwrap_or_default()),
                        Style::default().fg(palette::TEXT_DIM),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Select Patient ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette::BORDER))
                    .style(Style::default().bg(palette::PANEL)),
            )
            .highlight_style(
                Style::default()
                    .fg(palette::FOCUS)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("\u{25ba} ");
        let mut state = self.picker_state.clone();
        frame.render_stateful_widget(list, layout[1], &mut state);

        self.status.render(frame, layout[2]);
        render_help(
            frame,
            layout[3],
            "\u{2191}\u{2193}: Select | Enter: Open Chart | R: Refresh | B: Back",
        );
    }

    fn render_chart(&self, frame: &mut Frame) {
        crate::components::fill_background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        let name = self
            .patient
            .as_ref()
            .map(|p| p.full_name())
            .unwrap_or_default();
        render_header(frame, layout[0], &format!("RECORDS \u{2014} {name}"));

        let selected = TABS.iter().position(|t| *t == self.tab).unwrap_or(0);
        let tabs = Tabs::new(TABS.iter().map(|t| t.label()).collect::<Vec<_>>())
            .select(selected)
            .style(Style::default().fg(palette::TEXT_DIM).bg(palette::BG))
            .highlight_style(
                Style::default()
                    .fg(palette::FOCUS)
                    .add_modifier(Modifier::BOLD),
            )
            .divider("|");
        frame.render_widget(tabs, layout[1]);

        match self.tab {
            RecordsTab::Visits => self.render_visits(frame, layout[2]),
            RecordsTab::Labs => self.render_labs(frame, layout[2]),
            RecordsTab::Prescriptions => self.render_prescriptions(frame, layout[2]),
            RecordsTab::Vitals => self.render_vitals(frame, layout[2]),
            RecordsTab::Documents => self.render_documents(frame, layout[2]),
        }

        self.status.render(frame, layout[3]);
        let help = if self.role.is_staff() {
            "Tab/\u{2190}\u{2192}: Tabs | V: Add Visit | R: Refresh | Esc: Patients | B: Home"
        } else {
            "Tab/\u{2190}\u{2192}: Tabs | R: Refresh | Esc: Patients | B: Home"
        };
        render_help(frame, layout[4], help);
    }

    fn panel(&self, title: &str) -> Block<'_> {
        Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette::BORDER))
            .style(Style::default().bg(palette::PANEL))
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect, title: &str, message: &str) {
        let empty = Paragraph::new(message)
            .style(Style::default().fg(palette::TEXT_DIM))
            .block(self.panel(title));
        frame.render_widget(empty, area);
    }

    fn render_visits(&self, frame: &mut Frame, area: Rect) {
        if self.visits.is_empty() {
            self.render_empty(frame, area, "Visits", "No visits recorded.");
            return;
        }
        let items: Vec<ListItem> = self
            .visits
            .iter()
            .map(|v| {
                let mut lines = vec![Line::from(vec![
                    Span::styled(
                        v.visit_date.to_string(),
                        Style::default().fg(palette::INFO).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", v.provider_name),
                        Style::default().fg(palette::TEXT_DIM),
                    ),
                ])];
                lines.push(Line::from(Span::styled(
                    format!("  Chief complaint: {}", v.chief_complaint),
                    Style::default().fg(palette::TEXT),
                )));
                if let Some(diagnosis) = &v.diagnosis {
                    lines.push(Line::from(Span::styled(
                        format!("  Diagnosis: {diagnosis}"),
                        Style::default().fg(palette::TEXT),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();
        frame.render_widget(List::new(items).block(self.panel("Visits")), area);
    }

    fn render_labs(&self, frame: &mut Frame, area: Rect) {
        if self.labs.is_empty() {
            self.render_empty(frame, area, "Lab Results", "No lab results on file.");
            return;
        }
        let rows: Vec<Row> = self
            .labs
            .iter()
            .map(|l| {
                let value = match &l.unit {
                    Some(unit) => format!("{} {unit}", l.result_value),
                    None => l.result_value.clone(),
                };
                let style = if l.flagged {
                    Style::default().fg(palette::ERROR).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette::TEXT)
                };
                Row::new(vec![
                    l.collected_on.to_string(),
                    l.test_name.clone(),
                    value,
                    l.reference_range.clone().unwrap_or_default(),
                    if l.flagged { "\u{26a0} Abnormal" } else { "" }.to_string(),
                ])
                .style(style)
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Percentage(30),
                Constraint::Percentage(20),
                Constraint::Percentage(25),
                Constraint::Length(12),
            ],
        )
        .header(
            Row::new(vec!["Date", "Test", "Result", "Reference", ""])
                .style(Style::default().fg(palette::INFO).add_modifier(Modifier::BOLD)),
        )
        .block(self.panel("Lab Results"));
        frame.render_widget(table, area);
    }

    fn render_prescriptions(&self, frame: &mut Frame, area: Rect) {
        if self.prescriptions.is_empty() {
            self.render_empty(frame, area, "Prescriptions", "No prescriptions on file.");
            return;
        }
        let rows: Vec<Row> = self
            .prescriptions
            .iter()
            .map(|p| {
                Row::new(vec![
                    p.medication.clone(),
                    p.dosage.clone(),
                    p.frequency.clone(),
                    p.prescribed_by.clone(),
                    p.refills_remaining.to_string(),
                    if p.active { "Active" } else { "Inactive" }.to_string(),
                ])
                .style(Style::default().fg(if p.active {
                    palette::TEXT
                } else {
                    palette::TEXT_DIM
                }))
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(25),
                Constraint::Percentage(15),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Length(8),
                Constraint::Length(10),
            ],
        )
        .header(
            Row::new(vec!["Medication", "Dosage", "Frequency", "Prescriber", "Refills", "Status"])
                .style(Style::default().fg(palette::INFO).add_modifier(Modifier::BOLD)),
        )
        .block(self.panel("Prescriptions"));
        frame.render_widget(table, area);
    }

    fn render_vitals(&self, frame: &mut Frame, area: Rect) {
        let readings: Vec<(&Visit, &crate::models::VitalSigns)> = self
            .visits
            .iter()
            .filter_map(|v| v.vitals.as_ref().map(|vit| (v, vit)))
            .collect();
        if readings.is_empty() {
            self.render_empty(frame, area, "Vitals", "No vital signs recorded.");
            return;
        }
        let items: Vec<ListItem> = readings
            .iter()
            .map(|(visit, vitals)| {
                let mut parts = Vec::new();
                if let (Some(s), Some(d)) = (vitals.systolic_bp, vitals.diastolic_bp) {
                    parts.push(format!("BP {s}/{d}"));
                }
                if let Some(hr) = vitals.heart_rate {
                    parts.push(format!("HR {hr}"));
                }
                if let Some(t) = vitals.temperature {
                    parts.push(format!("Temp {t:.1}\u{00b0}F"));
                }
                if let Some(w) = vitals.weight_lbs {
                    parts.push(format!("Wt {w:.1} lbs"));
                }
                if let Some(bmi) = vitals.bmi {
                    parts.push(format!("BMI {bmi:.1}"));
                }
                let mut lines = vec![Line::from(vec![
                    Span::styled(
                        visit.visit_date.to_string(),
                        Style::default().fg(palette::INFO).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", parts.join("  ")),
                        Style::default().fg(palette::TEXT),
                    ),
                ])];
                for warning in validate::vital_warnings(vitals) {
                    lines.push(Line::from(Span::styled(
                        format!("  \u{26a0} {warning}"),
                        Style::default().fg(palette::ERROR),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();
        frame.render_widget(List::new(items).block(self.panel("Vitals")), area);
    }

    fn render_documents(&self, frame: &mut Frame, area: Rect) {
        if self.documents.is_empty() {
            self.render_empty(frame, area, "Documents", "No documents uploaded.");
            return;
        }
        let rows: Vec<Row> = self
            .documents
            .iter()
            .map(|d| {
                Row::new(vec![
                    d.uploaded_on.to_string(),
                    d.title.clone(),
                    d.category.clone().unwrap_or_default(),
                    d.file_name.clone(),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Percentage(35),
                Constraint::Percentage(20),
                Constraint::Percentage(30),
            ],
        )
        .header(
            Row::new(vec!["Uploaded", "Title", "Category", "File"])
                .style(Style::default().fg(palette::INFO).add_modifier(Modifier::BOLD)),
        )
        .style(Style::default().fg(palette::TEXT))
        .block(self.panel("Documents"));
        frame.render_widget(table, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn client() -> ApiClient {
        ApiClient::new(
            &ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
            },
            None,
        )
    }

    fn patient_without_email() -> Patient {
        Patient {
            id: 7,
            first_name: "June".to_string(),
            last_name: "Park".to_string(),
            email: None,
            phone: None,
            date_of_birth: None,
            age: None,
            address: None,
            avatar_url: None,
        }
    }

    #[test]
    fn picker_renders_a_patient_with_no_email_on_file() {
        let mut records = Records::new(client(), Role::Doctor);
        records.patients = vec![patient_without_email()];
        records.picker_state.select(Some(0));

        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal.draw(|frame| records.render(frame)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("June Park"));
    }
}
