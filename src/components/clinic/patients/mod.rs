//! Patient management pages.

use crate::api::{ApiClient, ApiResult};
use crate::app::SelectedPage;
use crate::components::Component;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;

pub mod add;
pub mod list;

/// Actions a patient sub-page can bubble up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientAction {
    BackToHome,
    BackToList,
    OpenAdd,
    SessionExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientsState {
    List,
    Add,
}

pub struct Patients {
    pub state: PatientsState,
    pub list: list::PatientList,
    pub add: add::AddPatient,
}

impl Patients {
    pub fn new(api: ApiClient) -> Self {
        Self {
            state: PatientsState::List,
            list: list::PatientList::new(api.clone()),
            add: add::AddPatient::new(api),
        }
    }

    /// Fetch-on-activation for the list view.
    pub fn refresh(&mut self) -> ApiResult<()> {
        self.state = PatientsState::List;
        self.list.refresh()
    }
}

impl Component for Patients {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        let action = match self.state {
            PatientsState::List => self.list.handle_input(event)?,
            PatientsState::Add => self.add.handle_input(event)?,
        };
        match action {
            Some(PatientAction::BackToHome) => Ok(Some(SelectedPage::None)),
            Some(PatientAction::BackToList) => {
                self.state = PatientsState::List;
                match self.list.refresh() {
                    Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
                    _ => Ok(None),
                }
            }
            Some(PatientAction::OpenAdd) => {
                self.add.reset();
                self.state = PatientsState::Add;
                Ok(None)
            }
            Some(PatientAction::SessionExpired) => Ok(Some(SelectedPage::Logout)),
            None => Ok(None),
        }
    }

    fn tick(&mut self) {
        match self.state {
            PatientsState::List => self.list.tick(),
            PatientsState::Add => self.add.tick(),
        }
    }

    fn render(&self, frame: &mut Frame) {
        match self.state {
            PatientsState::List => self.list.render(frame),
            PatientsState::Add => self.add.render(frame),
        }
    }
}
