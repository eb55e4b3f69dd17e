//! The clinic application: one component per business area, with this
//! module routing input and rendering to whichever page is active.
//!
//! Every page follows the same shape: fetch on activation into local
//! state, client-side filter/sort over the fetched array, forms that
//! post back to the API, and a transient status line for feedback. A 401
//! from any call bubbles out of here as `SelectedPage::Logout` so the
//! app can clear the session.

use crate::api::{ApiClient, ApiError};
use crate::app::SelectedPage;
use crate::components::Component;
use crate::models::User;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;

pub mod appointments;
pub mod billing;
pub mod invitations;
pub mod messages;
pub mod patients;
pub mod profile;
pub mod records;
pub mod staff;
pub mod telehealth;

/// Which page is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClinicState {
    Patients,
    Appointments,
    Calendar,
    Records,
    Billing,
    Messages,
    Telehealth,
    Staff,
    Invitations,
    Profile,
}

pub struct ClinicApp {
    pub state: ClinicState,
    pub patients: patients::Patients,
    pub appointments: appointments::Appointments,
    pub records: records::Records,
    pub billing: billing::Billing,
    pub messages: messages::Messages,
    pub telehealth: telehealth::Telehealth,
    pub staff: staff::Staff,
    pub invitations: invitations::Invitations,
    pub profile: profile::Profile,
}

/// Maps an activation-time API failure: 401 forces logout, anything else
/// was already captured as an on-page status message.
fn escalate(result: Result<(), ApiError>) -> Result<Option<SelectedPage>> {
    match result {
        Ok(()) => Ok(None),
        Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
        // Pages keep non-auth errors to themselves; reaching this arm
        // means a page leaked one, which we still present as a status.
        Err(_) => Ok(None),
    }
}

impl ClinicApp {
    pub fn new(api: ApiClient, user: User) -> Self {
        Self {
            state: ClinicState::Patients,
            patients: patients::Patients::new(api.clone()),
            appointments: appointments::Appointments::new(api.clone()),
            records: records::Records::new(api.clone(), user.role),
            billing: billing::Billing::new(api.clone()),
            messages: messages::Messages::new(api.clone()),
            telehealth: telehealth::Telehealth::new(api.clone()),
            staff: staff::Staff::new(api.clone()),
            invitations: invitations::Invitations::new(api.clone()),
            profile: profile::Profile::new(api, user),
        }
    }

    /// Switches to a page and performs its fetch-on-activation.
    pub fn activate(&mut self, state: ClinicState) -> Result<Option<SelectedPage>> {
        self.state = state;
        match state {
            ClinicState::Patients => escalate(self.patients.refresh()),
            ClinicState::Appointments => escalate(self.appointments.open_list()),
            ClinicState::Calendar => escalate(self.appointments.open_calendar()),
            ClinicState::Records => escalate(self.records.open()),
            ClinicState::Billing => escalate(self.billing.refresh()),
            ClinicState::Messages => escalate(self.messages.refresh()),
            ClinicState::Telehealth => escalate(self.telehealth.refresh()),
            ClinicState::Staff => escalate(self.staff.refresh()),
            ClinicState::Invitations => escalate(self.invitations.refresh()),
            ClinicState::Profile => {
                self.profile.open();
                Ok(None)
            }
        }
    }

    fn active_mut(&mut self) -> &mut dyn Component {
        match self.state {
            ClinicState::Patients => &mut self.patients,
            ClinicState::Appointments | ClinicState::Calendar => &mut self.appointments,
            ClinicState::Records => &mut self.records,
            ClinicState::Billing => &mut self.billing,
            ClinicState::Messages => &mut self.messages,
            ClinicState::Telehealth => &mut self.telehealth,
            ClinicState::Staff => &mut self.staff,
            ClinicState::Invitations => &mut self.invitations,
            ClinicState::Profile => &mut self.profile,
        }
    }

    fn active(&self) -> &dyn Component {
        match self.state {
            ClinicState::Patients => &self.patients,
            ClinicState::Appointments | ClinicState::Calendar => &self.appointments,
            ClinicState::Records => &self.records,
            ClinicState::Billing => &self.billing,
            ClinicState::Messages => &self.messages,
            ClinicState::Telehealth => &self.telehealth,
            ClinicState::Staff => &self.staff,
            ClinicState::Invitations => &self.invitations,
            ClinicState::Profile => &self.profile,
        }
    }
}

impl Component for ClinicApp {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        self.active_mut().handle_input(event)
    }

    fn tick(&mut self) {
        self.active_mut().tick();
    }

    fn render(&self, frame: &mut Frame) {
        self.active().render(frame);
    }
}
