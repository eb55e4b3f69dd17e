//! Appointment pages: list, booking form, and calendar.

use crate::api::{ApiClient, ApiResult};
use crate::app::SelectedPage;
use crate::components::Component;
use crate::models::Appointment;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;

pub mod calendar_view;
pub mod form;
pub mod list;

/// Actions an appointment sub-page can bubble up.
#[derive(Debug, Clone)]
pub enum AppointmentAction {
    BackToHome,
    BackToList,
    OpenNew,
    Edit(Box<Appointment>),
    SessionExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentsState {
    List,
    Form,
    Calendar,
}

pub struct Appointments {
    pub state: AppointmentsState,
    pub list: list::AppointmentList,
    pub form: Option<form::AppointmentForm>,
    pub calendar: calendar_view::CalendarPage,
    api: ApiClient,
}

impl Appointments {
    pub fn new(api: ApiClient) -> Self {
        Self {
            state: AppointmentsState::List,
            list: list::AppointmentList::new(api.clone()),
            form: None,
            calendar: calendar_view::CalendarPage::new(api.clone()),
            api,
        }
    }

    pub fn open_list(&mut self) -> ApiResult<()> {
        self.state = AppointmentsState::List;
        self.list.refresh()
    }

    pub fn open_calendar(&mut self) -> ApiResult<()> {
        self.state = AppointmentsState::Calendar;
        self.calendar.refresh()
    }

    fn open_form(&mut self, editing: Option<Appointment>) -> ApiResult<()> {
        let mut form = form::AppointmentForm::new(self.api.clone(), editing);
        form.load_choices()?;
        self.form = Some(form);
        self.state = AppointmentsState::Form;
        Ok(())
    }

    fn apply(&mut self, action: AppointmentAction) -> Result<Option<SelectedPage>> {
        match action {
            AppointmentAction::BackToHome => Ok(Some(SelectedPage::None)),
            AppointmentAction::BackToList => {
                self.form = None;
                match self.open_list() {
                    Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
                    _ => Ok(None),
                }
            }
            AppointmentAction::OpenNew => match self.open_form(None) {
                Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
                _ => Ok(None),
            },
            AppointmentAction::Edit(appointment) => match self.open_form(Some(*appointment)) {
                Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
                _ => Ok(None),
            },
            AppointmentAction::SessionExpired => Ok(Some(SelectedPage::Logout)),
        }
    }
}

impl Component for Appointments {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        let action = match self.state {
            AppointmentsState::List => self.list.handle_input(event)?,
            AppointmentsState::Calendar => self.calendar.handle_input(event)?,
            AppointmentsState::Form => match &mut self.form {
                Some(form) => form.handle_input(event)?,
                None => Some(AppointmentAction::BackToList),
            },
        };
        match action {
            Some(action) => self.apply(action),
            None => Ok(None),
        }
    }

    fn tick(&mut self) {
        match self.state {
            AppointmentsState::List => self.list.tick(),
            AppointmentsState::Calendar => self.calendar.tick(),
            AppointmentsState::Form => {
                if let Some(form) = &mut self.form {
                    form.tick();
                }
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        match self.state {
            AppointmentsState::List => self.list.render(frame),
            AppointmentsState::Calendar => self.calendar.render(frame),
            AppointmentsState::Form => {
                if let Some(form) = &self.form {
                    form.render(frame);
                }
            }
        }
    }
}
