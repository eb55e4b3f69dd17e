//! Staff management pages.

use crate::api::{ApiClient, ApiResult};
use crate::app::SelectedPage;
use crate::components::Component;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;

pub mod add;
pub mod list;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffAction {
    BackToHome,
    BackToList,
    OpenAdd,
    SessionExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffState {
    List,
    Add,
}

pub struct Staff {
    pub state: StaffState,
    pub list: list::StaffList,
    pub add: add::AddStaff,
}

impl Staff {
    pub fn new(api: ApiClient) -> Self {
        Self {
            state: StaffState::List,
            list: list::StaffList::new(api.clone()),
            add: add::AddStaff::new(api),
        }
    }

    pub fn refresh(&mut self) -> ApiResult<()> {
        self.state = StaffState::List;
        self.list.refresh()
    }
}

impl Component for Staff {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        let action = match self.state {
            StaffState::List => self.list.handle_input(event)?,
            StaffState::Add => self.add.handle_input(event)?,
        };
        match action {
            Some(StaffAction::BackToHome) => Ok(Some(SelectedPage::None)),
            Some(StaffAction::BackToList) => {
                self.state = StaffState::List;
                match self.list.refresh() {
                    Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
                    _ => Ok(None),
                }
            }
            Some(StaffAction::OpenAdd) => {
                self.add.reset();
                self.state = StaffState::Add;
                Ok(None)
            }
            Some(StaffAction::SessionExpired) => Ok(Some(SelectedPage::Logout)),
            None => Ok(None),
        }
    }

    fn tick(&mut self) {
        match self.state {
            StaffState::List => self.list.tick(),
            StaffState::Add => self.add.tick(),
        }
    }

    fn render(&self, frame: &mut Frame) {
        match self.state {
            StaffState::List => self.list.render(frame),
            StaffState::Add => self.add.render(frame),
        }
    }
}
