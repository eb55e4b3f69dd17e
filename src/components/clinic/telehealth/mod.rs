//! Telehealth: upcoming video sessions and the in-call screen.

use crate::api::{ApiClient, ApiResult};
use crate::app::SelectedPage;
use crate::components::Component;
use crate::models::TelehealthSession;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;

pub mod sessions;
pub mod video;

pub enum TelehealthAction {
    BackToHome,
    Join(Box<TelehealthSession>),
    LeaveCall,
    SessionExpired,
}

enum TelehealthState {
    Sessions,
    InCall(video::VideoCall),
}

pub struct Telehealth {
    state: TelehealthState,
    pub sessions: sessions::SessionList,
}

impl Telehealth {
    pub fn new(api: ApiClient) -> Self {
        Self {
            state: TelehealthState::Sessions,
            sessions: sessions::SessionList::new(api),
        }
    }

    pub fn refresh(&mut self) -> ApiResult<()> {
        self.state = TelehealthState::Sessions;
        self.sessions.refresh()
    }
}

impl Component for Telehealth {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        let action = match &mut self.state {
            TelehealthState::Sessions => self.sessions.handle_input(event)?,
            TelehealthState::InCall(call) => call.handle_input(event)?,
        };
        match action {
            Some(TelehealthAction::BackToHome) => Ok(Some(SelectedPage::None)),
            Some(TelehealthAction::Join(session)) => {
                self.state = TelehealthState::InCall(video::VideoCall::new(*session));
                Ok(None)
            }
            Some(TelehealthAction::LeaveCall) => {
                self.state = TelehealthState::Sessions;
                match self.sessions.refresh() {
                    Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
                    _ => Ok(None),
                }
            }
            Some(TelehealthAction::SessionExpired) => Ok(Some(SelectedPage::Logout)),
            None => Ok(None),
        }
    }

    fn tick(&mut self) {
        match &mut self.state {
            TelehealthState::Sessions => self.sessions.tick(),
            TelehealthState::InCall(call) => call.tick(),
        }
    }

    fn render(&self, frame: &mut Frame) {
        match &self.state {
            TelehealthState::Sessions => self.sessions.render(frame),
            TelehealthState::InCall(call) => call.render(frame),
        }
    }
}
