//! Application state machine: login, registration, the home menu, and
//! the clinic pages, with the session persisted across runs.

use crate::api::{ApiClient, RegisterRequest};
use crate::components::clinic::{ClinicApp, ClinicState};
use crate::components::{home::Home, login::Login, register::Register, Component};
use crate::models::User;
use crate::session::{Session, SessionStore};
use crate::tui::{self, Tui};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

/// A navigation target bubbled up from a component. `None` means "back
/// up one level" (or, from the login form, "attempt login"); `Register`
/// doubles as the registration attempt signal from the register form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedPage {
    Patients,
    Appointments,
    Calendar,
    MedicalRecords,
    Billing,
    Messages,
    Telehealth,
    Staff,
    Invitations,
    Profile,
    Register,
    Logout,
    None,
    Quit,
}

impl SelectedPage {
    /// The clinic page this selection opens, if it is one.
    fn clinic_state(self) -> Option<ClinicState> {
        match self {
            SelectedPage::Patients => Some(ClinicState::Patients),
            SelectedPage::Appointments => Some(ClinicState::Appointments),
            SelectedPage::Calendar => Some(ClinicState::Calendar),
            SelectedPage::MedicalRecords => Some(ClinicState::Records),
            SelectedPage::Billing => Some(ClinicState::Billing),
            SelectedPage::Messages => Some(ClinicState::Messages),
            SelectedPage::Telehealth => Some(ClinicState::Telehealth),
            SelectedPage::Staff => Some(ClinicState::Staff),
            SelectedPage::Invitations => Some(ClinicState::Invitations),
            SelectedPage::Profile => Some(ClinicState::Profile),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Init,
    Login,
    Register,
    Home,
    Running,
}

pub struct App {
    pub state: AppState,
    pub should_quit: bool,
    pub home: Home,
    pub login: Login,
    pub register: Register,
    /// Only exists while a clinic page is open.
    pub clinic: Option<ClinicApp>,
    api: ApiClient,
    store: SessionStore,
    session: Session,
}

impl App {
    pub fn new(api: ApiClient, store: SessionStore, session: Session) -> Self {
        Self {
            state: AppState::Init,
            should_quit: false,
            home: Home::new(),
            login: Login::new(),
            register: Register::new(),
            clinic: None,
            api,
            store,
            session,
        }
    }

    pub fn run(&mut self, tui: &mut Tui) -> Result<()> {
        self.restore_session();

        while !self.should_quit {
            tui.draw(|frame| self.render_ui(frame))?;
            self.handle_event(tui)?;
        }
        Ok(())
    }

    /// Re-validates a persisted session against the server so a stale
    /// token never fronts an apparently-logged-in UI.
    fn restore_session(&mut self) {
        if !self.session.is_authenticated() {
            self.state = AppState::Login;
            return;
        }
        match self.api.me() {
            Ok(user) => {
                info!(email = %user.email, "session restored");
                let business_name = self.session.business.as_ref().map(|b| b.name.clone());
                self.session.user = Some(user.clone());
                self.home.set_user(user, business_name);
                self.state = AppState::Home;
            }
            Err(e) if e.is_unauthorized() => {
                warn!("persisted session rejected, clearing it");
                self.drop_session();
                self.login
                    .set_error_message("Your session has expired. Please log in again.".into());
                self.state = AppState::Login;
            }
            Err(e) => {
                warn!(error = %e, "could not validate persisted session");
                self.login
                    .set_error_message(format!("Could not reach the server: {e}"));
                self.state = AppState::Login;
            }
        }
    }

    /// Carries a saved profile edit into the cached session, its on-disk
    /// copy, and the home greeting.
    fn apply_profile_update(&mut self, user: User) {
        self.session.user = Some(user.clone());
        if let Err(e) = self.store.save(&self.session) {
            warn!(error = %e, "failed to persist updated profile");
        }
        let business_name = self.session.business.as_ref().map(|b| b.name.clone());
        self.home.set_user(user, business_name);
    }

    fn handle_event(&mut self, tui: &mut Tui) -> Result<()> {
        match tui.next_event()? {
            tui::Event::Input(event) => {
                if let crossterm::event::Event::Key(key) = event {
                    // Global: Ctrl+Q quits from anywhere.
                    if key.code == KeyCode::Char('q')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        self.should_quit = true;
                        return Ok(());
                    }
                    self.handle_key(key)?;
                }
            }
            tui::Event::Tick => self.tick(),
        }
        Ok(())
    }

    fn tick(&mut self) {
        match self.state {
            AppState::Login => self.login.tick(),
            AppState::Register => self.register.tick(),
            AppState::Running => {
                if let Some(clinic) = &mut self.clinic {
                    clinic.tick();
                }
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.state {
            AppState::Init => self.state = AppState::Login,
            AppState::Login => {
                if let Some(page) = self.login.handle_input(key)? {
                    match page {
                        SelectedPage::Quit => self.should_quit = true,
                        SelectedPage::Register => self.state = AppState::Register,
                        SelectedPage::None => self.attempt_login(),
                        _ => {}
                    }
                }
            }
            AppState::Register => {
                if let Some(page) = self.register.handle_input(key)? {
                    match page {
                        SelectedPage::Register => self.attempt_register(),
                        _ => {
                            // Back to login.
                            self.state = AppState::Login;
                        }
                    }
                }
            }
            AppState::Home => {
                if let Some(page) = self.home.handle_input(key)? {
                    self.open_page(page)?;
                }
            }
            AppState::Running => {
                let Some(clinic) = &mut self.clinic else {
                    self.state = AppState::Home;
                    return Ok(());
                };
                let page = clinic.handle_input(key)?;
                if let Some(user) = clinic.profile.take_updated() {
                    self.apply_profile_update(user);
                }
                if let Some(page) = page {
                    match page {
                        SelectedPage::None => {
                            self.state = AppState::Home;
                            self.clinic = None;
                        }
                        SelectedPage::Logout => self.logout(),
                        SelectedPage::Quit => self.should_quit = true,
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn open_page(&mut self, page: SelectedPage) -> Result<()> {
        match page {
            SelectedPage::Quit => {
                self.should_quit = true;
                Ok(())
            }
            SelectedPage::Logout => {
                self.logout();
                Ok(())
            }
            page => {
                let Some(target) = page.clinic_state() else {
                    return Ok(());
                };
                let Some(user) = self.session.user.clone() else {
                    self.logout();
                    return Ok(());
                };
                let mut clinic = ClinicApp::new(self.api.clone(), user);
                let outcome = clinic.activate(target)?;
                self.clinic = Some(clinic);
                self.state = AppState::Running;
                if outcome == Some(SelectedPage::Logout) {
                    self.logout();
                }
                Ok(())
            }
        }
    }

    fn attempt_login(&mut self) {
        match self.api.login(&self.login.email, &self.login.password) {
            Ok(auth) => {
                info!(email = %auth.user.email, "logged in");
                self.session = Session {
                    auth_token: Some(auth.token),
                    user: Some(auth.user.clone()),
                    business: auth.business,
                    pharmacy: auth.pharmacy,
                };
                if let Err(e) = self.store.save(&self.session) {
                    warn!(error = %e, "failed to persist session");
                }
                let business_name = self.session.business.as_ref().map(|b| b.name.clone());
                self.home.set_user(auth.user, business_name);
                self.login = Login::new();
                self.state = AppState::Home;
            }
            Err(e) => self.login.set_error_message(e.to_string()),
        }
    }

    fn attempt_register(&mut self) {
        let request = RegisterRequest {
            name: self.register.name.clone(),
            email: self.register.email.clone(),
            password: self.register.password.clone(),
            business_name: self.register.business_name.clone(),
        };
        match self.api.register(&request) {
            Ok(auth) => {
                info!(email = %auth.user.email, "practice registered");
                // Fresh accounts log in explicitly; the register call's
                // token is not kept.
                self.api.clear_token();
                self.register.registration_success = true;
                self.login = Login::new();
                self.login
                    .set_success_message("Registration successful! Please log in.".into());
                self.register = Register::new();
                self.state = AppState::Login;
            }
            Err(e) => self.register.set_error_message(e.to_string()),
        }
    }

    /// Ends the session everywhere: server-side (best effort), on disk,
    /// and in memory.
    fn logout(&mut self) {
        if let Err(e) = self.api.logout() {
            warn!(error = %e, "server logout failed, clearing locally anyway");
        }
        self.drop_session();
        self.clinic = None;
        self.home = Home::new();
        self.login = Login::new();
        self.login
            .set_success_message("You have been logged out.".into());
        self.state = AppState::Login;
    }

    fn drop_session(&mut self) {
        self.api.clear_token();
        self.session = Session::default();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
    }

    fn render_ui(&self, frame: &mut crate::tui::Frame<'_>) {
        match self.state {
            AppState::Init => {}
            AppState::Login => self.login.render(frame),
            AppState::Register => self.register.render(frame),
            AppState::Home => self.home.render(frame),
            AppState::Running => {
                if let Some(clinic) = &self.clinic {
                    clinic.render(frame);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::models::Role;
    use tempfile::tempdir;

    fn user(name: &str, email: &str) -> User {
        User {
            id: 1,
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Doctor,
        }
    }

    #[test]
    fn profile_update_refreshes_the_session_and_its_persisted_copy() {
        let dir = tempdir().unwrap();
        let session = Session {
            auth_token: Some("token".to_string()),
            user: Some(user("Old Name", "old@clinic.example")),
            business: None,
            pharmacy: None,
        };
        let store = SessionStore::at(dir.path());
        store.save(&session).unwrap();
        let api = ApiClient::new(
            &ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
            },
            session.auth_token.clone(),
        );
        let mut app = App::new(api, store, session);

        app.apply_profile_update(user("New Name", "new@clinic.example"));

        assert_eq!(app.session.user.as_ref().unwrap().name, "New Name");
        let reloaded = SessionStore::at(dir.path()).load();
        let saved = reloaded.user.unwrap();
        assert_eq!(saved.email, "new@clinic.example");
        assert_eq!(reloaded.auth_token.as_deref(), Some("token"));
    }
}
