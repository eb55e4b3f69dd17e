//! Session storage for the EHReezy client.
//!
//! The terminal equivalent of the web client's local storage: a small
//! JSON file holding the bearer token and the cached `user`, `business`
//! and `pharmacy` records. Written at login and registration, read at
//! startup, cleared at logout or on any 401 from the API.

use crate::models::{Business, PharmacyInfo, User};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The name of the session file, created next to the binary's working
/// directory (or under `EHREEZY_HOME` when set).
const SESSION_FILE: &str = "ehreezy-session.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub auth_token: Option<String>,
    pub user: Option<User>,
    pub business: Option<Business>,
    pub pharmacy: Option<PharmacyInfo>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some() && self.user.is_some()
    }
}

/// Owns the session file path and performs all reads/writes.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Resolves the session file location. `EHREEZY_HOME` overrides the
    /// working directory so multiple clinics can keep separate logins.
    pub fn from_env() -> Self {
        let dir = std::env::var("EHREEZY_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        Self::at(dir)
    }

    pub fn at(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_FILE),
        }
    }

    /// Loads the stored session. A missing or unreadable file is an empty
    /// session, never an error: a corrupt session just means logging in
    /// again.
    pub fn load(&self) -> Session {
        match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Session::default(),
        }
    }

    /// Persists the session after login, registration, or a profile
    /// update.
    pub fn save(&self, session: &Session) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))
    }

    /// Removes all stored credentials. Called at logout and whenever the
    /// API answers 401.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove session file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_session() -> Session {
        Session {
            auth_token: Some("tok-123".into()),
            user: Some(User {
                id: 7,
                name: "Dana Whitfield".into(),
                email: "dana@clinic.test".into(),
                role: Role::Doctor,
            }),
            business: Some(Business {
                id: 1,
                name: "Lakeside Family Care".into(),
            }),
            pharmacy: None,
        }
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path());

        store.save(&sample_session()).unwrap();
        let loaded = store.load();
        assert!(loaded.is_authenticated());
        assert_eq!(loaded.auth_token.as_deref(), Some("tok-123"));
        assert_eq!(loaded.user.unwrap().role, Role::Doctor);
    }

    #[test]
    fn missing_file_loads_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path());
        let session = store.load();
        assert!(!session.is_authenticated());
        assert!(session.auth_token.is_none());
    }

    #[test]
    fn corrupt_file_loads_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path());
        fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
        assert!(!store.load().is_authenticated());
    }

    #[test]
    fn clear_removes_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path());

        store.save(&sample_session()).unwrap();
        store.clear().unwrap();
        assert!(!store.load().is_authenticated());

        // Clearing an already-empty store must not fail.
        store.clear().unwrap();
    }
}
