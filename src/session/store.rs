//! Session store.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock, RwLockReadGuard},
};

use thiserror::Error;

use crate::session::{
    models::{Session, SessionStatus},
    roles::{Authorization, Role, Section},
    token::AccessToken,
};

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session file io error")]
    Io(#[from] io::Error),

    #[error("session file holds invalid data")]
    InvalidData(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Loading,
    Guest,
    Authenticated(Session),
}

/// Holds the current identity and persists it across restarts.
///
/// The store reports [`SessionStatus::Loading`] until [`restore`] has run,
/// so route guards can wait instead of bouncing a user whose persisted
/// session has not been read yet.
///
/// [`restore`]: SessionStore::restore
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    state: RwLock<State>,
}

impl SessionStore {
    /// A store with no backing file. The session lasts until the process
    /// exits.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(State::Loading),
        }
    }

    /// A store persisted as a JSON file at `path`.
    #[must_use]
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            state: RwLock::new(State::Loading),
        }
    }

    /// Load the persisted session, if any, and leave `Loading`.
    ///
    /// A missing backing file is a normal guest start. An unreadable or
    /// corrupt file also drops the store to guest so the application stays
    /// usable, but the failure is still reported.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing file exists but cannot be read or
    /// decoded.
    pub fn restore(&self) -> Result<SessionStatus, SessionStoreError> {
        let outcome = match &self.path {
            Some(path) => read_session(path),
            None => Ok(None),
        };

        match outcome {
            Ok(Some(session)) => {
                self.set_state(State::Authenticated(session));
                Ok(SessionStatus::Authenticated)
            }
            Ok(None) => {
                self.set_state(State::Guest);
                Ok(SessionStatus::Guest)
            }
            Err(error) => {
                self.set_state(State::Guest);
                Err(error)
            }
        }
    }

    /// Replace the current identity unconditionally and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error when writing the backing file fails. The in-memory
    /// session is updated regardless, so the login still takes effect for
    /// this process.
    pub fn login(&self, session: Session) -> Result<(), SessionStoreError> {
        let written = match &self.path {
            Some(path) => write_session(path, &session),
            None => Ok(()),
        };

        self.set_state(State::Authenticated(session));

        written
    }

    /// Clear the identity. Safe to call repeatedly or while logged out.
    ///
    /// # Errors
    ///
    /// Returns an error when removing the backing file fails.
    pub fn logout(&self) -> Result<(), SessionStoreError> {
        self.set_state(State::Guest);

        let Some(path) = &self.path else {
            return Ok(());
        };

        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SessionStoreError::Io(error)),
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match &*self.read() {
            State::Loading => SessionStatus::Loading,
            State::Guest => SessionStatus::Guest,
            State::Authenticated(_) => SessionStatus::Authenticated,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        match &*self.read() {
            State::Authenticated(session) => Some(session.clone()),
            State::Loading | State::Guest => None,
        }
    }

    /// The effective role: the session's role when authenticated, `Guest`
    /// otherwise, including while still loading.
    #[must_use]
    pub fn role(&self) -> Role {
        match &*self.read() {
            State::Authenticated(session) => session.role,
            State::Loading | State::Guest => Role::Guest,
        }
    }

    /// Token to attach as a bearer credential, when logged in.
    #[must_use]
    pub fn bearer_token(&self) -> Option<AccessToken> {
        match &*self.read() {
            State::Authenticated(session) => Some(session.token.clone()),
            State::Loading | State::Guest => None,
        }
    }

    /// The single authorization check consumed by route guards.
    #[must_use]
    pub fn authorize(&self, section: Section) -> Authorization {
        match &*self.read() {
            State::Loading => Authorization::Pending,
            State::Guest => granted_or_denied(Role::Guest, section),
            State::Authenticated(session) => granted_or_denied(session.role, section),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: State) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

const fn granted_or_denied(role: Role, section: Section) -> Authorization {
    if role.can_access(section) {
        Authorization::Granted
    } else {
        Authorization::Denied
    }
}

fn read_session(path: &Path) -> Result<Option<Session>, SessionStoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(SessionStoreError::Io(error)),
    };

    let session = serde_json::from_str(&contents).map_err(SessionStoreError::InvalidData)?;

    Ok(Some(session))
}

fn write_session(path: &Path, session: &Session) -> Result<(), SessionStoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let encoded = serde_json::to_vec(session).map_err(SessionStoreError::InvalidData)?;

    // Write a sibling first so a crash never truncates the previous file.
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &encoded)?;
    fs::rename(&temp_path, path)?;

    Ok(())
}
