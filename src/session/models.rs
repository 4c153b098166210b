//! Session data models.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::{roles::Role, token::AccessToken};

/// Backend-issued account identifier.
///
/// Kept as an opaque string rather than a UUID: the storefront issues the
/// literal subject `admin` for its administrator account, and the portal's
/// identity provider issues usernames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// The authenticated identity triple persisted across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: AccessToken,
    pub user_id: UserId,
    pub role: Role,
}

/// Coarse lifecycle of the session store.
///
/// `Loading` is reported until the initial [`restore`] completes, so route
/// guards do not redirect a user whose persisted session has not been read
/// yet.
///
/// [`restore`]: crate::session::SessionStore::restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Guest,
    Authenticated,
}
