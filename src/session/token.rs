//! Bearer credential handling.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Opaque bearer token issued by a backend at login.
///
/// The raw value never appears in `Debug` output and the backing memory is
/// zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken {
    value: String,
}

impl AccessToken {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The raw token value, for constructing an `Authorization` header.
    #[must_use]
    pub fn reveal(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(**redacted**)")?;
        Ok(())
    }
}

impl Drop for AccessToken {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl From<String> for AccessToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
