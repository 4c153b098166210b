//! Roles and route authorization.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Account role attached to a session.
///
/// Closed set shared by both hosted applications. The storefront only ever
/// issues `Customer` and `Admin`; the portal's identity provider issues the
/// rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Customer,
    Admin,
    Setter,
    Getter,
    Super,
}

/// Guarded surfaces a route can ask about before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Public catalog and cart. Open to everyone.
    Storefront,
    /// Order history and checkout return page.
    CustomerDashboard,
    /// Book and order management.
    AdminDashboard,
    /// Paper submission dashboard.
    SetterDashboard,
    /// Paper request dashboard.
    GetterDashboard,
    /// Cross-role audit view.
    SuperDashboard,
}

/// Result of an authorization check.
///
/// `Pending` is reported while the persisted session is still being
/// restored, so guards can hold rendering instead of redirecting a user
/// who is about to be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Pending,
    Granted,
    Denied,
}

impl Role {
    /// Whether this role may enter the given section.
    ///
    /// `Super` spans every portal dashboard, and `Admin` also covers the
    /// customer-facing storefront surfaces.
    #[must_use]
    pub const fn can_access(self, section: Section) -> bool {
        match section {
            Section::Storefront => true,
            Section::CustomerDashboard => {
                matches!(self, Self::Customer | Self::Admin | Self::Super)
            }
            Section::AdminDashboard => matches!(self, Self::Admin | Self::Super),
            Section::SetterDashboard => matches!(self, Self::Setter | Self::Super),
            Section::GetterDashboard => matches!(self, Self::Getter | Self::Super),
            Section::SuperDashboard => matches!(self, Self::Super),
        }
    }

    /// Wire representation, as sent in portal query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::Setter => "setter",
            Self::Getter => "getter",
            Self::Super => "super",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
