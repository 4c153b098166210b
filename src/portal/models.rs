//! Wire types for the paper portal.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::session::UserId;

/// Identifier the portal backend assigns to papers and requests. The
/// backend does not promise UUIDs here, so the id stays an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperId(String);

impl PaperId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PaperId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl From<String> for PaperId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Review lifecycle of a paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl PaperStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }
}

impl Display for PaperStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Academic level a requested paper targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperLevel {
    Undergraduate,
    Graduate,
    Phd,
}

/// A paper row as the portal returns it.
///
/// The same shape covers submitted papers and open requests; assignment
/// and review fields are filled in as the row moves through its
/// lifecycle. Requests arrive without a title until a setter picks them
/// up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: PaperId,
    #[serde(default)]
    pub title: Option<String>,
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    pub status: PaperStatus,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub expert_name: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub setter_name: Option<String>,
    #[serde(default)]
    pub requester_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Payload a setter submits for a paper.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaper {
    pub title: String,
    pub subject: String,
    pub description: String,
    pub deadline: String,
    pub setter_id: UserId,
    pub setter_name: String,
}

/// Payload a getter files to request a new paper.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRequest {
    pub subject: String,
    pub level: PaperLevel,
    pub requirements: String,
    pub deadline: String,
    pub requester_id: UserId,
    pub requester_name: String,
    pub organization: String,
}
