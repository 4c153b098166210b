//! HTTP client for the paper portal.

use reqwest::Client;
use serde_json::json;

use crate::{
    api::{ApiError, decode},
    portal::models::{NewPaper, Paper, PaperId, PaperRequest, PaperStatus},
    session::{Role, UserId},
};

/// Connection settings for the paper portal.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the portal's REST gateway, without a trailing slash.
    pub base_url: String,
}

/// Typed client for the portal's REST surface.
///
/// The portal authenticates users out-of-band through its hosted
/// identity provider, so requests carry no bearer header; a caller's id
/// and role travel as query parameters where an endpoint needs them.
#[derive(Debug, Clone)]
pub struct PortalClient {
    config: PortalConfig,
    http: Client,
}

impl PortalClient {
    #[must_use]
    pub fn new(config: PortalConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Papers visible to one user acting in one role.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the portal rejects it.
    pub async fn papers_for(&self, user_id: &UserId, role: Role) -> Result<Vec<Paper>, ApiError> {
        let response = self
            .http
            .get(self.url("/papers"))
            .query(&[("userId", user_id.as_str()), ("role", role.as_str())])
            .send()
            .await?;

        decode(response).await
    }

    /// Every paper in the portal, for the admin and super dashboards.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the portal rejects it.
    pub async fn all_papers(&self) -> Result<Vec<Paper>, ApiError> {
        let response = self.http.get(self.url("/papers/all")).send().await?;

        decode(response).await
    }

    /// Move a paper to `status`, with reviewer feedback attached.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the portal rejects it.
    pub async fn update_paper_status(
        &self,
        paper_id: &PaperId,
        status: PaperStatus,
        feedback: &str,
    ) -> Result<Paper, ApiError> {
        let response = self
            .http
            .put(self.url(&format!("/papers/{paper_id}/status")))
            .json(&json!({ "status": status, "feedback": feedback }))
            .send()
            .await?;

        decode(response).await
    }

    /// Submit a finished paper against an open request.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the portal rejects it.
    pub async fn submit_paper(&self, paper: &NewPaper) -> Result<Paper, ApiError> {
        let response = self.http.post(self.url("/papers")).json(paper).send().await?;

        decode(response).await
    }

    /// File a request for a new paper.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the portal rejects it.
    pub async fn request_paper(&self, request: &PaperRequest) -> Result<Paper, ApiError> {
        let response = self
            .http
            .post(self.url("/requests"))
            .json(request)
            .send()
            .await?;

        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }
}
