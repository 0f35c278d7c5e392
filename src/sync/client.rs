//! HTTP client for the stats server.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use statkeeper_core::{League, SubmissionPayload, Team};
use tracing::{debug, error, info, instrument};

use crate::sync::{GameUploader, SyncError, TeamDirectory};

/// Talks to the stats server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSyncClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSyncClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the HTTP client cannot be built.
    #[instrument(skip(base_url), fields(base_url = %base_url.as_ref()))]
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Server base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self))]
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read response");
            SyncError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            return Err(SyncError::http(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(error = ?e, response = %body, "Failed to parse response");
            SyncError::new(format!("Failed to parse response from {}: {}", path, e))
        })
    }
}

#[async_trait]
impl GameUploader for HttpSyncClient {
    #[instrument(skip(self, payload), fields(league_id = payload.league_id(), week = payload.week()))]
    async fn upload(&self, payload: &SubmissionPayload) -> Result<Option<i64>, SyncError> {
        let url = format!("{}/submit_game", self.base_url);
        debug!(url = %url, points = payload.points().len(), "Submitting game");
        let response = self.client.post(&url).json(payload).send().await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(SyncError::http(status.as_u16(), &body));
        }

        let server_id = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["id"].as_i64());
        info!(status = %status, server_id = ?server_id, "Game submitted");
        Ok(server_id)
    }
}

#[async_trait]
impl TeamDirectory for HttpSyncClient {
    #[instrument(skip(self))]
    async fn leagues(&self) -> Result<Vec<League>, SyncError> {
        let leagues: Vec<League> = self.get_json("/api/leagues").await?;
        info!(count = leagues.len(), "Leagues loaded");
        Ok(leagues)
    }

    #[instrument(skip(self))]
    async fn teams(&self, league_id: i64) -> Result<Vec<Team>, SyncError> {
        let teams: Vec<Team> = self.get_json(&format!("/api/{}/teams", league_id)).await?;
        info!(count = teams.len(), "Teams loaded");
        Ok(teams)
    }
}
