//! Listing source — the capability that produces raw postings for a keyword.
//!
//! The actual page scraping happens in a separate browser-automation gateway
//! (Selenium lives there, not here). This module only speaks JSON over HTTP
//! to it: open a session, search per keyword, tear the session down.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::SourceError;
use crate::models::RawListing;

#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Origin tag stamped onto postings ingested from this source.
    fn origin(&self) -> &'static str;

    /// Acquires whatever session or resources searching needs. Called once
    /// at the start of each ingestion run.
    async fn setup(&mut self) -> Result<(), SourceError>;

    /// Returns the raw listings for one keyword. May fail per keyword
    /// without poisoning the session.
    async fn search(&self, keyword: &str) -> Result<Vec<RawListing>, SourceError>;

    /// Releases the session. Runs on every exit path of a run, including
    /// after a failed `setup`; must tolerate being called with nothing held.
    async fn cleanup(&mut self);
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    username: &'a str,
    password: &'a str,
    headless: bool,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session_id: String,
}

/// LinkedIn listings via the scraper gateway sidecar.
pub struct ScraperGatewaySource {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    headless: bool,
    session_id: Option<String>,
}

impl ScraperGatewaySource {
    pub fn new(base_url: String, username: String, password: String, headless: bool) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
            headless,
            session_id: None,
        }
    }
}

#[async_trait]
impl ListingSource for ScraperGatewaySource {
    fn origin(&self) -> &'static str {
        "linkedin"
    }

    async fn setup(&mut self) -> Result<(), SourceError> {
        info!("Opening scraper gateway session");
        let response = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .json(&SessionRequest {
                username: &self.username,
                password: &self.password,
                headless: self.headless,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response.json().await?;
        info!("Scraper gateway session {} established", session.session_id);
        self.session_id = Some(session.session_id);
        Ok(())
    }

    async fn search(&self, keyword: &str) -> Result<Vec<RawListing>, SourceError> {
        let session_id = self
            .session_id
            .as_deref()
            .ok_or_else(|| SourceError::Session("setup was not called".to_string()))?;

        let response = self
            .client
            .get(format!("{}/sessions/{session_id}/jobs", self.base_url))
            .query(&[("keyword", keyword)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn cleanup(&mut self) {
        if let Some(session_id) = self.session_id.take() {
            info!("Closing scraper gateway session {session_id}");
            let result = self
                .client
                .delete(format!("{}/sessions/{session_id}", self.base_url))
                .send()
                .await;
            if let Err(e) = result {
                // Best effort; the gateway reaps stale sessions on its own.
                warn!("Failed to close scraper session {session_id}: {e}");
            }
        }
    }
}
