//! Ingestion runner — Listing Source → normalization → dedup → Job Store.
//!
//! One run per interval tick: `Idle -> Connecting -> PerKeywordSearch ->
//! PerListingDedupAndPersist -> Idle`. Per-keyword and per-listing failures
//! are isolated and counted; only a store connectivity failure (or a failed
//! source setup) aborts the run. The source session is released on every
//! exit path.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::{RunError, StoreError};
use crate::models::{PostingDraft, RawListing, UNKNOWN_COMPANY, UNKNOWN_LOCATION};
use crate::source::ListingSource;
use crate::store::JobStore;

/// Counters for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Raw listings returned across all keywords.
    pub fetched: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub malformed: usize,
    pub failed_keywords: usize,
}

pub struct IngestionRunner<S: ListingSource> {
    store: Arc<dyn JobStore>,
    source: S,
    keywords: Vec<String>,
    /// Pause between persisted insertions, to pace the listing source.
    /// Policy knob, not a correctness requirement.
    insert_pacing: Duration,
}

impl<S: ListingSource> IngestionRunner<S> {
    pub fn new(
        store: Arc<dyn JobStore>,
        source: S,
        keywords: Vec<String>,
        insert_pacing: Duration,
    ) -> Self {
        Self {
            store,
            source,
            keywords,
            insert_pacing,
        }
    }

    /// Executes one ingestion run. The source is cleaned up whether the run
    /// completes, partially fails, or aborts.
    pub async fn run(&mut self) -> Result<IngestReport, RunError> {
        self.store.ping().await.map_err(RunError::Store)?;

        if let Err(e) = self.source.setup().await {
            self.source.cleanup().await;
            return Err(RunError::Source(e));
        }

        let result = self.execute().await;
        self.source.cleanup().await;
        result
    }

    async fn execute(&mut self) -> Result<IngestReport, RunError> {
        let mut report = IngestReport::default();

        for keyword in &self.keywords {
            let listings = match self.source.search(keyword).await {
                Ok(listings) => listings,
                Err(e) => {
                    warn!("Search for keyword '{keyword}' failed: {e}");
                    report.failed_keywords += 1;
                    continue;
                }
            };

            info!("Found {} listings for keyword '{keyword}'", listings.len());
            report.fetched += listings.len();

            for raw in listings {
                let Some(draft) = normalize(raw, self.source.origin()) else {
                    report.malformed += 1;
                    continue;
                };

                match self.store.exists_by_link(&draft.link).await {
                    Ok(true) => {
                        debug!("Posting already exists: {} at {}", draft.title, draft.company);
                        report.duplicates += 1;
                        continue;
                    }
                    Ok(false) => {}
                    Err(e) => return Err(RunError::Store(e)),
                }

                match self.store.insert_posting(&draft).await {
                    Ok(id) => {
                        info!("Stored posting {id}: {} at {}", draft.title, draft.company);
                        report.inserted += 1;
                        if !self.insert_pacing.is_zero() {
                            tokio::time::sleep(self.insert_pacing).await;
                        }
                    }
                    Err(StoreError::Constraint(_)) => {
                        // Lost the dedup race to a concurrent ingestor.
                        debug!("Duplicate link inserted concurrently: {}", draft.link);
                        report.duplicates += 1;
                    }
                    Err(e) => return Err(RunError::Store(e)),
                }
            }
        }

        info!(
            "Ingestion run complete: {} fetched, {} inserted, {} duplicates, {} malformed, {} failed keywords",
            report.fetched, report.inserted, report.duplicates, report.malformed, report.failed_keywords
        );
        Ok(report)
    }
}

/// Turns a raw listing into an insertable draft. Missing company and location
/// get placeholders; a listing with no usable title or link cannot be
/// identified or deduped and is dropped.
fn normalize(raw: RawListing, origin: &str) -> Option<PostingDraft> {
    let title = raw.title.filter(|t| !t.trim().is_empty())?;
    let link = raw.external_url.filter(|l| !l.trim().is_empty())?;

    Some(PostingDraft {
        title,
        company: raw
            .company
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
        location: raw
            .location
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        description: raw.description.unwrap_or_default(),
        link,
        source: origin.to_string(),
    })
}
