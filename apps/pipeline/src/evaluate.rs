//! Evaluation runner — Job Store (unevaluated snapshot) → Classifier → Job
//! Store (verdict).
//!
//! One run per interval tick: `Idle -> Connecting -> FetchUnevaluated ->
//! PerPostingClassify -> Idle`. The unevaluated set is fetched once at run
//! start; postings ingested mid-run wait for the next run. Classifications
//! are strictly sequential to respect the external API's rate limits.
//!
//! A classification failure never writes a verdict: the posting stays
//! unevaluated and is retried on the next run. Parse failures and rejections
//! are different things — only the model saying "not relevant" produces a
//! rejected verdict.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::classifier::{Classifier, Profile};
use crate::errors::{RunError, StoreError};
use crate::store::JobStore;

/// Counters for one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Size of the unevaluated snapshot at run start.
    pub fetched: usize,
    pub relevant: usize,
    pub rejected: usize,
    /// Classification failures; these postings stay unevaluated.
    pub failed: usize,
    /// Verdict inserts that hit an existing verdict; skipped, not retried.
    pub skipped: usize,
}

pub struct EvaluationRunner {
    store: Arc<dyn JobStore>,
    classifier: Arc<dyn Classifier>,
    profile: Profile,
    /// Pause between classifications. Policy knob, not a correctness
    /// requirement.
    pacing: Duration,
}

impl EvaluationRunner {
    pub fn new(
        store: Arc<dyn JobStore>,
        classifier: Arc<dyn Classifier>,
        profile: Profile,
        pacing: Duration,
    ) -> Self {
        Self {
            store,
            classifier,
            profile,
            pacing,
        }
    }

    /// Executes one evaluation run.
    pub async fn run(&self) -> Result<EvaluationReport, RunError> {
        self.store.ping().await.map_err(RunError::Store)?;

        let postings = self.store.select_unevaluated().await.map_err(RunError::Store)?;
        info!("Found {} unevaluated postings", postings.len());

        let mut report = EvaluationReport {
            fetched: postings.len(),
            ..Default::default()
        };

        for posting in &postings {
            match self.classifier.classify(posting, &self.profile).await {
                Ok(verdict) => {
                    let outcome = if verdict.is_relevant {
                        self.store
                            .insert_relevant_verdict(
                                posting.id,
                                i32::from(verdict.score),
                                &verdict.summary,
                            )
                            .await
                    } else {
                        self.store
                            .insert_rejected_verdict(posting.id, &verdict.reason)
                            .await
                    };

                    match outcome {
                        Ok(_) if verdict.is_relevant => {
                            info!(
                                "Posting {} marked relevant (score {})",
                                posting.id, verdict.score
                            );
                            report.relevant += 1;
                        }
                        Ok(_) => {
                            info!("Posting {} marked rejected", posting.id);
                            report.rejected += 1;
                        }
                        Err(StoreError::Constraint(msg)) => {
                            // Should not happen given the single-pass design.
                            warn!(
                                "Verdict already recorded for posting {}: {msg}",
                                posting.id
                            );
                            report.skipped += 1;
                        }
                        Err(e) => return Err(RunError::Store(e)),
                    }
                }
                Err(e) => {
                    warn!("Classification failed for posting {}: {e}", posting.id);
                    report.failed += 1;
                }
            }

            // Pace the failure path too: a failed classification has already
            // hit the endpoint, up to once per retry attempt.
            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        info!(
            "Evaluation run complete: {} fetched, {} relevant, {} rejected, {} failed, {} skipped",
            report.fetched, report.relevant, report.rejected, report.failed, report.skipped
        );
        Ok(report)
    }
}
