use thiserror::Error;

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Failure modes of the job store.
///
/// `Constraint` is the only per-item recoverable variant (a lost dedup race
/// or an already-recorded verdict); anything else means the store is
/// unreachable and the current run must abort.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    Constraint(String),

    #[error("store connectivity failure: {0}")]
    Connectivity(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::Constraint(db.message().to_string());
            }
        }
        StoreError::Connectivity(e)
    }
}

/// Failure modes of the listing source (the scraper gateway).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned status {status}: {message}")]
    Gateway { status: u16, message: String },

    #[error("no active session: {0}")]
    Session(String),
}

/// Failure modes of the classifier.
///
/// None of these is ever downgraded into a rejection verdict: a posting whose
/// classification fails stays unevaluated and is retried on the next run.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("classifier returned empty content")]
    EmptyContent,

    #[error("verdict score {0} outside 0-100")]
    ScoreOutOfRange(u8),
}

/// Run-level failure. Aborts the current run after resource cleanup; the
/// interval loop logs it and waits for the next scheduled trigger.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("job store failure: {0}")]
    Store(#[from] StoreError),

    #[error("listing source failure: {0}")]
    Source(#[from] SourceError),
}
