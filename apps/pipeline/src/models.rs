use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Placeholder stored when a listing carries no company name.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";
/// Placeholder stored when a listing carries no location.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// A persisted job posting. Immutable once created: never mutated, never
/// deleted. `link` is the dedup key (UNIQUE across all postings).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Posting {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
    pub source: String,
    pub scraped_at: DateTime<Utc>,
}

/// The insertable subset of a posting. `id` and `scraped_at` are assigned by
/// the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PostingDraft {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
    pub source: String,
}

/// Terminal outcome: the posting matched the user profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RelevantVerdict {
    pub id: i64,
    pub posting_id: i64,
    pub score: i32,
    pub summary: String,
    pub evaluated_at: DateTime<Utc>,
}

/// Terminal outcome: the posting did not match the user profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RejectedVerdict {
    pub id: i64,
    pub posting_id: i64,
    pub reason: String,
    pub evaluated_at: DateTime<Utc>,
}

/// Raw listing as returned by the scraper gateway. Every field is optional;
/// normalization decides what is salvageable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawListing {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub external_url: Option<String>,
}
