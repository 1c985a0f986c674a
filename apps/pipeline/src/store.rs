//! Job store — durable record of postings and their evaluation outcome.
//!
//! The trait is the seam between the runners and PostgreSQL: runners hold an
//! `Arc<dyn JobStore>` so tests can substitute an in-memory double. Every
//! operation is a single self-contained statement; no cross-operation lock is
//! ever held, so the two runners can share the store freely.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::errors::StoreError;
use crate::models::{Posting, PostingDraft};

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Cheap connectivity probe. Runners call this at run start; a failure
    /// aborts the whole run rather than failing item by item.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Inserts a new posting and returns its store-assigned id.
    /// A duplicate `link` surfaces as `StoreError::Constraint`.
    async fn insert_posting(&self, draft: &PostingDraft) -> Result<i64, StoreError>;

    /// Dedup guard. Check-then-insert is race-tolerant by design: a
    /// concurrent insert between the check and the insert loses the race as a
    /// `Constraint` error, which callers count as a duplicate.
    async fn exists_by_link(&self, link: &str) -> Result<bool, StoreError>;

    /// Returns every posting with no verdict of either kind, via left
    /// anti-join. Order is unspecified; this is a work queue.
    async fn select_unevaluated(&self) -> Result<Vec<Posting>, StoreError>;

    /// Records a relevant verdict. At most one verdict per posting; a second
    /// insert for the same posting surfaces as `Constraint`.
    async fn insert_relevant_verdict(
        &self,
        posting_id: i64,
        score: i32,
        summary: &str,
    ) -> Result<i64, StoreError>;

    /// Records a rejected verdict. Same 1:1 constraint as above, mutually
    /// exclusive with a relevant verdict.
    async fn insert_rejected_verdict(
        &self,
        posting_id: i64,
        reason: &str,
    ) -> Result<i64, StoreError>;
}

/// PostgreSQL-backed job store over a shared connection pool. Connections are
/// acquired per operation and released on every exit path by the pool.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_posting(&self, draft: &PostingDraft) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO postings (title, company, location, description, link, source)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.company)
        .bind(&draft.location)
        .bind(&draft.description)
        .bind(&draft.link)
        .bind(&draft.source)
        .fetch_one(&self.pool)
        .await?;

        debug!("Inserted posting {id} ({})", draft.link);
        Ok(id)
    }

    async fn exists_by_link(&self, link: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM postings WHERE link = $1)")
                .bind(link)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn select_unevaluated(&self) -> Result<Vec<Posting>, StoreError> {
        Ok(sqlx::query_as::<_, Posting>(
            r#"
            SELECT p.id, p.title, p.company, p.location, p.description,
                   p.link, p.source, p.scraped_at
            FROM postings p
            LEFT JOIN relevant_verdicts rv ON p.id = rv.posting_id
            LEFT JOIN rejected_verdicts xv ON p.id = xv.posting_id
            WHERE rv.id IS NULL AND xv.id IS NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_relevant_verdict(
        &self,
        posting_id: i64,
        score: i32,
        summary: &str,
    ) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO relevant_verdicts (posting_id, score, summary)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(posting_id)
        .bind(score)
        .bind(summary)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn insert_rejected_verdict(
        &self,
        posting_id: i64,
        reason: &str,
    ) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO rejected_verdicts (posting_id, reason)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(posting_id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}
