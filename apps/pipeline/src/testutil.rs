//! In-memory doubles for the collaborator traits, shared by the runner tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::classifier::{Classifier, Profile, Verdict};
use crate::errors::{ClassifyError, SourceError, StoreError};
use crate::models::{Posting, PostingDraft, RawListing, RejectedVerdict, RelevantVerdict};
use crate::source::ListingSource;
use crate::store::JobStore;

fn connectivity_error() -> StoreError {
    StoreError::Connectivity(sqlx::Error::PoolTimedOut)
}

#[derive(Default)]
struct MemStoreInner {
    next_id: i64,
    postings: Vec<Posting>,
    relevant: Vec<RelevantVerdict>,
    rejected: Vec<RejectedVerdict>,
}

/// In-memory `JobStore` mirroring the Postgres constraints: unique posting
/// links, at most one verdict per posting. Failure toggles let tests exercise
/// the connectivity and lost-race paths.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<MemStoreInner>,
    /// When set, `ping` fails with a connectivity error.
    pub fail_ping: AtomicBool,
    /// When set, `insert_posting` fails with a connectivity error.
    pub fail_inserts: AtomicBool,
    /// When set, `insert_posting` fails with a constraint error even though
    /// `exists_by_link` said the link was absent (simulated lost dedup race).
    pub force_insert_constraint: AtomicBool,
    /// When set, verdict inserts fail with a constraint error.
    pub force_verdict_constraint: AtomicBool,
}

impl MemStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed_posting(&self, title: &str, link: &str) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.postings.push(Posting {
            id,
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: "desc".to_string(),
            link: link.to_string(),
            source: "linkedin".to_string(),
            scraped_at: Utc::now(),
        });
        id
    }

    pub fn postings(&self) -> Vec<Posting> {
        self.inner.lock().unwrap().postings.clone()
    }

    pub fn relevant(&self) -> Vec<RelevantVerdict> {
        self.inner.lock().unwrap().relevant.clone()
    }

    pub fn rejected(&self) -> Vec<RejectedVerdict> {
        self.inner.lock().unwrap().rejected.clone()
    }
}

#[async_trait]
impl JobStore for MemStore {
    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(connectivity_error());
        }
        Ok(())
    }

    async fn insert_posting(&self, draft: &PostingDraft) -> Result<i64, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(connectivity_error());
        }
        if self.force_insert_constraint.load(Ordering::SeqCst) {
            return Err(StoreError::Constraint(format!(
                "duplicate key value violates unique constraint: {}",
                draft.link
            )));
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.postings.iter().any(|p| p.link == draft.link) {
            return Err(StoreError::Constraint(format!(
                "duplicate key value violates unique constraint: {}",
                draft.link
            )));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.postings.push(Posting {
            id,
            title: draft.title.clone(),
            company: draft.company.clone(),
            location: draft.location.clone(),
            description: draft.description.clone(),
            link: draft.link.clone(),
            source: draft.source.clone(),
            scraped_at: Utc::now(),
        });
        Ok(id)
    }

    async fn exists_by_link(&self, link: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.postings.iter().any(|p| p.link == link))
    }

    async fn select_unevaluated(&self) -> Result<Vec<Posting>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let evaluated: HashSet<i64> = inner
            .relevant
            .iter()
            .map(|v| v.posting_id)
            .chain(inner.rejected.iter().map(|v| v.posting_id))
            .collect();
        Ok(inner
            .postings
            .iter()
            .filter(|p| !evaluated.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert_relevant_verdict(
        &self,
        posting_id: i64,
        score: i32,
        summary: &str,
    ) -> Result<i64, StoreError> {
        if self.force_verdict_constraint.load(Ordering::SeqCst) {
            return Err(StoreError::Constraint(
                "relevant_verdicts_posting_id_key".to_string(),
            ));
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.relevant.iter().any(|v| v.posting_id == posting_id)
            || inner.rejected.iter().any(|v| v.posting_id == posting_id)
        {
            return Err(StoreError::Constraint(
                "relevant_verdicts_posting_id_key".to_string(),
            ));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.relevant.push(RelevantVerdict {
            id,
            posting_id,
            score,
            summary: summary.to_string(),
            evaluated_at: Utc::now(),
        });
        Ok(id)
    }

    async fn insert_rejected_verdict(
        &self,
        posting_id: i64,
        reason: &str,
    ) -> Result<i64, StoreError> {
        if self.force_verdict_constraint.load(Ordering::SeqCst) {
            return Err(StoreError::Constraint(
                "rejected_verdicts_posting_id_key".to_string(),
            ));
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.relevant.iter().any(|v| v.posting_id == posting_id)
            || inner.rejected.iter().any(|v| v.posting_id == posting_id)
        {
            return Err(StoreError::Constraint(
                "rejected_verdicts_posting_id_key".to_string(),
            ));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rejected.push(RejectedVerdict {
            id,
            posting_id,
            reason: reason.to_string(),
            evaluated_at: Utc::now(),
        });
        Ok(id)
    }
}

/// Scripted `ListingSource`: fixed listings per keyword, optional per-keyword
/// and setup failures, observable cleanup.
pub struct FakeSource {
    pub responses: HashMap<String, Vec<RawListing>>,
    pub failing_keywords: HashSet<String>,
    pub fail_setup: bool,
    pub cleaned_up: Arc<AtomicBool>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            failing_keywords: HashSet::new(),
            fail_setup: false,
            cleaned_up: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_listings(mut self, keyword: &str, listings: Vec<RawListing>) -> Self {
        self.responses.insert(keyword.to_string(), listings);
        self
    }

    pub fn with_failing_keyword(mut self, keyword: &str) -> Self {
        self.failing_keywords.insert(keyword.to_string());
        self
    }
}

impl Default for FakeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingSource for FakeSource {
    fn origin(&self) -> &'static str {
        "linkedin"
    }

    async fn setup(&mut self) -> Result<(), SourceError> {
        if self.fail_setup {
            return Err(SourceError::Session("login rejected".to_string()));
        }
        Ok(())
    }

    async fn search(&self, keyword: &str) -> Result<Vec<RawListing>, SourceError> {
        if self.failing_keywords.contains(keyword) {
            return Err(SourceError::Gateway {
                status: 502,
                message: format!("search failed for '{keyword}'"),
            });
        }
        Ok(self.responses.get(keyword).cloned().unwrap_or_default())
    }

    async fn cleanup(&mut self) {
        self.cleaned_up.store(true, Ordering::SeqCst);
    }
}

/// Scripted `Classifier`: per-posting verdicts, with a set of posting ids
/// whose classification fails.
#[derive(Default)]
pub struct FakeClassifier {
    pub verdicts: HashMap<i64, Verdict>,
    pub failing: HashSet<i64>,
}

impl FakeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verdict(mut self, posting_id: i64, verdict: Verdict) -> Self {
        self.verdicts.insert(posting_id, verdict);
        self
    }

    pub fn with_failure(mut self, posting_id: i64) -> Self {
        self.failing.insert(posting_id);
        self
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(
        &self,
        posting: &Posting,
        _profile: &Profile,
    ) -> Result<Verdict, ClassifyError> {
        if self.failing.contains(&posting.id) {
            return Err(ClassifyError::EmptyContent);
        }
        self.verdicts
            .get(&posting.id)
            .cloned()
            .ok_or(ClassifyError::EmptyContent)
    }
}

pub fn relevant_verdict(score: u8, summary: &str) -> Verdict {
    Verdict {
        is_relevant: true,
        score,
        reason: String::new(),
        summary: summary.to_string(),
        skills_match: vec![],
        missing_skills: vec![],
    }
}

pub fn rejected_verdict(reason: &str) -> Verdict {
    Verdict {
        is_relevant: false,
        score: 0,
        reason: reason.to_string(),
        summary: String::new(),
        skills_match: vec![],
        missing_skills: vec![],
    }
}

pub fn raw_listing(title: &str, link: &str) -> RawListing {
    RawListing {
        title: Some(title.to_string()),
        company: Some("Acme".to_string()),
        location: Some("Remote".to_string()),
        description: Some("desc".to_string()),
        external_url: Some(link.to_string()),
    }
}

pub fn profile() -> Profile {
    Profile {
        skills: "Rust, PostgreSQL".to_string(),
        experience: "5+ years backend".to_string(),
        preferences: "Remote work".to_string(),
    }
}
