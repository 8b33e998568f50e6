//! Database-side view of an application. The row source is a collaborator
//! boundary: connection pooling, batching, and retry all live outside this
//! crate, which only distinguishes "rows", "no rows", and the two fault
//! signals it must degrade from.

pub mod normalizer;

use chrono::NaiveDateTime;

use super::domain::DbStatusRecord;

/// Supplies the relational status history for one request number, newest
/// row first. `Ok(vec![])` means the lookup worked but found nothing; the
/// error variants are genuine faults.
pub trait StatusRowSource: Send + Sync {
    fn fetch_history(&self, request_no: &str) -> Result<Vec<DbStatusRecord>, DbLookupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DbLookupError {
    /// The pooled connection is currently unavailable. The core degrades to
    /// a fixed conclusion and never retries; backoff is the caller's job.
    #[error("database connection unavailable")]
    ConnectionUnavailable,
    /// The query itself failed.
    #[error("query failed: {0}")]
    Query(String),
}

/// Normalized database verdict. `resolved_status` is the substantive raw
/// status after skipping transient payment states, kept alongside the
/// mapped label because reconciliation branches on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConclusion {
    pub label: String,
    pub resolved_status: Option<String>,
    pub completed_at: Option<NaiveDateTime>,
}
