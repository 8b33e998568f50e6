//! Reconciles two partial views of a government service application, the
//! status-change table of its internal HTML status page and its relational
//! status history, into one authoritative, human-readable conclusion on
//! whether the service was delivered, on time, and without technical faults.
//!
//! The crate is pure computation over already-parsed pages and
//! already-fetched rows. Fetching, connection pooling, pacing between
//! applications, and the spreadsheet the verdicts land in are all caller
//! concerns behind the [`audit::db::StatusRowSource`] boundary and the
//! [`audit::Verdict`] output.

pub mod audit;
pub mod config;
pub mod error;
pub mod telemetry;

pub use audit::domain::{Conclusion, ConclusionCategory};
pub use audit::{AuditService, Verdict};
pub use error::AppError;
