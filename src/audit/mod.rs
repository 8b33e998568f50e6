//! Per-application audit pipeline: extract the page view, classify it,
//! normalize the database view, and reconcile the two into one verdict.
//!
//! Everything here is pure computation over an already-parsed page and
//! already-fetched rows; fetching, pacing, and the output sink belong to
//! the caller.

pub mod classify;
pub mod db;
pub mod domain;
pub mod extract;
pub mod owners;
pub mod reconcile;

use std::sync::Arc;

use scraper::Html;
use serde::Serialize;
use tracing::{debug, info, warn};

use self::classify::faults;
use self::db::{normalizer, StatusRowSource};
use self::domain::{Conclusion, ConclusionCategory, TimestampText};
use self::extract::ExtractError;
use self::owners::ErrorOwnerMap;

/// Final, serializable outcome for one application record. The caller owns
/// the output slot this is written into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub request_no: String,
    pub conclusion: Conclusion,
    pub deadline: Option<String>,
}

/// Composes the extractor, classifier, normalizer, and reconciliation
/// engine over an injected row source. Stateless between applications.
pub struct AuditService<S> {
    rows: Arc<S>,
    owners: ErrorOwnerMap,
}

impl<S> AuditService<S>
where
    S: StatusRowSource,
{
    pub fn new(rows: Arc<S>, owners: ErrorOwnerMap) -> Self {
        Self { rows, owners }
    }

    /// Page-only conclusion plus the extracted deadline. A structurally
    /// broken page becomes an `Error`-category conclusion for this one
    /// application; it never aborts the run.
    pub fn page_conclusion(&self, page: &Html) -> (Conclusion, Option<TimestampText>) {
        let history = match extract::status_history(page) {
            Ok(history) => history,
            Err(error @ ExtractError::MalformedDocument { .. }) => {
                warn!(%error, "status page rejected");
                return (Conclusion::error(format!("Error: {error}")), None);
            }
        };

        let deadline = extract::deadline(page);
        let conclusion = classify::classify(&history, deadline.as_ref());

        let signals = extract::error_signals(page);
        for signal in signals.iter().filter(|signal| faults::is_fault(signal)) {
            debug!(
                queue_type = %signal.queue_type,
                owner = self.owners.owner_for(&signal.message),
                message = %signal.message,
                "queue fault observed"
            );
        }
        let clause = faults::fault_clause(&signals);

        (faults::apply_review_policy(conclusion, &clause), deadline)
    }

    /// Full audit of one application: page conclusion, then the database
    /// view where the precedence rules call for it.
    pub fn conclude(&self, page: &Html, request_no: &str) -> Verdict {
        let (page_conclusion, deadline) = self.page_conclusion(page);

        // A broken page is terminal for this application; late deliveries
        // and ineligible request numbers never consult the database. In all
        // three cases the rows are not even fetched.
        let conclusion = if page_conclusion.category == ConclusionCategory::Error
            || reconcile::is_delivered_late_variant(&page_conclusion.text)
            || !reconcile::eligible_for_db_lookup(request_no)
        {
            page_conclusion
        } else {
            let db_view = normalizer::normalize(self.rows.fetch_history(request_no));
            reconcile::reconcile(&page_conclusion, &db_view, deadline.as_ref(), request_no)
        };

        info!(request_no, conclusion = %conclusion.text, "application audited");

        Verdict {
            request_no: request_no.to_string(),
            conclusion,
            deadline: deadline.map(TimestampText::into_inner),
        }
    }
}
