//! Merges the page-derived and database-derived conclusions into the final
//! verdict. Rules are ordered; the first match wins.

use super::classify::deadline;
use super::db::DbConclusion;
use super::domain::{labels, Conclusion, ConclusionCategory, TimestampText};

const DELIVERED_LATE_VARIANTS: [&str; 2] = [labels::DELIVERED_LATE, labels::DELIVERED_LATE_REVIEW];

/// Raw database statuses that prove the service was completed.
const COMPLETED_DB_STATUSES: [&str; 3] = ["COMPLETED", "CANCELLED", "APPROVED"];

pub(crate) fn is_delivered_late_variant(text: &str) -> bool {
    DELIVERED_LATE_VARIANTS.contains(&text)
}

/// Format gate on the secondary lookup key: only request numbers starting
/// with `0` or `1` have a counterpart in the database.
pub fn eligible_for_db_lookup(request_no: &str) -> bool {
    request_no.starts_with('0') || request_no.starts_with('1')
}

pub fn reconcile(
    html: &Conclusion,
    db: &DbConclusion,
    deadline_cell: Option<&TimestampText>,
    request_no: &str,
) -> Conclusion {
    // Rule 1: a late delivery observed on the page is final.
    if is_delivered_late_variant(&html.text) {
        return html.clone();
    }

    // Rule 2: ineligible lookup key, the page stands alone.
    if !eligible_for_db_lookup(request_no) {
        return html.clone();
    }

    // Rule 3: both sources agree verbatim.
    if db.label == html.text {
        return html.clone();
    }

    // Rule 4: the database already routed to the secondary queue while the
    // page still shows work in progress.
    if db.label == labels::SECONDARY_REVIEW
        && (html.text == labels::IN_PROGRESS || html.text == labels::IN_PROGRESS_REVIEW)
    {
        return Conclusion::new(labels::IN_PROGRESS_REVIEW, ConclusionCategory::InProgress);
    }

    // Rule 5: the database proves completion; recheck the deadline against
    // its timestamp. Rule 1 already filtered the delivered-late variants, so
    // the visibility caveat always applies here.
    if matches!(db.resolved_status.as_deref(), Some(status) if COMPLETED_DB_STATUSES.contains(&status))
    {
        let on_time = match (db.completed_at, deadline_cell.and_then(TimestampText::parse)) {
            (Some(completed_at), Some(due_at)) => deadline::on_time(completed_at, due_at),
            _ => false,
        };

        return if on_time {
            Conclusion::new(
                format!("{}.", labels::DELIVERED_ON_TIME),
                ConclusionCategory::DeliveredOnTime,
            )
        } else {
            Conclusion::new(labels::DELIVERED_LATE_REVIEW, ConclusionCategory::DeliveredLate)
        }
        .with_appended(labels::VISIBILITY_CAVEAT);
    }

    // Rule 6: explicit disagreement report, never silently dropped.
    Conclusion::undetermined(format!("HTML: {} | DB: {}", html.text, db.label))
}
