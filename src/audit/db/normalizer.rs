//! Collapses the raw relational status history into one canonical label.
//! Faults never escape this boundary: every outcome, including a failed
//! query, is a valid conclusion string.

use super::super::domain::{labels, DbStatusRecord};
use super::{DbConclusion, DbLookupError};

/// Transient payment states that never count as the substantive status.
const PAYMENT_STATES: [&str; 2] = ["PAYED", "WAITING_FOR_PAYMENT"];

const TECH_ERROR: &str = "TECH_ERROR";

fn is_payment_state(status: &str) -> bool {
    PAYMENT_STATES.contains(&status)
}

/// Maps the resolved substantive status to its canonical label. An
/// unresolved status (all rows were payment states) falls through to the
/// no-mapping label like any unknown status.
fn map_status(resolved: Option<&str>) -> &'static str {
    match resolved {
        Some("IN_PROCESSING") => labels::IN_PROGRESS_REVIEW,
        Some("SENT") | Some("ACCEPTED") => labels::SECONDARY_REVIEW,
        Some("COMPLETED") | Some("CANCELLED") | Some("APPROVED") => labels::DB_FINISHED,
        Some("CREATED") => labels::DB_REGISTERED,
        _ => labels::DB_NO_MAPPING,
    }
}

pub fn normalize(lookup: Result<Vec<DbStatusRecord>, DbLookupError>) -> DbConclusion {
    let rows = match lookup {
        Ok(rows) => rows,
        Err(DbLookupError::ConnectionUnavailable) => {
            return DbConclusion {
                label: labels::DB_CONNECTION_ERROR.to_string(),
                resolved_status: None,
                completed_at: None,
            }
        }
        Err(DbLookupError::Query(detail)) => {
            return DbConclusion {
                label: format!("{}{detail}", labels::DB_QUERY_ERROR_PREFIX),
                resolved_status: None,
                completed_at: None,
            }
        }
    };

    let Some(most_recent) = rows.first() else {
        return DbConclusion {
            label: labels::DB_NO_HISTORY.to_string(),
            resolved_status: None,
            completed_at: None,
        };
    };

    // Last status wins unless it is a payment state, in which case the scan
    // walks the older rows for the first substantive one; exhausting the
    // rows leaves the status unresolved.
    let resolved = if is_payment_state(&most_recent.status) {
        rows[1..]
            .iter()
            .map(|row| row.status.as_str())
            .find(|status| !is_payment_state(status))
    } else {
        Some(most_recent.status.as_str())
    };

    let mut label = map_status(resolved).to_string();
    if rows.iter().any(|row| row.status == TECH_ERROR) {
        label.push_str(labels::DB_TECH_ERROR_SUFFIX);
    }

    DbConclusion {
        label,
        resolved_status: resolved.map(str::to_string),
        completed_at: most_recent.created_at,
    }
}
