use chrono::NaiveDateTime;

use super::super::domain::TimestampText;

/// Inclusive boundary: completing exactly at the deadline counts as on time.
pub(crate) fn on_time(completion: NaiveDateTime, deadline: NaiveDateTime) -> bool {
    completion <= deadline
}

/// Compares two raw timestamp cells. Absent or empty input on either side is
/// "not on time", as is a completion cell holding a non-date placeholder such
/// as `currentState`. A timestamp that fails to parse is likewise treated as
/// not on time rather than surfaced as an error.
pub fn met_deadline(completion: Option<&TimestampText>, deadline: Option<&TimestampText>) -> bool {
    let (Some(completion), Some(deadline)) = (completion, deadline) else {
        return false;
    };

    if !completion.looks_like_timestamp() {
        return false;
    }

    match (completion.parse(), deadline.parse()) {
        (Some(completed_at), Some(due_at)) => on_time(completed_at, due_at),
        _ => false,
    }
}
