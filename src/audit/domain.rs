use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Canonical fractional-seconds format used by both the status page and the
/// database history, e.g. `2024-04-10 18:00:00.000`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Canonical conclusion vocabulary. Every verdict the crate emits is built
/// from these strings so the reconciliation engine can compare them verbatim.
pub mod labels {
    pub const NO_STATUS_DATA: &str = "No status data";
    pub const SERVICE_IN_PROGRESS: &str = "Service in progress";
    pub const DELIVERED_ON_TIME: &str = "Delivered on time";
    pub const DELIVERED_LATE: &str = "Delivered late";
    pub const COMPLETED_UNVERIFIABLE: &str = "Completed (deadline unverifiable)";
    pub const CANCELLED: &str = "Cancelled";
    pub const NOT_DELIVERED_TO_EXECUTOR: &str = "Not delivered to the executor";
    pub const ACCEPTED_FROM_APPLICANT: &str = "Accepted from applicant";
    pub const STAGE_B_NOT_ROUTED: &str = "Operator did not route through stage B";
    pub const IN_PROGRESS: &str = "In progress";
    pub const SECONDARY_REVIEW: &str = "Route to secondary review queue";
    pub const UNDETERMINED_SEQUENCE_PREFIX: &str = "Undetermined sequence: ";

    /// Appended to review-eligible conclusions when no fault clause fired.
    pub const REVIEW_SUFFIX: &str = ", refer to originating office.";
    pub const IN_PROGRESS_REVIEW: &str = "In progress, refer to originating office.";
    pub const DELIVERED_LATE_REVIEW: &str = "Delivered late, refer to originating office.";

    pub const DB_FINISHED: &str = "FINISHED";
    pub const DB_REGISTERED: &str = "REGISTERED";
    pub const DB_NO_MAPPING: &str = "No mapping found";
    pub const DB_NO_HISTORY: &str = "No history for this request number";
    pub const DB_CONNECTION_ERROR: &str = "Database connection error";
    pub const DB_QUERY_ERROR_PREFIX: &str = "Query error: ";
    pub const DB_TECH_ERROR_SUFFIX: &str = ". Has TECH_ERROR";

    /// Appended when the database proves completion the status page does not show.
    pub const VISIBILITY_CAVEAT: &str =
        " Completion is recorded in the database but not reflected on the status page.";
}

/// Raw timestamp text as it appeared in a table cell.
///
/// The original cell text is retained instead of an eagerly parsed datetime
/// because the deadline check must distinguish an absent timestamp (deadline
/// unverifiable) from a present placeholder such as `currentState` (treated
/// as missing the deadline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampText(String);

impl TimestampText {
    /// Builds from a table cell, discarding whitespace-only cells.
    pub fn from_cell(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// True when the text is composed only of digits and timestamp
    /// separators, i.e. could plausibly be a timestamp rather than a
    /// placeholder label.
    pub fn looks_like_timestamp(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '-' | ':' | '.' | ' '))
    }

    pub fn parse(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, TIMESTAMP_FORMAT).ok()
    }
}

/// One recorded status transition from the status page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: String,
    pub recorded_at: Option<TimestampText>,
}

/// Chronological (oldest first) sequence of status transitions for one
/// application. Constructed once by the extractor and never mutated; rows
/// with an empty status never make it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistory(Vec<StatusEvent>);

impl StatusHistory {
    pub fn new(events: Vec<StatusEvent>) -> Self {
        debug_assert!(events.iter().all(|event| !event.status.is_empty()));
        Self(events)
    }

    pub fn events(&self) -> &[StatusEvent] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// One row of the notification-queue table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSignal {
    pub queue_type: String,
    pub message: String,
}

/// One row of the relational status history, newest first as delivered by
/// the row source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStatusRecord {
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
}

/// Coarse classification backing the reconciliation branches. Derived
/// one-to-one from the canonical text at construction time and preserved
/// through suffix appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConclusionCategory {
    Accepted,
    InProgress,
    Delivered,
    DeliveredLate,
    DeliveredOnTime,
    Cancelled,
    Undetermined,
    Error,
}

/// The externally visible verdict for one application. The text is the
/// artifact; the category only drives reconciliation branching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conclusion {
    pub text: String,
    pub category: ConclusionCategory,
}

impl Conclusion {
    pub fn new(text: impl Into<String>, category: ConclusionCategory) -> Self {
        let text = text.into();
        debug_assert!(!text.is_empty());
        Self { text, category }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, ConclusionCategory::Error)
    }

    pub fn undetermined(text: impl Into<String>) -> Self {
        Self::new(text, ConclusionCategory::Undetermined)
    }

    /// Appends a suffix clause, keeping the base category.
    pub fn with_appended(mut self, suffix: &str) -> Self {
        self.text.push_str(suffix);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_text_discards_empty_cells() {
        assert!(TimestampText::from_cell("   ").is_none());
        assert_eq!(
            TimestampText::from_cell(" 2024-04-01 10:00:00.000 ")
                .expect("cell kept")
                .as_str(),
            "2024-04-01 10:00:00.000"
        );
    }

    #[test]
    fn placeholder_text_is_not_a_timestamp() {
        let placeholder = TimestampText::from_cell("currentState").expect("cell kept");
        assert!(!placeholder.looks_like_timestamp());
        assert!(placeholder.parse().is_none());

        let real = TimestampText::from_cell("2024-04-01 10:00:00.000").expect("cell kept");
        assert!(real.looks_like_timestamp());
        assert!(real.parse().is_some());
    }

    #[test]
    fn conclusion_suffix_keeps_category() {
        let conclusion = Conclusion::new(labels::IN_PROGRESS, ConclusionCategory::InProgress)
            .with_appended(labels::REVIEW_SUFFIX);
        assert_eq!(conclusion.text, labels::IN_PROGRESS_REVIEW);
        assert_eq!(conclusion.category, ConclusionCategory::InProgress);
    }
}
