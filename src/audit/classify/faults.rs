//! Queue-level fault detection and the review-suffix policy. The fault
//! clause and the originating-office suffix are mutually exclusive on any
//! one conclusion.

use super::super::domain::{labels, Conclusion, ErrorSignal};

/// Queue types that represent a stuck or failed notification.
const FAULT_QUEUE_TYPES: [&str; 2] = ["2", "4"];

/// Conclusions that are escalated to the originating office when no
/// technical fault explains the state.
const REVIEW_ELIGIBLE: [&str; 3] = [
    labels::ACCEPTED_FROM_APPLICANT,
    labels::IN_PROGRESS,
    labels::DELIVERED_LATE,
];

pub(crate) fn is_fault(signal: &ErrorSignal) -> bool {
    FAULT_QUEUE_TYPES.contains(&signal.queue_type.as_str()) && !signal.message.is_empty()
}

/// Builds the appended fault clause from the notification-queue rows, in row
/// order. Empty when no row qualifies.
pub fn fault_clause(signals: &[ErrorSignal]) -> String {
    let messages: Vec<&str> = signals
        .iter()
        .filter(|signal| is_fault(signal))
        .map(|signal| signal.message.as_str())
        .collect();

    let Some((first, rest)) = messages.split_first() else {
        return String::new();
    };

    let mut clause = format!(". However, error - {first} .");
    for message in rest {
        clause.push_str(&format!(" Additionally, error - {message} ."));
    }
    clause
}

/// Appends exactly one of the two suffix kinds: the fault clause when one
/// was produced, otherwise the originating-office suffix for the eligible
/// conclusions.
pub fn apply_review_policy(conclusion: Conclusion, fault_clause: &str) -> Conclusion {
    if !fault_clause.is_empty() {
        return conclusion.with_appended(fault_clause);
    }

    if REVIEW_ELIGIBLE.contains(&conclusion.text.as_str()) {
        conclusion.with_appended(labels::REVIEW_SUFFIX)
    } else {
        conclusion
    }
}
