//! Turns one application's chronological status sequence into a preliminary
//! conclusion. Priority statuses decide outright; otherwise the verdict falls
//! out of how many `ACCEPTED`/`LAUNCHED` transitions were observed.

pub mod deadline;
pub mod faults;

use super::domain::{labels, Conclusion, ConclusionCategory, StatusHistory, TimestampText};

const STARTED: &str = "STARTED";
const CANCELED: &str = "CANCELED";
const ACCEPTED: &str = "ACCEPTED";
const LAUNCHED: &str = "LAUNCHED";

/// Statuses that stand for a completed delivery.
const FINAL_STATUSES: [&str; 3] = ["FINISHED", "READY", "HANDED"];

fn is_priority(status: &str) -> bool {
    status == STARTED || status == CANCELED || FINAL_STATUSES.contains(&status)
}

/// Pure, deterministic classification of a status sequence against an
/// optional deadline.
pub fn classify(history: &StatusHistory, deadline: Option<&TimestampText>) -> Conclusion {
    if history.is_empty() {
        return Conclusion::undetermined(labels::NO_STATUS_DATA);
    }

    // The most recent priority status wins over everything below; the scan
    // stops at the first match walking backward.
    for event in history.events().iter().rev() {
        let status = event.status.as_str();
        if !is_priority(status) {
            continue;
        }

        return match status {
            STARTED => Conclusion::new(labels::SERVICE_IN_PROGRESS, ConclusionCategory::InProgress),
            CANCELED => Conclusion::new(labels::CANCELLED, ConclusionCategory::Cancelled),
            _ => classify_completed(history, deadline),
        };
    }

    classify_by_counts(history)
}

/// A final status was observed somewhere in the sequence. The completion
/// time is the timestamp of the earliest final status, so re-deliveries do
/// not shift the deadline check.
fn classify_completed(history: &StatusHistory, deadline: Option<&TimestampText>) -> Conclusion {
    let completion = history
        .events()
        .iter()
        .find(|event| FINAL_STATUSES.contains(&event.status.as_str()))
        .and_then(|event| event.recorded_at.as_ref());

    match (completion, deadline) {
        (Some(completed_at), Some(due_at)) => {
            if deadline::met_deadline(Some(completed_at), Some(due_at)) {
                Conclusion::new(labels::DELIVERED_ON_TIME, ConclusionCategory::DeliveredOnTime)
            } else {
                Conclusion::new(labels::DELIVERED_LATE, ConclusionCategory::DeliveredLate)
            }
        }
        _ => Conclusion::new(
            labels::COMPLETED_UNVERIFIABLE,
            ConclusionCategory::Delivered,
        ),
    }
}

fn classify_by_counts(history: &StatusHistory) -> Conclusion {
    let statuses: Vec<&str> = history
        .events()
        .iter()
        .map(|event| event.status.as_str())
        .collect();

    // A hand-off bounced back by the executor shows up as this exact tail.
    if statuses.len() >= 3 && statuses[statuses.len() - 3..] == [ACCEPTED, LAUNCHED, ACCEPTED] {
        return Conclusion::undetermined(labels::NOT_DELIVERED_TO_EXECUTOR);
    }

    let accepted = statuses.iter().filter(|s| **s == ACCEPTED).count();
    let launched = statuses.iter().filter(|s| **s == LAUNCHED).count();

    match (accepted, launched) {
        (1, 0) => Conclusion::new(labels::ACCEPTED_FROM_APPLICANT, ConclusionCategory::Accepted),
        (2, 0) => Conclusion::new(labels::STAGE_B_NOT_ROUTED, ConclusionCategory::Accepted),
        (2, 1) => Conclusion::new(labels::IN_PROGRESS, ConclusionCategory::InProgress),
        (1, 1) => Conclusion::new(labels::SECONDARY_REVIEW, ConclusionCategory::InProgress),
        _ => Conclusion::undetermined(format!(
            "{}{}",
            labels::UNDETERMINED_SEQUENCE_PREFIX,
            statuses.join(" -> ")
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::super::domain::StatusEvent;
    use super::*;

    fn event(status: &str, recorded_at: &str) -> StatusEvent {
        StatusEvent {
            status: status.to_string(),
            recorded_at: TimestampText::from_cell(recorded_at),
        }
    }

    fn history(statuses: &[&str]) -> StatusHistory {
        StatusHistory::new(
            statuses
                .iter()
                .map(|status| event(status, "2024-04-01 10:00:00.000"))
                .collect(),
        )
    }

    fn cell(text: &str) -> TimestampText {
        TimestampText::from_cell(text).expect("non-empty cell")
    }

    #[test]
    fn empty_history_yields_no_status_data() {
        let conclusion = classify(&StatusHistory::default(), None);
        assert_eq!(conclusion.text, labels::NO_STATUS_DATA);
        assert_eq!(conclusion.category, ConclusionCategory::Undetermined);
    }

    #[test]
    fn priority_status_wins_over_counts() {
        let conclusion = classify(&history(&["ACCEPTED", "STARTED"]), None);
        assert_eq!(conclusion.text, labels::SERVICE_IN_PROGRESS);
    }

    #[test]
    fn cancellation_wins_from_the_tail() {
        let conclusion = classify(&history(&["ACCEPTED", "LAUNCHED", "CANCELED"]), None);
        assert_eq!(conclusion.text, labels::CANCELLED);
        assert_eq!(conclusion.category, ConclusionCategory::Cancelled);
    }

    #[test]
    fn completion_without_deadline_is_unverifiable() {
        let conclusion = classify(&history(&["ACCEPTED", "FINISHED"]), None);
        assert_eq!(conclusion.text, labels::COMPLETED_UNVERIFIABLE);
        assert_eq!(conclusion.category, ConclusionCategory::Delivered);
    }

    #[test]
    fn completion_at_exact_deadline_is_on_time() {
        let deadline = cell("2024-04-01 10:00:00.000");
        let conclusion = classify(&history(&["ACCEPTED", "LAUNCHED", "FINISHED"]), Some(&deadline));
        assert_eq!(conclusion.text, labels::DELIVERED_ON_TIME);
    }

    #[test]
    fn completion_after_deadline_is_late() {
        let deadline = cell("2024-03-31 10:00:00.000");
        let conclusion = classify(&history(&["ACCEPTED", "FINISHED"]), Some(&deadline));
        assert_eq!(conclusion.text, labels::DELIVERED_LATE);
        assert_eq!(conclusion.category, ConclusionCategory::DeliveredLate);
    }

    #[test]
    fn deadline_check_uses_earliest_final_status() {
        let events = StatusHistory::new(vec![
            event("ACCEPTED", "2024-04-01 09:00:00.000"),
            event("FINISHED", "2024-04-01 10:00:00.000"),
            event("HANDED", "2024-04-05 10:00:00.000"),
        ]);
        let deadline = cell("2024-04-02 00:00:00.000");
        let conclusion = classify(&events, Some(&deadline));
        assert_eq!(conclusion.text, labels::DELIVERED_ON_TIME);
    }

    #[test]
    fn placeholder_completion_timestamp_counts_as_late() {
        let events = StatusHistory::new(vec![
            event("ACCEPTED", "2024-04-01 09:00:00.000"),
            event("FINISHED", "currentState"),
        ]);
        let deadline = cell("2024-04-02 00:00:00.000");
        let conclusion = classify(&events, Some(&deadline));
        assert_eq!(conclusion.text, labels::DELIVERED_LATE);
    }

    #[test]
    fn missing_completion_timestamp_is_unverifiable() {
        let events = StatusHistory::new(vec![
            event("ACCEPTED", "2024-04-01 09:00:00.000"),
            StatusEvent {
                status: "FINISHED".to_string(),
                recorded_at: None,
            },
        ]);
        let deadline = cell("2024-04-02 00:00:00.000");
        let conclusion = classify(&events, Some(&deadline));
        assert_eq!(conclusion.text, labels::COMPLETED_UNVERIFIABLE);
    }

    #[test]
    fn single_accepted_is_accepted_from_applicant() {
        let conclusion = classify(&history(&["ACCEPTED"]), None);
        assert_eq!(conclusion.text, labels::ACCEPTED_FROM_APPLICANT);
        assert_eq!(conclusion.category, ConclusionCategory::Accepted);
    }

    #[test]
    fn double_accepted_means_stage_b_was_skipped() {
        let conclusion = classify(&history(&["ACCEPTED", "ACCEPTED"]), None);
        assert_eq!(conclusion.text, labels::STAGE_B_NOT_ROUTED);
    }

    #[test]
    fn two_accepted_one_launched_is_in_progress() {
        let conclusion = classify(&history(&["ACCEPTED", "LAUNCHED", "ACCEPTED"]), None);
        // The exact ACCEPTED, LAUNCHED, ACCEPTED tail takes precedence.
        assert_eq!(conclusion.text, labels::NOT_DELIVERED_TO_EXECUTOR);

        let conclusion = classify(&history(&["ACCEPTED", "ACCEPTED", "LAUNCHED"]), None);
        assert_eq!(conclusion.text, labels::IN_PROGRESS);
    }

    #[test]
    fn one_accepted_one_launched_routes_to_secondary_review() {
        let conclusion = classify(&history(&["ACCEPTED", "LAUNCHED"]), None);
        assert_eq!(conclusion.text, labels::SECONDARY_REVIEW);
        assert_eq!(conclusion.category, ConclusionCategory::InProgress);
    }

    #[test]
    fn unknown_combinations_list_the_whole_sequence() {
        let conclusion = classify(&history(&["ACCEPTED", "PAUSED", "ACCEPTED", "ACCEPTED"]), None);
        assert_eq!(
            conclusion.text,
            "Undetermined sequence: ACCEPTED -> PAUSED -> ACCEPTED -> ACCEPTED"
        );
        assert_eq!(conclusion.category, ConclusionCategory::Undetermined);
    }

    #[test]
    fn classification_is_deterministic() {
        let events = history(&["ACCEPTED", "LAUNCHED", "FINISHED"]);
        let deadline = cell("2024-04-02 00:00:00.000");
        let first = classify(&events, Some(&deadline));
        for _ in 0..3 {
            assert_eq!(classify(&events, Some(&deadline)), first);
        }
    }
}
