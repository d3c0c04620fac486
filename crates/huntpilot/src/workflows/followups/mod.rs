//! Rule-based follow-up reminders.
//!
//! Each application status maps to a fixed cadence in days. The due date is
//! the last touchpoint plus that cadence, and urgency is the whole calendar
//! day distance between the due date and today. Nothing here is persisted:
//! callers recompute on every read.

mod cadence;
mod queue;
mod urgency;

pub use cadence::{
    cadence_days, cadence_days_for_label, compute_due_at, follow_up_base_date,
    status_or_default,
};
pub use queue::{build_follow_up_queue, FollowUpQueueEntry};
pub use urgency::{classify_urgency, classify_urgency_at, FollowUpUrgency, UrgencyKind};

use chrono::NaiveDate;
use serde::Serialize;

use super::applications::domain::ApplicationStatus;

/// Computed reminder for a single application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowUpDue {
    pub due_at: NaiveDate,
    pub urgency: FollowUpUrgency,
}

/// Due date and urgency for `status`, or `None` when the status has no cadence.
pub fn evaluate_follow_up(
    status: ApplicationStatus,
    base_date: NaiveDate,
    today: NaiveDate,
) -> Option<FollowUpDue> {
    let due_at = compute_due_at(status, base_date)?;
    Some(FollowUpDue {
        due_at,
        urgency: classify_urgency(due_at, today),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn evaluate_combines_due_date_and_urgency() {
        let due = evaluate_follow_up(ApplicationStatus::Applied, date(2024, 1, 1), date(2024, 1, 10))
            .expect("applied has a cadence");
        assert_eq!(due.due_at, date(2024, 1, 8));
        assert_eq!(due.urgency, FollowUpUrgency::Overdue { days_past: 2 });
    }

    #[test]
    fn evaluate_skips_rejected() {
        assert!(
            evaluate_follow_up(ApplicationStatus::Rejected, date(2024, 1, 1), date(2024, 1, 1))
                .is_none()
        );
    }
}
