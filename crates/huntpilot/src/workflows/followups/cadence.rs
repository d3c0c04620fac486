use chrono::{Days, NaiveDate};
use tracing::warn;

use crate::workflows::applications::domain::ApplicationStatus;

/// Days between touchpoints before a follow-up is due.
pub const fn cadence_days(status: ApplicationStatus) -> Option<u32> {
    match status {
        ApplicationStatus::Applied => Some(7),
        ApplicationStatus::Oa => Some(3),
        ApplicationStatus::Interview => Some(2),
        ApplicationStatus::Offer => Some(1),
        ApplicationStatus::Rejected => None,
    }
}

/// Parse a status label, treating anything unrecognized as `APPLIED`.
pub fn status_or_default(raw: &str) -> ApplicationStatus {
    ApplicationStatus::from_label(raw).unwrap_or_else(|| {
        warn!(status = raw, "unmapped status, using APPLIED cadence");
        ApplicationStatus::Applied
    })
}

/// Cadence lookup for untyped labels, e.g. rows read back from an external store.
pub fn cadence_days_for_label(raw: &str) -> Option<u32> {
    cadence_days(status_or_default(raw))
}

pub fn compute_due_at(status: ApplicationStatus, base_date: NaiveDate) -> Option<NaiveDate> {
    let cadence = cadence_days(status)?;
    base_date.checked_add_days(Days::new(u64::from(cadence)))
}

pub fn follow_up_base_date(date_applied: NaiveDate, last_contacted: Option<NaiveDate>) -> NaiveDate {
    last_contacted.unwrap_or(date_applied)
}
