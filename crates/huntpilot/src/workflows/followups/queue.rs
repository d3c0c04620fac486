use chrono::NaiveDate;
use serde::Serialize;

use super::{FollowUpDue, FollowUpUrgency};
use crate::workflows::applications::domain::{ApplicationId, ApplicationStatus, JobApplication};

/// One row of the follow-up queue.
#[derive(Debug, Clone, Serialize)]
pub struct FollowUpQueueEntry {
    pub application_id: ApplicationId,
    pub company: String,
    pub role: String,
    pub status: ApplicationStatus,
    pub base_date: NaiveDate,
    pub due_at: NaiveDate,
    pub urgency: FollowUpUrgency,
    pub urgency_label: String,
}

impl FollowUpQueueEntry {
    fn new(application: &JobApplication, due: FollowUpDue) -> Self {
        Self {
            application_id: application.id.clone(),
            company: application.company.clone(),
            role: application.role.clone(),
            status: application.status,
            base_date: application.follow_up_base(),
            due_at: due.due_at,
            urgency: due.urgency,
            urgency_label: due.urgency.label(),
        }
    }
}

/// Applications with a cadence, soonest due first.
pub fn build_follow_up_queue<'a, I>(applications: I, today: NaiveDate) -> Vec<FollowUpQueueEntry>
where
    I: IntoIterator<Item = &'a JobApplication>,
{
    let mut entries: Vec<FollowUpQueueEntry> = applications
        .into_iter()
        .filter_map(|application| {
            application
                .follow_up(today)
                .map(|due| FollowUpQueueEntry::new(application, due))
        })
        .collect();

    entries.sort_by_key(|entry| entry.due_at);
    entries
}
