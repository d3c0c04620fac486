use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::domain::{
    Activity, ActivityId, ActivityKind, ApplicationId, ApplicationStatus, ChecklistItem,
    FollowUp, InterviewRound, JobApplication, Priority, RoundId, RoundOutcome,
};
use crate::workflows::followups::{FollowUpDue, FollowUpQueueEntry};

/// Compact list row for an application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub company: String,
    pub role: String,
    pub status: ApplicationStatus,
    pub priority: Priority,
    pub date_applied: NaiveDate,
    pub last_contacted: Option<NaiveDate>,
    pub tags: Vec<String>,
}

impl From<&JobApplication> for ApplicationSummary {
    fn from(application: &JobApplication) -> Self {
        Self {
            id: application.id.clone(),
            company: application.company.clone(),
            role: application.role.clone(),
            status: application.status,
            priority: application.priority,
            date_applied: application.date_applied,
            last_contacted: application.last_contacted,
            tags: application.tags.clone(),
        }
    }
}

/// Checklist completion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChecklistProgress {
    pub done: usize,
    pub total: usize,
}

impl ChecklistProgress {
    pub fn of<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a ChecklistItem>,
    {
        items.into_iter().fold(Self::default(), |mut progress, item| {
            progress.total += 1;
            if item.is_done {
                progress.done += 1;
            }
            progress
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
    #[serde(flatten)]
    pub round: InterviewRound,
    pub checklist: Vec<ChecklistItem>,
    pub progress: ChecklistProgress,
}

/// Everything shown on a single application's page.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    pub application: JobApplication,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<FollowUpView>,
    pub activities: Vec<Activity>,
    pub follow_ups: Vec<FollowUp>,
    pub rounds: Vec<RoundView>,
    pub checklist: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowUpView {
    #[serde(flatten)]
    pub due: FollowUpDue,
    pub label: String,
}

impl From<FollowUpDue> for FollowUpView {
    fn from(due: FollowUpDue) -> Self {
        Self {
            label: due.urgency.label(),
            due,
        }
    }
}

/// Activity joined with the application it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub activity_id: ActivityId,
    pub application_id: ApplicationId,
    pub company: String,
    pub role: String,
    pub kind: ActivityKind,
    pub title: String,
    pub occurred_at: NaiveDate,
}

impl TimelineEntry {
    pub fn new(activity: &Activity, application: &JobApplication) -> Self {
        Self {
            activity_id: activity.id.clone(),
            application_id: activity.application_id.clone(),
            company: application.company.clone(),
            role: application.role.clone(),
            kind: activity.kind,
            title: activity.title.clone(),
            occurred_at: activity.occurred_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub total: usize,
    pub in_interview: usize,
    pub offers: usize,
    pub follow_ups_overdue: usize,
    pub recent_applications: Vec<ApplicationSummary>,
    pub follow_ups: Vec<FollowUpQueueEntry>,
    pub recent_activity: Vec<TimelineEntry>,
}

/// Pending interview round with its application context.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewEntry {
    pub round_id: RoundId,
    pub application_id: ApplicationId,
    pub company: String,
    pub role: String,
    pub round_number: u8,
    pub scheduled_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub outcome: RoundOutcome,
    pub progress: ChecklistProgress,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InterviewSchedule {
    pub scheduled: Vec<InterviewEntry>,
    pub unscheduled: Vec<InterviewEntry>,
}
