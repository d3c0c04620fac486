use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use super::analytics::{build_analytics, AnalyticsView};
use super::domain::{
    Activity, ActivityId, ActivityKind, ApplicationId, ApplicationPatch, ApplicationStatus,
    ChecklistItem, ChecklistItemId, FollowUp, FollowUpId, FollowUpTemplate, InterviewRound,
    JobApplication, RoundId, RoundOutcome, TemplateId, UserId,
};
use super::repository::{ApplicationOrder, ApplicationQuery, RepositoryError, TrackerRepository};
use super::validation::{
    ActivityForm, ApplicationForm, ApplicationInput, ChecklistForm, RoundForm, TemplateForm,
    ValidationErrors,
};
use super::views::{
    ApplicationDetail, ApplicationSummary, ChecklistProgress, DashboardView, InterviewEntry,
    InterviewSchedule, RoundView, TimelineEntry,
};
use crate::workflows::followups::{build_follow_up_queue, compute_due_at, FollowUpQueueEntry};

const APPLICATION_LIST_LIMIT: usize = 100;
const FOLLOW_UP_CANDIDATE_LIMIT: usize = 200;
const TIMELINE_LIMIT: usize = 120;
const INTERVIEW_LIMIT: usize = 80;
const DETAIL_ACTIVITY_LIMIT: usize = 25;
const DETAIL_FOLLOW_UP_LIMIT: usize = 10;
const DASHBOARD_ROWS: usize = 6;
const DASHBOARD_ACTIVITY: usize = 10;
const ANALYTICS_LIMIT: usize = 5000;

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    let id = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

/// Service composing validation, the cadence engine, and the repository.
pub struct TrackerService<R> {
    repository: Arc<R>,
}

impl<R> TrackerService<R>
where
    R: TrackerRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    fn owned_application(
        &self,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<JobApplication, TrackerServiceError> {
        self.repository
            .fetch_application(owner, id)?
            .ok_or_else(|| TrackerServiceError::ApplicationNotFound(id.clone()))
    }

    /// Validate and store a new application with its opening APPLIED event.
    pub fn create_application(
        &self,
        owner: &UserId,
        form: &ApplicationForm,
    ) -> Result<JobApplication, TrackerServiceError> {
        let ApplicationInput {
            company,
            role,
            location,
            application_link,
            status,
            priority,
            salary_range,
            source,
            date_applied,
            last_contacted,
            notes,
            tags,
        } = form.validate()?;
        let application = JobApplication {
            id: ApplicationId(next_id("app")),
            owner: owner.clone(),
            company,
            role,
            location,
            application_link,
            status,
            priority,
            salary_range,
            source,
            date_applied,
            last_contacted,
            notes,
            tags,
            created_at: Utc::now(),
        };

        let opening = Activity {
            id: ActivityId(next_id("act")),
            owner: owner.clone(),
            application_id: application.id.clone(),
            kind: ActivityKind::Applied,
            title: format!("Applied to {}", application.headline()),
            occurred_at: application.date_applied,
        };

        let stored = self.repository.insert_application(application, opening)?;
        info!(application = %stored.id, status = %stored.status, "application created");
        Ok(stored)
    }

    /// Replace the editable fields of an existing application.
    pub fn update_application(
        &self,
        owner: &UserId,
        id: &ApplicationId,
        form: &ApplicationForm,
    ) -> Result<JobApplication, TrackerServiceError> {
        let input = form.validate()?;
        let existing = self.owned_application(owner, id)?;
        let updated = apply_input(existing, input);
        self.repository.replace_application(updated.clone())?;
        info!(application = %updated.id, status = %updated.status, "application updated");
        Ok(updated)
    }

    pub fn delete_application(
        &self,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<(), TrackerServiceError> {
        if self.repository.delete_application(owner, id)? {
            info!(application = %id, "application deleted");
            Ok(())
        } else {
            Err(TrackerServiceError::ApplicationNotFound(id.clone()))
        }
    }

    pub fn list_applications(
        &self,
        owner: &UserId,
        query: &ApplicationQuery,
    ) -> Result<Vec<JobApplication>, TrackerServiceError> {
        let mut query = query.clone();
        query.limit = Some(
            query
                .limit
                .map_or(APPLICATION_LIST_LIMIT, |limit| limit.min(APPLICATION_LIST_LIMIT)),
        );
        Ok(self.repository.list_applications(owner, &query)?)
    }

    pub fn application_detail(
        &self,
        owner: &UserId,
        id: &ApplicationId,
        today: NaiveDate,
    ) -> Result<ApplicationDetail, TrackerServiceError> {
        let application = self.owned_application(owner, id)?;
        let activities = self
            .repository
            .activities(owner, Some(id), DETAIL_ACTIVITY_LIMIT)?;
        let follow_ups = self
            .repository
            .follow_ups(owner, id, DETAIL_FOLLOW_UP_LIMIT)?;
        let rounds = self.repository.rounds(owner, Some(id))?;
        let (round_items, general): (Vec<ChecklistItem>, Vec<ChecklistItem>) = self
            .repository
            .checklist(owner, Some(id))?
            .into_iter()
            .partition(|item| item.round_id.is_some());

        let rounds = rounds
            .into_iter()
            .map(|round| {
                let checklist: Vec<ChecklistItem> = round_items
                    .iter()
                    .filter(|item| item.round_id.as_ref() == Some(&round.id))
                    .cloned()
                    .collect();
                RoundView {
                    progress: ChecklistProgress::of(&checklist),
                    round,
                    checklist,
                }
            })
            .collect();

        Ok(ApplicationDetail {
            follow_up: application.follow_up(today).map(Into::into),
            application,
            activities,
            follow_ups,
            rounds,
            checklist: general,
        })
    }

    /// Log a timeline event, moving status and last contact as the event implies.
    pub fn log_activity(
        &self,
        owner: &UserId,
        id: &ApplicationId,
        form: &ActivityForm,
    ) -> Result<Activity, TrackerServiceError> {
        let input = form.validate()?;
        self.owned_application(owner, id)?;

        let activity = Activity {
            id: ActivityId(next_id("act")),
            owner: owner.clone(),
            application_id: id.clone(),
            kind: input.kind,
            title: input.title,
            occurred_at: input.occurred_at,
        };
        let patch = ApplicationPatch::for_activity(input.kind, input.occurred_at);

        let updated = self.repository.log_activity(activity.clone(), patch)?;
        info!(
            application = %id,
            kind = activity.kind.label(),
            status = %updated.status,
            "activity logged"
        );
        Ok(activity)
    }

    /// Mark the current follow-up done as of `today`.
    pub fn complete_follow_up(
        &self,
        owner: &UserId,
        id: &ApplicationId,
        today: NaiveDate,
    ) -> Result<FollowUp, TrackerServiceError> {
        let application = self.owned_application(owner, id)?;
        let due_at = compute_due_at(application.status, application.follow_up_base()).ok_or(
            TrackerServiceError::NoFollowUpDue {
                status: application.status,
            },
        )?;

        let follow_up = FollowUp {
            id: FollowUpId(next_id("fu")),
            owner: owner.clone(),
            application_id: id.clone(),
            due_at,
            completed_at: Some(today),
        };
        let activity = Activity {
            id: ActivityId(next_id("act")),
            owner: owner.clone(),
            application_id: id.clone(),
            kind: ActivityKind::FollowUp,
            title: format!("Follow-up completed · {}", application.headline()),
            occurred_at: today,
        };

        self.repository
            .complete_follow_up(follow_up.clone(), activity)?;
        info!(application = %id, %due_at, "follow-up completed");
        Ok(follow_up)
    }

    pub fn follow_up_queue(
        &self,
        owner: &UserId,
        today: NaiveDate,
    ) -> Result<Vec<FollowUpQueueEntry>, TrackerServiceError> {
        let query =
            ApplicationQuery::with_statuses(&ApplicationStatus::active(), FOLLOW_UP_CANDIDATE_LIMIT)
                .ordered_by(ApplicationOrder::StalestFirst);
        let candidates = self.repository.list_applications(owner, &query)?;
        Ok(build_follow_up_queue(&candidates, today))
    }

    pub fn dashboard(
        &self,
        owner: &UserId,
        today: NaiveDate,
    ) -> Result<DashboardView, TrackerServiceError> {
        let applications = self
            .repository
            .list_applications(owner, &ApplicationQuery::all(ANALYTICS_LIMIT))?;
        let follow_ups = build_follow_up_queue(&applications, today);
        let recent_activity = self.timeline_entries(owner, &applications, DASHBOARD_ACTIVITY)?;

        Ok(DashboardView {
            total: applications.len(),
            in_interview: count_status(&applications, ApplicationStatus::Interview),
            offers: count_status(&applications, ApplicationStatus::Offer),
            follow_ups_overdue: follow_ups
                .iter()
                .filter(|entry| entry.urgency.is_overdue())
                .count(),
            recent_applications: applications
                .iter()
                .take(DASHBOARD_ROWS)
                .map(ApplicationSummary::from)
                .collect(),
            follow_ups: follow_ups.into_iter().take(DASHBOARD_ROWS).collect(),
            recent_activity,
        })
    }

    pub fn timeline(&self, owner: &UserId) -> Result<Vec<TimelineEntry>, TrackerServiceError> {
        let applications = self
            .repository
            .list_applications(owner, &ApplicationQuery::all(ANALYTICS_LIMIT))?;
        self.timeline_entries(owner, &applications, TIMELINE_LIMIT)
    }

    fn timeline_entries(
        &self,
        owner: &UserId,
        applications: &[JobApplication],
        limit: usize,
    ) -> Result<Vec<TimelineEntry>, TrackerServiceError> {
        let by_id: HashMap<&ApplicationId, &JobApplication> = applications
            .iter()
            .map(|application| (&application.id, application))
            .collect();
        let activities = self.repository.activities(owner, None, limit)?;
        Ok(activities
            .iter()
            .filter_map(|activity| {
                by_id
                    .get(&activity.application_id)
                    .map(|application| TimelineEntry::new(activity, application))
            })
            .collect())
    }

    pub fn analytics(
        &self,
        owner: &UserId,
        today: NaiveDate,
    ) -> Result<AnalyticsView, TrackerServiceError> {
        let applications = self
            .repository
            .list_applications(owner, &ApplicationQuery::all(ANALYTICS_LIMIT))?;
        let activities = self.repository.activities(owner, None, ANALYTICS_LIMIT)?;
        Ok(build_analytics(&applications, &activities, today))
    }

    pub fn add_interview_round(
        &self,
        owner: &UserId,
        id: &ApplicationId,
        form: &RoundForm,
    ) -> Result<InterviewRound, TrackerServiceError> {
        let input = form.validate()?;
        self.owned_application(owner, id)?;

        let round_number = match input.round_number {
            Some(number) => number,
            None => {
                let existing = self.repository.rounds(owner, Some(id))?.len();
                u8::try_from(existing + 1).unwrap_or(u8::MAX)
            }
        };

        let round = InterviewRound {
            id: RoundId(next_id("rnd")),
            owner: owner.clone(),
            application_id: id.clone(),
            round_number,
            scheduled_at: input.scheduled_at,
            notes: input.notes,
            outcome: RoundOutcome::Pending,
            created_at: Utc::now(),
        };
        let stored = self.repository.insert_round(round)?;
        info!(application = %id, round = stored.round_number, "interview round added");
        Ok(stored)
    }

    pub fn record_round_outcome(
        &self,
        owner: &UserId,
        round_id: &RoundId,
        outcome: RoundOutcome,
    ) -> Result<InterviewRound, TrackerServiceError> {
        let round = self
            .repository
            .set_round_outcome(owner, round_id, outcome)?
            .ok_or_else(|| TrackerServiceError::RoundNotFound(round_id.clone()))?;
        info!(round = %round_id, outcome = outcome.label(), "interview outcome recorded");
        Ok(round)
    }

    /// Pending rounds across all applications, split by whether they have a time.
    pub fn interview_schedule(
        &self,
        owner: &UserId,
    ) -> Result<InterviewSchedule, TrackerServiceError> {
        let applications: HashMap<ApplicationId, JobApplication> = self
            .repository
            .list_applications(owner, &ApplicationQuery::all(ANALYTICS_LIMIT))?
            .into_iter()
            .map(|application| (application.id.clone(), application))
            .collect();
        let checklist = self.repository.checklist(owner, None)?;

        let mut pending: Vec<InterviewRound> = self
            .repository
            .rounds(owner, None)?
            .into_iter()
            .filter(|round| round.outcome == RoundOutcome::Pending)
            .collect();
        pending.sort_by_key(|round| {
            (
                round.scheduled_at.is_none(),
                round.scheduled_at,
                Reverse(round.created_at),
            )
        });
        pending.truncate(INTERVIEW_LIMIT);

        let mut schedule = InterviewSchedule::default();
        for round in pending {
            let Some(application) = applications.get(&round.application_id) else {
                continue;
            };
            let progress = ChecklistProgress::of(
                checklist
                    .iter()
                    .filter(|item| item.round_id.as_ref() == Some(&round.id)),
            );
            let entry = InterviewEntry {
                round_id: round.id,
                application_id: round.application_id,
                company: application.company.clone(),
                role: application.role.clone(),
                round_number: round.round_number,
                scheduled_at: round.scheduled_at,
                notes: round.notes,
                outcome: round.outcome,
                progress,
            };
            if entry.scheduled_at.is_some() {
                schedule.scheduled.push(entry);
            } else {
                schedule.unscheduled.push(entry);
            }
        }
        Ok(schedule)
    }

    pub fn add_checklist_item(
        &self,
        owner: &UserId,
        id: &ApplicationId,
        form: &ChecklistForm,
    ) -> Result<ChecklistItem, TrackerServiceError> {
        let input = form.validate()?;
        self.owned_application(owner, id)?;

        if let Some(round_id) = &input.round_id {
            let belongs = self
                .repository
                .rounds(owner, Some(id))?
                .iter()
                .any(|round| &round.id == round_id);
            if !belongs {
                return Err(TrackerServiceError::RoundNotFound(round_id.clone()));
            }
        }

        let item = ChecklistItem {
            id: ChecklistItemId(next_id("chk")),
            owner: owner.clone(),
            application_id: id.clone(),
            round_id: input.round_id,
            text: input.text,
            is_done: false,
        };
        Ok(self.repository.insert_checklist_item(item)?)
    }

    pub fn toggle_checklist_item(
        &self,
        owner: &UserId,
        id: &ApplicationId,
        item_id: &ChecklistItemId,
    ) -> Result<ChecklistItem, TrackerServiceError> {
        self.repository
            .toggle_checklist_item(owner, id, item_id)?
            .ok_or_else(|| TrackerServiceError::ChecklistItemNotFound(item_id.clone()))
    }

    pub fn create_template(
        &self,
        owner: &UserId,
        form: &TemplateForm,
    ) -> Result<FollowUpTemplate, TrackerServiceError> {
        let input = form.validate()?;
        let template = FollowUpTemplate {
            id: TemplateId(next_id("tpl")),
            owner: owner.clone(),
            status: input.status,
            title: input.title,
            body: input.body,
        };
        Ok(self.repository.insert_template(template)?)
    }

    /// Templates for `status` (including catch-all ones), or every template.
    pub fn templates(
        &self,
        owner: &UserId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<FollowUpTemplate>, TrackerServiceError> {
        let templates = self.repository.templates(owner)?;
        Ok(match status {
            Some(status) => templates
                .into_iter()
                .filter(|template| template.applies_to(status))
                .collect(),
            None => templates,
        })
    }

    pub fn delete_template(
        &self,
        owner: &UserId,
        id: &TemplateId,
    ) -> Result<(), TrackerServiceError> {
        if self.repository.delete_template(owner, id)? {
            Ok(())
        } else {
            Err(TrackerServiceError::TemplateNotFound(id.clone()))
        }
    }
}

fn apply_input(mut application: JobApplication, input: ApplicationInput) -> JobApplication {
    application.company = input.company;
    application.role = input.role;
    application.location = input.location;
    application.application_link = input.application_link;
    application.status = input.status;
    application.priority = input.priority;
    application.salary_range = input.salary_range;
    application.source = input.source;
    application.date_applied = input.date_applied;
    application.last_contacted = input.last_contacted;
    application.notes = input.notes;
    application.tags = input.tags;
    application
}

fn count_status(applications: &[JobApplication], status: ApplicationStatus) -> usize {
    applications
        .iter()
        .filter(|application| application.status == status)
        .count()
}

/// Error raised by the tracker service.
#[derive(Debug, thiserror::Error)]
pub enum TrackerServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("interview round {0} not found")]
    RoundNotFound(RoundId),
    #[error("checklist item {0} not found")]
    ChecklistItemNotFound(ChecklistItemId),
    #[error("template {0} not found")]
    TemplateNotFound(TemplateId),
    #[error("no follow-up cadence for {status} applications")]
    NoFollowUpDue { status: ApplicationStatus },
}
