use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::applications::domain::{
    Activity, ApplicationId, ApplicationPatch, ChecklistItem, ChecklistItemId, FollowUp,
    FollowUpTemplate, InterviewRound, JobApplication, RoundId, RoundOutcome, TemplateId, UserId,
};
use crate::workflows::applications::repository::{
    ApplicationQuery, RepositoryError, TrackerRepository,
};
use crate::workflows::applications::{
    tracker_router, ApplicationForm, InMemoryTrackerRepository, TrackerService, USER_HEADER,
};

pub(super) fn owner() -> UserId {
    UserId("ada@huntpilot.local".to_string())
}

pub(super) fn other_owner() -> UserId {
    UserId("grace@huntpilot.local".to_string())
}

pub(super) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn application_form(company: &str, status: &str, date_applied: &str) -> ApplicationForm {
    ApplicationForm {
        company: company.to_string(),
        role: "Backend Engineer".to_string(),
        location: "Remote".to_string(),
        application_link: format!("https://jobs.example.com/{}", company.to_lowercase()),
        status: status.to_string(),
        priority: "HIGH".to_string(),
        salary_range: Some("$150k - $180k".to_string()),
        source: "Referral".to_string(),
        date_applied: date_applied.to_string(),
        last_contacted: None,
        notes: None,
        tags: Some("rust, remote".to_string()),
    }
}

pub(super) fn build_service() -> (
    Arc<TrackerService<InMemoryTrackerRepository>>,
    Arc<InMemoryTrackerRepository>,
) {
    let repository = Arc::new(InMemoryTrackerRepository::default());
    let service = Arc::new(TrackerService::new(repository.clone()));
    (service, repository)
}

pub(super) fn router_with_service<R>(service: Arc<TrackerService<R>>) -> Router
where
    R: TrackerRepository + 'static,
{
    tracker_router(service)
}

pub(super) fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(USER_HEADER, owner().0)
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(USER_HEADER, owner().0)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Rejects every write as a duplicate and stores nothing.
pub(super) struct ConflictRepository;

impl TrackerRepository for ConflictRepository {
    fn insert_application(
        &self,
        _application: JobApplication,
        _opening: Activity,
    ) -> Result<JobApplication, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn replace_application(&self, _application: JobApplication) -> Result<(), RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch_application(
        &self,
        _owner: &UserId,
        _id: &ApplicationId,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        Ok(None)
    }

    fn list_applications(
        &self,
        _owner: &UserId,
        _query: &ApplicationQuery,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        Ok(Vec::new())
    }

    fn delete_application(
        &self,
        _owner: &UserId,
        _id: &ApplicationId,
    ) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn log_activity(
        &self,
        _activity: Activity,
        _patch: ApplicationPatch,
    ) -> Result<JobApplication, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn complete_follow_up(
        &self,
        _follow_up: FollowUp,
        _activity: Activity,
    ) -> Result<JobApplication, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn activities(
        &self,
        _owner: &UserId,
        _application_id: Option<&ApplicationId>,
        _limit: usize,
    ) -> Result<Vec<Activity>, RepositoryError> {
        Ok(Vec::new())
    }

    fn follow_ups(
        &self,
        _owner: &UserId,
        _application_id: &ApplicationId,
        _limit: usize,
    ) -> Result<Vec<FollowUp>, RepositoryError> {
        Ok(Vec::new())
    }

    fn insert_round(&self, _round: InterviewRound) -> Result<InterviewRound, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn rounds(
        &self,
        _owner: &UserId,
        _application_id: Option<&ApplicationId>,
    ) -> Result<Vec<InterviewRound>, RepositoryError> {
        Ok(Vec::new())
    }

    fn set_round_outcome(
        &self,
        _owner: &UserId,
        _id: &RoundId,
        _outcome: RoundOutcome,
    ) -> Result<Option<InterviewRound>, RepositoryError> {
        Ok(None)
    }

    fn insert_checklist_item(&self, _item: ChecklistItem) -> Result<ChecklistItem, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn checklist(
        &self,
        _owner: &UserId,
        _application_id: Option<&ApplicationId>,
    ) -> Result<Vec<ChecklistItem>, RepositoryError> {
        Ok(Vec::new())
    }

    fn toggle_checklist_item(
        &self,
        _owner: &UserId,
        _application_id: &ApplicationId,
        _id: &ChecklistItemId,
    ) -> Result<Option<ChecklistItem>, RepositoryError> {
        Ok(None)
    }

    fn insert_template(
        &self,
        _template: FollowUpTemplate,
    ) -> Result<FollowUpTemplate, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn templates(&self, _owner: &UserId) -> Result<Vec<FollowUpTemplate>, RepositoryError> {
        Ok(Vec::new())
    }

    fn delete_template(&self, _owner: &UserId, _id: &TemplateId) -> Result<bool, RepositoryError> {
        Ok(false)
    }
}

/// Fails every call as if the backing store were down.
pub(super) struct UnavailableRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("offline".to_string()))
}

impl TrackerRepository for UnavailableRepository {
    fn insert_application(
        &self,
        _application: JobApplication,
        _opening: Activity,
    ) -> Result<JobApplication, RepositoryError> {
        offline()
    }

    fn replace_application(&self, _application: JobApplication) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_application(
        &self,
        _owner: &UserId,
        _id: &ApplicationId,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        offline()
    }

    fn list_applications(
        &self,
        _owner: &UserId,
        _query: &ApplicationQuery,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        offline()
    }

    fn delete_application(
        &self,
        _owner: &UserId,
        _id: &ApplicationId,
    ) -> Result<bool, RepositoryError> {
        offline()
    }

    fn log_activity(
        &self,
        _activity: Activity,
        _patch: ApplicationPatch,
    ) -> Result<JobApplication, RepositoryError> {
        offline()
    }

    fn complete_follow_up(
        &self,
        _follow_up: FollowUp,
        _activity: Activity,
    ) -> Result<JobApplication, RepositoryError> {
        offline()
    }

    fn activities(
        &self,
        _owner: &UserId,
        _application_id: Option<&ApplicationId>,
        _limit: usize,
    ) -> Result<Vec<Activity>, RepositoryError> {
        offline()
    }

    fn follow_ups(
        &self,
        _owner: &UserId,
        _application_id: &ApplicationId,
        _limit: usize,
    ) -> Result<Vec<FollowUp>, RepositoryError> {
        offline()
    }

    fn insert_round(&self, _round: InterviewRound) -> Result<InterviewRound, RepositoryError> {
        offline()
    }

    fn rounds(
        &self,
        _owner: &UserId,
        _application_id: Option<&ApplicationId>,
    ) -> Result<Vec<InterviewRound>, RepositoryError> {
        offline()
    }

    fn set_round_outcome(
        &self,
        _owner: &UserId,
        _id: &RoundId,
        _outcome: RoundOutcome,
    ) -> Result<Option<InterviewRound>, RepositoryError> {
        offline()
    }

    fn insert_checklist_item(&self, _item: ChecklistItem) -> Result<ChecklistItem, RepositoryError> {
        offline()
    }

    fn checklist(
        &self,
        _owner: &UserId,
        _application_id: Option<&ApplicationId>,
    ) -> Result<Vec<ChecklistItem>, RepositoryError> {
        offline()
    }

    fn toggle_checklist_item(
        &self,
        _owner: &UserId,
        _application_id: &ApplicationId,
        _id: &ChecklistItemId,
    ) -> Result<Option<ChecklistItem>, RepositoryError> {
        offline()
    }

    fn insert_template(
        &self,
        _template: FollowUpTemplate,
    ) -> Result<FollowUpTemplate, RepositoryError> {
        offline()
    }

    fn templates(&self, _owner: &UserId) -> Result<Vec<FollowUpTemplate>, RepositoryError> {
        offline()
    }

    fn delete_template(&self, _owner: &UserId, _id: &TemplateId) -> Result<bool, RepositoryError> {
        offline()
    }
}
