use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::domain::{ApplicationId, ApplicationStatus, ChecklistItemId, RoundId, TemplateId, UserId};
use super::repository::{ApplicationQuery, RepositoryError, TrackerRepository};
use super::service::{TrackerService, TrackerServiceError};
use super::validation::{
    parse_calendar_date, ActivityForm, ApplicationForm, ChecklistForm, OutcomeForm, RoundForm,
    TemplateForm, ValidationErrors,
};

/// Header carrying the caller identity resolved by the upstream auth proxy.
pub const USER_HEADER: &str = "x-user-id";

type SharedService<R> = State<Arc<TrackerService<R>>>;

/// Router builder exposing the tracker JSON API.
pub fn tracker_router<R>(service: Arc<TrackerService<R>>) -> Router
where
    R: TrackerRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(detail_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/activities",
            post(log_activity_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/follow-ups/complete",
            post(complete_follow_up_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/rounds",
            post(add_round_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/checklist",
            post(add_checklist_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/checklist/:item_id/toggle",
            post(toggle_checklist_handler::<R>),
        )
        .route(
            "/api/v1/rounds/:round_id/outcome",
            post(round_outcome_handler::<R>),
        )
        .route("/api/v1/follow-ups", get(follow_up_queue_handler::<R>))
        .route("/api/v1/dashboard", get(dashboard_handler::<R>))
        .route("/api/v1/timeline", get(timeline_handler::<R>))
        .route("/api/v1/interviews", get(interviews_handler::<R>))
        .route("/api/v1/analytics", get(analytics_handler::<R>))
        .route(
            "/api/v1/templates",
            get(list_templates_handler::<R>).post(create_template_handler::<R>),
        )
        .route(
            "/api/v1/templates/:template_id",
            axum::routing::delete(delete_template_handler::<R>),
        )
        .with_state(service)
}

/// HTTP-facing failure for tracker routes.
#[derive(Debug)]
pub enum ApiError {
    MissingIdentity,
    Service(TrackerServiceError),
}

impl From<TrackerServiceError> for ApiError {
    fn from(value: TrackerServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::Service(TrackerServiceError::Validation(value))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            ApiError::MissingIdentity => {
                let payload = json!({ "error": "sign in required" });
                return (StatusCode::UNAUTHORIZED, Json(payload)).into_response();
            }
            ApiError::Service(error) => error,
        };

        let status = match &error {
            TrackerServiceError::Validation(errors) => {
                let payload = json!({
                    "message": errors.to_string(),
                    "errors": errors.fields,
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
            }
            TrackerServiceError::ApplicationNotFound(_)
            | TrackerServiceError::RoundNotFound(_)
            | TrackerServiceError::ChecklistItemNotFound(_)
            | TrackerServiceError::TemplateNotFound(_)
            | TrackerServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            TrackerServiceError::NoFollowUpDue { .. }
            | TrackerServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            TrackerServiceError::Repository(RepositoryError::Unavailable(_)) => {
                warn!(error = %error, "tracker repository unavailable");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let payload = json!({ "error": error.to_string() });
        (status, Json(payload)).into_response()
    }
}

pub(crate) fn require_user(headers: &HeaderMap) -> Result<UserId, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| UserId(value.to_string()))
        .ok_or(ApiError::MissingIdentity)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TodayParams {
    pub(crate) today: Option<String>,
}

impl TodayParams {
    fn resolve(&self) -> Result<NaiveDate, ApiError> {
        match self.today.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
            None => Ok(Local::now().date_naive()),
            Some(raw) => parse_calendar_date(raw)
                .ok_or_else(|| ValidationErrors::single("today", "Enter a valid date").into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    /// Comma separated status labels.
    pub(crate) status: Option<String>,
    pub(crate) tag: Option<String>,
    pub(crate) limit: Option<usize>,
}

impl ListParams {
    fn query(&self) -> Result<ApplicationQuery, ApiError> {
        let mut statuses = Vec::new();
        for raw in self.status.as_deref().unwrap_or_default().split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let status = ApplicationStatus::from_label(raw)
                .ok_or_else(|| ValidationErrors::single("status", "Choose a valid status"))?;
            statuses.push(status);
        }

        Ok(ApplicationQuery {
            statuses,
            tag: self
                .tag
                .as_deref()
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string),
            limit: self.limit,
            ..ApplicationQuery::default()
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TemplateParams {
    pub(crate) status: Option<String>,
}

pub(crate) async fn list_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let applications = service.list_applications(&owner, &params.query()?)?;
    Ok(Json(applications).into_response())
}

pub(crate) async fn create_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Json(form): Json<ApplicationForm>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let application = service.create_application(&owner, &form)?;
    Ok((StatusCode::CREATED, Json(application)).into_response())
}

pub(crate) async fn detail_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Query(params): Query<TodayParams>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let today = params.resolve()?;
    let detail = service.application_detail(&owner, &ApplicationId(application_id), today)?;
    Ok(Json(detail).into_response())
}

pub(crate) async fn update_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(form): Json<ApplicationForm>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let application =
        service.update_application(&owner, &ApplicationId(application_id), &form)?;
    Ok(Json(application).into_response())
}

pub(crate) async fn delete_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    service.delete_application(&owner, &ApplicationId(application_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn log_activity_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(form): Json<ActivityForm>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let activity = service.log_activity(&owner, &ApplicationId(application_id), &form)?;
    Ok((StatusCode::CREATED, Json(activity)).into_response())
}

pub(crate) async fn complete_follow_up_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Query(params): Query<TodayParams>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let today = params.resolve()?;
    let follow_up = service.complete_follow_up(&owner, &ApplicationId(application_id), today)?;
    Ok((StatusCode::CREATED, Json(follow_up)).into_response())
}

pub(crate) async fn add_round_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(form): Json<RoundForm>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let round = service.add_interview_round(&owner, &ApplicationId(application_id), &form)?;
    Ok((StatusCode::CREATED, Json(round)).into_response())
}

pub(crate) async fn round_outcome_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Path(round_id): Path<String>,
    Json(form): Json<OutcomeForm>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let outcome = form.validate()?;
    let round = service.record_round_outcome(&owner, &RoundId(round_id), outcome)?;
    Ok(Json(round).into_response())
}

pub(crate) async fn add_checklist_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(form): Json<ChecklistForm>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let item = service.add_checklist_item(&owner, &ApplicationId(application_id), &form)?;
    Ok((StatusCode::CREATED, Json(item)).into_response())
}

pub(crate) async fn toggle_checklist_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Path((application_id, item_id)): Path<(String, String)>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let item = service.toggle_checklist_item(
        &owner,
        &ApplicationId(application_id),
        &ChecklistItemId(item_id),
    )?;
    Ok(Json(item).into_response())
}

pub(crate) async fn follow_up_queue_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Query(params): Query<TodayParams>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let queue = service.follow_up_queue(&owner, params.resolve()?)?;
    Ok(Json(queue).into_response())
}

pub(crate) async fn dashboard_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Query(params): Query<TodayParams>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let dashboard = service.dashboard(&owner, params.resolve()?)?;
    Ok(Json(dashboard).into_response())
}

pub(crate) async fn timeline_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    Ok(Json(service.timeline(&owner)?).into_response())
}

pub(crate) async fn interviews_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    Ok(Json(service.interview_schedule(&owner)?).into_response())
}

pub(crate) async fn analytics_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Query(params): Query<TodayParams>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let analytics = service.analytics(&owner, params.resolve()?)?;
    Ok(Json(analytics).into_response())
}

pub(crate) async fn list_templates_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Query(params): Query<TemplateParams>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let status = match params.status.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => Some(
            ApplicationStatus::from_label(raw)
                .ok_or_else(|| ValidationErrors::single("status", "Choose a valid status"))?,
        ),
        None => None,
    };
    Ok(Json(service.templates(&owner, status)?).into_response())
}

pub(crate) async fn create_template_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Json(form): Json<TemplateForm>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    let template = service.create_template(&owner, &form)?;
    Ok((StatusCode::CREATED, Json(template)).into_response())
}

pub(crate) async fn delete_template_handler<R>(
    State(service): SharedService<R>,
    headers: HeaderMap,
    Path(template_id): Path<String>,
) -> Result<Response, ApiError>
where
    R: TrackerRepository + 'static,
{
    let owner = require_user(&headers)?;
    service.delete_template(&owner, &TemplateId(template_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
