//! Job application tracking: the pipeline, its timeline, interview prep, and
//! the JSON routes that expose them.
//!
//! Every record is owned by a single user. Repository calls always take the
//! owner so one user's data can never leak into another user's views.

pub mod analytics;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use analytics::{build_analytics, AnalyticsView, StatusCount, WeeklyCount};
pub use domain::{
    Activity, ActivityId, ActivityKind, ApplicationId, ApplicationPatch, ApplicationStatus,
    ChecklistItem, ChecklistItemId, FollowUp, FollowUpId, FollowUpTemplate, InterviewRound,
    JobApplication, Priority, RoundId, RoundOutcome, TemplateId, UserId,
};
pub use memory::InMemoryTrackerRepository;
pub use repository::{ApplicationOrder, ApplicationQuery, RepositoryError, TrackerRepository};
pub use router::{tracker_router, ApiError, USER_HEADER};
pub use service::{TrackerService, TrackerServiceError};
pub use validation::{
    ActivityForm, ApplicationForm, ChecklistForm, OutcomeForm, RoundForm, TemplateForm,
    ValidationErrors,
};
pub use views::{
    ApplicationDetail, ApplicationSummary, ChecklistProgress, DashboardView, FollowUpView,
    InterviewEntry, InterviewSchedule, RoundView, TimelineEntry,
};
