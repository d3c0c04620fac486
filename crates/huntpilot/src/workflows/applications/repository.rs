use super::domain::{
    Activity, ApplicationId, ApplicationPatch, ApplicationStatus, ChecklistItem, ChecklistItemId,
    FollowUp, FollowUpTemplate, InterviewRound, JobApplication, RoundId, RoundOutcome, TemplateId,
    UserId,
};

/// Sort order applied before the listing limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplicationOrder {
    /// Newest `date_applied` first, then newest created.
    #[default]
    NewestApplied,
    /// Oldest follow-up base date (last contact, else applied) first.
    StalestFirst,
}

/// Filter for owner-scoped application listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationQuery {
    /// Empty matches every status.
    pub statuses: Vec<ApplicationStatus>,
    pub tag: Option<String>,
    pub limit: Option<usize>,
    pub order: ApplicationOrder,
}

impl ApplicationQuery {
    pub fn all(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn with_statuses(statuses: &[ApplicationStatus], limit: usize) -> Self {
        Self {
            statuses: statuses.to_vec(),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn ordered_by(mut self, order: ApplicationOrder) -> Self {
        self.order = order;
        self
    }

    pub fn matches(&self, application: &JobApplication) -> bool {
        let status_ok = self.statuses.is_empty() || self.statuses.contains(&application.status);
        let tag_ok = self.tag.as_ref().map_or(true, |tag| {
            application
                .tags
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(tag))
        });
        status_ok && tag_ok
    }
}

/// Storage abstraction for the tracker.
///
/// Every read is scoped to an owner. Calls that touch several records are
/// single methods so implementations can apply them as one unit.
pub trait TrackerRepository: Send + Sync {
    /// Store a new application together with its opening activity.
    fn insert_application(
        &self,
        application: JobApplication,
        opening: Activity,
    ) -> Result<JobApplication, RepositoryError>;
    fn replace_application(&self, application: JobApplication) -> Result<(), RepositoryError>;
    fn fetch_application(
        &self,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<Option<JobApplication>, RepositoryError>;
    /// Sorted by `query.order`, then truncated to `query.limit`.
    fn list_applications(
        &self,
        owner: &UserId,
        query: &ApplicationQuery,
    ) -> Result<Vec<JobApplication>, RepositoryError>;
    /// Removes the application and everything attached to it.
    fn delete_application(&self, owner: &UserId, id: &ApplicationId)
        -> Result<bool, RepositoryError>;

    /// Append an activity and patch its application.
    fn log_activity(
        &self,
        activity: Activity,
        patch: ApplicationPatch,
    ) -> Result<JobApplication, RepositoryError>;
    /// Record a completed follow-up, its FOLLOW_UP activity, and the new contact date.
    fn complete_follow_up(
        &self,
        follow_up: FollowUp,
        activity: Activity,
    ) -> Result<JobApplication, RepositoryError>;
    /// Most recent first.
    fn activities(
        &self,
        owner: &UserId,
        application_id: Option<&ApplicationId>,
        limit: usize,
    ) -> Result<Vec<Activity>, RepositoryError>;
    /// Latest due date first.
    fn follow_ups(
        &self,
        owner: &UserId,
        application_id: &ApplicationId,
        limit: usize,
    ) -> Result<Vec<FollowUp>, RepositoryError>;

    fn insert_round(&self, round: InterviewRound) -> Result<InterviewRound, RepositoryError>;
    /// Rounds ordered by application, then round number.
    fn rounds(
        &self,
        owner: &UserId,
        application_id: Option<&ApplicationId>,
    ) -> Result<Vec<InterviewRound>, RepositoryError>;
    fn set_round_outcome(
        &self,
        owner: &UserId,
        id: &RoundId,
        outcome: RoundOutcome,
    ) -> Result<Option<InterviewRound>, RepositoryError>;

    fn insert_checklist_item(&self, item: ChecklistItem) -> Result<ChecklistItem, RepositoryError>;
    /// Insertion order.
    fn checklist(
        &self,
        owner: &UserId,
        application_id: Option<&ApplicationId>,
    ) -> Result<Vec<ChecklistItem>, RepositoryError>;
    fn toggle_checklist_item(
        &self,
        owner: &UserId,
        application_id: &ApplicationId,
        id: &ChecklistItemId,
    ) -> Result<Option<ChecklistItem>, RepositoryError>;

    fn insert_template(
        &self,
        template: FollowUpTemplate,
    ) -> Result<FollowUpTemplate, RepositoryError>;
    fn templates(&self, owner: &UserId) -> Result<Vec<FollowUpTemplate>, RepositoryError>;
    fn delete_template(&self, owner: &UserId, id: &TemplateId) -> Result<bool, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
