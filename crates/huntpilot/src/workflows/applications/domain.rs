use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workflows::followups::{self, FollowUpDue};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Authenticated owner resolved by the upstream identity provider.
    UserId
);
string_id!(ApplicationId);
string_id!(ActivityId);
string_id!(FollowUpId);
string_id!(RoundId);
string_id!(ChecklistItemId);
string_id!(TemplateId);

/// Pipeline stage of a job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Applied,
    Oa,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Applied,
            Self::Oa,
            Self::Interview,
            Self::Offer,
            Self::Rejected,
        ]
    }

    /// Statuses that still expect a follow-up from the applicant.
    pub const fn active() -> [Self; 4] {
        [Self::Applied, Self::Oa, Self::Interview, Self::Offer]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "APPLIED",
            Self::Oa => "OA",
            Self::Interview => "INTERVIEW",
            Self::Offer => "OFFER",
            Self::Rejected => "REJECTED",
        }
    }

    /// Exact, case-sensitive match on the stored label.
    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == raw)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const fn ordered() -> [Self; 3] {
        [Self::Low, Self::Medium, Self::High]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|priority| priority.label() == raw)
    }
}

/// A tracked job application owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: ApplicationId,
    pub owner: UserId,
    pub company: String,
    pub role: String,
    pub location: String,
    pub application_link: String,
    pub status: ApplicationStatus,
    pub priority: Priority,
    pub salary_range: Option<String>,
    pub source: String,
    pub date_applied: NaiveDate,
    pub last_contacted: Option<NaiveDate>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl JobApplication {
    /// Last touchpoint the follow-up cadence counts from.
    pub fn follow_up_base(&self) -> NaiveDate {
        followups::follow_up_base_date(self.date_applied, self.last_contacted)
    }

    pub fn follow_up(&self, today: NaiveDate) -> Option<FollowUpDue> {
        followups::evaluate_follow_up(self.status, self.follow_up_base(), today)
    }

    /// "Company · Role" heading used in titles and list rows.
    pub fn headline(&self) -> String {
        format!("{} · {}", self.company, self.role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Applied,
    Contacted,
    Oa,
    Interview,
    Offer,
    Rejected,
    FollowUp,
    Note,
}

impl ActivityKind {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Applied,
            Self::Contacted,
            Self::Oa,
            Self::Interview,
            Self::Offer,
            Self::Rejected,
            Self::FollowUp,
            Self::Note,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "APPLIED",
            Self::Contacted => "CONTACTED",
            Self::Oa => "OA",
            Self::Interview => "INTERVIEW",
            Self::Offer => "OFFER",
            Self::Rejected => "REJECTED",
            Self::FollowUp => "FOLLOW_UP",
            Self::Note => "NOTE",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label() == raw)
    }

    /// Status the application moves to when this event is logged.
    pub const fn status_transition(self) -> Option<ApplicationStatus> {
        match self {
            Self::Oa => Some(ApplicationStatus::Oa),
            Self::Interview => Some(ApplicationStatus::Interview),
            Self::Offer => Some(ApplicationStatus::Offer),
            Self::Rejected => Some(ApplicationStatus::Rejected),
            Self::Applied | Self::Contacted | Self::FollowUp | Self::Note => None,
        }
    }

    /// Whether the event counts as contact with the employer.
    pub const fn touches_contact(self) -> bool {
        matches!(
            self,
            Self::Contacted | Self::FollowUp | Self::Interview | Self::Oa
        )
    }
}

/// Timeline event logged against an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub owner: UserId,
    pub application_id: ApplicationId,
    pub kind: ActivityKind,
    pub title: String,
    pub occurred_at: NaiveDate,
}

/// Changes applied to an application alongside a logged activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicationPatch {
    pub status: Option<ApplicationStatus>,
    pub last_contacted: Option<NaiveDate>,
}

impl ApplicationPatch {
    pub fn for_activity(kind: ActivityKind, occurred_at: NaiveDate) -> Self {
        Self {
            status: kind.status_transition(),
            last_contacted: kind.touches_contact().then_some(occurred_at),
        }
    }

    pub fn apply(&self, application: &mut JobApplication) {
        if let Some(status) = self.status {
            application.status = status;
        }
        if let Some(contacted) = self.last_contacted {
            application.last_contacted = Some(contacted);
        }
    }
}

/// Completed follow-up, kept as history next to the recomputed due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: FollowUpId,
    pub owner: UserId,
    pub application_id: ApplicationId,
    pub due_at: NaiveDate,
    pub completed_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundOutcome {
    Pending,
    Passed,
    Failed,
}

impl RoundOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        [Self::Pending, Self::Passed, Self::Failed]
            .into_iter()
            .find(|outcome| outcome.label() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewRound {
    pub id: RoundId,
    pub owner: UserId,
    pub application_id: ApplicationId,
    pub round_number: u8,
    pub scheduled_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub outcome: RoundOutcome,
    pub created_at: DateTime<Utc>,
}

/// Preparation item, either general to the application or tied to one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub owner: UserId,
    pub application_id: ApplicationId,
    pub round_id: Option<RoundId>,
    pub text: String,
    pub is_done: bool,
}

/// Reusable follow-up message; `status: None` applies to every status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpTemplate {
    pub id: TemplateId,
    pub owner: UserId,
    pub status: Option<ApplicationStatus>,
    pub title: String,
    pub body: String,
}

impl FollowUpTemplate {
    pub fn applies_to(&self, status: ApplicationStatus) -> bool {
        self.status.map_or(true, |target| target == status)
    }
}
