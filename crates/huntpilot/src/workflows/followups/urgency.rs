use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyKind {
    Due,
    Upcoming,
    Overdue,
}

/// Position of a due date relative to today, at day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FollowUpUrgency {
    #[serde(rename = "due")]
    DueToday,
    Upcoming { days_remaining: u32 },
    Overdue { days_past: u32 },
}

impl FollowUpUrgency {
    pub const fn kind(self) -> UrgencyKind {
        match self {
            Self::DueToday => UrgencyKind::Due,
            Self::Upcoming { .. } => UrgencyKind::Upcoming,
            Self::Overdue { .. } => UrgencyKind::Overdue,
        }
    }

    pub const fn magnitude(self) -> u32 {
        match self {
            Self::DueToday => 0,
            Self::Upcoming { days_remaining } => days_remaining,
            Self::Overdue { days_past } => days_past,
        }
    }

    pub const fn is_overdue(self) -> bool {
        matches!(self, Self::Overdue { .. })
    }

    pub fn label(self) -> String {
        match self {
            Self::DueToday => "Due today".to_string(),
            Self::Upcoming { days_remaining } => format!("Due in {}", days(days_remaining)),
            Self::Overdue { days_past } => format!("Overdue by {}", days(days_past)),
        }
    }
}

fn days(count: u32) -> String {
    if count == 1 {
        "1 day".to_string()
    } else {
        format!("{count} days")
    }
}

pub fn classify_urgency(due_at: NaiveDate, today: NaiveDate) -> FollowUpUrgency {
    let diff = due_at.signed_duration_since(today).num_days();
    let magnitude = u32::try_from(diff.unsigned_abs()).unwrap_or(u32::MAX);
    match diff {
        0 => FollowUpUrgency::DueToday,
        d if d > 0 => FollowUpUrgency::Upcoming {
            days_remaining: magnitude,
        },
        _ => FollowUpUrgency::Overdue {
            days_past: magnitude,
        },
    }
}

/// Timestamp variant; both instants are reduced to their calendar day first.
pub fn classify_urgency_at<Tz: TimeZone>(due_at: &DateTime<Tz>, now: &DateTime<Tz>) -> FollowUpUrgency {
    classify_urgency(due_at.date_naive(), now.date_naive())
}
