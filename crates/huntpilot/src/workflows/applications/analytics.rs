use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use super::domain::{Activity, ApplicationStatus, JobApplication};

pub const WEEKS_TRACKED: usize = 12;

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyCount {
    pub week_start: NaiveDate,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsView {
    pub total: usize,
    /// Applications that moved past APPLIED.
    pub responded: usize,
    pub response_rate: f32,
    pub response_rate_label: String,
    pub status_counts: Vec<StatusCount>,
    pub weekly: Vec<WeeklyCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_last_activity: Option<i64>,
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

pub fn build_analytics(
    applications: &[JobApplication],
    activities: &[Activity],
    today: NaiveDate,
) -> AnalyticsView {
    let total = applications.len();
    let responded = applications
        .iter()
        .filter(|application| application.status != ApplicationStatus::Applied)
        .count();
    let response_rate = if total == 0 {
        0.0
    } else {
        responded as f32 / total as f32
    };

    let status_counts = ApplicationStatus::ordered()
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: applications
                .iter()
                .filter(|application| application.status == status)
                .count(),
        })
        .collect();

    let current_week = week_start(today);
    let weekly = (0..WEEKS_TRACKED)
        .rev()
        .filter_map(|weeks_back| {
            current_week.checked_sub_days(Days::new(7 * weeks_back as u64))
        })
        .map(|start| WeeklyCount {
            week_start: start,
            label: start.format("%b %-d").to_string(),
            count: applications
                .iter()
                .filter(|application| week_start(application.date_applied) == start)
                .count(),
        })
        .collect();

    let last_touch = applications
        .iter()
        .map(|application| application.date_applied)
        .chain(activities.iter().map(|activity| activity.occurred_at))
        .max();

    AnalyticsView {
        total,
        responded,
        response_rate,
        response_rate_label: format!("{}%", (response_rate * 100.0).round() as u32),
        status_counts,
        weekly,
        days_since_last_activity: last_touch
            .map(|touched| today.signed_duration_since(touched).num_days()),
    }
}
