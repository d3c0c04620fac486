//! Form validation for tracker inputs.
//!
//! Forms arrive as loosely typed strings. Each `validate` call either returns
//! a typed input or every field problem at once, keyed by field name.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{ActivityKind, ApplicationStatus, Priority, RoundId, RoundOutcome};

pub const MAX_TAGS: usize = 12;
const MAX_ROUND_NUMBER: u8 = 20;

/// Field-level validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Please fix the highlighted fields.")]
pub struct ValidationErrors {
    pub fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    max: usize,
    missing: &str,
) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, missing);
    } else if value.chars().count() > max {
        errors.add(field, format!("Must be at most {max} characters"));
    }
    value.to_string()
}

fn optional_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<&str>,
    max: usize,
) -> Option<String> {
    let value = raw.map(str::trim).filter(|value| !value.is_empty())?;
    if value.chars().count() > max {
        errors.add(field, format!("Must be at most {max} characters"));
    }
    Some(value.to_string())
}

fn blank(raw: Option<&str>) -> bool {
    raw.map_or(true, |value| value.trim().is_empty())
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` or RFC 3339 and keeps the day.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|timestamp| timestamp.date())
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Some(timestamp);
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|timestamp| timestamp.naive_local())
}

fn required_date(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> NaiveDate {
    match parse_calendar_date(raw) {
        Some(date) => date,
        None => {
            errors.add(field, "Enter a valid date");
            NaiveDate::MIN
        }
    }
}

fn optional_date(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<&str>,
) -> Option<NaiveDate> {
    if blank(raw) {
        return None;
    }
    let parsed = raw.and_then(parse_calendar_date);
    if parsed.is_none() {
        errors.add(field, "Enter a valid date");
    }
    parsed
}

/// Split a comma separated tag list, dropping blanks and repeats.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.unwrap_or_default().split(',').map(str::trim) {
        if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags.truncate(MAX_TAGS);
    tags
}

/// Deserialize form scalars that clients may send as either strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Number(number) => number.to_string(),
    }))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationForm {
    pub company: String,
    pub role: String,
    pub location: String,
    pub application_link: String,
    pub status: String,
    pub priority: String,
    pub salary_range: Option<String>,
    pub source: String,
    pub date_applied: String,
    pub last_contacted: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInput {
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
}

impl ApplicationForm {
    pub fn validate(&self) -> Result<ApplicationInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let company = required_text(&mut errors, "company", &self.company, 120, "Company is required");
        let role = required_text(&mut errors, "role", &self.role, 120, "Role is required");
        let location =
            required_text(&mut errors, "location", &self.location, 120, "Location is required");

        let application_link = self.application_link.trim().to_string();
        if url::Url::parse(&application_link).is_err() {
            errors.add("application_link", "Enter a valid URL");
        }

        let status = ApplicationStatus::from_label(&self.status);
        if status.is_none() {
            errors.add("status", "Choose a valid status");
        }
        let priority = Priority::from_label(&self.priority);
        if priority.is_none() {
            errors.add("priority", "Choose a valid priority");
        }

        let salary_range =
            optional_text(&mut errors, "salary_range", self.salary_range.as_deref(), 80);
        let source = required_text(&mut errors, "source", &self.source, 80, "Source is required");
        let date_applied = required_date(&mut errors, "date_applied", &self.date_applied);
        let last_contacted =
            optional_date(&mut errors, "last_contacted", self.last_contacted.as_deref());
        let notes = optional_text(&mut errors, "notes", self.notes.as_deref(), 5000);
        let tags_raw = optional_text(&mut errors, "tags", self.tags.as_deref(), 200);

        errors.finish(|| ApplicationInput {
            company,
            role,
            location,
            application_link,
            status: status.unwrap_or(ApplicationStatus::Applied),
            priority: priority.unwrap_or(Priority::Medium),
            salary_range,
            source,
            date_applied,
            last_contacted,
            notes,
            tags: parse_tags(tags_raw.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityForm {
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    pub occurred_at: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityInput {
    pub kind: ActivityKind,
    pub occurred_at: NaiveDate,
    pub title: String,
}

impl ActivityForm {
    pub fn validate(&self) -> Result<ActivityInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let kind = ActivityKind::from_label(&self.kind);
        if kind.is_none() {
            errors.add("type", "Choose a valid activity type");
        }
        let occurred_at = required_date(&mut errors, "occurred_at", &self.occurred_at);
        let title = required_text(&mut errors, "title", &self.title, 200, "Title is required");

        errors.finish(|| ActivityInput {
            kind: kind.unwrap_or(ActivityKind::Note),
            occurred_at,
            title,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundForm {
    #[serde(deserialize_with = "string_or_number")]
    pub round_number: Option<String>,
    pub scheduled_at: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundInput {
    /// `None` means "next after the existing rounds".
    pub round_number: Option<u8>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

impl RoundForm {
    pub fn validate(&self) -> Result<RoundInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let round_number = if blank(self.round_number.as_deref()) {
            None
        } else {
            let parsed = self
                .round_number
                .as_deref()
                .and_then(|raw| raw.trim().parse::<u8>().ok())
                .filter(|number| (1..=MAX_ROUND_NUMBER).contains(number));
            if parsed.is_none() {
                errors.add(
                    "round_number",
                    format!("Round number must be between 1 and {MAX_ROUND_NUMBER}"),
                );
            }
            parsed
        };

        let scheduled_at = if blank(self.scheduled_at.as_deref()) {
            None
        } else {
            let parsed = self.scheduled_at.as_deref().and_then(parse_timestamp);
            if parsed.is_none() {
                errors.add("scheduled_at", "Enter a valid date and time");
            }
            parsed
        };

        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string);

        errors.finish(|| RoundInput {
            round_number,
            scheduled_at,
            notes,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistForm {
    pub round_id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistInput {
    pub round_id: Option<RoundId>,
    pub text: String,
}

impl ChecklistForm {
    pub fn validate(&self) -> Result<ChecklistInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let text = required_text(&mut errors, "text", &self.text, 200, "Text is required");
        let round_id = self
            .round_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| RoundId(id.to_string()));

        errors.finish(|| ChecklistInput { round_id, text })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateForm {
    pub status: Option<String>,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInput {
    pub status: Option<ApplicationStatus>,
    pub title: String,
    pub body: String,
}

impl TemplateForm {
    pub fn validate(&self) -> Result<TemplateInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let status = if blank(self.status.as_deref()) {
            None
        } else {
            let parsed = self.status.as_deref().and_then(ApplicationStatus::from_label);
            if parsed.is_none() {
                errors.add("status", "Choose a valid status");
            }
            parsed
        };
        let title = required_text(&mut errors, "title", &self.title, 120, "Title is required");
        let body = required_text(&mut errors, "body", &self.body, 4000, "Message body is required");

        errors.finish(|| TemplateInput {
            status,
            title,
            body,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeForm {
    pub outcome: String,
}

impl OutcomeForm {
    pub fn validate(&self) -> Result<RoundOutcome, ValidationErrors> {
        RoundOutcome::from_label(&self.outcome)
            .ok_or_else(|| ValidationErrors::single("outcome", "Choose a valid outcome"))
    }
}
