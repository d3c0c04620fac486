use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    Activity, ApplicationId, ApplicationPatch, ChecklistItem, ChecklistItemId, FollowUp,
    FollowUpTemplate, InterviewRound, JobApplication, RoundId, RoundOutcome, TemplateId, UserId,
};
use super::repository::{ApplicationOrder, ApplicationQuery, RepositoryError, TrackerRepository};

#[derive(Debug, Default)]
struct Tables {
    applications: HashMap<ApplicationId, JobApplication>,
    activities: Vec<Activity>,
    follow_ups: Vec<FollowUp>,
    rounds: Vec<InterviewRound>,
    checklist: Vec<ChecklistItem>,
    templates: Vec<FollowUpTemplate>,
}

impl Tables {
    fn owned_application_mut(
        &mut self,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<&mut JobApplication, RepositoryError> {
        self.applications
            .get_mut(id)
            .filter(|application| &application.owner == owner)
            .ok_or(RepositoryError::NotFound)
    }
}

/// Process-local store; every call holds one lock for its whole mutation.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTrackerRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryTrackerRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("tracker store lock poisoned".to_string()))
    }
}

impl TrackerRepository for InMemoryTrackerRepository {
    fn insert_application(
        &self,
        application: JobApplication,
        opening: Activity,
    ) -> Result<JobApplication, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .applications
            .insert(application.id.clone(), application.clone());
        tables.activities.push(opening);
        Ok(application)
    }

    fn replace_application(&self, application: JobApplication) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let stored = tables.owned_application_mut(&application.owner, &application.id)?;
        *stored = application;
        Ok(())
    }

    fn fetch_application(
        &self,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .applications
            .get(id)
            .filter(|application| &application.owner == owner)
            .cloned())
    }

    fn list_applications(
        &self,
        owner: &UserId,
        query: &ApplicationQuery,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        let tables = self.lock()?;
        let mut applications: Vec<JobApplication> = tables
            .applications
            .values()
            .filter(|application| &application.owner == owner && query.matches(application))
            .cloned()
            .collect();
        match query.order {
            ApplicationOrder::NewestApplied => applications.sort_by_key(|application| {
                (
                    Reverse(application.date_applied),
                    Reverse(application.created_at),
                    application.id.clone(),
                )
            }),
            ApplicationOrder::StalestFirst => applications.sort_by_key(|application| {
                (
                    application.follow_up_base(),
                    application.date_applied,
                    application.created_at,
                    application.id.clone(),
                )
            }),
        }
        if let Some(limit) = query.limit {
            applications.truncate(limit);
        }
        Ok(applications)
    }

    fn delete_application(
        &self,
        owner: &UserId,
        id: &ApplicationId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.owned_application_mut(owner, id).is_err() {
            return Ok(false);
        }
        tables.applications.remove(id);
        tables.activities.retain(|activity| &activity.application_id != id);
        tables.follow_ups.retain(|follow_up| &follow_up.application_id != id);
        tables.rounds.retain(|round| &round.application_id != id);
        tables.checklist.retain(|item| &item.application_id != id);
        Ok(true)
    }

    fn log_activity(
        &self,
        activity: Activity,
        patch: ApplicationPatch,
    ) -> Result<JobApplication, RepositoryError> {
        let mut tables = self.lock()?;
        let application =
            tables.owned_application_mut(&activity.owner, &activity.application_id)?;
        patch.apply(application);
        let updated = application.clone();
        tables.activities.push(activity);
        Ok(updated)
    }

    fn complete_follow_up(
        &self,
        follow_up: FollowUp,
        activity: Activity,
    ) -> Result<JobApplication, RepositoryError> {
        let mut tables = self.lock()?;
        let application =
            tables.owned_application_mut(&follow_up.owner, &follow_up.application_id)?;
        application.last_contacted = Some(activity.occurred_at);
        let updated = application.clone();
        tables.follow_ups.push(follow_up);
        tables.activities.push(activity);
        Ok(updated)
    }

    fn activities(
        &self,
        owner: &UserId,
        application_id: Option<&ApplicationId>,
        limit: usize,
    ) -> Result<Vec<Activity>, RepositoryError> {
        let tables = self.lock()?;
        // Reverse first so later inserts win ties on the same day.
        let mut activities: Vec<Activity> = tables
            .activities
            .iter()
            .rev()
            .filter(|activity| {
                &activity.owner == owner
                    && application_id.map_or(true, |id| &activity.application_id == id)
            })
            .cloned()
            .collect();
        activities.sort_by_key(|activity| Reverse(activity.occurred_at));
        activities.truncate(limit);
        Ok(activities)
    }

    fn follow_ups(
        &self,
        owner: &UserId,
        application_id: &ApplicationId,
        limit: usize,
    ) -> Result<Vec<FollowUp>, RepositoryError> {
        let tables = self.lock()?;
        let mut follow_ups: Vec<FollowUp> = tables
            .follow_ups
            .iter()
            .rev()
            .filter(|follow_up| {
                &follow_up.owner == owner && &follow_up.application_id == application_id
            })
            .cloned()
            .collect();
        follow_ups.sort_by_key(|follow_up| Reverse(follow_up.due_at));
        follow_ups.truncate(limit);
        Ok(follow_ups)
    }

    fn insert_round(&self, round: InterviewRound) -> Result<InterviewRound, RepositoryError> {
        let mut tables = self.lock()?;
        tables.owned_application_mut(&round.owner, &round.application_id)?;
        if tables.rounds.iter().any(|existing| existing.id == round.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.rounds.push(round.clone());
        Ok(round)
    }

    fn rounds(
        &self,
        owner: &UserId,
        application_id: Option<&ApplicationId>,
    ) -> Result<Vec<InterviewRound>, RepositoryError> {
        let tables = self.lock()?;
        let mut rounds: Vec<InterviewRound> = tables
            .rounds
            .iter()
            .filter(|round| {
                &round.owner == owner
                    && application_id.map_or(true, |id| &round.application_id == id)
            })
            .cloned()
            .collect();
        rounds.sort_by(|left, right| {
            left.application_id
                .cmp(&right.application_id)
                .then(left.round_number.cmp(&right.round_number))
        });
        Ok(rounds)
    }

    fn set_round_outcome(
        &self,
        owner: &UserId,
        id: &RoundId,
        outcome: RoundOutcome,
    ) -> Result<Option<InterviewRound>, RepositoryError> {
        let mut tables = self.lock()?;
        Ok(tables
            .rounds
            .iter_mut()
            .find(|round| &round.id == id && &round.owner == owner)
            .map(|round| {
                round.outcome = outcome;
                round.clone()
            }))
    }

    fn insert_checklist_item(&self, item: ChecklistItem) -> Result<ChecklistItem, RepositoryError> {
        let mut tables = self.lock()?;
        tables.owned_application_mut(&item.owner, &item.application_id)?;
        if tables.checklist.iter().any(|existing| existing.id == item.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.checklist.push(item.clone());
        Ok(item)
    }

    fn checklist(
        &self,
        owner: &UserId,
        application_id: Option<&ApplicationId>,
    ) -> Result<Vec<ChecklistItem>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .checklist
            .iter()
            .filter(|item| {
                &item.owner == owner && application_id.map_or(true, |id| &item.application_id == id)
            })
            .cloned()
            .collect())
    }

    fn toggle_checklist_item(
        &self,
        owner: &UserId,
        application_id: &ApplicationId,
        id: &ChecklistItemId,
    ) -> Result<Option<ChecklistItem>, RepositoryError> {
        let mut tables = self.lock()?;
        Ok(tables
            .checklist
            .iter_mut()
            .find(|item| {
                &item.id == id && &item.owner == owner && &item.application_id == application_id
            })
            .map(|item| {
                item.is_done = !item.is_done;
                item.clone()
            }))
    }

    fn insert_template(
        &self,
        template: FollowUpTemplate,
    ) -> Result<FollowUpTemplate, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.templates.iter().any(|existing| existing.id == template.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.templates.push(template.clone());
        Ok(template)
    }

    fn templates(&self, owner: &UserId) -> Result<Vec<FollowUpTemplate>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .templates
            .iter()
            .filter(|template| &template.owner == owner)
            .cloned()
            .collect())
    }

    fn delete_template(&self, owner: &UserId, id: &TemplateId) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.templates.len();
        tables
            .templates
            .retain(|template| !(&template.id == id && &template.owner == owner));
        Ok(tables.templates.len() != before)
    }
}
