use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{ApplicationId, ApplicationStatus, JobApplication, StatusUpdate};
use super::repository::{ApplicationRepository, RepositoryError};
use crate::workflows::apply_flow::ApplicationSubmission;

/// Records applications and lets applicants follow them afterwards.
pub struct ApplicationTracker<R> {
    repository: Arc<R>,
    sequence: AtomicU64,
}

impl<R> ApplicationTracker<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            sequence: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> ApplicationId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ApplicationId(format!("app-{id:06}"))
    }

    /// Stores a new pending application. One application per user and job, enforced
    /// atomically by the repository insert.
    pub fn create(
        &self,
        user_id: &str,
        submission: ApplicationSubmission,
    ) -> Result<JobApplication, TrackerError> {
        if self
            .repository
            .find_for_user_and_job(user_id, &submission.job_id)?
            .is_some()
        {
            debug!(user_id, job_id = %submission.job_id, "duplicate application refused");
            return Err(TrackerError::AlreadyApplied);
        }

        let record = JobApplication {
            id: self.next_id(),
            job_id: submission.job_id,
            user_id: user_id.to_string(),
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
            next_step: None,
            interview_at: None,
            notes: submission.notes,
        };

        let stored = self.repository.insert(record).map_err(|err| match err {
            RepositoryError::Conflict => TrackerError::AlreadyApplied,
            other => TrackerError::Repository(other),
        })?;
        info!(application_id = %stored.id.0, job_id = %stored.job_id, "application recorded");
        Ok(stored)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<JobApplication, TrackerError> {
        self.repository.fetch(id)?.ok_or(TrackerError::NotFound)
    }

    /// Newest first.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<JobApplication>, TrackerError> {
        let mut records = self.repository.list_for_user(user_id)?;
        newest_first(&mut records);
        Ok(records)
    }

    /// Applications received for one job, newest first.
    pub fn list_for_job(&self, job_id: &str) -> Result<Vec<JobApplication>, TrackerError> {
        let mut records = self.repository.list_for_job(job_id)?;
        newest_first(&mut records);
        Ok(records)
    }

    pub fn has_applied(&self, user_id: &str, job_id: &str) -> Result<bool, TrackerError> {
        Ok(self
            .repository
            .find_for_user_and_job(user_id, job_id)?
            .is_some())
    }

    pub fn update_status(
        &self,
        id: &ApplicationId,
        update: StatusUpdate,
    ) -> Result<JobApplication, TrackerError> {
        let mut record = self.get(id)?;
        record.status = update.status;
        record.next_step = update.next_step;
        record.interview_at = update.interview_at;

        self.repository.update(record.clone())?;
        info!(application_id = %id.0, status = record.status.label(), "application status updated");
        Ok(record)
    }

    pub fn update_notes(
        &self,
        user_id: &str,
        id: &ApplicationId,
        notes: Option<String>,
    ) -> Result<JobApplication, TrackerError> {
        let mut record = self.owned(user_id, id)?;
        record.notes = notes;
        self.repository.update(record.clone())?;
        Ok(record)
    }

    /// Withdraws an application.
    pub fn delete(&self, user_id: &str, id: &ApplicationId) -> Result<(), TrackerError> {
        self.owned(user_id, id)?;
        self.repository.delete(id)?;
        info!(application_id = %id.0, "application withdrawn");
        Ok(())
    }

    fn owned(&self, user_id: &str, id: &ApplicationId) -> Result<JobApplication, TrackerError> {
        let record = self.get(id)?;
        if record.user_id != user_id {
            return Err(TrackerError::NotAuthorized);
        }
        Ok(record)
    }
}

fn newest_first(records: &mut [JobApplication]) {
    records.sort_by(|a, b| {
        b.applied_at
            .cmp(&a.applied_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Already applied to this job")]
    AlreadyApplied,
    #[error("Not authorized to change this application")]
    NotAuthorized,
    #[error("application not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
