use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::ApplicationJob;
use super::form::ApplicationFormData;

/// Persists a completed application. Implementations own retries and timeouts.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(
        &self,
        form: &ApplicationFormData,
        job: &ApplicationJob,
    ) -> Result<(), SubmissionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Already applied to this job")]
    AlreadyApplied,
    #[error("Must be authenticated to apply")]
    Unauthenticated,
    #[error("application rejected: {0}")]
    Rejected(String),
    #[error("application store unavailable: {0}")]
    Unavailable(String),
}

/// Record handed to the application store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub job_id: String,
    pub notes: Option<String>,
}

impl ApplicationSubmission {
    /// Notes come from the questions step only; cover letter text is never copied here.
    pub fn from_form(form: &ApplicationFormData, job: &ApplicationJob) -> Self {
        let notes = form
            .questions
            .additional_notes
            .as_deref()
            .filter(|notes| !notes.trim().is_empty())
            .map(str::to_string);

        Self {
            job_id: job.id.clone(),
            notes,
        }
    }
}
