use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::domain::{ApplicationJob, ApplicationUser, ResumeDocument};

/// Read side of the job board and user directory.
#[async_trait]
pub trait ApplicationContextLoader: Send + Sync {
    async fn load_job(&self, job_id: &str) -> Result<Option<ApplicationJob>, LoadError>;
    async fn load_applicant(&self, user_id: &str) -> Result<Option<ApplicationUser>, LoadError>;
}

/// Documents an applicant saved earlier and can pick instead of uploading.
#[async_trait]
pub trait DocumentLibrary: Send + Sync {
    async fn list_saved_documents(
        &self,
        applicant_id: &str,
    ) -> Result<Vec<ResumeDocument>, LoadError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// What a host renders while preparing a flow. Only `Ready` carries data for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    Loading,
    JobNotFound,
    SignInRequired,
    Ready {
        job: ApplicationJob,
        applicant: ApplicationUser,
    },
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadState::Loading)
    }
}

/// Resolves the job first, then the signed-in applicant.
pub async fn load_flow_context<L>(
    loader: &L,
    job_id: &str,
    user_id: Option<&str>,
) -> Result<LoadState, LoadError>
where
    L: ApplicationContextLoader + ?Sized,
{
    let Some(job) = loader.load_job(job_id).await? else {
        debug!(job_id, "job not found for application flow");
        return Ok(LoadState::JobNotFound);
    };

    let Some(user_id) = user_id else {
        return Ok(LoadState::SignInRequired);
    };

    match loader.load_applicant(user_id).await? {
        Some(applicant) => Ok(LoadState::Ready { job, applicant }),
        None => {
            debug!(user_id, "applicant record missing for signed-in user");
            Ok(LoadState::SignInRequired)
        }
    }
}
