use super::domain::{ApplicationId, JobApplication};

/// Storage abstraction so the tracker can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    /// Stores a new record. Must fail with [`RepositoryError::Conflict`] when the id is taken
    /// or the user already has an application for the same job, checked atomically with the write.
    fn insert(&self, record: JobApplication) -> Result<JobApplication, RepositoryError>;
    fn update(&self, record: JobApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<JobApplication>, RepositoryError>;
    fn find_for_user_and_job(
        &self,
        user_id: &str,
        job_id: &str,
    ) -> Result<Option<JobApplication>, RepositoryError>;
    fn list_for_user(&self, user_id: &str) -> Result<Vec<JobApplication>, RepositoryError>;
    fn list_for_job(&self, job_id: &str) -> Result<Vec<JobApplication>, RepositoryError>;
    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
