use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::repository::ApplicationRepository;
use super::service::{ApplicationTracker, TrackerError};
use crate::workflows::apply_flow::{
    ApplicationFormData, ApplicationJob, ApplicationSubmission, ApplicationUser, SinkProvider,
    SubmissionError, SubmissionSink,
};

/// Submission sink that records the application for one signed-in user.
pub struct TrackerSink<R> {
    tracker: Arc<ApplicationTracker<R>>,
    user_id: String,
}

impl<R> TrackerSink<R> {
    pub fn new(tracker: Arc<ApplicationTracker<R>>, user_id: impl Into<String>) -> Self {
        Self {
            tracker,
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl<R> SubmissionSink for TrackerSink<R>
where
    R: ApplicationRepository + 'static,
{
    async fn submit(
        &self,
        form: &ApplicationFormData,
        job: &ApplicationJob,
    ) -> Result<(), SubmissionError> {
        if self.user_id.trim().is_empty() {
            return Err(SubmissionError::Unauthenticated);
        }

        let submission = ApplicationSubmission::from_form(form, job);
        match self.tracker.create(&self.user_id, submission) {
            Ok(_) => Ok(()),
            Err(TrackerError::AlreadyApplied) => Err(SubmissionError::AlreadyApplied),
            Err(TrackerError::NotAuthorized) => Err(SubmissionError::Unauthenticated),
            Err(other) => {
                warn!(job_id = %job.id, error = %other, "tracker refused application");
                Err(SubmissionError::Unavailable(other.to_string()))
            }
        }
    }
}

/// Hands each flow a sink bound to its applicant.
pub struct TrackerSinks<R> {
    tracker: Arc<ApplicationTracker<R>>,
}

impl<R> TrackerSinks<R> {
    pub fn new(tracker: Arc<ApplicationTracker<R>>) -> Self {
        Self { tracker }
    }
}

impl<R> SinkProvider for TrackerSinks<R>
where
    R: ApplicationRepository + 'static,
{
    type Sink = TrackerSink<R>;

    fn sink_for(&self, applicant: &ApplicationUser) -> Arc<TrackerSink<R>> {
        Arc::new(TrackerSink::new(
            Arc::clone(&self.tracker),
            applicant.id.clone(),
        ))
    }
}
