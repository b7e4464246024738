use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::Notify;

use crate::workflows::apply_flow::domain::{
    ApplicationJob, ApplicationUser, ResumeDocument, ResumeSource,
};
use crate::workflows::apply_flow::form::ApplicationFormData;
use crate::workflows::apply_flow::loader::{ApplicationContextLoader, DocumentLibrary, LoadError};
use crate::workflows::apply_flow::sessions::SinkProvider;
use crate::workflows::apply_flow::submission::{
    ApplicationSubmission, SubmissionError, SubmissionSink,
};
use crate::workflows::apply_flow::{ApplicationFlowEngine, ApplyFlowService};

pub(super) fn job() -> ApplicationJob {
    ApplicationJob {
        id: "J1".to_string(),
        title: "Backend Engineer".to_string(),
        company: "Acme".to_string(),
        location: "Manila".to_string(),
        description: "Build services".to_string(),
        employment_type: Some("full_time".to_string()),
        location_type: Some("hybrid".to_string()),
        min_salary: Some(40_000),
        max_salary: Some(60_000),
        salary_currency: Some("PHP".to_string()),
        salary_period: Some("monthly".to_string()),
        required_skills: vec!["Rust".to_string()],
        experience_level: None,
        posted_date: NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date"),
    }
}

pub(super) fn applicant() -> ApplicationUser {
    ApplicationUser {
        id: "U1".to_string(),
        name: "Ana Reyes".to_string(),
        email: "ana@example.com".to_string(),
        avatar_url: None,
        location: Some("Quezon City".to_string()),
        experience: None,
        education: None,
        skills: Some(vec!["Go".to_string()]),
    }
}

pub(super) fn resume() -> ResumeDocument {
    ResumeDocument {
        id: "R1".to_string(),
        name: "ana-resume.pdf".to_string(),
        url: None,
        source: ResumeSource::Upload,
        uploaded_at: None,
    }
}

/// Records every submission and answers with a fixed result.
pub(super) struct SpySink {
    result: Result<(), SubmissionError>,
    calls: Mutex<Vec<ApplicationSubmission>>,
}

impl SpySink {
    pub(super) fn accepting() -> Arc<Self> {
        Arc::new(Self {
            result: Ok(()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn failing(err: SubmissionError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(err),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn calls(&self) -> Vec<ApplicationSubmission> {
        self.calls.lock().expect("spy mutex poisoned").clone()
    }
}

#[async_trait]
impl SubmissionSink for SpySink {
    async fn submit(
        &self,
        form: &ApplicationFormData,
        job: &ApplicationJob,
    ) -> Result<(), SubmissionError> {
        self.calls
            .lock()
            .expect("spy mutex poisoned")
            .push(ApplicationSubmission::from_form(form, job));
        self.result.clone()
    }
}

/// Parks inside `submit` until the test releases it.
#[derive(Default)]
pub(super) struct GatedSink {
    pub(super) started: Notify,
    pub(super) release: Notify,
}

#[async_trait]
impl SubmissionSink for GatedSink {
    async fn submit(
        &self,
        _form: &ApplicationFormData,
        _job: &ApplicationJob,
    ) -> Result<(), SubmissionError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

pub(super) fn initialized<S>(sink: Arc<S>) -> ApplicationFlowEngine<S>
where
    S: SubmissionSink + 'static,
{
    let engine = ApplicationFlowEngine::new(sink);
    engine.initialize(job(), applicant());
    engine
}

/// Engine with every review requirement satisfied.
pub(super) fn ready_to_submit<S>(sink: Arc<S>) -> ApplicationFlowEngine<S>
where
    S: SubmissionSink + 'static,
{
    use crate::workflows::apply_flow::form::{DocumentsPatch, QuestionsPatch};

    let engine = initialized(sink);
    engine.update_documents(DocumentsPatch::resume(resume()));
    engine.update_questions(QuestionsPatch::expected_salary("50000"));
    engine.set_confirmation(true);
    engine
}

#[derive(Default)]
pub(super) struct MemoryLoader {
    pub(super) jobs: HashMap<String, ApplicationJob>,
    pub(super) applicants: HashMap<String, ApplicationUser>,
    pub(super) documents: HashMap<String, Vec<ResumeDocument>>,
    pub(super) offline: bool,
}

impl MemoryLoader {
    pub(super) fn seeded() -> Self {
        let mut loader = Self::default();
        loader.jobs.insert("J1".to_string(), job());
        loader.applicants.insert("U1".to_string(), applicant());
        loader.documents.insert(
            "U1".to_string(),
            vec![ResumeDocument {
                id: "R9".to_string(),
                name: "saved-cv.pdf".to_string(),
                url: Some("https://files.example.com/R9".to_string()),
                source: ResumeSource::Existing,
                uploaded_at: None,
            }],
        );
        loader
    }

    fn check_online(&self) -> Result<(), LoadError> {
        if self.offline {
            Err(LoadError::Unavailable("directory offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ApplicationContextLoader for MemoryLoader {
    async fn load_job(&self, job_id: &str) -> Result<Option<ApplicationJob>, LoadError> {
        self.check_online()?;
        Ok(self.jobs.get(job_id).cloned())
    }

    async fn load_applicant(&self, user_id: &str) -> Result<Option<ApplicationUser>, LoadError> {
        self.check_online()?;
        Ok(self.applicants.get(user_id).cloned())
    }
}

#[async_trait]
impl DocumentLibrary for MemoryLoader {
    async fn list_saved_documents(
        &self,
        applicant_id: &str,
    ) -> Result<Vec<ResumeDocument>, LoadError> {
        self.check_online()?;
        Ok(self.documents.get(applicant_id).cloned().unwrap_or_default())
    }
}

/// Hands every session the same sink.
pub(super) struct SharedSink<S>(pub(super) Arc<S>);

impl<S> SinkProvider for SharedSink<S>
where
    S: SubmissionSink + 'static,
{
    type Sink = S;

    fn sink_for(&self, _applicant: &ApplicationUser) -> Arc<S> {
        Arc::clone(&self.0)
    }
}

pub(super) type TestService<S> = ApplyFlowService<MemoryLoader, SharedSink<S>>;

pub(super) fn build_service<S>(sink: Arc<S>) -> Arc<TestService<S>>
where
    S: SubmissionSink + 'static,
{
    Arc::new(ApplyFlowService::new(
        Arc::new(MemoryLoader::seeded()),
        SharedSink(sink),
        "PHP",
    ))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
