use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::engine::{ApplicationFlowEngine, SubmitError, SubmitOutcome, WizardState};
use super::form::{DocumentsPatch, ProfilePatch, QuestionsPatch};
use super::loader::{load_flow_context, ApplicationContextLoader, DocumentLibrary, LoadState};
use super::sessions::{FlowSession, FlowSessions, SessionId, SinkProvider};
use super::step::ApplicationStep;
use super::stepper::{Stepper, StepperEntry};
use super::submission::SubmissionError;
use crate::workflows::identity::user_from_headers;

/// Everything the HTTP surface needs to open and drive application flows.
pub struct ApplyFlowService<L, P>
where
    P: SinkProvider,
{
    loader: Arc<L>,
    sinks: P,
    sessions: FlowSessions<P::Sink>,
    stepper: Stepper,
    salary_currency: String,
}

impl<L, P> ApplyFlowService<L, P>
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    pub fn new(loader: Arc<L>, sinks: P, salary_currency: impl Into<String>) -> Self {
        Self {
            loader,
            sinks,
            sessions: FlowSessions::default(),
            stepper: Stepper::default(),
            salary_currency: salary_currency.into(),
        }
    }

    pub fn with_stepper(mut self, stepper: Stepper) -> Self {
        self.stepper = stepper;
        self
    }

    pub fn sessions(&self) -> &FlowSessions<P::Sink> {
        &self.sessions
    }

    fn session_for(
        &self,
        headers: &HeaderMap,
        session_id: String,
    ) -> Result<(SessionId, FlowSession<P::Sink>), Response> {
        let Some(user) = user_from_headers(headers) else {
            return Err(error_response(StatusCode::UNAUTHORIZED, "sign in required"));
        };

        let id = SessionId(session_id);
        match self.sessions.get(&id) {
            Some(session) if session.owner == user => Ok((id, session)),
            _ => Err(error_response(
                StatusCode::NOT_FOUND,
                "application flow not found",
            )),
        }
    }
}

/// Wizard state plus the stepper rendering for one session.
#[derive(Debug, Serialize)]
pub struct FlowView {
    pub session_id: SessionId,
    pub can_proceed: bool,
    pub stepper: Vec<StepperEntry>,
    pub state: WizardState,
}

impl FlowView {
    fn build<S>(id: &SessionId, engine: &ApplicationFlowEngine<S>, stepper: &Stepper) -> Self
    where
        S: super::submission::SubmissionSink + 'static,
    {
        let entries = stepper.entries(engine);
        let can_proceed = engine.check_step(engine.current_step()).is_valid;
        Self {
            session_id: id.clone(),
            can_proceed,
            stepper: entries,
            state: engine.state(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub step: ApplicationStep,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmationRequest {
    pub confirmed: bool,
}

/// Router builder exposing the application flow endpoints.
pub fn apply_flow_router<L, P>(service: Arc<ApplyFlowService<L, P>>) -> Router
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    Router::new()
        .route("/api/v1/jobs/:job_id/apply", post(open_handler::<L, P>))
        .route(
            "/api/v1/apply/:session_id",
            get(show_handler::<L, P>).delete(cancel_handler::<L, P>),
        )
        .route(
            "/api/v1/apply/:session_id/navigate",
            post(navigate_handler::<L, P>),
        )
        .route(
            "/api/v1/apply/:session_id/documents",
            patch(documents_handler::<L, P>),
        )
        .route(
            "/api/v1/apply/:session_id/documents/saved",
            get(saved_documents_handler::<L, P>),
        )
        .route(
            "/api/v1/apply/:session_id/questions",
            patch(questions_handler::<L, P>),
        )
        .route(
            "/api/v1/apply/:session_id/profile",
            patch(profile_handler::<L, P>),
        )
        .route(
            "/api/v1/apply/:session_id/confirmation",
            put(confirmation_handler::<L, P>),
        )
        .route(
            "/api/v1/apply/:session_id/validation/:step",
            get(validation_handler::<L, P>),
        )
        .route(
            "/api/v1/apply/:session_id/submit",
            post(submit_handler::<L, P>),
        )
        .with_state(service)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn view_response<L, P>(
    service: &ApplyFlowService<L, P>,
    id: &SessionId,
    session: &FlowSession<P::Sink>,
    status: StatusCode,
) -> Response
where
    P: SinkProvider,
{
    let view = FlowView::build(id, &session.engine, &service.stepper);
    (status, Json(view)).into_response()
}

pub(crate) async fn open_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    let user = user_from_headers(&headers);
    let state = match load_flow_context(service.loader.as_ref(), &job_id, user.as_deref()).await {
        Ok(state) => state,
        Err(err) => {
            warn!(%job_id, error = %err, "unable to load application flow context");
            return error_response(StatusCode::SERVICE_UNAVAILABLE, &err.to_string());
        }
    };

    match state {
        LoadState::Ready { job, applicant } => {
            let sink = service.sinks.sink_for(&applicant);
            let engine = ApplicationFlowEngine::with_currency(sink, service.salary_currency.clone());
            let owner = applicant.id.clone();
            engine.initialize(job, applicant);

            let (id, session) = service.sessions.open(&owner, &job_id, engine);
            info!(session_id = %id.0, %job_id, applicant_id = %owner, "application flow opened");
            view_response(&service, &id, &session, StatusCode::CREATED)
        }
        LoadState::JobNotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "job not found", "state": "job_not_found" })),
        )
            .into_response(),
        LoadState::SignInRequired => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "sign in required", "state": "sign_in_required" })),
        )
            .into_response(),
        LoadState::Loading => error_response(StatusCode::SERVICE_UNAVAILABLE, "still loading"),
    }
}

pub(crate) async fn show_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    match service.session_for(&headers, session_id) {
        Ok((id, session)) => view_response(&service, &id, &session, StatusCode::OK),
        Err(response) => response,
    }
}

pub(crate) async fn navigate_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<NavigateRequest>,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    let (id, session) = match service.session_for(&headers, session_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    match service.stepper.navigate(session.engine.as_ref(), request.step) {
        Ok(_) => view_response(&service, &id, &session, StatusCode::OK),
        Err(err) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": err.to_string(), "current_step": session.engine.current_step() })),
        )
            .into_response(),
    }
}

pub(crate) async fn documents_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<DocumentsPatch>,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    match service.session_for(&headers, session_id) {
        Ok((id, session)) => {
            session.engine.update_documents(patch);
            view_response(&service, &id, &session, StatusCode::OK)
        }
        Err(response) => response,
    }
}

pub(crate) async fn saved_documents_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    let (_, session) = match service.session_for(&headers, session_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    match service.loader.list_saved_documents(&session.owner).await {
        Ok(documents) => (StatusCode::OK, Json(documents)).into_response(),
        Err(err) => error_response(StatusCode::SERVICE_UNAVAILABLE, &err.to_string()),
    }
}

pub(crate) async fn questions_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<QuestionsPatch>,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    match service.session_for(&headers, session_id) {
        Ok((id, session)) => {
            session.engine.update_questions(patch);
            view_response(&service, &id, &session, StatusCode::OK)
        }
        Err(response) => response,
    }
}

pub(crate) async fn profile_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<ProfilePatch>,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    match service.session_for(&headers, session_id) {
        Ok((id, session)) => {
            session.engine.update_profile(patch);
            view_response(&service, &id, &session, StatusCode::OK)
        }
        Err(response) => response,
    }
}

pub(crate) async fn confirmation_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ConfirmationRequest>,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    match service.session_for(&headers, session_id) {
        Ok((id, session)) => {
            session.engine.set_confirmation(request.confirmed);
            view_response(&service, &id, &session, StatusCode::OK)
        }
        Err(response) => response,
    }
}

pub(crate) async fn validation_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path((session_id, step)): Path<(String, u8)>,
    headers: HeaderMap,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    let (_, session) = match service.session_for(&headers, session_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    match ApplicationStep::from_number(step) {
        Ok(step) => (StatusCode::OK, Json(session.engine.validate_step(step))).into_response(),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

pub(crate) async fn submit_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    let (id, session) = match service.session_for(&headers, session_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    match session.engine.submit_action().await {
        Ok(SubmitOutcome::Submitted) => {
            let job_id = session.engine.state().job.map(|job| job.id);
            service.sessions.close(&id);
            (
                StatusCode::ACCEPTED,
                Json(json!({ "status": "submitted", "job_id": job_id })),
            )
                .into_response()
        }
        Ok(SubmitOutcome::Skipped) => error_response(StatusCode::CONFLICT, "no job loaded"),
        Err(SubmitError::Validation { errors }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "Please complete all required fields",
                "errors": errors,
            })),
        )
            .into_response(),
        Err(SubmitError::InProgress) => {
            error_response(StatusCode::CONFLICT, "submission already in progress")
        }
        Err(SubmitError::Sink(err)) => {
            let status = match err {
                SubmissionError::AlreadyApplied => StatusCode::CONFLICT,
                SubmissionError::Unauthenticated => StatusCode::UNAUTHORIZED,
                SubmissionError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SubmissionError::Unavailable(_) => StatusCode::BAD_GATEWAY,
            };
            error_response(status, &err.to_string())
        }
    }
}

pub(crate) async fn cancel_handler<L, P>(
    State(service): State<Arc<ApplyFlowService<L, P>>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    L: ApplicationContextLoader + DocumentLibrary + 'static,
    P: SinkProvider + 'static,
{
    match service.session_for(&headers, session_id) {
        Ok((id, session)) => {
            session.engine.reset();
            service.sessions.close(&id);
            info!(session_id = %id.0, "application flow cancelled");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(response) => response,
    }
}
