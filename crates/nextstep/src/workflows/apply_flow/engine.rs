use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{ApplicationJob, ApplicationUser};
use super::form::{ApplicationFormData, DocumentsPatch, ProfilePatch, ProfileStepData, QuestionsPatch};
use super::step::ApplicationStep;
use super::submission::{SubmissionError, SubmissionSink};
use super::validation::{self, StepValidation};

/// Everything one applicant has done in one pass through the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardState {
    pub current_step: ApplicationStep,
    pub job: Option<ApplicationJob>,
    pub applicant: Option<ApplicationUser>,
    pub form_data: ApplicationFormData,
    pub validation: BTreeMap<ApplicationStep, StepValidation>,
    pub is_submitting: bool,
    pub is_complete: bool,
}

impl WizardState {
    pub fn pristine(salary_currency: &str) -> Self {
        let validation = ApplicationStep::ordered()
            .into_iter()
            .map(|step| (step, StepValidation::unchecked(step)))
            .collect();

        Self {
            current_step: ApplicationStep::FIRST,
            job: None,
            applicant: None,
            form_data: ApplicationFormData::new(salary_currency),
            validation,
            is_submitting: false,
            is_complete: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// No job was loaded, so there was nothing to submit.
    Skipped,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Please complete all required fields")]
    Validation { errors: Vec<String> },
    #[error("submission already in progress")]
    InProgress,
    #[error(transparent)]
    Sink(#[from] SubmissionError),
}

struct FlowCell {
    state: WizardState,
    // Bumped by initialize/reset so a submission that outlives its session cannot mark the
    // next one complete.
    generation: u64,
}

/// Step-gated application wizard for a single applicant session.
///
/// All methods take `&self`; the state lives behind a mutex that is never held across an
/// `.await`, so one engine can be shared through an `Arc` by concurrent request handlers.
pub struct ApplicationFlowEngine<S> {
    sink: Arc<S>,
    salary_currency: String,
    cell: Mutex<FlowCell>,
}

impl<S> ApplicationFlowEngine<S>
where
    S: SubmissionSink + 'static,
{
    pub fn new(sink: Arc<S>) -> Self {
        Self::with_currency(sink, "PHP")
    }

    pub fn with_currency(sink: Arc<S>, salary_currency: impl Into<String>) -> Self {
        let salary_currency = salary_currency.into();
        let state = WizardState::pristine(&salary_currency);

        Self {
            sink,
            salary_currency,
            cell: Mutex::new(FlowCell {
                state,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlowCell> {
        lock_cell(&self.cell)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WizardState {
        self.lock().state.clone()
    }

    pub fn current_step(&self) -> ApplicationStep {
        self.lock().state.current_step
    }

    pub fn initialize(&self, job: ApplicationJob, applicant: ApplicationUser) {
        let mut state = WizardState::pristine(&self.salary_currency);
        state.form_data.profile = ProfileStepData::seeded_from(&applicant);
        debug!(job_id = %job.id, applicant_id = %applicant.id, "application flow initialized");
        state.job = Some(job);
        state.applicant = Some(applicant);

        let mut cell = self.lock();
        cell.state = state;
        cell.generation += 1;
    }

    pub fn reset(&self) {
        let mut cell = self.lock();
        cell.state = WizardState::pristine(&self.salary_currency);
        cell.generation += 1;
    }

    /// Moves to `step` without any gating; stepper components decide what is allowed.
    pub fn go_to_step(&self, step: ApplicationStep) {
        self.lock().state.current_step = step;
    }

    pub fn next_step(&self) {
        let mut cell = self.lock();
        if let Some(next) = cell.state.current_step.next() {
            cell.state.current_step = next;
        }
    }

    pub fn prev_step(&self) {
        let mut cell = self.lock();
        if let Some(previous) = cell.state.current_step.previous() {
            cell.state.current_step = previous;
        }
    }

    pub fn update_documents(&self, patch: DocumentsPatch) {
        self.lock().state.form_data.documents.apply(patch);
    }

    pub fn update_questions(&self, patch: QuestionsPatch) {
        self.lock().state.form_data.questions.apply(patch);
    }

    pub fn update_profile(&self, patch: ProfilePatch) {
        self.lock().state.form_data.profile.apply(patch);
    }

    pub fn set_confirmation(&self, confirmed: bool) {
        self.lock().state.form_data.review.is_confirmed = confirmed;
    }

    /// Checks `step` against the current form data and records the result.
    pub fn validate_step(&self, step: ApplicationStep) -> StepValidation {
        record_validation(&mut self.lock().state, step)
    }

    /// Same check as [`Self::validate_step`] without touching the recorded results.
    pub fn check_step(&self, step: ApplicationStep) -> StepValidation {
        validation::validate_step(step, &self.lock().state.form_data)
    }

    pub fn is_step_valid(&self, step: ApplicationStep) -> bool {
        self.validate_step(step).is_valid
    }

    pub fn can_proceed(&self) -> bool {
        let current = self.current_step();
        self.is_step_valid(current)
    }

    /// Re-validates the review step and hands the form to the sink.
    ///
    /// The sink is never called when validation fails or another submission is in flight.
    /// `is_submitting` is cleared on every exit path, including when the returned future is
    /// dropped before completion.
    pub async fn submit_action(&self) -> Result<SubmitOutcome, SubmitError> {
        let (form_data, job, generation) = {
            let mut cell = self.lock();
            let generation = cell.generation;
            let state = &mut cell.state;

            let Some(job) = state.job.clone() else {
                debug!("submit requested before a job was loaded");
                return Ok(SubmitOutcome::Skipped);
            };

            if state.is_submitting {
                warn!(job_id = %job.id, "rejecting overlapping submission");
                return Err(SubmitError::InProgress);
            }

            let review = record_validation(state, ApplicationStep::Review);
            if !review.is_valid {
                debug!(job_id = %job.id, errors = ?review.errors, "submission blocked by validation");
                return Err(SubmitError::Validation {
                    errors: review.errors,
                });
            }

            state.is_submitting = true;
            (state.form_data.clone(), job, generation)
        };

        let _submitting = SubmittingGuard {
            cell: &self.cell,
            generation,
        };

        info!(job_id = %job.id, "submitting application");
        match self.sink.submit(&form_data, &job).await {
            Ok(()) => {
                let mut cell = self.lock();
                if cell.generation == generation {
                    cell.state.is_complete = true;
                }
                info!(job_id = %job.id, "application submitted");
                Ok(SubmitOutcome::Submitted)
            }
            Err(err) => {
                warn!(job_id = %job.id, error = %err, "application submission failed");
                Err(SubmitError::Sink(err))
            }
        }
    }
}

fn lock_cell(cell: &Mutex<FlowCell>) -> MutexGuard<'_, FlowCell> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record_validation(state: &mut WizardState, step: ApplicationStep) -> StepValidation {
    let result = validation::validate_step(step, &state.form_data);
    state.validation.insert(step, result.clone());
    result
}

struct SubmittingGuard<'a> {
    cell: &'a Mutex<FlowCell>,
    generation: u64,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        let mut cell = lock_cell(self.cell);
        if cell.generation == self.generation {
            cell.state.is_submitting = false;
        }
    }
}
