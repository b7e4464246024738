//! Four-step job application wizard: documents, questions, profile, review.
//!
//! The engine owns the wizard state and the submit protocol. Loading, persistence and
//! navigation policy sit behind traits so hosts can swap them.

pub mod catalog;
pub mod domain;
pub mod engine;
pub mod form;
pub mod loader;
pub mod router;
pub mod sessions;
pub mod step;
pub mod stepper;
pub mod submission;
pub mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, SeedCatalog};
pub use domain::{
    ApplicationJob, ApplicationUser, CertificationEntry, CoverLetterDocument, CoverLetterOption,
    EducationEntry, ExperienceEntry, ResumeDocument, ResumeSource, SalaryRange, SALARY_RANGES,
};
pub use engine::{ApplicationFlowEngine, SubmitError, SubmitOutcome, WizardState};
pub use form::{
    ApplicationFormData, DocumentsPatch, DocumentsStepData, ProfilePatch, ProfileStepData,
    QuestionsPatch, QuestionsStepData, ReviewStepData, ADDITIONAL_NOTES_SOFT_LIMIT,
};
pub use loader::{load_flow_context, ApplicationContextLoader, DocumentLibrary, LoadError, LoadState};
pub use router::{apply_flow_router, ApplyFlowService, FlowView};
pub use sessions::{FlowSession, FlowSessions, SessionId, SinkProvider};
pub use step::{ApplicationStep, StepError};
pub use stepper::{
    step_from_path, step_path, step_url, NavigationError, SkipPolicy, StepGate, StepStatus,
    Stepper, StepperEntry,
};
pub use submission::{ApplicationSubmission, SubmissionError, SubmissionSink};
pub use validation::{validate_step, StepValidation};
