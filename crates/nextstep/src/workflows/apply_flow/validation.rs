use serde::{Deserialize, Serialize};

use super::form::ApplicationFormData;
use super::step::ApplicationStep;

pub const RESUME_MISSING: &str = "Please upload or select a resume";
pub const SALARY_MISSING: &str = "Please select your expected salary";
pub const REVIEW_RESUME_REQUIRED: &str = "Resume is required";
pub const REVIEW_SALARY_REQUIRED: &str = "Expected salary is required";
pub const REVIEW_UNCONFIRMED: &str = "Please confirm your application details";

/// Result of checking one step. Errors are data, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl StepValidation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Placeholder recorded for a step nobody has validated yet.
    pub(crate) fn unchecked(step: ApplicationStep) -> Self {
        Self {
            is_valid: step == ApplicationStep::Profile,
            errors: Vec::new(),
        }
    }
}

pub fn validate_step(step: ApplicationStep, form: &ApplicationFormData) -> StepValidation {
    let errors = match step {
        ApplicationStep::Documents => documents_errors(form),
        ApplicationStep::Questions => questions_errors(form),
        // Profile edits are optional enrichment.
        ApplicationStep::Profile => Vec::new(),
        ApplicationStep::Review => review_errors(form),
    };

    StepValidation::from_errors(errors)
}

fn documents_errors(form: &ApplicationFormData) -> Vec<String> {
    if form.documents.resume.is_none() {
        vec![RESUME_MISSING.to_string()]
    } else {
        Vec::new()
    }
}

fn questions_errors(form: &ApplicationFormData) -> Vec<String> {
    if form.questions.expected_salary.is_empty() {
        vec![SALARY_MISSING.to_string()]
    } else {
        Vec::new()
    }
}

fn review_errors(form: &ApplicationFormData) -> Vec<String> {
    let mut errors = Vec::new();
    if form.documents.resume.is_none() {
        errors.push(REVIEW_RESUME_REQUIRED.to_string());
    }
    if form.questions.expected_salary.is_empty() {
        errors.push(REVIEW_SALARY_REQUIRED.to_string());
    }
    if !form.review.is_confirmed {
        errors.push(REVIEW_UNCONFIRMED.to_string());
    }
    errors
}
