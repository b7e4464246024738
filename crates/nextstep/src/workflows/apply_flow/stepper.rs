//! Navigation policy for the progress indicator.
//!
//! The engine moves wherever it is told. Refusing to skip ahead lives here so that each
//! front end can pick its own policy.

use serde::Serialize;
use tracing::debug;

use super::engine::ApplicationFlowEngine;
use super::step::ApplicationStep;
use super::submission::SubmissionSink;
use super::validation::StepValidation;

/// What a stepper needs from the flow it drives.
pub trait StepGate {
    fn current_step(&self) -> ApplicationStep;
    /// Validates `step` and records the outcome.
    fn validate_step(&self, step: ApplicationStep) -> StepValidation;
    /// Validates `step` without recording anything, for rendering.
    fn check_step(&self, step: ApplicationStep) -> StepValidation;
    fn go_to_step(&self, step: ApplicationStep);

    fn is_step_valid(&self, step: ApplicationStep) -> bool {
        self.validate_step(step).is_valid
    }
}

impl<S> StepGate for ApplicationFlowEngine<S>
where
    S: SubmissionSink + 'static,
{
    fn current_step(&self) -> ApplicationStep {
        ApplicationFlowEngine::current_step(self)
    }

    fn validate_step(&self, step: ApplicationStep) -> StepValidation {
        ApplicationFlowEngine::validate_step(self, step)
    }

    fn check_step(&self, step: ApplicationStep) -> StepValidation {
        ApplicationFlowEngine::check_step(self, step)
    }

    fn go_to_step(&self, step: ApplicationStep) {
        ApplicationFlowEngine::go_to_step(self, step)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SkipPolicy {
    /// Forward moves go one step at a time and only from a valid step.
    #[default]
    SingleStep,
    /// Forward moves may cover several steps as long as every step passed over validates.
    ValidatedPrefix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Active,
    Upcoming,
}

impl StepStatus {
    pub fn of(step: ApplicationStep, current: ApplicationStep) -> Self {
        if step < current {
            Self::Completed
        } else if step == current {
            Self::Active
        } else {
            Self::Upcoming
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepperEntry {
    pub step: ApplicationStep,
    pub label: &'static str,
    pub status: StepStatus,
    pub clickable: bool,
    pub path: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("cannot skip from {from} to {to}")]
    SkipAhead {
        from: ApplicationStep,
        to: ApplicationStep,
    },
    #[error("{step} is incomplete: {}", .errors.join("; "))]
    Incomplete {
        step: ApplicationStep,
        errors: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Stepper {
    policy: SkipPolicy,
}

impl Stepper {
    pub fn new(policy: SkipPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SkipPolicy {
        self.policy
    }

    pub fn can_navigate_to<G>(&self, gate: &G, target: ApplicationStep) -> bool
    where
        G: StepGate + ?Sized,
    {
        self.check(gate, target, |step| gate.check_step(step)).is_ok()
    }

    /// Moves the flow to `target` when the policy allows it.
    pub fn navigate<G>(
        &self,
        gate: &G,
        target: ApplicationStep,
    ) -> Result<ApplicationStep, NavigationError>
    where
        G: StepGate + ?Sized,
    {
        if let Err(err) = self.check(gate, target, |step| gate.validate_step(step)) {
            debug!(target = target.number(), error = %err, "navigation refused");
            return Err(err);
        }

        if target != gate.current_step() {
            gate.go_to_step(target);
        }
        Ok(target)
    }

    pub fn entries<G>(&self, gate: &G) -> Vec<StepperEntry>
    where
        G: StepGate + ?Sized,
    {
        let current = gate.current_step();
        ApplicationStep::ordered()
            .into_iter()
            .map(|step| StepperEntry {
                step,
                label: step.label(),
                status: StepStatus::of(step, current),
                clickable: step != current && self.can_navigate_to(gate, step),
                path: step_path(step),
            })
            .collect()
    }

    fn check<G, V>(
        &self,
        gate: &G,
        target: ApplicationStep,
        validate: V,
    ) -> Result<(), NavigationError>
    where
        G: StepGate + ?Sized,
        V: Fn(ApplicationStep) -> StepValidation,
    {
        let current = gate.current_step();
        if target <= current {
            return Ok(());
        }

        if self.policy == SkipPolicy::SingleStep && current.next() != Some(target) {
            return Err(NavigationError::SkipAhead {
                from: current,
                to: target,
            });
        }

        for step in ApplicationStep::ordered()
            .into_iter()
            .filter(|step| *step >= current && *step < target)
        {
            let validation = validate(step);
            if !validation.is_valid {
                return Err(NavigationError::Incomplete {
                    step,
                    errors: validation.errors,
                });
            }
        }

        Ok(())
    }
}

/// Path suffix under `/jobs/{id}/apply` for the URL-driven stepper.
pub const fn step_path(step: ApplicationStep) -> &'static str {
    match step {
        ApplicationStep::Documents => "",
        ApplicationStep::Questions => "/questions",
        ApplicationStep::Profile => "/profile",
        ApplicationStep::Review => "/review",
    }
}

pub fn step_url(job_id: &str, step: ApplicationStep) -> String {
    format!("/jobs/{job_id}/apply{}", step_path(step))
}

/// Unknown paths fall back to the first step.
pub fn step_from_path(path: &str) -> ApplicationStep {
    let path = path.trim_end_matches('/');
    if path.ends_with("/review") {
        ApplicationStep::Review
    } else if path.ends_with("/profile") {
        ApplicationStep::Profile
    } else if path.ends_with("/questions") {
        ApplicationStep::Questions
    } else {
        ApplicationStep::Documents
    }
}
