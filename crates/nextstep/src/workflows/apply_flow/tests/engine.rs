use std::sync::Arc;

use super::common::*;
use crate::workflows::apply_flow::domain::CertificationEntry;
use crate::workflows::apply_flow::engine::{
    ApplicationFlowEngine, SubmitError, SubmitOutcome, WizardState,
};
use crate::workflows::apply_flow::form::{DocumentsPatch, ProfilePatch, QuestionsPatch};
use crate::workflows::apply_flow::step::ApplicationStep;
use crate::workflows::apply_flow::submission::SubmissionError;
use crate::workflows::apply_flow::validation::{
    REVIEW_RESUME_REQUIRED, REVIEW_SALARY_REQUIRED, REVIEW_UNCONFIRMED, SALARY_MISSING,
};

#[test]
fn initialize_seeds_profile_from_applicant() {
    let engine = initialized(SpySink::accepting());
    let state = engine.state();

    assert_eq!(state.current_step, ApplicationStep::Documents);
    assert_eq!(state.job.as_ref().map(|job| job.id.as_str()), Some("J1"));
    assert_eq!(state.form_data.profile.skills, vec!["Go".to_string()]);
    assert!(state.form_data.profile.experience.is_empty());
    assert!(state.form_data.profile.certifications.is_empty());
    assert!(!state.is_submitting);
    assert!(!state.is_complete);
}

#[test]
fn profile_edits_leave_applicant_record_alone() {
    let engine = initialized(SpySink::accepting());
    engine.update_profile(ProfilePatch {
        skills: Some(vec!["Go".to_string(), "Rust".to_string()]),
        ..ProfilePatch::default()
    });

    let state = engine.state();
    assert_eq!(state.form_data.profile.skills.len(), 2);
    assert_eq!(
        state.applicant.and_then(|applicant| applicant.skills),
        Some(vec!["Go".to_string()])
    );
}

#[test]
fn salary_gates_questions_step() {
    let engine = initialized(SpySink::accepting());
    engine.update_documents(DocumentsPatch::resume(resume()));
    engine.go_to_step(ApplicationStep::Questions);

    let validation = engine.validate_step(ApplicationStep::Questions);
    assert!(!validation.is_valid);
    assert_eq!(validation.errors, vec![SALARY_MISSING.to_string()]);
    assert!(!engine.can_proceed());

    engine.update_questions(QuestionsPatch::expected_salary("50000"));
    assert!(engine.is_step_valid(ApplicationStep::Questions));
    assert!(engine.can_proceed());
}

#[test]
fn unlisted_salary_still_passes() {
    let engine = initialized(SpySink::accepting());
    engine.update_questions(QuestionsPatch::expected_salary("42424"));
    assert!(engine.is_step_valid(ApplicationStep::Questions));
}

#[test]
fn validate_step_records_latest_result() {
    let engine = initialized(SpySink::accepting());
    engine.validate_step(ApplicationStep::Documents);
    assert!(!engine.state().validation[&ApplicationStep::Documents].is_valid);

    engine.update_documents(DocumentsPatch::resume(resume()));
    assert!(!engine.state().validation[&ApplicationStep::Documents].is_valid);

    engine.validate_step(ApplicationStep::Documents);
    assert!(engine.state().validation[&ApplicationStep::Documents].is_valid);
}

#[test]
fn validation_only_touches_its_own_entry() {
    let engine = initialized(SpySink::accepting());
    let before = engine.state();

    engine.validate_step(ApplicationStep::Review);
    let after = engine.state();

    assert_eq!(before.form_data, after.form_data);
    assert_eq!(before.current_step, after.current_step);
    for step in [
        ApplicationStep::Documents,
        ApplicationStep::Questions,
        ApplicationStep::Profile,
    ] {
        assert_eq!(before.validation[&step], after.validation[&step]);
    }
}

#[test]
fn step_bounds_are_no_ops() {
    let engine = initialized(SpySink::accepting());
    engine.prev_step();
    assert_eq!(engine.current_step(), ApplicationStep::Documents);

    engine.go_to_step(ApplicationStep::Review);
    engine.next_step();
    assert_eq!(engine.current_step(), ApplicationStep::Review);

    engine.prev_step();
    assert_eq!(engine.current_step(), ApplicationStep::Profile);
}

#[test]
fn next_step_does_not_validate() {
    let engine = initialized(SpySink::accepting());
    engine.next_step();
    assert_eq!(engine.current_step(), ApplicationStep::Questions);
}

#[test]
fn go_to_step_jumps_unconditionally() {
    let engine = initialized(SpySink::accepting());
    engine.go_to_step(ApplicationStep::Review);
    assert_eq!(engine.current_step(), ApplicationStep::Review);
}

#[test]
fn patches_merge_shallowly() {
    let engine = initialized(SpySink::accepting());
    engine.update_questions(QuestionsPatch::expected_salary("50000"));
    engine.update_questions(QuestionsPatch::additional_notes("Available in March"));

    let questions = engine.state().form_data.questions;
    assert_eq!(questions.expected_salary, "50000");
    assert_eq!(questions.salary_currency, "PHP");
    assert_eq!(questions.additional_notes.as_deref(), Some("Available in March"));
}

#[test]
fn reset_discards_everything() {
    let engine = initialized(SpySink::accepting());
    engine.update_documents(DocumentsPatch::resume(resume()));
    engine.update_questions(QuestionsPatch::expected_salary("50000"));
    engine.update_profile(ProfilePatch {
        certifications: Some(vec![CertificationEntry {
            id: None,
            name: "CKA".to_string(),
            issuing_organization: "CNCF".to_string(),
            issue_date: None,
            expiry_date: None,
            credential_id: None,
            credential_url: None,
            never_expires: true,
        }]),
        ..ProfilePatch::default()
    });
    engine.set_confirmation(true);
    engine.go_to_step(ApplicationStep::Review);
    engine.validate_step(ApplicationStep::Review);

    engine.reset();

    assert_eq!(engine.state(), WizardState::pristine("PHP"));
    let fresh = ApplicationFlowEngine::new(SpySink::accepting());
    assert_eq!(engine.state(), fresh.state());
}

#[test]
fn currency_follows_engine_configuration() {
    let engine = ApplicationFlowEngine::with_currency(SpySink::accepting(), "USD");
    engine.initialize(job(), applicant());
    assert_eq!(engine.state().form_data.questions.salary_currency, "USD");

    engine.reset();
    assert_eq!(engine.state().form_data.questions.salary_currency, "USD");
}

#[test]
fn review_reports_every_missing_requirement() {
    let engine = initialized(SpySink::accepting());
    let validation = engine.validate_step(ApplicationStep::Review);

    assert!(!validation.is_valid);
    assert_eq!(
        validation.errors,
        vec![
            REVIEW_RESUME_REQUIRED.to_string(),
            REVIEW_SALARY_REQUIRED.to_string(),
            REVIEW_UNCONFIRMED.to_string(),
        ]
    );
}

#[tokio::test]
async fn unconfirmed_submit_never_reaches_sink() {
    let sink = SpySink::accepting();
    let engine = initialized(Arc::clone(&sink));
    engine.update_documents(DocumentsPatch::resume(resume()));
    engine.update_questions(QuestionsPatch::expected_salary("50000"));

    match engine.submit_action().await {
        Err(SubmitError::Validation { errors }) => {
            assert_eq!(errors, vec![REVIEW_UNCONFIRMED.to_string()]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    assert!(sink.calls().is_empty());
    let state = engine.state();
    assert!(!state.is_submitting);
    assert!(!state.is_complete);
    assert!(!state.validation[&ApplicationStep::Review].is_valid);
}

#[tokio::test]
async fn submit_without_job_is_skipped() {
    let sink = SpySink::accepting();
    let engine = ApplicationFlowEngine::new(Arc::clone(&sink));

    let outcome = engine.submit_action().await.expect("no-op submit");
    assert_eq!(outcome, SubmitOutcome::Skipped);
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn successful_submit_marks_complete() {
    let sink = SpySink::accepting();
    let engine = ready_to_submit(Arc::clone(&sink));
    engine.update_questions(QuestionsPatch::additional_notes("Can start in two weeks"));

    let outcome = engine.submit_action().await.expect("submission succeeds");
    assert_eq!(outcome, SubmitOutcome::Submitted);

    let state = engine.state();
    assert!(state.is_complete);
    assert!(!state.is_submitting);

    let calls = sink.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].job_id, "J1");
    assert_eq!(calls[0].notes.as_deref(), Some("Can start in two weeks"));
}

#[tokio::test]
async fn sink_failure_leaves_form_intact() {
    let sink = SpySink::failing(SubmissionError::Unavailable("Network".to_string()));
    let engine = ready_to_submit(Arc::clone(&sink));
    let before = engine.state().form_data;

    match engine.submit_action().await {
        Err(SubmitError::Sink(SubmissionError::Unavailable(message))) => {
            assert_eq!(message, "Network");
        }
        other => panic!("expected sink failure, got {other:?}"),
    }

    let state = engine.state();
    assert!(!state.is_submitting);
    assert!(!state.is_complete);
    assert_eq!(state.form_data, before);
    assert_eq!(sink.calls().len(), 1);
}

#[tokio::test]
async fn failed_submit_can_be_retried() {
    let failing = SpySink::failing(SubmissionError::AlreadyApplied);
    let engine = ready_to_submit(Arc::clone(&failing));

    let err = engine.submit_action().await.expect_err("duplicate rejected");
    assert_eq!(err.to_string(), "Already applied to this job");

    let err = engine.submit_action().await.expect_err("still rejected");
    assert!(matches!(err, SubmitError::Sink(SubmissionError::AlreadyApplied)));
    assert_eq!(failing.calls().len(), 2);
}

#[tokio::test]
async fn overlapping_submit_is_rejected() {
    let sink = Arc::new(GatedSink::default());
    let engine = Arc::new(ready_to_submit(Arc::clone(&sink)));

    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.submit_action().await })
    };
    sink.started.notified().await;
    assert!(engine.state().is_submitting);

    let second = engine.submit_action().await;
    assert!(matches!(second, Err(SubmitError::InProgress)));

    sink.release.notify_one();
    let outcome = first.await.expect("task joins").expect("first submit succeeds");
    assert_eq!(outcome, SubmitOutcome::Submitted);

    let state = engine.state();
    assert!(state.is_complete);
    assert!(!state.is_submitting);
}

#[tokio::test]
async fn dropped_submit_clears_in_progress_flag() {
    let sink = Arc::new(GatedSink::default());
    let engine = ready_to_submit(Arc::clone(&sink));

    {
        let submit = engine.submit_action();
        tokio::pin!(submit);
        tokio::select! {
            biased;
            _ = &mut submit => panic!("gated sink should not finish"),
            _ = sink.started.notified() => {}
        }
        assert!(engine.state().is_submitting);
    }

    let state = engine.state();
    assert!(!state.is_submitting);
    assert!(!state.is_complete);
}

#[tokio::test]
async fn reset_during_submit_keeps_new_session_clean() {
    let sink = Arc::new(GatedSink::default());
    let engine = Arc::new(ready_to_submit(Arc::clone(&sink)));

    let pending = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.submit_action().await })
    };
    sink.started.notified().await;

    engine.reset();
    engine.initialize(job(), applicant());
    engine.update_documents(DocumentsPatch::resume(resume()));

    sink.release.notify_one();
    let outcome = pending.await.expect("task joins").expect("stale submit succeeds");
    assert_eq!(outcome, SubmitOutcome::Submitted);

    let state = engine.state();
    assert!(!state.is_complete);
    assert!(!state.is_submitting);
    assert!(state.form_data.documents.resume.is_some());
}
