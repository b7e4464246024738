use crate::infra::{InMemoryApplicationRepository, InMemoryCatalog};
use crate::server::load_catalog;
use chrono::Utc;
use clap::Args;
use nextstep::config::AppConfig;
use nextstep::error::AppError;
use nextstep::workflows::applications::{ApplicationTracker, TrackerSinks};
use nextstep::workflows::apply_flow::{
    load_flow_context, step_url, ApplicationFlowEngine, ApplicationStep, DocumentLibrary,
    DocumentsPatch, LoadState, QuestionsPatch, ResumeDocument, ResumeSource, SinkProvider,
    Stepper, StepStatus, SubmissionSink, SubmitError, SubmitOutcome,
};
use nextstep::workflows::apply_flow::domain::salary_label;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// JSON catalog to load instead of the built-in sample
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Job to apply to. Defaults to the first job in the catalog.
    #[arg(long)]
    pub(crate) job: Option<String>,
    /// Applicant user id. Defaults to the first applicant in the catalog.
    #[arg(long)]
    pub(crate) user: Option<String>,
    /// Expected salary bracket, e.g. 50000
    #[arg(long, default_value = "50000")]
    pub(crate) salary: String,
    /// Notes for the employer
    #[arg(long)]
    pub(crate) notes: Option<String>,
    /// Leave the review unconfirmed to see submission blocked
    #[arg(long)]
    pub(crate) skip_confirmation: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        catalog,
        job,
        user,
        salary,
        notes,
        skip_confirmation,
    } = args;

    let config = AppConfig::load()?;
    let catalog = load_catalog(catalog.as_deref())?;
    let Some(job_id) = job.or_else(|| catalog.job_ids().into_iter().next()) else {
        println!("The catalog has no jobs to apply to.");
        return Ok(());
    };
    let user_id = user.or_else(|| catalog.applicant_ids().into_iter().next());

    println!("NextStep application demo");
    let (job, applicant) = match load_flow_context(&catalog, &job_id, user_id.as_deref()).await? {
        LoadState::Ready { job, applicant } => (job, applicant),
        LoadState::JobNotFound => {
            println!("Job {job_id} was not found.");
            return Ok(());
        }
        LoadState::SignInRequired => {
            println!("Please sign in to apply to {job_id}.");
            return Ok(());
        }
        LoadState::Loading => return Ok(()),
    };
    println!(
        "Applying to {} at {} as {}",
        job.title, job.company, applicant.name
    );

    let tracker = Arc::new(ApplicationTracker::new(Arc::new(
        InMemoryApplicationRepository::default(),
    )));
    let sinks = TrackerSinks::new(Arc::clone(&tracker));
    let engine = ApplicationFlowEngine::with_currency(
        sinks.sink_for(&applicant),
        config.apply_flow.salary_currency.clone(),
    );
    engine.initialize(job.clone(), applicant.clone());
    let stepper = Stepper::default();

    render_stepper(&stepper, &engine, &job.id);
    let resume = pick_resume(&catalog, &applicant.id).await?;
    println!("- resume: {} ({:?})", resume.name, resume.source);
    engine.update_documents(DocumentsPatch::resume(resume));
    if !advance(&stepper, &engine, ApplicationStep::Questions) {
        return Ok(());
    }

    render_stepper(&stepper, &engine, &job.id);
    engine.update_questions(QuestionsPatch {
        expected_salary: Some(salary.clone()),
        additional_notes: Some(notes),
        ..QuestionsPatch::default()
    });
    println!(
        "- expected salary: {} {}",
        salary_label(&salary).unwrap_or(salary.as_str()),
        engine.state().form_data.questions.salary_currency
    );
    if !advance(&stepper, &engine, ApplicationStep::Profile) {
        return Ok(());
    }

    render_stepper(&stepper, &engine, &job.id);
    let profile = engine.state().form_data.profile;
    println!(
        "- profile: {} experience entries, skills: {}",
        profile.experience.len(),
        profile.skills.join(", ")
    );
    if !advance(&stepper, &engine, ApplicationStep::Review) {
        return Ok(());
    }

    render_stepper(&stepper, &engine, &job.id);
    if !skip_confirmation {
        engine.set_confirmation(true);
    }

    match engine.submit_action().await {
        Ok(SubmitOutcome::Submitted) => println!("\nApplication submitted."),
        Ok(SubmitOutcome::Skipped) => println!("\nNothing to submit."),
        Err(SubmitError::Validation { errors }) => {
            println!("\nSubmission blocked:");
            for error in errors {
                println!("  - {error}");
            }
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }

    println!("Your applications:");
    for record in tracker.list_for_user(&applicant.id)? {
        let summary = record.summary();
        println!(
            "  - {} for {} | {} | applied {}",
            summary.id.0,
            summary.job_id,
            summary.status_label,
            summary.applied_at.format("%Y-%m-%d %H:%M")
        );
    }

    let repeat = sinks.sink_for(&applicant);
    if let Err(err) = repeat.submit(&engine.state().form_data, &job).await {
        println!("Submitting the same job again: {err}");
    }

    Ok(())
}

async fn pick_resume(
    catalog: &InMemoryCatalog,
    applicant_id: &str,
) -> Result<ResumeDocument, AppError> {
    let saved = catalog.list_saved_documents(applicant_id).await?;
    Ok(saved.into_iter().next().unwrap_or_else(|| ResumeDocument {
        id: format!("upload-{applicant_id}"),
        name: format!("{applicant_id}-resume.pdf"),
        url: None,
        source: ResumeSource::Upload,
        uploaded_at: Some(Utc::now()),
    }))
}

fn advance<S>(stepper: &Stepper, engine: &ApplicationFlowEngine<S>, target: ApplicationStep) -> bool
where
    S: SubmissionSink + 'static,
{
    match stepper.navigate(engine, target) {
        Ok(_) => true,
        Err(err) => {
            println!("Cannot continue: {err}");
            false
        }
    }
}

fn render_stepper<S>(stepper: &Stepper, engine: &ApplicationFlowEngine<S>, job_id: &str)
where
    S: SubmissionSink + 'static,
{
    let current = engine.current_step();
    println!("\n{} of 4: {}  [{}]", current.number(), current.label(), step_url(job_id, current));
    let line: Vec<String> = stepper
        .entries(engine)
        .into_iter()
        .map(|entry| {
            let marker = match entry.status {
                StepStatus::Completed => "x",
                StepStatus::Active => ">",
                StepStatus::Upcoming => " ",
            };
            format!("[{marker}] {}", entry.label)
        })
        .collect();
    println!("{}", line.join("  "));
}
