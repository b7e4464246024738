use async_trait::async_trait;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use nextstep::workflows::applications::{
    ApplicationId, ApplicationRepository, JobApplication, RepositoryError,
};
use nextstep::workflows::apply_flow::{
    ApplicationContextLoader, ApplicationJob, ApplicationUser, DocumentLibrary, ExperienceEntry,
    LoadError, ResumeDocument, SeedCatalog,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Job board and user directory held in memory, seeded from a catalog.
#[derive(Debug, Default)]
pub(crate) struct InMemoryCatalog {
    jobs: HashMap<String, ApplicationJob>,
    applicants: HashMap<String, ApplicationUser>,
    saved_documents: HashMap<String, Vec<ResumeDocument>>,
}

impl InMemoryCatalog {
    pub(crate) fn job_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.jobs.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub(crate) fn applicant_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.applicants.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl From<SeedCatalog> for InMemoryCatalog {
    fn from(catalog: SeedCatalog) -> Self {
        Self {
            jobs: catalog
                .jobs
                .into_iter()
                .map(|job| (job.id.clone(), job))
                .collect(),
            applicants: catalog
                .applicants
                .into_iter()
                .map(|applicant| (applicant.id.clone(), applicant))
                .collect(),
            saved_documents: catalog.saved_documents.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ApplicationContextLoader for InMemoryCatalog {
    async fn load_job(&self, job_id: &str) -> Result<Option<ApplicationJob>, LoadError> {
        Ok(self.jobs.get(job_id).cloned())
    }

    async fn load_applicant(&self, user_id: &str) -> Result<Option<ApplicationUser>, LoadError> {
        Ok(self.applicants.get(user_id).cloned())
    }
}

#[async_trait]
impl DocumentLibrary for InMemoryCatalog {
    async fn list_saved_documents(
        &self,
        applicant_id: &str,
    ) -> Result<Vec<ResumeDocument>, LoadError> {
        Ok(self
            .saved_documents
            .get(applicant_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, JobApplication>>>,
}

impl InMemoryApplicationRepository {
    fn lock(&self) -> MutexGuard<'_, HashMap<ApplicationId, JobApplication>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: JobApplication) -> Result<JobApplication, RepositoryError> {
        let mut guard = self.lock();
        let taken = guard.contains_key(&record.id)
            || guard
                .values()
                .any(|stored| stored.user_id == record.user_id && stored.job_id == record.job_id);
        if taken {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: JobApplication) -> Result<(), RepositoryError> {
        let mut guard = self.lock();
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<JobApplication>, RepositoryError> {
        Ok(self.lock().get(id).cloned())
    }

    fn find_for_user_and_job(
        &self,
        user_id: &str,
        job_id: &str,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        Ok(self
            .lock()
            .values()
            .find(|record| record.user_id == user_id && record.job_id == job_id)
            .cloned())
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<JobApplication>, RepositoryError> {
        Ok(self
            .lock()
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect())
    }

    fn list_for_job(&self, job_id: &str) -> Result<Vec<JobApplication>, RepositoryError> {
        Ok(self
            .lock()
            .values()
            .filter(|record| record.job_id == job_id)
            .cloned()
            .collect())
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        self.lock()
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Jobs and one applicant for local runs without a catalog file. No saved documents.
pub(crate) fn sample_catalog() -> SeedCatalog {
    let posted = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap_or_default();

    let job = |id: &str, title: &str, company: &str, skills: &[&str]| ApplicationJob {
        id: id.to_string(),
        title: title.to_string(),
        company: company.to_string(),
        location: "Makati City".to_string(),
        description: format!("{title} at {company}"),
        employment_type: Some("full_time".to_string()),
        location_type: Some("hybrid".to_string()),
        min_salary: Some(40_000),
        max_salary: Some(80_000),
        salary_currency: Some("PHP".to_string()),
        salary_period: Some("monthly".to_string()),
        required_skills: skills.iter().map(|skill| skill.to_string()).collect(),
        experience_level: Some("mid".to_string()),
        posted_date: posted,
    };

    SeedCatalog {
        jobs: vec![
            job("job-001", "Backend Engineer", "Lakbay Labs", &["Rust", "PostgreSQL"]),
            job("job-002", "Product Designer", "Tala Studio", &["Figma", "Research"]),
        ],
        applicants: vec![ApplicationUser {
            id: "user-001".to_string(),
            name: "Ana Reyes".to_string(),
            email: "ana.reyes@example.com".to_string(),
            avatar_url: None,
            location: Some("Quezon City".to_string()),
            experience: Some(vec![ExperienceEntry {
                id: Some("exp-1".to_string()),
                title: "Software Engineer".to_string(),
                company: "Daloy Systems".to_string(),
                location: Some("Pasig".to_string()),
                start_date: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap_or_default(),
                end_date: None,
                is_current: true,
                description: None,
            }]),
            education: None,
            skills: Some(vec!["Go".to_string(), "Rust".to_string()]),
        }],
        saved_documents: Default::default(),
    }
}
