use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::domain::{ApplicationJob, ApplicationUser, ResumeDocument};

/// Jobs, applicants and saved documents used to seed in-memory loaders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub jobs: Vec<ApplicationJob>,
    #[serde(default)]
    pub applicants: Vec<ApplicationUser>,
    /// Saved documents keyed by applicant id.
    #[serde(default)]
    pub saved_documents: BTreeMap<String, Vec<ResumeDocument>>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to open catalog at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("job {0} appears more than once")]
    DuplicateJob(String),
    #[error("applicant {0} appears more than once")]
    DuplicateApplicant(String),
    #[error("saved documents reference unknown applicant {0}")]
    UnknownApplicant(String),
}

impl SeedCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let catalog: SeedCatalog = serde_json::from_reader(reader)?;
        catalog.check()?;
        Ok(catalog)
    }

    fn check(&self) -> Result<(), CatalogError> {
        let mut job_ids = HashSet::new();
        for job in &self.jobs {
            if !job_ids.insert(job.id.as_str()) {
                return Err(CatalogError::DuplicateJob(job.id.clone()));
            }
        }

        let mut applicant_ids = HashSet::new();
        for applicant in &self.applicants {
            if !applicant_ids.insert(applicant.id.as_str()) {
                return Err(CatalogError::DuplicateApplicant(applicant.id.clone()));
            }
        }

        if let Some(owner) = self
            .saved_documents
            .keys()
            .find(|owner| !applicant_ids.contains(owner.as_str()))
        {
            return Err(CatalogError::UnknownApplicant(owner.clone()));
        }

        Ok(())
    }
}
