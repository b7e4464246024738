//! Stored job applications: creation from the wizard, status tracking, withdrawal.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod sink;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationStatus, ApplicationSummary, JobApplication, StatusUpdate,
};
pub use repository::{ApplicationRepository, RepositoryError};
pub use router::tracker_router;
pub use service::{ApplicationTracker, TrackerError};
pub use sink::{TrackerSink, TrackerSinks};
