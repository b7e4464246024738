use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Where an application stands on the employer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Interview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Reviewing,
        Self::Interview,
        Self::Accepted,
        Self::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Reviewing => "Under Review",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Position used when grouping applications by status.
    pub const fn sort_order(self) -> u8 {
        match self {
            ApplicationStatus::Pending => 1,
            ApplicationStatus::Reviewing => 2,
            ApplicationStatus::Interview => 3,
            ApplicationStatus::Accepted => 4,
            ApplicationStatus::Rejected => 5,
        }
    }
}

/// A submitted application as the tracker stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: ApplicationId,
    pub job_id: String,
    pub user_id: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub next_step: Option<String>,
    pub interview_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl JobApplication {
    pub fn summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            id: self.id.clone(),
            job_id: self.job_id.clone(),
            status: self.status,
            status_label: self.status.label(),
            applied_at: self.applied_at,
            next_step: self.next_step.clone(),
            interview_at: self.interview_at,
            notes: self.notes.clone(),
        }
    }
}

/// What the applicant sees for one of their applications.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub job_id: String,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Employer-side progress update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub next_step: Option<String>,
    #[serde(default)]
    pub interview_at: Option<DateTime<Utc>>,
}
