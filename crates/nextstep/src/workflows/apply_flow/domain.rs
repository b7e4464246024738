use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Job snapshot loaded once per application flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationJob {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub employment_type: Option<String>,
    pub location_type: Option<String>,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub salary_currency: Option<String>,
    pub salary_period: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub experience_level: Option<String>,
    pub posted_date: NaiveDate,
}

/// Applicant snapshot; the lists seed the profile step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub education: Option<Vec<EducationEntry>>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: Option<String>,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub id: Option<String>,
    pub institution: String,
    pub degree: String,
    pub field: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationEntry {
    pub id: Option<String>,
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    #[serde(default)]
    pub never_expires: bool,
}

/// Where a resume came from. Only the descriptor is kept; bytes live in document storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSource {
    Upload,
    Existing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub source: ResumeSource,
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverLetterOption {
    Upload,
    Write,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverLetterDocument {
    pub id: String,
    pub name: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub option: CoverLetterOption,
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// A selectable expected-salary bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalaryRange {
    pub value: &'static str,
    pub label: &'static str,
}

pub const SALARY_RANGES: [SalaryRange; 15] = [
    SalaryRange { value: "15000", label: "₱15,000" },
    SalaryRange { value: "20000", label: "₱20,000" },
    SalaryRange { value: "25000", label: "₱25,000" },
    SalaryRange { value: "30000", label: "₱30,000" },
    SalaryRange { value: "35000", label: "₱35,000" },
    SalaryRange { value: "40000", label: "₱40,000" },
    SalaryRange { value: "45000", label: "₱45,000" },
    SalaryRange { value: "50000", label: "₱50,000" },
    SalaryRange { value: "60000", label: "₱60,000" },
    SalaryRange { value: "70000", label: "₱70,000" },
    SalaryRange { value: "80000", label: "₱80,000" },
    SalaryRange { value: "90000", label: "₱90,000" },
    SalaryRange { value: "100000", label: "₱100,000" },
    SalaryRange { value: "120000", label: "₱120,000" },
    SalaryRange { value: "150000", label: "₱150,000+" },
];

/// Membership in `SALARY_RANGES`. Informational only: the questions step accepts any
/// non-empty value.
pub fn is_listed_salary(value: &str) -> bool {
    SALARY_RANGES.iter().any(|range| range.value == value)
}

pub fn salary_label(value: &str) -> Option<&'static str> {
    SALARY_RANGES
        .iter()
        .find(|range| range.value == value)
        .map(|range| range.label)
}
