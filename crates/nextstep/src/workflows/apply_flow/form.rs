use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{
    ApplicationUser, CertificationEntry, CoverLetterDocument, EducationEntry, ExperienceEntry,
    ResumeDocument,
};

/// Character counter shown next to the notes field. Longer notes are still accepted.
pub const ADDITIONAL_NOTES_SOFT_LIMIT: usize = 500;

/// Everything the applicant has entered across the four steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFormData {
    pub documents: DocumentsStepData,
    pub questions: QuestionsStepData,
    pub profile: ProfileStepData,
    pub review: ReviewStepData,
}

impl ApplicationFormData {
    pub fn new(salary_currency: &str) -> Self {
        Self {
            documents: DocumentsStepData::default(),
            questions: QuestionsStepData::new(salary_currency),
            profile: ProfileStepData::default(),
            review: ReviewStepData::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentsStepData {
    pub resume: Option<ResumeDocument>,
    pub cover_letter: Option<CoverLetterDocument>,
}

impl DocumentsStepData {
    pub fn apply(&mut self, patch: DocumentsPatch) {
        if let Some(resume) = patch.resume {
            self.resume = resume;
        }
        if let Some(cover_letter) = patch.cover_letter {
            self.cover_letter = cover_letter;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionsStepData {
    pub expected_salary: String,
    pub salary_currency: String,
    pub additional_notes: Option<String>,
}

impl QuestionsStepData {
    pub fn new(salary_currency: &str) -> Self {
        Self {
            expected_salary: String::new(),
            salary_currency: salary_currency.to_string(),
            additional_notes: None,
        }
    }

    pub fn apply(&mut self, patch: QuestionsPatch) {
        if let Some(expected_salary) = patch.expected_salary {
            self.expected_salary = expected_salary;
        }
        if let Some(salary_currency) = patch.salary_currency {
            self.salary_currency = salary_currency;
        }
        if let Some(additional_notes) = patch.additional_notes {
            self.additional_notes = additional_notes;
        }
    }

    /// Count shown against `ADDITIONAL_NOTES_SOFT_LIMIT`.
    pub fn notes_length(&self) -> usize {
        self.additional_notes
            .as_deref()
            .map(|notes| notes.chars().count())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStepData {
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub skills: Vec<String>,
}

impl ProfileStepData {
    /// Working copy of the applicant's profile; edits here never touch the source record.
    pub fn seeded_from(applicant: &ApplicationUser) -> Self {
        Self {
            experience: applicant.experience.clone().unwrap_or_default(),
            education: applicant.education.clone().unwrap_or_default(),
            certifications: Vec::new(),
            skills: applicant.skills.clone().unwrap_or_default(),
        }
    }

    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(experience) = patch.experience {
            self.experience = experience;
        }
        if let Some(education) = patch.education {
            self.education = education;
        }
        if let Some(certifications) = patch.certifications {
            self.certifications = certifications;
        }
        if let Some(skills) = patch.skills {
            self.skills = skills;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStepData {
    pub is_confirmed: bool,
}

/// Shallow update for the documents step. An absent key leaves the field alone, an explicit
/// `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentsPatch {
    #[serde(default, deserialize_with = "present")]
    pub resume: Option<Option<ResumeDocument>>,
    #[serde(default, deserialize_with = "present")]
    pub cover_letter: Option<Option<CoverLetterDocument>>,
}

impl DocumentsPatch {
    pub fn resume(resume: ResumeDocument) -> Self {
        Self {
            resume: Some(Some(resume)),
            ..Self::default()
        }
    }

    pub fn cover_letter(cover_letter: CoverLetterDocument) -> Self {
        Self {
            cover_letter: Some(Some(cover_letter)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionsPatch {
    pub expected_salary: Option<String>,
    pub salary_currency: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub additional_notes: Option<Option<String>>,
}

impl QuestionsPatch {
    pub fn expected_salary(value: impl Into<String>) -> Self {
        Self {
            expected_salary: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn additional_notes(notes: impl Into<String>) -> Self {
        Self {
            additional_notes: Some(Some(notes.into())),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfilePatch {
    pub experience: Option<Vec<ExperienceEntry>>,
    pub education: Option<Vec<EducationEntry>>,
    pub certifications: Option<Vec<CertificationEntry>>,
    pub skills: Option<Vec<String>>,
}

/// Distinguishes a present `null` from a missing key.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::apply_flow::domain::ResumeSource;

    fn resume() -> ResumeDocument {
        ResumeDocument {
            id: "R1".to_string(),
            name: "resume.pdf".to_string(),
            url: None,
            source: ResumeSource::Upload,
            uploaded_at: None,
        }
    }

    #[test]
    fn patch_distinguishes_missing_from_null() {
        let untouched: DocumentsPatch = serde_json::from_str("{}").expect("parse");
        assert_eq!(untouched.resume, None);

        let cleared: DocumentsPatch = serde_json::from_str(r#"{"resume": null}"#).expect("parse");
        assert_eq!(cleared.resume, Some(None));

        let mut documents = DocumentsStepData::default();
        documents.apply(DocumentsPatch::resume(resume()));
        documents.apply(untouched);
        assert!(documents.resume.is_some());
        documents.apply(cleared);
        assert!(documents.resume.is_none());
    }

    #[test]
    fn questions_merge_is_shallow() {
        let mut questions = QuestionsStepData::new("PHP");
        questions.apply(QuestionsPatch::additional_notes("Available immediately"));
        questions.apply(QuestionsPatch::expected_salary("50000"));

        assert_eq!(questions.expected_salary, "50000");
        assert_eq!(questions.salary_currency, "PHP");
        assert_eq!(
            questions.additional_notes.as_deref(),
            Some("Available immediately")
        );
    }

    #[test]
    fn notes_beyond_soft_limit_are_kept() {
        let long_notes = "x".repeat(ADDITIONAL_NOTES_SOFT_LIMIT + 25);
        let mut questions = QuestionsStepData::new("PHP");
        questions.apply(QuestionsPatch::additional_notes(long_notes.clone()));
        assert_eq!(questions.notes_length(), ADDITIONAL_NOTES_SOFT_LIMIT + 25);
        assert_eq!(questions.additional_notes, Some(long_notes));
    }

    #[test]
    fn profile_seed_tolerates_missing_lists() {
        let applicant = ApplicationUser {
            id: "U1".to_string(),
            name: "Ana".to_string(),
            email: String::new(),
            avatar_url: None,
            location: None,
            experience: None,
            education: None,
            skills: Some(vec!["Go".to_string()]),
        };

        let profile = ProfileStepData::seeded_from(&applicant);
        assert!(profile.experience.is_empty());
        assert!(profile.certifications.is_empty());
        assert_eq!(profile.skills, vec!["Go".to_string()]);
    }
}
