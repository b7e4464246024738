use serde::{Deserialize, Serialize};

/// One of the four linear pages of the application flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ApplicationStep {
    Documents,
    Questions,
    Profile,
    Review,
}

impl ApplicationStep {
    pub const FIRST: Self = Self::Documents;
    pub const LAST: Self = Self::Review;

    pub const fn ordered() -> [Self; 4] {
        [Self::Documents, Self::Questions, Self::Profile, Self::Review]
    }

    pub fn from_number(number: u8) -> Result<Self, StepError> {
        match number {
            1 => Ok(Self::Documents),
            2 => Ok(Self::Questions),
            3 => Ok(Self::Profile),
            4 => Ok(Self::Review),
            other => Err(StepError::OutOfRange(other)),
        }
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::Documents => 1,
            Self::Questions => 2,
            Self::Profile => 3,
            Self::Review => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Documents => "Choose Documents",
            Self::Questions => "Employer Questions",
            Self::Profile => "Update Profile",
            Self::Review => "Review & Submit",
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1).ok()
    }

    pub fn previous(self) -> Option<Self> {
        self.number()
            .checked_sub(1)
            .and_then(|number| Self::from_number(number).ok())
    }
}

impl TryFrom<u8> for ApplicationStep {
    type Error = StepError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value)
    }
}

impl From<ApplicationStep> for u8 {
    fn from(step: ApplicationStep) -> Self {
        step.number()
    }
}

impl std::fmt::Display for ApplicationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {} ({})", self.number(), self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("application step must be between 1 and 4, got {0}")]
    OutOfRange(u8),
}
