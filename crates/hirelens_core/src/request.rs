use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Smallest accepted `max_job_offers`.
pub const MIN_JOB_OFFERS: u32 = 20;
/// `max_job_offers` must be a multiple of this.
pub const JOB_OFFERS_STEP: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobLevel {
    Intern,
    Junior,
    Mid,
    Senior,
    #[default]
    All,
}

impl JobLevel {
    pub const ALL_LEVELS: [JobLevel; 5] = [
        JobLevel::Intern,
        JobLevel::Junior,
        JobLevel::Mid,
        JobLevel::Senior,
        JobLevel::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobLevel::Intern => "INTERN",
            JobLevel::Junior => "JUNIOR",
            JobLevel::Mid => "MID",
            JobLevel::Senior => "SENIOR",
            JobLevel::All => "ALL",
        }
    }
}

impl fmt::Display for JobLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobLevel {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        JobLevel::ALL_LEVELS
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| RequestError::UnknownLevel(trimmed.to_string()))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("max job offers must be at least 20, got {0}")]
    MaxOffersTooLow(u32),
    #[error("max job offers must be a multiple of 10, got {0}")]
    MaxOffersNotStep(u32),
    #[error("unknown seniority level '{0}'")]
    UnknownLevel(String),
}

/// Parameters of a job-start request, serialized in the backend's camelCase form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobRequest {
    pub query: String,
    pub level: JobLevel,
    pub include_unknown: bool,
    pub max_job_offers: u32,
}

impl Default for StartJobRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            level: JobLevel::All,
            include_unknown: true,
            max_job_offers: 100,
        }
    }
}

impl StartJobRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.max_job_offers < MIN_JOB_OFFERS {
            return Err(RequestError::MaxOffersTooLow(self.max_job_offers));
        }
        if self.max_job_offers % JOB_OFFERS_STEP != 0 {
            return Err(RequestError::MaxOffersNotStep(self.max_job_offers));
        }
        Ok(())
    }
}
