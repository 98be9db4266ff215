use crate::{
    CategorySelector, JobId, LocationBuckets, LocationCount, Source, StatusPhase, StatusSnapshot,
    SubscriptionStatus, WeightEntry,
};

/// Width of the AI progress bar, in blocks.
pub const PROGRESS_BLOCKS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerViewModel {
    pub job_id: Option<JobId>,
    pub subscription: SubscriptionStatus,
    pub start_pending: bool,
    pub phase: StatusPhase,
    pub status: StatusSnapshot,
    pub sources: Vec<SourceLine>,
    /// Unclassified error tokens; non-empty means the job failed.
    pub fatal_errors: Vec<String>,
    pub ai_progress: ProgressBar,
    pub saving_visible: bool,
    pub selector: CategorySelector,
    pub weights: Vec<WeightEntry>,
    pub location_buckets: LocationBuckets,
    pub named_locations: Vec<LocationCount>,
    pub last_failure: Option<String>,
    pub dirty: bool,
}

impl TrackerViewModel {
    pub fn has_fatal_error(&self) -> bool {
        !self.fatal_errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub source: Source,
    pub count: u64,
    pub unavailable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressBar {
    pub percent: u32,
    pub filled: usize,
}

impl ProgressBar {
    /// Progress is clamped to `[0, max]`; an empty `max` renders as 0%.
    pub fn from_counts(progress: u64, max: u64) -> Self {
        if max == 0 {
            return Self::default();
        }
        let ratio = progress.min(max) as f64 / max as f64;
        Self {
            percent: (ratio * 100.0).round() as u32,
            filled: (ratio * PROGRESS_BLOCKS as f64).round() as usize,
        }
    }

    pub fn bar(&self) -> String {
        let filled = self.filled.min(PROGRESS_BLOCKS);
        format!(
            "[{}{}]",
            "#".repeat(filled),
            ".".repeat(PROGRESS_BLOCKS - filled)
        )
    }
}
