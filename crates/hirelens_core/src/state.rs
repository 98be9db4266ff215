use crate::aggregation::AggregationEngine;
use crate::status::StatusMachine;
use crate::view_model::{ProgressBar, SourceLine, TrackerViewModel};
use crate::Source;

pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionStatus {
    #[default]
    Inactive,
    Active,
    Closing,
}

/// The one job currently observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSession {
    pub job_id: JobId,
    pub subscription: SubscriptionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: Option<JobSession>,
    start_pending: bool,
    status: StatusMachine,
    aggregation: AggregationEngine,
    last_failure: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&JobSession> {
        self.session.as_ref()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.job_id.as_str())
    }

    pub fn status(&self) -> &StatusMachine {
        &self.status
    }

    pub fn aggregation(&self) -> &AggregationEngine {
        &self.aggregation
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn is_start_pending(&self) -> bool {
        self.start_pending
    }

    pub fn view(&self) -> TrackerViewModel {
        let snapshot = self.status.snapshot();
        let tokens = self.status.error_tokens();
        let aggregation = &self.aggregation;

        TrackerViewModel {
            job_id: self.session.as_ref().map(|s| s.job_id.clone()),
            subscription: self
                .session
                .as_ref()
                .map(|s| s.subscription)
                .unwrap_or_default(),
            start_pending: self.start_pending,
            phase: self.status.phase(),
            sources: Source::ALL
                .into_iter()
                .map(|source| SourceLine {
                    source,
                    count: snapshot.source_count(source),
                    unavailable: tokens.has_source_failure(source),
                })
                .collect(),
            fatal_errors: tokens.unclassified().map(ToOwned::to_owned).collect(),
            ai_progress: ProgressBar::from_counts(
                snapshot.processed_by_ai,
                snapshot.downloaded_total,
            ),
            saving_visible: snapshot.processing_by_ai
                && (snapshot.processed_by_ai == snapshot.downloaded_total
                    || snapshot.saved_to_database),
            status: snapshot.clone(),
            selector: aggregation.selector().clone(),
            weights: aggregation.formatted_weights(),
            location_buckets: aggregation.group_locations_three_buckets(),
            named_locations: aggregation.filter_named_locations(),
            last_failure: self.last_failure.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn record_failure(&mut self, reason: String) {
        self.last_failure = Some(reason);
        self.mark_dirty();
    }

    pub(crate) fn begin_start(&mut self) {
        self.start_pending = true;
        self.last_failure = None;
        self.mark_dirty();
    }

    pub(crate) fn start_failed(&mut self, reason: String) {
        self.start_pending = false;
        self.record_failure(reason);
    }

    /// A fresh job starts from `Idle`; aggregated results stay until replaced.
    pub(crate) fn attach_session(&mut self, job_id: JobId) {
        self.start_pending = false;
        self.session = Some(JobSession {
            job_id,
            subscription: SubscriptionStatus::Inactive,
        });
        self.status.reset();
        self.mark_dirty();
    }

    pub(crate) fn take_session(&mut self) -> Option<JobSession> {
        let session = self.session.take();
        if session.is_some() {
            self.mark_dirty();
        }
        session
    }

    pub(crate) fn set_subscription(&mut self, subscription: SubscriptionStatus) {
        if let Some(session) = self.session.as_mut() {
            session.subscription = subscription;
            self.mark_dirty();
        }
    }

    pub(crate) fn status_mut(&mut self) -> &mut StatusMachine {
        &mut self.status
    }

    pub(crate) fn aggregation_mut(&mut self) -> &mut AggregationEngine {
        &mut self.aggregation
    }
}
