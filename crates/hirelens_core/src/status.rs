use std::fmt;

use hirelens_logging::{lens_debug, lens_info, lens_warn};

/// One of the fixed upstream providers the backend downloads offers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    Remotive,
    RemoteOk,
    Adzuna,
    Joinrise,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::Remotive,
        Source::RemoteOk,
        Source::Adzuna,
        Source::Joinrise,
    ];

    /// Token the backend places in the error text when this source failed.
    pub fn failure_token(self) -> &'static str {
        match self {
            Source::Remotive => "fetchRemotiveError",
            Source::RemoteOk => "fetchRemoteOkError",
            Source::Adzuna => "fetchAdzunaError",
            Source::Joinrise => "fetchJoinriseError",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Source::Remotive => "Remotive",
            Source::RemoteOk => "RemoteOK",
            Source::Adzuna => "Adzuna",
            Source::Joinrise => "Joinrise",
        }
    }

    pub fn from_failure_token(token: &str) -> Option<Source> {
        Source::ALL
            .into_iter()
            .find(|source| source.failure_token() == token)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Progress report of a running job. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub overlay_visible: bool,
    pub downloading: bool,
    pub downloaded_total: u64,
    pub remotive_count: u64,
    pub remote_ok_count: u64,
    pub adzuna_count: u64,
    pub joinrise_count: u64,
    pub processing_by_ai: bool,
    pub processed_by_ai: u64,
    pub saved_to_database: bool,
    pub cancelled: bool,
    pub error_text: String,
}

impl StatusSnapshot {
    pub fn source_count(&self, source: Source) -> u64 {
        match source {
            Source::Remotive => self.remotive_count,
            Source::RemoteOk => self.remote_ok_count,
            Source::Adzuna => self.adzuna_count,
            Source::Joinrise => self.joinrise_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorToken {
    /// Tolerable: one source could not be fetched.
    SourceFailure(Source),
    /// Anything else; fatal for the session.
    Unclassified(String),
}

impl ErrorToken {
    pub fn classify(token: &str) -> Self {
        match Source::from_failure_token(token) {
            Some(source) => ErrorToken::SourceFailure(source),
            None => ErrorToken::Unclassified(token.to_string()),
        }
    }
}

/// Whitespace-split view of a status error text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorTokens {
    tokens: Vec<ErrorToken>,
}

impl ErrorTokens {
    pub fn parse(text: &str) -> Self {
        Self {
            tokens: text.split_whitespace().map(ErrorToken::classify).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorToken> {
        self.tokens.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn unclassified(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            ErrorToken::Unclassified(text) => Some(text.as_str()),
            ErrorToken::SourceFailure(_) => None,
        })
    }

    pub fn unclassified_count(&self) -> usize {
        self.unclassified().count()
    }

    pub fn is_fatal(&self) -> bool {
        self.unclassified_count() > 0
    }

    pub fn has_source_failure(&self, source: Source) -> bool {
        self.tokens
            .iter()
            .any(|token| *token == ErrorToken::SourceFailure(source))
    }

    pub fn failed_sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|source| self.has_source_failure(*source))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPhase {
    /// No status received for the current job yet.
    #[default]
    Idle,
    Active,
    /// Cancelled, failed fatally, or stopped. Only a new job leaves this state.
    Terminated,
}

/// What the caller must do after a status payload was folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    Continue,
    /// Backend reported cancellation; snapshot already reset to defaults.
    Cancelled,
    /// Unclassified errors present; last snapshot kept for display.
    Fatal { unclassified: usize },
    /// Job reported progress earlier and has now dropped both its overlay and
    /// downloading flags: the run is over.
    Completed,
    /// Payload arrived after termination and was dropped.
    Ignored,
}

impl StatusTransition {
    pub fn terminates_session(self) -> bool {
        matches!(
            self,
            StatusTransition::Cancelled
                | StatusTransition::Fatal { .. }
                | StatusTransition::Completed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusMachine {
    phase: StatusPhase,
    snapshot: StatusSnapshot,
    tokens: ErrorTokens,
    /// Set once a payload showed the overlay or a download in progress.
    seen_progress: bool,
}

impl StatusMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> StatusPhase {
        self.phase
    }

    pub fn snapshot(&self) -> &StatusSnapshot {
        &self.snapshot
    }

    pub fn error_tokens(&self) -> &ErrorTokens {
        &self.tokens
    }

    /// Folds one status payload into the model.
    pub fn apply(&mut self, incoming: StatusSnapshot) -> StatusTransition {
        if self.phase == StatusPhase::Terminated {
            lens_debug!("status payload after termination dropped");
            return StatusTransition::Ignored;
        }

        self.snapshot = incoming;
        self.tokens = ErrorTokens::parse(&self.snapshot.error_text);

        if self.snapshot.cancelled {
            self.snapshot = StatusSnapshot::default();
            self.tokens = ErrorTokens::default();
            self.phase = StatusPhase::Terminated;
            return StatusTransition::Cancelled;
        }

        let unclassified = self.tokens.unclassified_count();
        if unclassified > 0 {
            lens_warn!(
                "fatal job error(s): {}",
                self.tokens.unclassified().collect::<Vec<_>>().join(", ")
            );
            self.phase = StatusPhase::Terminated;
            return StatusTransition::Fatal { unclassified };
        }

        let in_progress = self.snapshot.overlay_visible || self.snapshot.downloading;
        if self.seen_progress && !in_progress {
            lens_info!("job reported completion");
            self.phase = StatusPhase::Terminated;
            return StatusTransition::Completed;
        }
        self.seen_progress |= in_progress;

        for source in self.tokens.failed_sources() {
            lens_debug!("source {} unavailable", source);
        }
        self.phase = StatusPhase::Active;
        StatusTransition::Continue
    }

    /// External stop: terminate and clear the visible status.
    pub fn stop(&mut self) {
        self.snapshot = StatusSnapshot::default();
        self.tokens = ErrorTokens::default();
        self.phase = StatusPhase::Terminated;
        self.seen_progress = false;
    }

    /// Back to `Idle` for a freshly started job.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
