use crate::{Inbound, JobId, ResultPayload, StartJobRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Caller wants a new job tracked.
    StartRequested(StartJobRequest),
    /// Backend accepted the start request.
    JobStarted { job_id: JobId },
    /// Start request could not be sent or was rejected.
    JobStartFailed { reason: String },
    /// Channel handshake completed.
    ChannelReady,
    /// Channel could not be opened.
    ChannelFailed { reason: String },
    /// One routed frame for the subscribed job.
    FrameReceived(Inbound),
    /// The channel is gone, either closed by us or ended by the peer.
    ChannelClosed,
    /// Caller stops observing the job.
    StopRequested,
    /// Caller asks the backend to cancel the running job.
    CancelJobRequested,
    /// The cancel request could not be delivered.
    JobStopFailed { reason: String },
    /// One-shot catch-up for a job id persisted by an earlier run.
    ResumeRequested { job_id: Option<JobId> },
    /// Catch-up payload fetched; `None` when nothing usable came back.
    CurrentResultsLoaded(Option<ResultPayload>),
    AllCategoriesSelected,
    CategorySelected(String),
}
