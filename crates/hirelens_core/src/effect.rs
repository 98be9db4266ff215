use crate::{JobId, StartJobRequest};

/// Side effects requested by `update`, executed by the tracker in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartJob(StartJobRequest),
    PersistJobId(JobId),
    OpenChannel,
    Subscribe { job_id: JobId },
    CloseChannel,
    /// Ask the backend to cancel the job; its `cancelled` status ends the session.
    StopJob { job_id: JobId },
    FetchCurrentResults { job_id: JobId },
}
