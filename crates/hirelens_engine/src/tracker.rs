use std::collections::VecDeque;
use std::path::PathBuf;

use hirelens_core::{
    update, AppState, Effect, JobId, Msg, RequestError, StartJobRequest, TrackerViewModel,
};
use hirelens_logging::{lens_debug, lens_info, lens_warn, set_job_context};
use thiserror::Error;

use crate::api::{ApiSettings, JobsApi, ReqwestJobsApi};
use crate::persist::{JobIdStore, RonJobIdStore};
use crate::session::SessionManager;
use crate::transport::{StompTransport, TransportSettings};
use crate::{ApiError, JobRecord};

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub api: ApiSettings,
    pub transport: TransportSettings,
    /// Directory holding the persisted job id.
    pub state_dir: PathBuf,
}

impl TrackerConfig {
    pub fn default_with_state_dir(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            api: ApiSettings::default(),
            transport: TransportSettings::default(),
            state_dir: state_dir.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid start request: {0}")]
    InvalidRequest(#[from] RequestError),
    #[error("could not start tracking: {0}")]
    StartFailed(String),
    #[error("no job is being tracked")]
    NoActiveJob,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Runs the pure core against the REST backend, the message channel and the
/// job-id store. All transitions go through [`hirelens_core::update`].
pub struct Tracker {
    api: Box<dyn JobsApi>,
    session: SessionManager,
    store: Box<dyn JobIdStore>,
    state: AppState,
    stop_error: Option<ApiError>,
}

impl Tracker {
    pub fn new(api: Box<dyn JobsApi>, session: SessionManager, store: Box<dyn JobIdStore>) -> Self {
        Self {
            api,
            session,
            store,
            state: AppState::new(),
            stop_error: None,
        }
    }

    pub fn from_config(config: TrackerConfig) -> Result<Self, TrackerError> {
        let api = ReqwestJobsApi::new(config.api)?;
        let transport = StompTransport::new(config.transport.clone());
        let session = SessionManager::new(Box::new(transport), config.transport);
        let store = RonJobIdStore::new(config.state_dir);
        Ok(Self::new(Box::new(api), session, Box::new(store)))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn view(&self) -> TrackerViewModel {
        self.state.view()
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    /// Applies a message and runs the effects it produces, feeding their
    /// outcomes back until the queue drains.
    pub async fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let (next, effects) = update(std::mem::take(&mut self.state), msg);
            self.state = next;
            set_job_context(self.state.job_id());
            for effect in effects {
                if let Some(follow_up) = self.execute(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn execute(&mut self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::StartJob(request) => match self.api.start_job(&request).await {
                Ok(job_id) => Some(Msg::JobStarted { job_id }),
                Err(err) => Some(Msg::JobStartFailed {
                    reason: err.to_string(),
                }),
            },
            Effect::PersistJobId(job_id) => {
                if let Err(err) = self.store.save(&job_id) {
                    lens_warn!("could not persist job id {}: {}", job_id, err);
                }
                None
            }
            Effect::OpenChannel => match self.session.open().await {
                Ok(()) => Some(Msg::ChannelReady),
                Err(err) => Some(Msg::ChannelFailed {
                    reason: err.to_string(),
                }),
            },
            Effect::Subscribe { job_id } => match self.session.subscribe(&job_id).await {
                Ok(true) => None,
                Ok(false) => Some(Msg::ChannelFailed {
                    reason: "channel not open".to_string(),
                }),
                Err(err) => {
                    self.session.close().await;
                    Some(Msg::ChannelFailed {
                        reason: err.to_string(),
                    })
                }
            },
            Effect::CloseChannel => {
                self.session.close().await;
                Some(Msg::ChannelClosed)
            }
            Effect::StopJob { job_id } => match self.api.stop_job(&job_id).await {
                Ok(status) => {
                    lens_debug!("cancel accepted with status {}", status);
                    None
                }
                Err(err) => {
                    self.stop_error = Some(err.clone());
                    Some(Msg::JobStopFailed {
                        reason: err.to_string(),
                    })
                }
            },
            Effect::FetchCurrentResults { job_id } => {
                match self.api.fetch_current_results(&job_id).await {
                    Ok(payload) => Some(Msg::CurrentResultsLoaded(payload)),
                    Err(err) => {
                        lens_warn!("could not load results for job {}: {}", job_id, err);
                        None
                    }
                }
            }
        }
    }

    /// Starts a job and subscribes to its channel. The returned id is also
    /// persisted for [`Tracker::resume_from_store`].
    pub async fn start_tracking(&mut self, request: StartJobRequest) -> Result<JobId, TrackerError> {
        request.validate()?;
        self.dispatch(Msg::StartRequested(request)).await;
        match self.state.job_id() {
            Some(job_id) if self.session.is_open() => Ok(job_id.to_string()),
            _ => Err(TrackerError::StartFailed(
                self.state
                    .last_failure()
                    .unwrap_or("job was not started")
                    .to_string(),
            )),
        }
    }

    /// Closes the session and resets the status to its idle defaults.
    pub async fn stop_tracking(&mut self) {
        self.dispatch(Msg::StopRequested).await;
    }

    /// Asks the backend to cancel the current job. The session stays open so
    /// the backend's cancelled status ends it.
    pub async fn cancel_job(&mut self) -> Result<(), TrackerError> {
        if self.state.job_id().is_none() {
            return Err(TrackerError::NoActiveJob);
        }
        self.stop_error = None;
        self.dispatch(Msg::CancelJobRequested).await;
        match self.stop_error.take() {
            Some(err) => Err(TrackerError::Api(err)),
            None => Ok(()),
        }
    }

    /// Loads the stored results of a previous job without opening a session.
    /// Returns `false` when there was no job id to resume.
    pub async fn resume_if_possible(&mut self, job_id: Option<JobId>) -> bool {
        let Some(job_id) = job_id else {
            lens_debug!("nothing to resume");
            return false;
        };
        lens_info!("catching up on results of job {}", job_id);
        self.dispatch(Msg::ResumeRequested {
            job_id: Some(job_id),
        })
        .await;
        true
    }

    pub async fn resume_from_store(&mut self) -> bool {
        let job_id = self.store.load();
        self.resume_if_possible(job_id).await
    }

    /// Waits for the next frame and applies it. Returns `false` once the
    /// session is gone.
    pub async fn next_event(&mut self) -> bool {
        if self.state.session().is_none() {
            return false;
        }
        match self.session.next_inbound().await {
            Some(inbound) => self.dispatch(Msg::FrameReceived(inbound)).await,
            None => self.dispatch(Msg::ChannelClosed).await,
        }
        self.state.session().is_some() && self.session.is_open()
    }

    /// Pumps frames until the session ends, handing every changed view to
    /// `observer`.
    pub async fn run<F>(&mut self, mut observer: F)
    where
        F: FnMut(&TrackerViewModel),
    {
        loop {
            if self.consume_dirty() {
                observer(&self.view());
            }
            if !self.next_event().await {
                break;
            }
        }
        if self.consume_dirty() {
            observer(&self.view());
        }
    }

    pub async fn select_category(&mut self, name: &str) {
        self.dispatch(Msg::CategorySelected(name.to_string())).await;
    }

    pub async fn select_all_categories(&mut self) {
        self.dispatch(Msg::AllCategoriesSelected).await;
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobRecord>, TrackerError> {
        Ok(self.api.list_jobs().await?)
    }
}
