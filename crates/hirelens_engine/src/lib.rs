//! HireLens engine: REST client, STOMP channel, persistence and the tracker
//! that executes core effects.
mod api;
mod persist;
mod session;
mod stomp;
mod tracker;
mod transport;
mod types;

pub use api::{ApiSettings, JobsApi, ReqwestJobsApi};
pub use persist::{
    ensure_state_dir, write_atomically, JobIdStore, PersistError, RonJobIdStore, STATE_FILENAME,
};
pub use session::SessionManager;
pub use stomp::{decode_frames, FrameError, StompFrame};
pub use tracker::{Tracker, TrackerConfig, TrackerError};
pub use transport::{StompTransport, Transport, TransportSettings};
pub use types::{ApiError, JobRecord, TransportError, TransportMessage};
