//! HireLens core: pure job-tracking state machine, result aggregation and
//! view-model helpers.
mod aggregation;
mod effect;
mod msg;
mod request;
mod router;
mod state;
mod status;
mod update;
mod view_model;

pub use aggregation::{
    AggregationEngine, CategorySelector, LocationBucket, LocationBuckets, LocationCount,
    ResultPayload, ResultSnapshot, SkillMap, WeightEntry, WeightMap,
};
pub use effect::Effect;
pub use msg::Msg;
pub use request::{JobLevel, RequestError, StartJobRequest, JOB_OFFERS_STEP, MIN_JOB_OFFERS};
pub use router::{
    coerce_count, coerce_flag, parse_result_payload, parse_status_payload, route, route_value,
    Inbound, MessageKind,
};
pub use state::{AppState, JobId, JobSession, SubscriptionStatus};
pub use status::{
    ErrorToken, ErrorTokens, Source, StatusMachine, StatusPhase, StatusSnapshot,
    StatusTransition,
};
pub use update::update;
pub use view_model::{ProgressBar, SourceLine, TrackerViewModel, PROGRESS_BLOCKS};
