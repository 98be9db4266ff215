use hirelens_logging::{lens_debug, lens_info, lens_warn};

use crate::{AppState, Effect, Inbound, Msg, StatusTransition, SubscriptionStatus};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested(request) => {
            if let Err(err) = request.validate() {
                lens_warn!("start request rejected: {}", err);
                state.record_failure(err.to_string());
                return (state, Vec::new());
            }
            let mut effects = Vec::with_capacity(2);
            // A new start supersedes whatever job is being observed.
            if let Some(previous) = state.take_session() {
                lens_info!("superseding job {}", previous.job_id);
                effects.push(Effect::CloseChannel);
            }
            state.begin_start();
            effects.push(Effect::StartJob(request));
            effects
        }
        Msg::JobStarted { job_id } => {
            lens_info!("job {} started", job_id);
            state.attach_session(job_id.clone());
            vec![Effect::PersistJobId(job_id), Effect::OpenChannel]
        }
        Msg::JobStartFailed { reason } => {
            lens_warn!("job start failed: {}", reason);
            state.start_failed(reason);
            Vec::new()
        }
        Msg::ChannelReady => {
            let waiting = state
                .session()
                .filter(|session| session.subscription == SubscriptionStatus::Inactive)
                .map(|session| session.job_id.clone());
            match waiting {
                Some(job_id) => {
                    state.set_subscription(SubscriptionStatus::Active);
                    vec![Effect::Subscribe { job_id }]
                }
                None => Vec::new(),
            }
        }
        Msg::ChannelFailed { reason } => {
            lens_warn!("channel failed: {}", reason);
            state.take_session();
            state.record_failure(reason);
            Vec::new()
        }
        Msg::FrameReceived(inbound) => {
            if state.session().is_none() {
                lens_debug!("{:?} frame without a session dropped", inbound.kind());
                return (state, Vec::new());
            }
            match inbound {
                Inbound::Status(snapshot) => {
                    let transition = state.status_mut().apply(snapshot);
                    if transition != StatusTransition::Ignored {
                        state.mark_dirty();
                    }
                    if transition.terminates_session() {
                        lens_info!("status {:?} ends the session", transition);
                        state.set_subscription(SubscriptionStatus::Closing);
                        vec![Effect::CloseChannel]
                    } else {
                        Vec::new()
                    }
                }
                Inbound::Result(payload) => {
                    state.aggregation_mut().set_snapshot(Some(payload));
                    state.mark_dirty();
                    Vec::new()
                }
            }
        }
        Msg::ChannelClosed => {
            if let Some(session) = state.take_session() {
                lens_debug!(
                    "channel for job {} closed while {:?}",
                    session.job_id,
                    session.subscription
                );
            }
            Vec::new()
        }
        Msg::StopRequested => {
            state.status_mut().stop();
            state.mark_dirty();
            if state.session().is_some() {
                state.set_subscription(SubscriptionStatus::Closing);
                vec![Effect::CloseChannel]
            } else {
                Vec::new()
            }
        }
        Msg::CancelJobRequested => match state.job_id() {
            Some(job_id) => vec![Effect::StopJob {
                job_id: job_id.to_string(),
            }],
            None => {
                lens_debug!("cancel requested without an active job");
                Vec::new()
            }
        },
        Msg::JobStopFailed { reason } => {
            lens_warn!("job cancel failed: {}", reason);
            state.record_failure(reason);
            Vec::new()
        }
        Msg::ResumeRequested { job_id } => match job_id {
            Some(job_id) => vec![Effect::FetchCurrentResults { job_id }],
            None => Vec::new(),
        },
        Msg::CurrentResultsLoaded(payload) => {
            state.aggregation_mut().set_snapshot(payload);
            state.mark_dirty();
            Vec::new()
        }
        Msg::AllCategoriesSelected => {
            state.aggregation_mut().select_all_categories();
            state.mark_dirty();
            Vec::new()
        }
        Msg::CategorySelected(name) => {
            if state.aggregation_mut().select_category(&name) {
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}
