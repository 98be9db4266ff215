use std::sync::Once;

use hirelens_core::{
    update, AppState, Effect, Inbound, Msg, ResultPayload, SkillMap, StartJobRequest,
    StatusPhase, StatusSnapshot, SubscriptionStatus, WeightMap,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(hirelens_logging::initialize_for_tests);
}

fn status(error_text: &str) -> Msg {
    Msg::FrameReceived(Inbound::Status(StatusSnapshot {
        overlay_visible: true,
        downloading: true,
        downloaded_total: 30,
        remotive_count: 20,
        adzuna_count: 10,
        error_text: error_text.to_string(),
        ..StatusSnapshot::default()
    }))
}

/// Drives a state through start, job id and handshake into an active subscription.
fn subscribed(job_id: &str) -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::StartRequested(StartJobRequest::new("rust developer")),
    );
    let (state, _) = update(
        state,
        Msg::JobStarted {
            job_id: job_id.to_string(),
        },
    );
    let (state, _) = update(state, Msg::ChannelReady);
    state
}

#[test]
fn start_walks_through_persist_open_and_subscribe() {
    init_logging();
    let request = StartJobRequest::new("rust developer");
    let (state, effects) = update(AppState::new(), Msg::StartRequested(request.clone()));
    assert!(state.is_start_pending());
    assert_eq!(effects, vec![Effect::StartJob(request)]);

    let (state, effects) = update(
        state,
        Msg::JobStarted {
            job_id: "job-1".to_string(),
        },
    );
    assert!(!state.is_start_pending());
    assert_eq!(
        effects,
        vec![Effect::PersistJobId("job-1".to_string()), Effect::OpenChannel]
    );
    assert_eq!(
        state.session().map(|s| s.subscription),
        Some(SubscriptionStatus::Inactive)
    );

    let (mut state, effects) = update(state, Msg::ChannelReady);
    assert_eq!(
        effects,
        vec![Effect::Subscribe {
            job_id: "job-1".to_string()
        }]
    );
    assert_eq!(state.view().subscription, SubscriptionStatus::Active);
    assert!(state.consume_dirty());

    // A second handshake notification does not subscribe twice.
    let (_state, effects) = update(state, Msg::ChannelReady);
    assert!(effects.is_empty());
}

#[test]
fn invalid_request_never_reaches_the_backend() {
    init_logging();
    let request = StartJobRequest {
        max_job_offers: 25,
        ..StartJobRequest::default()
    };
    let (state, effects) = update(AppState::new(), Msg::StartRequested(request));

    assert!(effects.is_empty());
    assert!(!state.is_start_pending());
    assert_eq!(
        state.last_failure(),
        Some("max job offers must be a multiple of 10, got 25")
    );
}

#[test]
fn source_failures_are_tolerated() {
    init_logging();
    let state = subscribed("job-2");
    let (state, effects) = update(state, status("fetchRemotiveError fetchAdzunaError"));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, StatusPhase::Active);
    assert_eq!(view.subscription, SubscriptionStatus::Active);
    let unavailable: Vec<_> = view
        .sources
        .iter()
        .filter(|line| line.unavailable)
        .map(|line| line.source.display_name())
        .collect();
    assert_eq!(unavailable, vec!["Remotive", "Adzuna"]);
    assert!(!view.has_fatal_error());
}

#[test]
fn unclassified_error_closes_channel_and_keeps_status() {
    init_logging();
    let state = subscribed("job-3");
    let (state, effects) = update(state, status("fetchRemotiveError somethingElse"));

    assert_eq!(effects, vec![Effect::CloseChannel]);
    let view = state.view();
    assert_eq!(view.phase, StatusPhase::Terminated);
    assert_eq!(view.subscription, SubscriptionStatus::Closing);
    assert_eq!(view.status.downloaded_total, 30);
    assert_eq!(view.fatal_errors, vec!["somethingElse".to_string()]);

    let (state, effects) = update(state, Msg::ChannelClosed);
    assert!(effects.is_empty());
    assert!(state.session().is_none());
    assert_eq!(state.view().status.error_text, "fetchRemotiveError somethingElse");
}

#[test]
fn cancellation_closes_channel_and_resets_status() {
    init_logging();
    let state = subscribed("job-4");
    let (state, _) = update(state, status(""));
    let (state, effects) = update(
        state,
        Msg::FrameReceived(Inbound::Status(StatusSnapshot {
            cancelled: true,
            downloaded_total: 99,
            ..StatusSnapshot::default()
        })),
    );

    assert_eq!(effects, vec![Effect::CloseChannel]);
    let view = state.view();
    assert_eq!(view.phase, StatusPhase::Terminated);
    assert_eq!(view.status, StatusSnapshot::default());
}

#[test]
fn frames_after_termination_change_nothing() {
    init_logging();
    let state = subscribed("job-5");
    let (state, _) = update(state, status("boom"));
    let (mut state, _) = update(state, Msg::ChannelClosed);
    state.consume_dirty();
    let before = state.clone();

    let (mut state, effects) = update(state, status(""));
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state, before);
}

#[test]
fn result_frames_replace_the_aggregation_snapshot() {
    init_logging();
    let state = subscribed("job-6");
    let skills = SkillMap::from([(
        "Backend".to_string(),
        WeightMap::from([("Rust".to_string(), 4), ("Go".to_string(), 2)]),
    )]);
    let payload = ResultPayload::complete(
        WeightMap::from([("Remote".to_string(), 5), ("Oslo".to_string(), 1)]),
        skills,
    );
    let (state, _) = update(state, Msg::FrameReceived(Inbound::Result(payload)));
    let (state, _) = update(state, Msg::CategorySelected("Backend".to_string()));

    let view = state.view();
    let weights: Vec<_> = view
        .weights
        .iter()
        .map(|entry| (entry.name.as_str(), entry.weight))
        .collect();
    assert_eq!(weights, vec![("Go", 2), ("Rust", 4)]);
    assert_eq!(view.location_buckets.remote, 5);
    assert_eq!(view.named_locations.len(), 1);

    let (state, _) = update(state, Msg::AllCategoriesSelected);
    assert_eq!(state.view().weights[0].weight, 6);
}

#[test]
fn completion_frame_closes_channel_and_keeps_results() {
    init_logging();
    let state = subscribed("job-10");
    let (state, _) = update(state, status(""));
    let payload = ResultPayload::complete(
        WeightMap::from([("Oslo".to_string(), 3)]),
        SkillMap::from([(
            "Data".to_string(),
            WeightMap::from([("SQL".to_string(), 8)]),
        )]),
    );
    let (state, _) = update(state, Msg::FrameReceived(Inbound::Result(payload)));

    // Final report of a finished run: every flag and counter back to zero.
    let (state, effects) = update(
        state,
        Msg::FrameReceived(Inbound::Status(StatusSnapshot::default())),
    );
    assert_eq!(effects, vec![Effect::CloseChannel]);
    assert_eq!(state.view().phase, StatusPhase::Terminated);
    assert!(!state.view().has_fatal_error());

    let (state, _) = update(state, Msg::ChannelClosed);
    assert!(state.session().is_none());
    assert_eq!(state.view().location_buckets.onsite, 3);
    assert_eq!(state.view().weights[0].weight, 8);
}

#[test]
fn stop_closes_session_and_clears_status() {
    init_logging();
    let state = subscribed("job-7");
    let (state, _) = update(state, status("fetchJoinriseError"));
    let (state, effects) = update(state, Msg::StopRequested);

    assert_eq!(effects, vec![Effect::CloseChannel]);
    assert_eq!(state.view().status, StatusSnapshot::default());
    assert_eq!(state.view().phase, StatusPhase::Terminated);

    let (state, _) = update(state, Msg::ChannelClosed);
    let (_state, effects) = update(state, Msg::StopRequested);
    assert!(effects.is_empty());
}

#[test]
fn new_start_supersedes_running_session() {
    init_logging();
    let state = subscribed("old-job");
    let (state, _) = update(state, status(""));
    let request = StartJobRequest::new("kotlin");
    let (state, effects) = update(state, Msg::StartRequested(request.clone()));

    assert_eq!(effects, vec![Effect::CloseChannel, Effect::StartJob(request)]);
    assert!(state.session().is_none());

    let (state, _) = update(
        state,
        Msg::JobStarted {
            job_id: "new-job".to_string(),
        },
    );
    assert_eq!(state.job_id(), Some("new-job"));
    assert_eq!(state.view().phase, StatusPhase::Idle);
}

#[test]
fn cancel_asks_backend_and_waits_for_status() {
    init_logging();
    let (_, effects) = update(AppState::new(), Msg::CancelJobRequested);
    assert!(effects.is_empty());

    let state = subscribed("job-8");
    let (state, effects) = update(state, Msg::CancelJobRequested);
    assert_eq!(
        effects,
        vec![Effect::StopJob {
            job_id: "job-8".to_string()
        }]
    );
    assert_eq!(state.view().subscription, SubscriptionStatus::Active);
}

#[test]
fn resume_fetches_results_without_a_session() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ResumeRequested { job_id: None });
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::ResumeRequested {
            job_id: Some("persisted".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::FetchCurrentResults {
            job_id: "persisted".to_string()
        }]
    );
    assert!(state.session().is_none());

    let payload = ResultPayload::complete(
        WeightMap::from([("Remote".to_string(), 2)]),
        SkillMap::new(),
    );
    let (state, _) = update(state, Msg::CurrentResultsLoaded(Some(payload)));
    assert_eq!(state.view().location_buckets.remote, 2);

    let (state, _) = update(state, Msg::CurrentResultsLoaded(None));
    assert!(state.aggregation().snapshot().is_empty());
}

#[test]
fn start_and_channel_failures_are_reported() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::StartRequested(StartJobRequest::new("x")),
    );
    let (state, _) = update(
        state,
        Msg::JobStartFailed {
            reason: "http status 500".to_string(),
        },
    );
    assert!(!state.is_start_pending());
    assert_eq!(state.view().last_failure.as_deref(), Some("http status 500"));

    let state = subscribed("job-9");
    let (state, effects) = update(
        state,
        Msg::ChannelFailed {
            reason: "connection refused".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert!(state.session().is_none());
    assert_eq!(state.last_failure(), Some("connection refused"));
}
