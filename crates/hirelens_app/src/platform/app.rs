use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use hirelens_core::{JobLevel, StartJobRequest, TrackerViewModel};
use hirelens_engine::{
    ApiSettings, JobIdStore, JobsApi, ReqwestJobsApi, RonJobIdStore, Tracker, TrackerConfig,
    TransportSettings,
};
use hirelens_logging::{lens_info, lens_warn};

use super::logging::LogDestination;
use super::render::{render_jobs, render_results, render_status};

/// How long to wait for the backend to confirm a cancel before giving up.
const CANCEL_GRACE: Duration = Duration::from_secs(15);

#[derive(Parser, Debug)]
#[command(name = "hirelens")]
#[command(about = "Start job-offer collection runs and follow them live")]
#[command(version)]
pub struct Cli {
    /// Base url of the backend REST API
    #[arg(long, global = true, env = "HIRELENS_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// WebSocket endpoint of the STOMP broker
    #[arg(
        long,
        global = true,
        env = "HIRELENS_WS_URL",
        default_value = "ws://localhost:8080/ws/websocket"
    )]
    ws_url: String,

    /// Directory holding the last started job id
    #[arg(long, global = true, env = "HIRELENS_STATE_DIR", default_value = ".")]
    state_dir: PathBuf,

    /// Where log output goes
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a job and follow it until it finishes
    Track {
        /// Search phrase sent to the job sources
        #[arg(default_value = "")]
        query: String,

        /// Seniority filter (intern, junior, mid, senior, all)
        #[arg(long, default_value = "all")]
        level: JobLevel,

        /// Keep offers whose seniority is unknown
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        include_unknown: bool,

        /// Upper bound on collected offers (at least 20, in steps of 10)
        #[arg(long, default_value_t = 100)]
        max_offers: u32,

        /// On Ctrl-C ask the backend to cancel instead of only detaching
        #[arg(long)]
        cancel_on_interrupt: bool,
    },
    /// Show the stored results of the last started job
    Resume {
        /// Drill into one skill category
        #[arg(long)]
        category: Option<String>,
    },
    /// Ask the backend to cancel a job
    Stop {
        /// Job to cancel; defaults to the last started job
        job_id: Option<String>,
    },
    /// List stored job offers
    Jobs,
}

impl Cli {
    fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            api: ApiSettings {
                base_url: self.api_url.clone(),
                ..ApiSettings::default()
            },
            transport: TransportSettings {
                ws_url: self.ws_url.clone(),
                ..TransportSettings::default()
            },
            state_dir: self.state_dir.clone(),
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.tracker_config();
    match cli.command {
        Command::Track {
            query,
            level,
            include_unknown,
            max_offers,
            cancel_on_interrupt,
        } => {
            let request = StartJobRequest {
                query,
                level,
                include_unknown,
                max_job_offers: max_offers,
            };
            track(config, request, cancel_on_interrupt).await
        }
        Command::Resume { category } => resume(config, category).await,
        Command::Stop { job_id } => stop(config, job_id).await,
        Command::Jobs => {
            let tracker = Tracker::from_config(config).context("creating tracker")?;
            print_lines(&render_jobs(&tracker.list_jobs().await?));
            Ok(())
        }
    }
}

async fn track(config: TrackerConfig, request: StartJobRequest, cancel_on_interrupt: bool) -> Result<()> {
    let mut tracker = Tracker::from_config(config).context("creating tracker")?;
    let job_id = tracker.start_tracking(request).await?;
    lens_info!("following job {}", job_id);

    let interrupted = tokio::select! {
        _ = tracker.run(print_status) => false,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl-C")?;
            true
        }
    };

    if interrupted {
        if cancel_on_interrupt {
            println!("Cancelling job {job_id}...");
            tracker.cancel_job().await?;
            if tokio::time::timeout(CANCEL_GRACE, tracker.run(print_status))
                .await
                .is_err()
            {
                lens_warn!("no cancel confirmation for job {}, detaching", job_id);
                tracker.stop_tracking().await;
            }
        } else {
            println!("Detached from job {job_id}; it keeps running on the server.");
            tracker.stop_tracking().await;
        }
    }

    let view = tracker.view();
    print_lines(&render_results(&view));
    if view.has_fatal_error() {
        bail!("job {job_id} failed: {}", view.fatal_errors.join(", "));
    }
    Ok(())
}

async fn resume(config: TrackerConfig, category: Option<String>) -> Result<()> {
    let mut tracker = Tracker::from_config(config).context("creating tracker")?;
    if !tracker.resume_from_store().await {
        println!("No previous job to resume.");
        return Ok(());
    }
    if let Some(category) = category {
        tracker.select_category(&category).await;
    }
    print_lines(&render_results(&tracker.view()));
    Ok(())
}

async fn stop(config: TrackerConfig, job_id: Option<String>) -> Result<()> {
    let job_id = match job_id {
        Some(job_id) => job_id,
        None => match RonJobIdStore::new(&config.state_dir).load() {
            Some(job_id) => job_id,
            None => bail!("no job id given and none stored in {:?}", config.state_dir),
        },
    };
    let api = ReqwestJobsApi::new(config.api)?;
    let status = api.stop_job(&job_id).await?;
    println!("Cancel requested for job {job_id} (HTTP {status})");
    Ok(())
}

fn print_status(view: &TrackerViewModel) {
    print_lines(&render_status(view));
    println!();
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
