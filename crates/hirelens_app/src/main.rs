//! `hirelens`: start a job-collection run and follow its progress from the
//! terminal.
mod platform;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = platform::Cli::parse();
    platform::logging::initialize(cli.log, cli.verbose);
    platform::run(cli).await
}
