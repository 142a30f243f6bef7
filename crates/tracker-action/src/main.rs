//! Events Tracker Action
//!
//! Entry point run by GitHub Actions. The `pre` step reports the job to the
//! tracker; the `post` step reports a `failure` event when the job did not
//! succeed.
//!
//! ## Commands
//!
//! - `pre`: send the job event (main entrypoint)
//! - `post`: send a failure event unless the job succeeded

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tracker_core::{ActionIo, GithubActionsIo, GithubApiConfig, Reporter, RunContext, RunMode};

#[derive(Parser)]
#[command(name = "events-tracker-action")]
#[command(author = "BananaOps")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Report CI job events to events-tracker", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Final status of the job (`success`, `failure`, `cancelled`)
    #[arg(long, global = true, env = "INPUT_JOB_STATUS")]
    job_status: Option<String>,

    /// GitHub REST API base URL (default: `GITHUB_API_URL`, then api.github.com)
    #[arg(long, global = true)]
    github_api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send the job event before the job's main work
    Pre,

    /// Send a failure event after the job, unless it succeeded
    Post,
}

impl From<&Commands> for RunMode {
    fn from(command: &Commands) -> Self {
        match command {
            Commands::Pre => RunMode::Pre,
            Commands::Post => RunMode::Post,
        }
    }
}

/// Build the run context, failing the run through `io` when it is incomplete.
fn load_context<F>(io: &dyn ActionIo, lookup: F, job_status: Option<&str>) -> Result<RunContext>
where
    F: Fn(&str) -> Option<String>,
{
    match RunContext::from_lookup(lookup) {
        Ok(ctx) => Ok(ctx.with_job_status(job_status)),
        Err(e) => {
            io.fail_run(&e.to_string());
            Err(e).context("Failed to read GitHub run context")
        }
    }
}

fn github_config(api_url: Option<&str>) -> GithubApiConfig {
    match api_url {
        Some(url) => GithubApiConfig::new(url),
        None => GithubApiConfig::default(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracker_core::init_tracing(cli.json, cli.verbose);

    let io = GithubActionsIo::from_env();
    let ctx = load_context(&io, |key| std::env::var(key).ok(), cli.job_status.as_deref())?;

    let outcome = Reporter::new(&io, &ctx)
        .with_github_config(github_config(cli.github_api_url.as_deref()))
        .run(RunMode::from(&cli.command))
        .await;

    if outcome.is_failure() || io.has_failed() {
        std::process::exit(1);
    }
    Ok(())
}
