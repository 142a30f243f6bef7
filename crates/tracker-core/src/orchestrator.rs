//! Pre-run and post-run sequencing
//!
//! A job emits at most two events: an optimistic one from the pre step, and
//! a corrective `failure` event from the post step when the job did not
//! succeed. Each invocation is a single pass with one delivery attempt.
//!
//! All errors are contained here and reported through [`ActionIo::fail_run`];
//! the `id` output is only set when the tracker accepted the event.

use std::fmt;

use tracing::debug;

use crate::client::{TrackerClient, TrackerConfig};
use crate::context::RunContext;
use crate::error::Result;
use crate::event::build_event;
use crate::inputs::ActionInputs;
use crate::io::ActionIo;
use crate::obs;
use crate::pull_request::{GithubApiConfig, PullRequestLookup, PullRequestResolver};

/// Name of the output carrying the tracker event id.
pub const OUTPUT_ID: &str = "id";

/// Invocation point within the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Pre,
    Post,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Pre => "pre",
            RunMode::Post => "post",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Event accepted; `id` was published as an output
    Delivered { id: String },
    /// Post step of a successful job; nothing sent
    Skipped,
    /// Run marked failed with `message`
    Failed { message: String },
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Drives one tracker run against a platform bridge and run context.
pub struct Reporter<'a> {
    io: &'a dyn ActionIo,
    ctx: &'a RunContext,
    github: GithubApiConfig,
}

impl<'a> Reporter<'a> {
    pub fn new(io: &'a dyn ActionIo, ctx: &'a RunContext) -> Self {
        Reporter {
            io,
            ctx,
            github: GithubApiConfig::default(),
        }
    }

    pub fn with_github_config(mut self, config: GithubApiConfig) -> Self {
        self.github = config;
        self
    }

    /// Execute the run for `mode`, converting any error into a failed run.
    pub async fn run(&self, mode: RunMode) -> RunOutcome {
        let _span = obs::RunSpan::enter(mode.as_str(), &self.ctx.sha);

        if mode == RunMode::Post {
            let status = self.ctx.job_status.as_deref().unwrap_or("");
            debug!(job_status = %status, "job status");
            if self.ctx.job_succeeded() {
                obs::emit_run_skipped(status);
                return RunOutcome::Skipped;
            }
        }

        obs::emit_run_started(
            mode.as_str(),
            &self.ctx.repository.to_string(),
            &self.ctx.job,
        );

        match self.execute(mode == RunMode::Post).await {
            Ok(id) => {
                self.io.set_output(OUTPUT_ID, &id);
                RunOutcome::Delivered { id }
            }
            Err(e) => {
                obs::emit_run_failed(&e);
                let message = e.to_string();
                self.io.fail_run(&message);
                RunOutcome::Failed { message }
            }
        }
    }

    async fn execute(&self, is_post_run: bool) -> Result<String> {
        let inputs = ActionInputs::read(self.io);
        debug!("lock is enable {}", inputs.lock_enable);
        debug!("tracker host {}", inputs.tracker_host);

        let resolver = PullRequestResolver::new(self.github.clone());
        let pull = resolver
            .resolve(
                inputs.github_token.as_deref(),
                &self.ctx.repository,
                &self.ctx.sha,
            )
            .await?;

        match &pull {
            PullRequestLookup::Found(pr) => obs::emit_pull_request_resolved(Some(pr.number)),
            PullRequestLookup::NotFound if inputs.github_token.is_some() => {
                debug!("pull request not found");
                obs::emit_pull_request_resolved(None);
            }
            PullRequestLookup::NotFound => {}
        }

        let event = build_event(&inputs.event, self.ctx, is_post_run);
        let client = TrackerClient::new(TrackerConfig::new(&inputs.tracker_host))?;
        let id = client.send_event(&event, &pull, self.ctx).await?;

        obs::emit_event_delivered(&id, &event.status);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RepoRef;
    use crate::fakes::MemoryActionIo;

    fn ctx(status: Option<&str>) -> RunContext {
        RunContext::new(RepoRef::new("bananaops", "checkout"), "abc123", "deploy")
            .with_job_status(status)
    }

    #[test]
    fn test_run_mode_display() {
        assert_eq!(RunMode::Pre.to_string(), "pre");
        assert_eq!(RunMode::Post.to_string(), "post");
    }

    #[tokio::test]
    async fn test_post_success_is_skipped() {
        // Unroutable host: a delivery attempt would fail the run.
        let io = MemoryActionIo::new().with_input("tracker_host", "127.0.0.1:1");
        let ctx = ctx(Some("success"));

        let outcome = Reporter::new(&io, &ctx).run(RunMode::Post).await;
        assert_eq!(outcome, RunOutcome::Skipped);
        assert!(io.outputs().is_empty());
        assert!(!io.has_failed());
    }

    #[tokio::test]
    async fn test_unreachable_tracker_fails_run() {
        let io = MemoryActionIo::new().with_input("tracker_host", "127.0.0.1:1");
        let ctx = ctx(None);

        let outcome = Reporter::new(&io, &ctx).run(RunMode::Pre).await;
        assert!(outcome.is_failure());
        assert_eq!(io.failures().len(), 1);
        assert_eq!(io.output(OUTPUT_ID), None);
    }
}
