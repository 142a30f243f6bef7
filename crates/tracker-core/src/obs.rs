//! Structured lifecycle records for a tracker run.
//!
//! Every record carries an `event` field (`run.started`, `run.skipped`,
//! `pull_request.resolved`, `event.delivered`, `run.failed`) so runs can be
//! followed in JSON log output.

use tracing::{error, info};

/// RAII guard entering a span tagged with the run mode and commit.
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(mode: &str, sha: &str) -> Self {
        let span = tracing::info_span!("tracker.run", mode = %mode, sha = %sha);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_run_started(mode: &str, repository: &str, job: &str) {
    info!(event = "run.started", mode = %mode, repository = %repository, job = %job);
}

/// Post step found a successful job; nothing is sent.
pub fn emit_run_skipped(job_status: &str) {
    info!(event = "run.skipped", job_status = %job_status);
}

pub fn emit_pull_request_resolved(number: Option<u64>) {
    info!(
        event = "pull_request.resolved",
        found = number.is_some(),
        number = number,
    );
}

pub fn emit_event_delivered(event_id: &str, status: &str) {
    info!(event = "event.delivered", event_id = %event_id, status = %status);
}

pub fn emit_run_failed(error: &dyn std::fmt::Display) {
    error!(event = "run.failed", error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let _span = RunSpan::enter("pre", "abc123");
        emit_pull_request_resolved(None);
    }
}
