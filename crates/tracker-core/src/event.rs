//! Event construction from raw run inputs.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::RunContext;

/// Status forced onto every post-run event.
pub const POST_RUN_STATUS: &str = "failure";

/// User-supplied event fields, verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEventInputs {
    pub title: String,
    pub message: String,
    pub service: String,
    pub priority: String,
    pub status: String,
    pub related_id: String,
}

/// Normalized event record handed to the tracker client.
///
/// `title` and `message` are never empty once built by [`build_event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub title: String,
    pub message: String,
    pub service: String,
    pub priority: String,
    pub status: String,
    pub related_id: String,
}

/// Build the event for this run.
///
/// Post-run events always carry [`POST_RUN_STATUS`]. An empty title becomes
/// `"<job> on <repository>"` and an empty message copies the final title.
pub fn build_event(inputs: &RawEventInputs, ctx: &RunContext, is_post_run: bool) -> Event {
    let mut event = Event {
        title: inputs.title.clone(),
        message: inputs.message.clone(),
        service: inputs.service.clone(),
        priority: inputs.priority.clone(),
        status: inputs.status.clone(),
        related_id: inputs.related_id.clone(),
    };

    if is_post_run {
        event.status = POST_RUN_STATUS.to_string();
    }

    if event.title.is_empty() {
        event.title = format!("{} on {}", ctx.job, ctx.repository.name);
        warn!(title = %event.title, "set default title");
    }

    if event.message.is_empty() {
        event.message = event.title.clone();
        warn!(message = %event.message, "set default message");
    }

    event
}
