//! Events Tracker Core
//!
//! Builds a normalized event describing a CI job's outcome and delivers it
//! to an events-tracker instance:
//! - `host`: tracker host scheme normalization
//! - `pull_request`: merged pull request lookup by merge commit
//! - `event`: event defaulting and post-run status override
//! - `client`: wire payload and single-shot delivery
//! - `orchestrator`: pre-run / post-run sequencing and failure containment
//!
//! Platform access goes through the [`ActionIo`] bridge and an explicit
//! [`RunContext`].

pub mod client;
pub mod context;
pub mod error;
pub mod event;
pub mod fakes;
pub mod host;
pub mod inputs;
pub mod io;
pub mod obs;
pub mod orchestrator;
pub mod pull_request;
pub mod telemetry;

pub use client::{
    extract_event_id, EventAttributes, EventLinks, TrackerClient, TrackerConfig,
    TrackerEventPayload,
};
pub use context::{RepoRef, RunContext};
pub use error::{Result, TrackerError};
pub use event::{build_event, Event, RawEventInputs};
pub use host::{ensure_http_scheme, event_endpoint};
pub use inputs::ActionInputs;
pub use io::{ActionIo, GithubActionsIo};
pub use orchestrator::{Reporter, RunMode, RunOutcome};
pub use pull_request::{
    GithubApiConfig, GithubClient, PullRequestLookup, PullRequestRef, PullRequestResolver,
};
pub use telemetry::init_tracing;

/// User agent sent to the tracker and GitHub.
pub const USER_AGENT: &str = concat!("events-tracker-action/", env!("CARGO_PKG_VERSION"));
