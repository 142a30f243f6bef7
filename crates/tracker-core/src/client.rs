//! Tracker HTTP client
//!
//! Serializes an [`Event`] into the tracker's `v1alpha1` wire format and
//! POSTs it once. Delivery is fire-and-forget: no retries, no queueing.

use reqwest::header::{HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::context::RunContext;
use crate::error::{Result, TrackerError};
use crate::event::Event;
use crate::host::event_endpoint;
use crate::pull_request::PullRequestLookup;

/// Value of `attributes.source` for events sent by this action.
pub const EVENT_SOURCE: &str = "github_action";

/// Value of `attributes.type` for events sent by this action.
pub const EVENT_TYPE: u8 = 1;

/// Tracker connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Tracker host, with or without scheme
    pub host: String,
    pub user_agent: String,
}

impl TrackerConfig {
    pub fn new(host: &str) -> Self {
        TrackerConfig {
            host: host.to_string(),
            user_agent: crate::USER_AGENT.to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Event-ingestion URL for this host.
    pub fn endpoint(&self) -> String {
        event_endpoint(&self.host)
    }
}

/// `attributes` object of the wire payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttributes {
    pub message: String,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub priority: String,
    pub related_id: String,
    /// Name of the triggering repository
    pub service: String,
    pub status: String,
}

/// `links` object of the wire payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLinks {
    pub pull_request_link: String,
}

/// Request body for `POST /api/v1alpha1/event`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerEventPayload {
    pub title: String,
    pub attributes: EventAttributes,
    pub links: EventLinks,
}

impl TrackerEventPayload {
    pub fn new(event: &Event, pull: &PullRequestLookup, ctx: &RunContext) -> Self {
        TrackerEventPayload {
            title: event.title.clone(),
            attributes: EventAttributes {
                message: event.message.clone(),
                source: EVENT_SOURCE.to_string(),
                kind: EVENT_TYPE,
                priority: event.priority.clone(),
                related_id: event.related_id.clone(),
                service: ctx.repository.name.clone(),
                status: event.status.clone(),
            },
            links: EventLinks {
                pull_request_link: pull.link().to_string(),
            },
        }
    }
}

/// Extract `event.metadata.id` from a tracker response body.
///
/// String ids are returned as-is, numeric ids in decimal form.
pub fn extract_event_id(body: &Value) -> Result<String> {
    match body.pointer("/event/metadata/id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(other) => Err(TrackerError::MalformedResponse(format!(
            "event.metadata.id is not a string or number: {other}"
        ))),
        None => Err(TrackerError::MalformedResponse(
            "missing event.metadata.id".to_string(),
        )),
    }
}

/// Client for the tracker's event-ingestion API.
pub struct TrackerClient {
    config: TrackerConfig,
    http: reqwest::Client,
}

impl TrackerClient {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| TrackerError::InvalidHeader(format!("user agent: {e}")))?;
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(TrackerClient { config, http })
    }

    /// POST the event once and return the tracker-assigned id.
    pub async fn send_event(
        &self,
        event: &Event,
        pull: &PullRequestLookup,
        ctx: &RunContext,
    ) -> Result<String> {
        let payload = TrackerEventPayload::new(event, pull, ctx);
        let url = self.config.endpoint();

        let result = self.post(&url, &payload).await;
        if let Err(e) = &result {
            error!(url = %url, error = %e, "failed to post event to tracker");
        }
        result
    }

    async fn post(&self, url: &str, payload: &TrackerEventPayload) -> Result<String> {
        let response = self.http.post(url).json(payload).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TrackerError::TrackerStatus {
                status: status.as_u16(),
                body,
            });
        }

        info!(response = %body, "tracker response");
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| TrackerError::MalformedResponse(format!("invalid JSON: {e}")))?;
        extract_event_id(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RepoRef;
    use crate::pull_request::PullRequestRef;
    use serde_json::json;

    fn event() -> Event {
        Event {
            title: "deploy on checkout".to_string(),
            message: "deploy on checkout".to_string(),
            service: "api".to_string(),
            priority: "P2".to_string(),
            status: "pending".to_string(),
            related_id: "42".to_string(),
        }
    }

    fn ctx() -> RunContext {
        RunContext::new(RepoRef::new("bananaops", "checkout"), "abc123", "deploy")
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = TrackerEventPayload::new(&event(), &PullRequestLookup::NotFound, &ctx());
        let v = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            v,
            json!({
                "title": "deploy on checkout",
                "attributes": {
                    "message": "deploy on checkout",
                    "source": "github_action",
                    "type": 1,
                    "priority": "P2",
                    "relatedId": "42",
                    "service": "checkout",
                    "status": "pending"
                },
                "links": { "pullRequestLink": "" }
            })
        );
    }

    #[test]
    fn test_payload_carries_pull_request_link() {
        let pr = PullRequestRef {
            title: "Fix".to_string(),
            body: Some("details".to_string()),
            number: 9,
            url: "https://github.com/bananaops/checkout/pull/9".to_string(),
            labels: vec![],
            assignees: vec![],
        };
        let payload = TrackerEventPayload::new(&event(), &PullRequestLookup::Found(pr), &ctx());
        assert_eq!(
            payload.links.pull_request_link,
            "https://github.com/bananaops/checkout/pull/9"
        );
    }

    #[test]
    fn test_extract_event_id() {
        let id = extract_event_id(&json!({"event": {"metadata": {"id": "evt-1"}}})).unwrap();
        assert_eq!(id, "evt-1");

        let id = extract_event_id(&json!({"event": {"metadata": {"id": 17}}})).unwrap();
        assert_eq!(id, "17");
    }

    #[test]
    fn test_extract_event_id_malformed() {
        for body in [
            json!({}),
            json!({"event": {}}),
            json!({"event": {"metadata": {"id": null}}}),
            json!({"event": {"metadata": {"id": ["x"]}}}),
        ] {
            assert!(matches!(
                extract_event_id(&body),
                Err(TrackerError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn test_config_endpoint() {
        let config = TrackerConfig::new("tracker.io:8080");
        assert_eq!(config.endpoint(), "http://tracker.io:8080/api/v1alpha1/event");
    }
}
