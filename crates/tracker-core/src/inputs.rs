//! Action inputs declared in `action.yml`.

use crate::event::RawEventInputs;
use crate::io::ActionIo;

/// Input names as declared in the action metadata.
pub mod names {
    pub const TRACKER_HOST: &str = "tracker_host";
    pub const LOCK_ENABLE: &str = "lock_enable";
    pub const TITLE: &str = "title";
    pub const MESSAGE: &str = "message";
    pub const SERVICE: &str = "service";
    pub const PRIORITY: &str = "priority";
    pub const STATUS: &str = "status";
    pub const RELATED_ID: &str = "related_id";
    pub const GITHUB_TOKEN: &str = "github_token";
}

/// Per-invocation inputs read through the platform bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionInputs {
    pub tracker_host: String,
    /// Logged only; has no effect on delivery
    pub lock_enable: bool,
    pub event: RawEventInputs,
    pub github_token: Option<String>,
}

impl ActionInputs {
    pub fn read(io: &dyn ActionIo) -> Self {
        let token = io.read_input(names::GITHUB_TOKEN);

        ActionInputs {
            tracker_host: io.read_input(names::TRACKER_HOST),
            lock_enable: parse_bool(&io.read_input(names::LOCK_ENABLE)),
            event: RawEventInputs {
                title: io.read_input(names::TITLE),
                message: io.read_input(names::MESSAGE),
                service: io.read_input(names::SERVICE),
                priority: io.read_input(names::PRIORITY),
                status: io.read_input(names::STATUS),
                related_id: io.read_input(names::RELATED_ID),
            },
            github_token: (!token.is_empty()).then_some(token),
        }
    }
}

/// YAML 1.2 core-schema truthiness, as used for boolean action inputs.
fn parse_bool(value: &str) -> bool {
    matches!(value, "true" | "True" | "TRUE")
}
