//! Bridge to the automation platform's named inputs, outputs and run status.
//!
//! The orchestrator only talks to [`ActionIo`]; [`GithubActionsIo`] is the
//! GitHub Actions implementation and `fakes::MemoryActionIo` serves tests.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;
use uuid::Uuid;

use crate::error::{Result, TrackerError};

/// Capability interface the core depends on for platform I/O.
pub trait ActionIo: Send + Sync {
    /// Read a named input. Unset inputs read as the empty string.
    fn read_input(&self, name: &str) -> String;

    /// Publish a named output value.
    fn set_output(&self, name: &str, value: &str);

    /// Mark the run as failed with a user-visible message.
    fn fail_run(&self, message: &str);
}

/// Environment variable carrying an input, e.g. `related_id` → `INPUT_RELATED_ID`.
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Escape data for a workflow command (`::error::...`).
pub fn escape_command_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command property (`name=...`).
pub fn escape_command_property(value: &str) -> String {
    escape_command_data(value)
        .replace(':', "%3A")
        .replace(',', "%2C")
}

/// Render one `GITHUB_OUTPUT` heredoc record.
///
/// Fails when `name` or `value` contains `delimiter`, which would end the
/// record early and let the value inject further outputs.
pub fn format_output_record(name: &str, value: &str, delimiter: &str) -> Result<String> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return Err(TrackerError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("output {name:?} contains the heredoc delimiter"),
        )));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

fn output_delimiter() -> String {
    format!("ghadelimiter_{}", Uuid::new_v4())
}

/// GitHub Actions implementation backed by a snapshot of the environment.
#[derive(Debug)]
pub struct GithubActionsIo {
    vars: HashMap<String, String>,
    output_path: Option<PathBuf>,
    failed: AtomicBool,
}

impl GithubActionsIo {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build from an explicit variable map. `GITHUB_OUTPUT` in the map
    /// selects the output file.
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        let output_path = vars
            .get("GITHUB_OUTPUT")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        GithubActionsIo {
            vars,
            output_path,
            failed: AtomicBool::new(false),
        }
    }

    /// Whether `fail_run` was called.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn append_output(&self, path: &Path, name: &str, value: &str) -> Result<()> {
        let record = format_output_record(name, value, &output_delimiter())?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(record.as_bytes())?;
        Ok(())
    }
}

impl ActionIo for GithubActionsIo {
    fn read_input(&self, name: &str) -> String {
        self.vars
            .get(&input_env_name(name))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn set_output(&self, name: &str, value: &str) {
        match &self.output_path {
            Some(path) => {
                if let Err(e) = self.append_output(path, name, value) {
                    warn!(output = %name, error = %e, "failed to write GITHUB_OUTPUT");
                }
            }
            None => println!(
                "::set-output name={}::{}",
                escape_command_property(name),
                escape_command_data(value)
            ),
        }
    }

    fn fail_run(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        println!("::error::{}", escape_command_data(message));
    }
}
