//! In-memory fakes for the platform bridge (testing only)
//!
//! `MemoryActionIo` satisfies [`ActionIo`] without touching the environment,
//! the filesystem or stdout.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::io::ActionIo;

/// In-memory action I/O recording every output and failure.
#[derive(Debug, Default)]
pub struct MemoryActionIo {
    inputs: HashMap<String, String>,
    outputs: Mutex<Vec<(String, String)>>,
    failures: Mutex<Vec<String>>,
}

impl MemoryActionIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an input value.
    pub fn with_input(mut self, name: &str, value: &str) -> Self {
        self.inputs.insert(name.to_string(), value.to_string());
        self
    }

    /// Most recent value published for `name`.
    pub fn output(&self, name: &str) -> Option<String> {
        let outputs = self.outputs.lock().unwrap();
        outputs
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// All outputs in publication order.
    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs.lock().unwrap().clone()
    }

    /// All failure messages in order.
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }

    pub fn has_failed(&self) -> bool {
        !self.failures.lock().unwrap().is_empty()
    }
}

impl ActionIo for MemoryActionIo {
    fn read_input(&self, name: &str) -> String {
        self.inputs.get(name).cloned().unwrap_or_default()
    }

    fn set_output(&self, name: &str, value: &str) {
        let mut outputs = self.outputs.lock().unwrap();
        outputs.push((name.to_string(), value.to_string()));
    }

    fn fail_run(&self, message: &str) {
        let mut failures = self.failures.lock().unwrap();
        failures.push(message.to_string());
    }
}
