//! Pipeline configuration
//!
//! One config object constructed per process and handed to the pipeline;
//! there is no ambient global session state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the request pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Anchor attribute the duplicate guard extracts from create requests.
    #[serde(default = "default_guard_anchor_attribute")]
    pub guard_anchor_attribute: String,

    /// Completion-poll interval in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound on a completion wait, in seconds. `None` waits without
    /// bound, matching the behavior of the product's own tooling.
    #[serde(default = "default_wait_deadline_secs")]
    pub wait_deadline_secs: Option<u64>,

    /// Whether `apply` blocks until submitted requests reach a terminal
    /// status.
    #[serde(default = "default_wait_for_completion")]
    pub wait_for_completion: bool,

    /// Whether `apply` still submits an update request whose change list
    /// was emptied by duplicate suppression.
    #[serde(default)]
    pub submit_empty_requests: bool,
}

fn default_guard_anchor_attribute() -> String {
    "DisplayName".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_wait_deadline_secs() -> Option<u64> {
    Some(300)
}

fn default_wait_for_completion() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            guard_anchor_attribute: default_guard_anchor_attribute(),
            poll_interval_secs: default_poll_interval_secs(),
            wait_deadline_secs: default_wait_deadline_secs(),
            wait_for_completion: default_wait_for_completion(),
            submit_empty_requests: false,
        }
    }
}

impl PipelineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the guard anchor attribute.
    #[must_use]
    pub fn with_guard_anchor_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.guard_anchor_attribute = attribute.into();
        self
    }

    /// Set the completion-poll interval.
    #[must_use]
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Set or clear the wait deadline.
    #[must_use]
    pub fn with_wait_deadline_secs(mut self, secs: Option<u64>) -> Self {
        self.wait_deadline_secs = secs;
        self
    }

    /// Set whether `apply` waits for completion.
    #[must_use]
    pub fn with_wait_for_completion(mut self, wait: bool) -> Self {
        self.wait_for_completion = wait;
        self
    }

    /// Derive the waiter configuration.
    #[must_use]
    pub fn waiter_config(&self) -> WaiterConfig {
        WaiterConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            deadline: self.wait_deadline_secs.map(Duration::from_secs),
        }
    }
}

/// Configuration for the completion waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaiterConfig {
    /// Time between completion polls.
    pub poll_interval: Duration,
    /// Upper bound on the whole wait; `None` waits without bound.
    pub deadline: Option<Duration>,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        PipelineConfig::default().waiter_config()
    }
}
