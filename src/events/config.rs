//! Event queue settings

use crate::core::retry::RetryPolicy;
use crate::events::error::{EventQueueError, EventQueueResult};
use serde::Deserialize;
use std::time::Duration;

/// How a listener queue gets its drain work executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueKind {
    /// Drain tasks run on the named worker pool
    #[default]
    Pooled,
    /// Each drain burst gets its own tokio task
    Single,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EventQueueSettings {
    pub kind: QueueKind,
    pub pool_name: String,
    /// Delivery attempts per event before it is dropped
    pub max_failure: usize,
    pub wait_before_retry_ms: u64,
}

impl Default for EventQueueSettings {
    fn default() -> Self {
        Self {
            kind: QueueKind::Pooled,
            pool_name: "remote_cache_event_queue".to_string(),
            max_failure: 3,
            wait_before_retry_ms: 500,
        }
    }
}

impl EventQueueSettings {
    pub fn with_kind(mut self, kind: QueueKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_pool_name(mut self, pool_name: impl Into<String>) -> Self {
        self.pool_name = pool_name.into();
        self
    }

    pub fn with_retry(mut self, max_failure: usize, wait_before_retry: Duration) -> Self {
        self.max_failure = max_failure;
        self.wait_before_retry_ms = wait_before_retry.as_millis() as u64;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_failure,
            Duration::from_millis(self.wait_before_retry_ms),
        )
    }

    pub fn validate(&self) -> EventQueueResult<()> {
        if self.max_failure == 0 {
            return Err(EventQueueError::InvalidConfig {
                message: "max-failure must be at least 1".to_string(),
            });
        }
        if self.kind == QueueKind::Pooled && self.pool_name.trim().is_empty() {
            return Err(EventQueueError::InvalidConfig {
                message: "pool-name must not be empty for pooled queues".to_string(),
            });
        }
        Ok(())
    }
}
