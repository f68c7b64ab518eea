//! Worker pool configuration and the configuration source seam

use crate::pool::error::{PoolError, PoolResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// What `execute` does when a bounded task queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhenBlockedPolicy {
    /// The submitter waits until a worker takes a task off the queue
    #[default]
    Wait,
    /// The submission fails with `PoolError::QueueFull`
    Abort,
    /// The oldest queued task is dropped to make room
    DiscardOldest,
}

/// Settings for one named worker pool
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PoolConfig {
    pub max_workers: usize,
    /// Idle workers at or below this count survive the idle timeout
    pub min_workers: usize,
    pub idle_timeout_ms: u64,
    /// Maximum queued tasks; `None` means unbounded
    pub boundary_size: Option<usize>,
    pub when_blocked: WhenBlockedPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 150,
            min_workers: 4,
            idle_timeout_ms: 300_000,
            boundary_size: None,
            when_blocked: WhenBlockedPolicy::Wait,
        }
    }
}

impl PoolConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_min_workers(mut self, min_workers: usize) -> Self {
        self.min_workers = min_workers;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout_ms = u64::try_from(idle_timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_boundary(mut self, boundary_size: usize, when_blocked: WhenBlockedPolicy) -> Self {
        self.boundary_size = Some(boundary_size);
        self.when_blocked = when_blocked;
        self
    }

    pub fn validate(&self, pool: &str) -> PoolResult<()> {
        let invalid = |message: &str| PoolError::InvalidConfig {
            pool: pool.to_string(),
            message: message.to_string(),
        };

        if self.max_workers == 0 {
            return Err(invalid("max-workers must be at least 1"));
        }
        if self.min_workers > self.max_workers {
            return Err(invalid("min-workers must not exceed max-workers"));
        }
        if self.boundary_size == Some(0) {
            return Err(invalid("boundary-size must be at least 1 when set"));
        }
        Ok(())
    }
}

/// Supplies the configuration for a pool the first time it is created
pub trait PoolConfigSource: Send + Sync {
    fn pool_config(&self, pool_name: &str) -> PoolConfig;
}

/// Named pool sections with a default fallback
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PoolSettings {
    pub default: PoolConfig,
    pub pools: HashMap<String, PoolConfig>,
}

impl PoolSettings {
    pub fn with_pool(mut self, name: impl Into<String>, config: PoolConfig) -> Self {
        self.pools.insert(name.into(), config);
        self
    }

    pub fn validate(&self) -> PoolResult<()> {
        self.default.validate("default")?;
        for (name, config) in &self.pools {
            config.validate(name)?;
        }
        Ok(())
    }
}

impl PoolConfigSource for PoolSettings {
    fn pool_config(&self, pool_name: &str) -> PoolConfig {
        self.pools
            .get(pool_name)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

impl PoolConfigSource for PoolConfig {
    fn pool_config(&self, _pool_name: &str) -> PoolConfig {
        self.clone()
    }
}
