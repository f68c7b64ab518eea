//! Builds event queues according to the configured queue kind

use crate::core::retry::RetryPolicy;
use crate::events::config::{EventQueueSettings, QueueKind};
use crate::events::error::EventQueueResult;
use crate::events::queue::{EventQueue, QueueExecutor};
use crate::listeners::api::{CacheListener, ListenerId};
use crate::pool::api::{PoolConfigSource, WorkerPool, WorkerPoolManager};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct EventQueueFactory {
    kind: QueueKind,
    retry: RetryPolicy,
    pool: Option<Arc<WorkerPool>>,
}

impl EventQueueFactory {
    /// Validate the settings and resolve the delivery pool for pooled queues
    ///
    /// The pool is looked up by name in `manager`, so every factory using
    /// the same pool name shares one set of workers.
    pub fn new(
        settings: &EventQueueSettings,
        manager: &WorkerPoolManager,
        pools: &dyn PoolConfigSource,
    ) -> EventQueueResult<Self> {
        settings.validate()?;

        let pool = match settings.kind {
            QueueKind::Pooled => Some(manager.get_or_create(&settings.pool_name, pools)?),
            QueueKind::Single => None,
        };

        Ok(Self {
            kind: settings.kind,
            retry: settings.retry_policy(),
            pool,
        })
    }

    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    pub fn pool(&self) -> Option<&Arc<WorkerPool>> {
        self.pool.as_ref()
    }

    pub fn create(
        &self,
        listener_id: ListenerId,
        listener: Arc<dyn CacheListener>,
    ) -> Arc<EventQueue> {
        let executor = match &self.pool {
            Some(pool) => QueueExecutor::Pooled(Arc::clone(pool)),
            None => QueueExecutor::Dedicated,
        };
        EventQueue::new(listener_id, listener, executor, self.retry.clone())
    }
}
