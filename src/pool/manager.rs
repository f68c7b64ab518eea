//! WorkerPoolManager - pools looked up by name
//!
//! The first request for a name creates the pool from the configuration
//! source; later requests return the same pool regardless of the source they
//! pass.

use crate::core::sync::lock_recover;
use crate::pool::config::PoolConfigSource;
use crate::pool::error::PoolResult;
use crate::pool::worker_pool::WorkerPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct WorkerPoolManager {
    pools: Mutex<HashMap<String, Arc<WorkerPool>>>,
}

impl WorkerPoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the pool called `name`, creating it on first use
    pub fn get_or_create(
        &self,
        name: &str,
        source: &dyn PoolConfigSource,
    ) -> PoolResult<Arc<WorkerPool>> {
        let mut pools = lock_recover(&self.pools);
        if let Some(pool) = pools.get(name) {
            return Ok(Arc::clone(pool));
        }

        let pool = WorkerPool::new(name, source.pool_config(name))?;
        pools.insert(name.to_string(), Arc::clone(&pool));
        log::info!(
            "Worker pool '{}' created (max {} workers)",
            name,
            pool.config().max_workers
        );
        Ok(pool)
    }

    pub fn get(&self, name: &str) -> Option<Arc<WorkerPool>> {
        lock_recover(&self.pools).get(name).cloned()
    }

    pub fn pool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock_recover(&self.pools).keys().cloned().collect();
        names.sort();
        names
    }

    /// Shut down every pool and forget them
    ///
    /// Returns the total number of queued tasks that were discarded.
    pub fn shutdown_all(&self) -> usize {
        let pools: Vec<Arc<WorkerPool>> = lock_recover(&self.pools)
            .drain()
            .map(|(_, pool)| pool)
            .collect();
        pools.iter().map(|pool| pool.shutdown()).sum()
    }
}
