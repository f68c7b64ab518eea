//! Public API for the worker pool system
//!
//! External modules should import from here rather than directly from
//! internal modules.

use std::sync::{Arc, LazyLock};

pub use crate::pool::config::{PoolConfig, PoolConfigSource, PoolSettings, WhenBlockedPolicy};
pub use crate::pool::error::{PoolError, PoolResult};
pub use crate::pool::manager::WorkerPoolManager;
pub use crate::pool::worker_pool::{PoolTask, WorkerPool};

/// Process-wide pool manager
static POOL_MANAGER: LazyLock<Arc<WorkerPoolManager>> = LazyLock::new(|| {
    log::trace!("Initializing worker pool manager");
    Arc::new(WorkerPoolManager::new())
});

/// Access the process-wide pool manager
///
/// Every call returns the same shared instance, so pools created through it
/// are unique per name for the lifetime of the process.
///
/// # Examples
/// ```no_run
/// # use remcache::pool::api::{get_pool_manager, PoolConfig};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = get_pool_manager().get_or_create("maxtest", &PoolConfig::default())?;
/// pool.execute(async { /* deliver something */ }).await?;
/// # Ok(())
/// # }
/// ```
pub fn get_pool_manager() -> Arc<WorkerPoolManager> {
    Arc::clone(&POOL_MANAGER)
}
