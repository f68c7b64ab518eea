//! Elastic worker pool
//!
//! A named set of tokio worker tasks draining a shared task queue. Workers
//! are spawned on demand up to `max_workers` and retire when they find the
//! pool over its cap, or when they stay idle past the idle timeout while
//! above `min_workers`. The cap can be changed while the pool is busy:
//!
//! ```text
//!  execute ──push──▶ ┌───────────────────────┐ ◀──pop── worker 1 (busy)
//!                    │ VecDeque<PoolTask>    │ ◀──pop── worker 2 (idle, waiting on Notify)
//!                    └───────────────────────┘          worker 3 (over cap → retires after its task)
//! ```
//!
//! A shrink never interrupts a running task and never drops queued tasks;
//! the worker count converges to the cap as workers come back for work.

use crate::core::sync::lock_recover;
use crate::pool::config::{PoolConfig, WhenBlockedPolicy};
use crate::pool::error::{PoolError, PoolResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::Notify;

/// A unit of work accepted by the pool
pub type PoolTask = BoxFuture<'static, ()>;

struct PoolState {
    tasks: VecDeque<PoolTask>,
    max_workers: usize,
    current_workers: usize,
    idle_workers: usize,
    completed_tasks: u64,
    shutdown: bool,
}

enum WorkerStep {
    Run(PoolTask),
    Wait,
    Retire,
}

/// Named, resizable pool of async workers
pub struct WorkerPool {
    name: String,
    config: PoolConfig,
    state: Mutex<PoolState>,
    work_available: Notify,
    space_available: Notify,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("max_workers", &state.max_workers)
            .field("current_workers", &state.current_workers)
            .field("idle_workers", &state.idle_workers)
            .field("queued_tasks", &state.tasks.len())
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool; no workers are started until work arrives
    pub fn new(name: impl Into<String>, config: PoolConfig) -> PoolResult<Arc<Self>> {
        let name = name.into();
        config.validate(&name)?;

        log::debug!(
            "Creating worker pool '{}' (max {}, min {}, idle timeout {:?}, boundary {:?})",
            name,
            config.max_workers,
            config.min_workers,
            config.idle_timeout(),
            config.boundary_size
        );

        Ok(Arc::new(Self {
            name,
            state: Mutex::new(PoolState {
                tasks: VecDeque::new(),
                max_workers: config.max_workers,
                current_workers: 0,
                idle_workers: 0,
                completed_tasks: 0,
                shutdown: false,
            }),
            config,
            work_available: Notify::new(),
            space_available: Notify::new(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, PoolState> {
        lock_recover(&self.state)
    }

    /// Submit a task
    ///
    /// Starts a new worker when no idle worker can take the task and the
    /// pool is below its cap; otherwise the task waits in the queue. Only a
    /// bounded, full queue makes this call wait or fail, according to the
    /// pool's `when_blocked` policy.
    pub async fn execute<F>(self: &Arc<Self>, task: F) -> PoolResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = Handle::try_current().map_err(|_| PoolError::NoRuntime {
            pool: self.name.clone(),
        })?;
        let mut task: Option<PoolTask> = Some(task.boxed());

        loop {
            let space = self.space_available.notified();
            tokio::pin!(space);

            let spawn_worker = {
                let mut state = self.state();
                if state.shutdown {
                    return Err(PoolError::ShutDown {
                        pool: self.name.clone(),
                    });
                }

                let blocked = match self.config.boundary_size {
                    Some(boundary_size) if state.tasks.len() >= boundary_size => {
                        match self.config.when_blocked {
                            WhenBlockedPolicy::Wait => true,
                            WhenBlockedPolicy::Abort => {
                                return Err(PoolError::QueueFull {
                                    pool: self.name.clone(),
                                    boundary_size,
                                });
                            }
                            WhenBlockedPolicy::DiscardOldest => {
                                if state.tasks.pop_front().is_some() {
                                    log::warn!(
                                        "Pool '{}' queue full ({}), discarded oldest task",
                                        self.name,
                                        boundary_size
                                    );
                                }
                                false
                            }
                        }
                    }
                    _ => false,
                };

                if blocked {
                    space.as_mut().enable();
                    None
                } else {
                    state.tasks.extend(task.take());
                    Some(Self::claim_worker(&mut state))
                }
            };

            match spawn_worker {
                Some(true) => {
                    handle.spawn(Arc::clone(self).run_worker());
                    return Ok(());
                }
                Some(false) => {
                    self.work_available.notify_one();
                    return Ok(());
                }
                None => {
                    log::trace!("Pool '{}' queue full, waiting for space", self.name);
                    space.await;
                }
            }
        }
    }

    // Reserve a worker slot when queued work outnumbers idle workers.
    fn claim_worker(state: &mut PoolState) -> bool {
        if state.tasks.len() > state.idle_workers && state.current_workers < state.max_workers {
            state.current_workers += 1;
            true
        } else {
            false
        }
    }

    /// Change the worker cap
    ///
    /// Growing starts workers for any backlog right away. Shrinking wakes
    /// idle workers so the surplus retires immediately; busy workers above
    /// the cap retire when their current task completes.
    pub fn set_maximum_pool_size(self: &Arc<Self>, max_workers: usize) -> PoolResult<()> {
        if max_workers == 0 {
            return Err(PoolError::InvalidConfig {
                pool: self.name.clone(),
                message: "maximum pool size must be at least 1".to_string(),
            });
        }

        let handle = Handle::try_current().ok();
        let spawned = {
            let mut state = self.state();
            let previous = state.max_workers;
            state.max_workers = max_workers;
            log::info!(
                "Pool '{}' maximum size changed {} -> {} (current workers {})",
                self.name,
                previous,
                max_workers,
                state.current_workers
            );

            let mut spawned = 0;
            if handle.is_some() && !state.shutdown {
                while state.tasks.len() > state.idle_workers + spawned
                    && state.current_workers < state.max_workers
                {
                    state.current_workers += 1;
                    spawned += 1;
                }
            }
            spawned
        };

        self.work_available.notify_waiters();

        if let Some(handle) = handle {
            for _ in 0..spawned {
                handle.spawn(Arc::clone(self).run_worker());
            }
        }
        Ok(())
    }

    /// Discard queued tasks and let every worker retire
    ///
    /// Running tasks are allowed to finish. Returns the number of discarded
    /// tasks.
    pub fn shutdown(&self) -> usize {
        let discarded = {
            let mut state = self.state();
            state.shutdown = true;
            let discarded = state.tasks.len();
            state.tasks.clear();
            discarded
        };
        self.work_available.notify_waiters();
        self.space_available.notify_waiters();
        log::debug!(
            "Pool '{}' shut down, {} queued task(s) discarded",
            self.name,
            discarded
        );
        discarded
    }

    /// Number of live workers at this instant
    pub fn pool_size(&self) -> usize {
        self.state().current_workers
    }

    /// Number of workers currently running a task
    pub fn active_count(&self) -> usize {
        let state = self.state();
        state.current_workers.saturating_sub(state.idle_workers)
    }

    pub fn idle_count(&self) -> usize {
        self.state().idle_workers
    }

    pub fn maximum_pool_size(&self) -> usize {
        self.state().max_workers
    }

    pub fn queued_tasks(&self) -> usize {
        self.state().tasks.len()
    }

    pub fn completed_tasks(&self) -> u64 {
        self.state().completed_tasks
    }

    pub fn is_shutdown(&self) -> bool {
        self.state().shutdown
    }

    async fn run_worker(self: Arc<Self>) {
        let mut guard = WorkerGuard {
            pool: Arc::clone(&self),
            idle: false,
            retired: false,
        };
        let mut timed_out = false;
        log::debug!("Pool '{}' worker started", self.name);

        loop {
            let notified = self.work_available.notified();
            tokio::pin!(notified);

            let step = {
                let mut state = self.state();
                if guard.idle {
                    state.idle_workers = state.idle_workers.saturating_sub(1);
                    guard.idle = false;
                }

                let keep_alive = self.config.min_workers.min(state.max_workers);
                if state.shutdown || state.current_workers > state.max_workers {
                    state.current_workers -= 1;
                    guard.retired = true;
                    WorkerStep::Retire
                } else if let Some(task) = state.tasks.pop_front() {
                    WorkerStep::Run(task)
                } else if timed_out && state.current_workers > keep_alive {
                    state.current_workers -= 1;
                    guard.retired = true;
                    WorkerStep::Retire
                } else {
                    notified.as_mut().enable();
                    state.idle_workers += 1;
                    guard.idle = true;
                    WorkerStep::Wait
                }
            };

            match step {
                WorkerStep::Run(task) => {
                    timed_out = false;
                    self.space_available.notify_one();
                    if AssertUnwindSafe(task).catch_unwind().await.is_err() {
                        log::error!("Pool '{}' task panicked; worker continues", self.name);
                    }
                    self.state().completed_tasks += 1;
                }
                WorkerStep::Wait => {
                    timed_out = tokio::time::timeout(self.config.idle_timeout(), notified)
                        .await
                        .is_err();
                }
                WorkerStep::Retire => {
                    log::debug!("Pool '{}' worker retired", self.name);
                    return;
                }
            }
        }
    }
}

/// Keeps worker accounting correct if a worker future is dropped mid-flight
/// (for example when its runtime shuts down).
struct WorkerGuard {
    pool: Arc<WorkerPool>,
    idle: bool,
    retired: bool,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        if self.retired {
            return;
        }
        let mut state = self.pool.state();
        state.current_workers = state.current_workers.saturating_sub(1);
        if self.idle {
            state.idle_workers = state.idle_workers.saturating_sub(1);
        }
        log::debug!("Pool '{}' worker dropped before retiring", self.pool.name);
    }
}
