//! Per-listener event queue
//!
//! Each registered listener owns one queue. Events are appended by the
//! dispatcher and drained by a single drain task at a time, which is what
//! keeps delivery to one listener in enqueue order. The drain task runs
//! either on a worker pool or on its own tokio task, depending on the
//! queue kind.

use crate::core::retry::{retry_async, RetryPolicy};
use crate::core::sync::lock_recover;
use crate::events::config::QueueKind;
use crate::events::error::{DeliveryError, EventQueueError, EventQueueResult};
use crate::events::event::CacheEvent;
use crate::events::statistics::{EventQueueStatistics, EventQueueStats};
use crate::listeners::api::{CacheListener, ListenerId};
use crate::pool::api::WorkerPool;
use futures::FutureExt;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;

/// Pending events above which the backlog is reported once
pub(crate) const HIGH_WATER_MARK: usize = 10_000;

pub(crate) enum QueueExecutor {
    Dedicated,
    Pooled(Arc<WorkerPool>),
}

struct QueueState {
    pending: VecDeque<CacheEvent>,
    draining: bool,
    destroyed: bool,
}

pub struct EventQueue {
    listener_id: ListenerId,
    listener: Arc<dyn CacheListener>,
    executor: QueueExecutor,
    retry: RetryPolicy,
    state: Mutex<QueueState>,
    statistics: EventQueueStatistics,
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("EventQueue")
            .field("listener_id", &self.listener_id)
            .field("kind", &self.kind())
            .field("pending", &state.pending.len())
            .field("draining", &state.draining)
            .field("destroyed", &state.destroyed)
            .finish()
    }
}

impl EventQueue {
    pub(crate) fn new(
        listener_id: ListenerId,
        listener: Arc<dyn CacheListener>,
        executor: QueueExecutor,
        retry: RetryPolicy,
    ) -> Arc<Self> {
        Arc::new(Self {
            listener_id,
            listener,
            executor,
            retry,
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                draining: false,
                destroyed: false,
            }),
            statistics: EventQueueStatistics::new(),
        })
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener_id
    }

    pub fn listener(&self) -> &Arc<dyn CacheListener> {
        &self.listener
    }

    pub fn kind(&self) -> QueueKind {
        match self.executor {
            QueueExecutor::Dedicated => QueueKind::Single,
            QueueExecutor::Pooled(_) => QueueKind::Pooled,
        }
    }

    pub fn statistics(&self) -> &EventQueueStatistics {
        &self.statistics
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        lock_recover(&self.state)
    }

    /// Append an event and make sure a drain task is running
    ///
    /// Returns `Ok(false)` when the queue has been destroyed; the event is
    /// dropped in that case. If no drain task could be scheduled the event
    /// is taken back out of the queue before the error is returned.
    pub async fn enqueue(self: &Arc<Self>, event: CacheEvent) -> EventQueueResult<bool> {
        let start_drain = {
            let mut state = self.state();
            if state.destroyed {
                log::trace!(
                    "Dropping {} for destroyed queue of listener {}",
                    event,
                    self.listener_id
                );
                return Ok(false);
            }

            state.pending.push_back(event.clone());
            let pending = state.pending.len();
            self.statistics.set_queue_size(pending);
            if pending == HIGH_WATER_MARK + 1 {
                self.statistics.record_backlog_warning();
                log::warn!(
                    "Event queue for listener {} has more than {} undelivered events",
                    self.listener_id,
                    HIGH_WATER_MARK
                );
            }

            !std::mem::replace(&mut state.draining, true)
        };

        if start_drain {
            // a task that could not be scheduled is dropped and releases the drain role
            if let Err(error) = self.schedule_drain().await {
                self.withdraw(&event);
                return Err(error);
            }
        }
        Ok(true)
    }

    /// Remove the most recent pending copy of `event`
    fn withdraw(&self, event: &CacheEvent) {
        let mut state = self.state();
        if let Some(position) = state.pending.iter().rposition(|pending| pending == event) {
            state.pending.remove(position);
            self.statistics.set_queue_size(state.pending.len());
            log::debug!(
                "Withdrew {} from queue of listener {}: no drain task could be scheduled",
                event,
                self.listener_id
            );
        }
    }

    async fn schedule_drain(self: &Arc<Self>) -> EventQueueResult<()> {
        let task = DrainTask {
            queue: Arc::clone(self),
            finished: false,
        };
        match &self.executor {
            QueueExecutor::Pooled(pool) => pool
                .execute(task.run())
                .await
                .map_err(|source| EventQueueError::Scheduling {
                    listener_id: self.listener_id,
                    source,
                }),
            QueueExecutor::Dedicated => {
                let handle = Handle::try_current().map_err(|_| EventQueueError::NoRuntime {
                    listener_id: self.listener_id,
                })?;
                handle.spawn(task.run());
                Ok(())
            }
        }
    }

    async fn deliver(&self, event: CacheEvent) {
        let description = event.to_string();
        let listener_id = self.listener_id;
        let operation = format!("deliver {} to listener {}", description, listener_id);

        let outcome = retry_async(&operation, &self.retry, || {
            deliver_once(Arc::clone(&self.listener), event.clone())
        })
        .await;

        match outcome {
            Ok(()) => {
                self.statistics.record_delivered();
                log::trace!("Delivered {} to listener {}", description, listener_id);
            }
            Err(error) => {
                self.statistics.record_failure();
                log::error!(
                    "Dropping {} for listener {} after {} attempt(s): {}",
                    description,
                    listener_id,
                    self.retry.max_attempts.max(1),
                    error
                );
            }
        }
    }

    /// Discard pending events and refuse new ones
    ///
    /// A delivery already in progress runs to completion. Returns the number
    /// of events discarded; a second call returns zero.
    pub fn destroy(&self) -> usize {
        let mut state = self.state();
        if state.destroyed {
            return 0;
        }
        state.destroyed = true;
        let discarded = state.pending.len();
        state.pending.clear();
        self.statistics.set_queue_size(0);

        if discarded > 0 {
            log::debug!(
                "Discarded {} undelivered event(s) for listener {}",
                discarded,
                self.listener_id
            );
        }
        discarded
    }

    pub fn is_alive(&self) -> bool {
        !self.state().destroyed
    }

    /// True while a drain task owns the queue
    pub fn is_working(&self) -> bool {
        self.state().draining
    }

    pub fn pending(&self) -> usize {
        self.state().pending.len()
    }

    pub fn stats(&self) -> EventQueueStats {
        let state = self.state();
        EventQueueStats {
            listener_id: self.listener_id,
            alive: !state.destroyed,
            working: state.draining,
            pending: state.pending.len(),
            delivered: self.statistics.delivered(),
            failed: self.statistics.failed(),
        }
    }
}

/// Owns the drain role of one queue until it runs dry
///
/// A task that is dropped before it finishes (discarded by a full pool or
/// a pool shutdown) hands the role back so the next enqueue can schedule a
/// new one.
struct DrainTask {
    queue: Arc<EventQueue>,
    finished: bool,
}

impl DrainTask {
    async fn run(mut self) {
        loop {
            let event = {
                let mut state = self.queue.state();
                let next = if state.destroyed {
                    None
                } else {
                    state.pending.pop_front()
                };
                match next {
                    Some(event) => {
                        self.queue.statistics.set_queue_size(state.pending.len());
                        event
                    }
                    None => {
                        state.draining = false;
                        self.finished = true;
                        return;
                    }
                }
            };
            self.queue.deliver(event).await;
        }
    }
}

impl Drop for DrainTask {
    fn drop(&mut self) {
        if !self.finished {
            self.queue.state().draining = false;
            log::warn!(
                "Drain task for listener {} was dropped; {} event(s) wait for the next enqueue",
                self.queue.listener_id,
                self.queue.pending()
            );
        }
    }
}

async fn deliver_once(
    listener: Arc<dyn CacheListener>,
    event: CacheEvent,
) -> Result<(), DeliveryError> {
    let attempt = async move {
        match event {
            CacheEvent::Put(element) => listener.handle_put(element).await,
            CacheEvent::Remove { region_name, key } => {
                listener.handle_remove(&region_name, &key).await
            }
            CacheEvent::RemoveAll { region_name } => listener.handle_remove_all(&region_name).await,
            CacheEvent::Dispose { region_name } => listener.handle_dispose(&region_name).await,
        }
    };

    match AssertUnwindSafe(attempt).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(DeliveryError::Listener(error.to_string())),
        Err(panic) => Err(DeliveryError::Panicked(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
