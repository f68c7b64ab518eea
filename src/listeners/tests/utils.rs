//! Listener Test Utilities
//!
//! A recording listener with configurable failure modes, shared with the
//! event queue and server tests.

use crate::events::api::{
    CacheElement, CacheEvent, EventQueueFactory, EventQueueSettings, QueueKind,
};
use crate::listeners::id::ListenerId;
use crate::listeners::traits::{CacheListener, ListenerError};
use crate::pool::api::{PoolConfig, WorkerPoolManager};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Records every event it accepts, in delivery order
#[derive(Debug, Default)]
pub(crate) struct RecordingListener {
    events: Mutex<Vec<CacheEvent>>,
    registered_as: Mutex<Option<ListenerId>>,
    attempts: AtomicUsize,
    failures_remaining: AtomicUsize,
    fail_on_key: Option<String>,
    panic_on_key: Option<String>,
    delay: Duration,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every delivery sleeps for `delay` before it is recorded
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    /// The first `failures` delivery attempts return an error
    pub fn failing_first(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures_remaining: AtomicUsize::new(failures),
            ..Self::default()
        })
    }

    /// Every delivery for `key` returns an error
    pub fn failing_on(key: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_on_key: Some(key.to_string()),
            ..Self::default()
        })
    }

    /// Every delivery for `key` panics
    pub fn panicking_on(key: &str) -> Arc<Self> {
        Arc::new(Self {
            panic_on_key: Some(key.to_string()),
            ..Self::default()
        })
    }

    pub fn events(&self) -> Vec<CacheEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Keys of the recorded put and remove events, in delivery order
    pub fn keys(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|event| event.key().map(str::to_string))
            .collect()
    }

    pub fn puts(&self) -> Vec<Arc<CacheElement>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                CacheEvent::Put(element) => Some(element),
                _ => None,
            })
            .collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn registered_as(&self) -> Option<ListenerId> {
        *self.registered_as.lock().unwrap()
    }

    /// Wait until at least `count` events have been recorded
    pub async fn wait_for(&self, count: usize) -> bool {
        eventually(Duration::from_secs(5), || self.count() >= count).await
    }

    async fn record(&self, event: CacheEvent) -> Result<(), ListenerError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if let Some(key) = event.key() {
            if self.panic_on_key.as_deref() == Some(key) {
                panic!("listener refuses key {}", key);
            }
            if self.fail_on_key.as_deref() == Some(key) {
                return Err(format!("listener rejects key {}", key).into());
            }
        }
        let transient = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if transient {
            return Err("transient failure".into());
        }

        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[async_trait]
impl CacheListener for RecordingListener {
    async fn handle_put(&self, element: Arc<CacheElement>) -> Result<(), ListenerError> {
        self.record(CacheEvent::Put(element)).await
    }

    async fn handle_remove(&self, region_name: &str, key: &str) -> Result<(), ListenerError> {
        self.record(CacheEvent::remove(region_name, key)).await
    }

    async fn handle_remove_all(&self, region_name: &str) -> Result<(), ListenerError> {
        self.record(CacheEvent::remove_all(region_name)).await
    }

    async fn handle_dispose(&self, region_name: &str) -> Result<(), ListenerError> {
        self.record(CacheEvent::dispose(region_name)).await
    }

    fn on_registered(&self, listener_id: ListenerId) {
        *self.registered_as.lock().unwrap() = Some(listener_id);
    }
}

/// Poll `condition` every few milliseconds until it holds or `deadline` passes
pub(crate) async fn eventually(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let until = Instant::now() + deadline;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= until {
            return false;
        }
        sleep(Duration::from_millis(5)).await;
    }
}

/// Queue factory on a private pool with a single attempt per event
pub(crate) fn test_factory(kind: QueueKind) -> EventQueueFactory {
    let settings = EventQueueSettings::default()
        .with_kind(kind)
        .with_retry(1, Duration::ZERO);
    EventQueueFactory::new(
        &settings,
        &WorkerPoolManager::new(),
        &PoolConfig::default().with_max_workers(8).with_min_workers(0),
    )
    .unwrap()
}
