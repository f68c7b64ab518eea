//! Server Test Utilities

use crate::events::api::{CacheElement, EventQueueSettings, QueueKind};
use crate::pool::api::{PoolConfig, PoolSettings, WorkerPoolManager};
use crate::server::api::{
    CacheEventDescriptor, CacheEventLogger, ElementMap, MemoryRegionStore, RegionStore,
    RemoteCacheServer, ServerSettings, StoreError, StoreResult,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Counts start, end and error hooks and keeps application events
#[derive(Debug, Default)]
pub struct RecordingEventLogger {
    pub starts: AtomicUsize,
    pub ends: AtomicUsize,
    pub errors: AtomicUsize,
    pub events: Mutex<Vec<String>>,
    pub application_events: Mutex<Vec<String>>,
}

impl RecordingEventLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn ends(&self) -> usize {
        self.ends.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn application_events(&self) -> Vec<String> {
        self.application_events.lock().unwrap().clone()
    }
}

impl CacheEventLogger for RecordingEventLogger {
    fn log_start(&self, event: &CacheEventDescriptor) {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(event.event_name.clone());
    }

    fn log_end(&self, _event: &CacheEventDescriptor) {
        self.ends.fetch_add(1, Ordering::SeqCst);
    }

    fn log_error(&self, _event: &CacheEventDescriptor, _error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    fn log_application_event(&self, _source: &str, event_name: &str, _details: &str) {
        self.application_events
            .lock()
            .unwrap()
            .push(event_name.to_string());
    }
}

/// Memory store whose mutations can be switched to fail
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryRegionStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, region_name: &str) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                region: region_name.to_string(),
                message: "store offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RegionStore for FlakyStore {
    async fn put(&self, element: Arc<CacheElement>) -> StoreResult<()> {
        self.check(&element.region_name)?;
        self.inner.put(element).await
    }

    async fn get(&self, region_name: &str, key: &str) -> StoreResult<Option<Arc<CacheElement>>> {
        self.inner.get(region_name, key).await
    }

    async fn get_matching(&self, region_name: &str, pattern: &str) -> StoreResult<ElementMap> {
        self.inner.get_matching(region_name, pattern).await
    }

    async fn get_multiple(&self, region_name: &str, keys: &[String]) -> StoreResult<ElementMap> {
        self.inner.get_multiple(region_name, keys).await
    }

    async fn remove(&self, region_name: &str, key: &str) -> StoreResult<bool> {
        self.check(region_name)?;
        self.inner.remove(region_name, key).await
    }

    async fn remove_all(&self, region_name: &str) -> StoreResult<()> {
        self.check(region_name)?;
        self.inner.remove_all(region_name).await
    }

    async fn dispose(&self, region_name: &str) -> StoreResult<()> {
        self.check(region_name)?;
        self.inner.dispose(region_name).await
    }
}

/// Settings with one delivery attempt per event and a small private pool
pub fn test_settings() -> ServerSettings {
    ServerSettings::default()
        .with_event_queue(
            EventQueueSettings::default()
                .with_kind(QueueKind::Pooled)
                .with_retry(1, Duration::ZERO),
        )
        .with_thread_pool(PoolSettings {
            default: PoolConfig::default().with_max_workers(8).with_min_workers(0),
            ..PoolSettings::default()
        })
}

pub fn test_server() -> RemoteCacheServer {
    server_with(test_settings())
}

pub fn server_with(settings: ServerSettings) -> RemoteCacheServer {
    RemoteCacheServer::builder(settings)
        .pool_manager(Arc::new(WorkerPoolManager::new()))
        .build()
        .unwrap()
}
