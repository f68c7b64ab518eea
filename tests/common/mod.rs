//! Common test utilities and helpers
//!
//! A listener that records what it receives and a server wired to a
//! private pool manager, built only from the public API.

#![allow(dead_code)]

use async_trait::async_trait;
use remcache::events::api::{CacheElement, EventQueueSettings, QueueKind};
use remcache::listeners::api::{CacheListener, ListenerError, ListenerId};
use remcache::pool::api::{PoolConfig, PoolSettings, WorkerPoolManager};
use remcache::server::api::{RemoteCacheServer, ServerSettings};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a listener was told, in delivery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Put { key: String, value: String },
    Remove { key: String },
    RemoveAll { region: String },
    Dispose { region: String },
}

#[derive(Debug, Default)]
pub struct Collector {
    received: Mutex<Vec<Received>>,
    id: Mutex<Option<ListenerId>>,
}

impl Collector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.received()
            .into_iter()
            .filter_map(|event| match event {
                Received::Put { key, .. } | Received::Remove { key } => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn id(&self) -> Option<ListenerId> {
        *self.id.lock().unwrap()
    }

    /// Poll until at least `count` events arrived or five seconds pass
    pub async fn wait_for(&self, count: usize) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while tokio::time::Instant::now() < deadline {
            if self.received.lock().unwrap().len() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    fn record(&self, event: Received) {
        self.received.lock().unwrap().push(event);
    }
}

#[async_trait]
impl CacheListener for Collector {
    async fn handle_put(&self, element: Arc<CacheElement>) -> Result<(), ListenerError> {
        self.record(Received::Put {
            key: element.key.clone(),
            value: String::from_utf8_lossy(&element.value).into_owned(),
        });
        Ok(())
    }

    async fn handle_remove(&self, _region_name: &str, key: &str) -> Result<(), ListenerError> {
        self.record(Received::Remove {
            key: key.to_string(),
        });
        Ok(())
    }

    async fn handle_remove_all(&self, region_name: &str) -> Result<(), ListenerError> {
        self.record(Received::RemoveAll {
            region: region_name.to_string(),
        });
        Ok(())
    }

    async fn handle_dispose(&self, region_name: &str) -> Result<(), ListenerError> {
        self.record(Received::Dispose {
            region: region_name.to_string(),
        });
        Ok(())
    }

    fn on_registered(&self, listener_id: ListenerId) {
        *self.id.lock().unwrap() = Some(listener_id);
    }
}

/// Settings with a single delivery attempt and a small default pool
pub fn settings(kind: QueueKind) -> ServerSettings {
    ServerSettings::default()
        .with_event_queue(
            EventQueueSettings::default()
                .with_kind(kind)
                .with_retry(1, Duration::ZERO),
        )
        .with_thread_pool(PoolSettings {
            default: PoolConfig::default().with_max_workers(4).with_min_workers(0),
            ..PoolSettings::default()
        })
}

pub fn server(settings: ServerSettings) -> RemoteCacheServer {
    RemoteCacheServer::builder(settings)
        .pool_manager(Arc::new(WorkerPoolManager::new()))
        .build()
        .unwrap()
}

/// Give stray deliveries time to arrive before asserting absence
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}
