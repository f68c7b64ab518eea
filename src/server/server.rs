//! Remote cache server facade
//!
//! The single entry point a transport calls into. Every operation is
//! reported to the cache event logger. Mutations are applied to the region
//! store first and fanned out to listeners only when the store succeeds;
//! reads never fan out.

use crate::core::sync::{read_recover, write_recover};
use crate::events::api::{CacheElement, CacheEvent, EventQueueFactory, EventQueueStats};
use crate::listeners::api::{
    CacheListener, ListenerCounts, ListenerId, ListenerRegistry, ListenerSnapshot, RegionScope,
    RegistryError, RemoteType,
};
use crate::pool::api::{get_pool_manager, WorkerPoolManager};
use crate::server::dispatch::{DispatchReport, Dispatcher};
use crate::server::error::{ServerError, ServerResult};
use crate::server::event_logger::{event_names, CacheEventLogger, LogEventLogger};
use crate::server::settings::ServerSettings;
use crate::server::store::{ElementMap, MemoryRegionStore, RegionStore};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

const EVENT_SOURCE: &str = "RemoteCacheServer";

/// Listener counts for one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionStatistics {
    pub region_name: String,
    pub listeners: ListenerCounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatistics {
    pub regions: Vec<RegionStatistics>,
    pub all_regions: ListenerCounts,
    pub queues: Vec<EventQueueStats>,
    pub local_cluster_consistency: bool,
    pub shut_down: bool,
}

impl ServerStatistics {
    pub fn listener_count(&self) -> usize {
        self.queues.len()
    }

    pub fn pending_events(&self) -> usize {
        self.queues.iter().map(|queue| queue.pending).sum()
    }
}

pub struct RemoteCacheServerBuilder {
    settings: ServerSettings,
    store: Option<Arc<dyn RegionStore>>,
    event_logger: Option<Arc<dyn CacheEventLogger>>,
    pool_manager: Option<Arc<WorkerPoolManager>>,
}

impl RemoteCacheServerBuilder {
    pub fn store(mut self, store: Arc<dyn RegionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn event_logger(mut self, event_logger: Arc<dyn CacheEventLogger>) -> Self {
        self.event_logger = Some(event_logger);
        self
    }

    /// Use a private pool manager instead of the process-wide one
    pub fn pool_manager(mut self, pool_manager: Arc<WorkerPoolManager>) -> Self {
        self.pool_manager = Some(pool_manager);
        self
    }

    pub fn build(self) -> ServerResult<RemoteCacheServer> {
        self.settings.validate()?;

        let pool_manager = self.pool_manager.unwrap_or_else(get_pool_manager);
        let queues = EventQueueFactory::new(
            &self.settings.event_queue,
            &pool_manager,
            &self.settings.thread_pool,
        )?;
        let registry = Arc::new(ListenerRegistry::new(queues));
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            self.settings.local_cluster_consistency,
        );

        log::info!(
            "Remote cache server ready (event queue {:?} on pool '{}', local cluster consistency {})",
            self.settings.event_queue.kind,
            self.settings.event_queue.pool_name,
            self.settings.local_cluster_consistency
        );

        Ok(RemoteCacheServer {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryRegionStore::new())),
            event_logger: RwLock::new(
                self.event_logger
                    .unwrap_or_else(|| Arc::new(LogEventLogger)),
            ),
            settings: self.settings,
            registry,
            dispatcher,
            pool_manager,
            shut_down: AtomicBool::new(false),
        })
    }
}

pub struct RemoteCacheServer {
    settings: ServerSettings,
    store: Arc<dyn RegionStore>,
    registry: Arc<ListenerRegistry>,
    dispatcher: Dispatcher,
    event_logger: RwLock<Arc<dyn CacheEventLogger>>,
    pool_manager: Arc<WorkerPoolManager>,
    shut_down: AtomicBool,
}

impl std::fmt::Debug for RemoteCacheServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCacheServer")
            .field("registry", &self.registry)
            .field(
                "local_cluster_consistency",
                &self.dispatcher.local_cluster_consistency(),
            )
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

impl RemoteCacheServer {
    pub fn builder(settings: ServerSettings) -> RemoteCacheServerBuilder {
        RemoteCacheServerBuilder {
            settings,
            store: None,
            event_logger: None,
            pool_manager: None,
        }
    }

    /// A server with default settings, an in-memory store and the
    /// process-wide pool manager
    pub fn new(settings: ServerSettings) -> ServerResult<Self> {
        Self::builder(settings).build()
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    pub fn pool_manager(&self) -> &Arc<WorkerPoolManager> {
        &self.pool_manager
    }

    pub fn set_cache_event_logger(&self, event_logger: Arc<dyn CacheEventLogger>) {
        *write_recover(&self.event_logger) = event_logger;
    }

    fn event_logger(&self) -> Arc<dyn CacheEventLogger> {
        Arc::clone(&read_recover(&self.event_logger))
    }

    async fn logged<T, F>(
        &self,
        event_name: &str,
        region_name: &str,
        key: Option<&str>,
        origin: ListenerId,
        operation: F,
    ) -> ServerResult<T>
    where
        F: Future<Output = ServerResult<T>>,
    {
        let logger = self.event_logger();
        let details = format!("requester={}", origin);
        let event = logger.create_event(EVENT_SOURCE, region_name, event_name, &details, key);
        logger.log_start(&event);

        match operation.await {
            Ok(value) => {
                logger.log_end(&event);
                Ok(value)
            }
            Err(error) => {
                logger.log_error(&event, &error.to_string());
                Err(error)
            }
        }
    }

    // Listener registration

    /// Register a listener for one region, or for every region with
    /// `RegionScope::All`
    pub fn add_listener(
        &self,
        scope: impl Into<RegionScope>,
        remote_type: RemoteType,
        listener: Arc<dyn CacheListener>,
        extra_info: Option<String>,
    ) -> ServerResult<ListenerId> {
        if self.is_shut_down() {
            return Err(ServerError::ShutDown);
        }
        let scope = scope.into();
        let listener_id = self
            .registry
            .register(scope.clone(), remote_type, listener, extra_info)
            .map_err(|error| match error {
                RegistryError::ShutDown => ServerError::ShutDown,
                other => ServerError::Registry(other),
            })?;

        self.event_logger().log_application_event(
            EVENT_SOURCE,
            event_names::ADD_LISTENER,
            &format!("{} listener {} for region {}", remote_type, listener_id, scope),
        );
        Ok(listener_id)
    }

    /// Remove a listener from one region; unknown ids are ignored
    pub fn remove_listener(
        &self,
        scope: impl Into<RegionScope>,
        listener_id: ListenerId,
    ) -> ServerResult<bool> {
        let scope = scope.into();
        let removed = self.registry.unregister(&scope, listener_id)?;
        if removed {
            self.event_logger().log_application_event(
                EVENT_SOURCE,
                event_names::REMOVE_LISTENER,
                &format!("listener {} from region {}", listener_id, scope),
            );
        }
        Ok(removed)
    }

    /// Remove a listener from every region it is registered for
    pub fn remove_listener_everywhere(&self, listener_id: ListenerId) -> ServerResult<usize> {
        let removed = self.registry.unregister_everywhere(listener_id)?;
        if removed > 0 {
            self.event_logger().log_application_event(
                EVENT_SOURCE,
                event_names::REMOVE_LISTENER,
                &format!("listener {} from {} registration(s)", listener_id, removed),
            );
        }
        Ok(removed)
    }

    pub fn get_extra_info(&self, listener_id: ListenerId) -> Option<String> {
        self.registry.extra_info(listener_id)
    }

    // Mutations

    /// Store `element` and fan it out, excluding `origin`
    pub async fn update(
        &self,
        element: CacheElement,
        origin: ListenerId,
    ) -> ServerResult<DispatchReport> {
        let element = Arc::new(element);
        self.logged(
            event_names::UPDATE,
            &element.region_name,
            Some(element.key.as_str()),
            origin,
            async {
                self.store.put(Arc::clone(&element)).await?;
                Ok::<_, ServerError>(self
                    .dispatcher
                    .dispatch(origin, CacheEvent::Put(Arc::clone(&element)))
                    .await)
            },
        )
        .await
    }

    pub async fn put(
        &self,
        region_name: &str,
        key: &str,
        value: impl Into<Vec<u8>>,
    ) -> ServerResult<DispatchReport> {
        self.put_from(region_name, key, value, ListenerId::NONE).await
    }

    pub async fn put_from(
        &self,
        region_name: &str,
        key: &str,
        value: impl Into<Vec<u8>>,
        origin: ListenerId,
    ) -> ServerResult<DispatchReport> {
        self.update(CacheElement::new(region_name, key, value), origin)
            .await
    }

    pub async fn remove(&self, region_name: &str, key: &str) -> ServerResult<DispatchReport> {
        self.remove_from(region_name, key, ListenerId::NONE).await
    }

    pub async fn remove_from(
        &self,
        region_name: &str,
        key: &str,
        origin: ListenerId,
    ) -> ServerResult<DispatchReport> {
        self.logged(event_names::REMOVE, region_name, Some(key), origin, async {
            let removed = self.store.remove(region_name, key).await?;
            log::trace!("Store remove {}:{} found={}", region_name, key, removed);
            Ok::<_, ServerError>(self
                .dispatcher
                .dispatch(origin, CacheEvent::remove(region_name, key))
                .await)
        })
        .await
    }

    pub async fn remove_all(&self, region_name: &str) -> ServerResult<DispatchReport> {
        self.remove_all_from(region_name, ListenerId::NONE).await
    }

    pub async fn remove_all_from(
        &self,
        region_name: &str,
        origin: ListenerId,
    ) -> ServerResult<DispatchReport> {
        self.logged(event_names::REMOVE_ALL, region_name, None, origin, async {
            self.store.remove_all(region_name).await?;
            Ok::<_, ServerError>(self
                .dispatcher
                .dispatch(origin, CacheEvent::remove_all(region_name))
                .await)
        })
        .await
    }

    pub async fn dispose(&self, region_name: &str) -> ServerResult<DispatchReport> {
        self.dispose_from(region_name, ListenerId::NONE).await
    }

    /// Drop the region's data; its listeners stay registered
    pub async fn dispose_from(
        &self,
        region_name: &str,
        origin: ListenerId,
    ) -> ServerResult<DispatchReport> {
        self.logged(event_names::DISPOSE, region_name, None, origin, async {
            self.store.dispose(region_name).await?;
            Ok::<_, ServerError>(self
                .dispatcher
                .dispatch(origin, CacheEvent::dispose(region_name))
                .await)
        })
        .await
    }

    // Reads

    pub async fn get(
        &self,
        region_name: &str,
        key: &str,
    ) -> ServerResult<Option<Arc<CacheElement>>> {
        self.logged(event_names::GET, region_name, Some(key), ListenerId::NONE, async {
            self.store.get(region_name, key).await.map_err(ServerError::from)
        })
        .await
    }

    /// Elements whose key matches the regular expression `pattern`
    pub async fn get_matching(
        &self,
        region_name: &str,
        pattern: &str,
        origin: ListenerId,
    ) -> ServerResult<ElementMap> {
        self.logged(event_names::GET_MATCHING, region_name, Some(pattern), origin, async {
            self.store
                .get_matching(region_name, pattern)
                .await
                .map_err(ServerError::from)
        })
        .await
    }

    pub async fn get_multiple(
        &self,
        region_name: &str,
        keys: &[String],
    ) -> ServerResult<ElementMap> {
        self.logged(
            event_names::GET_MULTIPLE,
            region_name,
            None,
            ListenerId::NONE,
            async {
                self.store
                    .get_multiple(region_name, keys)
                    .await
                    .map_err(ServerError::from)
            },
        )
        .await
    }

    // Configuration and introspection

    pub fn set_local_cluster_consistency(&self, enabled: bool) {
        self.dispatcher.set_local_cluster_consistency(enabled);
    }

    pub fn local_cluster_consistency(&self) -> bool {
        self.dispatcher.local_cluster_consistency()
    }

    pub fn lookup(&self, scope: impl Into<RegionScope>) -> ListenerSnapshot {
        self.registry.lookup(&scope.into())
    }

    pub fn listener_counts(&self, scope: impl Into<RegionScope>) -> ListenerCounts {
        self.registry.listener_counts(&scope.into())
    }

    /// Regions that have ever had a listener
    pub fn region_names(&self) -> Vec<String> {
        self.registry.region_names()
    }

    pub fn statistics(&self) -> ServerStatistics {
        let regions = self
            .registry
            .region_names()
            .into_iter()
            .map(|region_name| RegionStatistics {
                listeners: self
                    .registry
                    .listener_counts(&RegionScope::region(region_name.as_str())),
                region_name,
            })
            .collect();

        ServerStatistics {
            regions,
            all_regions: self.registry.listener_counts(&RegionScope::All),
            queues: self.registry.queue_stats(),
            local_cluster_consistency: self.local_cluster_consistency(),
            shut_down: self.is_shut_down(),
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Drop every registration and refuse new ones
    ///
    /// Later mutations still reach the store but have nobody to notify.
    /// Pools are left running; they belong to the pool manager. Returns the
    /// number of listeners removed.
    pub fn shutdown(&self) -> usize {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return 0;
        }
        let removed = self.registry.close();
        log::info!(
            "Remote cache server shut down ({} listener(s) removed)",
            removed
        );
        removed
    }
}
