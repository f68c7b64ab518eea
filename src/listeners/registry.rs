//! Region listener registry
//!
//! Every region has its own lock over a pair of maps, local and cluster
//! listeners, so registrations on one region never contend with another.
//! Listeners registered for every region live in a separate pair of maps
//! that the dispatcher consults for all mutations.
//!
//! ```text
//!  regions ──▶ "users"  ──▶ RwLock { local: {1 → queue}, cluster: {3 → queue} }
//!              "orders" ──▶ RwLock { local: {2 → queue}, cluster: {} }
//!  all_regions ─────────▶ RwLock { local: {},            cluster: {4 → queue} }
//! ```
//!
//! Region entries are created on first registration and kept when they
//! become empty.

use crate::core::sync::{handle_rwlock_write, read_recover, write_recover};
use crate::events::api::{EventQueue, EventQueueFactory, EventQueueStats};
use crate::listeners::directory::{ListenerDirectory, ListenerRecord};
use crate::listeners::error::{RegistryError, RegistryResult};
use crate::listeners::id::{ListenerId, ListenerIdAllocator};
use crate::listeners::traits::CacheListener;
use crate::listeners::types::{ListenerCounts, RegionScope, RemoteType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct ListenerMaps {
    local: HashMap<ListenerId, Arc<EventQueue>>,
    cluster: HashMap<ListenerId, Arc<EventQueue>>,
}

impl ListenerMaps {
    fn map_mut(&mut self, remote_type: RemoteType) -> &mut HashMap<ListenerId, Arc<EventQueue>> {
        match remote_type {
            RemoteType::Local => &mut self.local,
            RemoteType::Cluster => &mut self.cluster,
        }
    }
}

/// Read-only view of one region's listeners, ordered by id
#[derive(Debug, Clone, Default)]
pub struct ListenerSnapshot {
    pub local: Vec<(ListenerId, Arc<EventQueue>)>,
    pub cluster: Vec<(ListenerId, Arc<EventQueue>)>,
}

impl ListenerSnapshot {
    pub fn local_ids(&self) -> Vec<ListenerId> {
        self.local.iter().map(|(id, _)| *id).collect()
    }

    pub fn cluster_ids(&self) -> Vec<ListenerId> {
        self.cluster.iter().map(|(id, _)| *id).collect()
    }

    pub fn counts(&self) -> ListenerCounts {
        ListenerCounts {
            local: self.local.len(),
            cluster: self.cluster.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.cluster.is_empty()
    }
}

/// Listeners of one region, or of the all-regions scope
#[derive(Debug)]
pub struct RegionListeners {
    scope: RegionScope,
    maps: RwLock<ListenerMaps>,
}

impl RegionListeners {
    fn new(scope: RegionScope) -> Self {
        Self {
            scope,
            maps: RwLock::new(ListenerMaps::default()),
        }
    }

    pub fn scope(&self) -> &RegionScope {
        &self.scope
    }

    pub fn snapshot(&self) -> ListenerSnapshot {
        let maps = read_recover(&self.maps);
        let mut snapshot = ListenerSnapshot {
            local: maps
                .local
                .iter()
                .map(|(id, queue)| (*id, Arc::clone(queue)))
                .collect(),
            cluster: maps
                .cluster
                .iter()
                .map(|(id, queue)| (*id, Arc::clone(queue)))
                .collect(),
        };
        snapshot.local.sort_by_key(|(id, _)| *id);
        snapshot.cluster.sort_by_key(|(id, _)| *id);
        snapshot
    }

    pub fn counts(&self) -> ListenerCounts {
        let maps = read_recover(&self.maps);
        ListenerCounts {
            local: maps.local.len(),
            cluster: maps.cluster.len(),
        }
    }

    fn queues(&self) -> Vec<Arc<EventQueue>> {
        let maps = read_recover(&self.maps);
        maps.local.values().chain(maps.cluster.values()).cloned().collect()
    }
}

/// Bookkeeping for every listener the server knows about
pub struct ListenerRegistry {
    ids: ListenerIdAllocator,
    directory: ListenerDirectory,
    regions: RwLock<HashMap<String, Arc<RegionListeners>>>,
    all_regions: Arc<RegionListeners>,
    queues: EventQueueFactory,
    closed: AtomicBool,
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("regions", &self.region_names())
            .field("listeners", &self.directory.len())
            .field("next_id", &self.ids.peek_next())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl ListenerRegistry {
    pub fn new(queues: EventQueueFactory) -> Self {
        Self {
            ids: ListenerIdAllocator::new(),
            directory: ListenerDirectory::new(),
            regions: RwLock::new(HashMap::new()),
            all_regions: Arc::new(RegionListeners::new(RegionScope::All)),
            queues,
            closed: AtomicBool::new(false),
        }
    }

    pub fn directory(&self) -> &ListenerDirectory {
        &self.directory
    }

    pub fn queue_factory(&self) -> &EventQueueFactory {
        &self.queues
    }

    /// Register a listener and return its newly allocated id
    ///
    /// A blank region name is rejected before an id is allocated, so ids
    /// stay consecutive across successful registrations.
    pub fn register(
        &self,
        scope: RegionScope,
        remote_type: RemoteType,
        listener: Arc<dyn CacheListener>,
        extra_info: Option<String>,
    ) -> RegistryResult<ListenerId> {
        if let RegionScope::Region(name) = &scope {
            if name.trim().is_empty() {
                return Err(RegistryError::InvalidRegistration {
                    message: "region name must not be empty".to_string(),
                });
            }
        }
        if self.is_closed() {
            return Err(RegistryError::ShutDown);
        }

        let region = self.region_for_registration(&scope)?;
        let listener_id = {
            let mut maps = handle_rwlock_write(region.maps.write(), |message| {
                RegistryError::Synchronisation { message }
            })?;
            if self.is_closed() {
                return Err(RegistryError::ShutDown);
            }

            let listener_id = self.ids.allocate();
            let queue = self.queues.create(listener_id, Arc::clone(&listener));
            maps.map_mut(remote_type).insert(listener_id, queue);
            self.directory.insert(ListenerRecord {
                listener_id,
                remote_type,
                scope: scope.clone(),
                extra_info: extra_info.clone(),
            });
            listener_id
        };

        log::info!(
            "Added {} listener {} for region '{}' (requester: {})",
            remote_type,
            listener_id,
            scope,
            extra_info.as_deref().unwrap_or("unknown")
        );
        listener.on_registered(listener_id);
        Ok(listener_id)
    }

    fn region_for_registration(&self, scope: &RegionScope) -> RegistryResult<Arc<RegionListeners>> {
        let name = match scope {
            RegionScope::All => return Ok(Arc::clone(&self.all_regions)),
            RegionScope::Region(name) => name,
        };

        if let Some(region) = read_recover(&self.regions).get(name) {
            return Ok(Arc::clone(region));
        }

        let mut regions = handle_rwlock_write(self.regions.write(), |message| {
            RegistryError::Synchronisation { message }
        })?;
        let region = regions.entry(name.clone()).or_insert_with(|| {
            log::debug!("Created listener registry for region '{}'", name);
            Arc::new(RegionListeners::new(scope.clone()))
        });
        Ok(Arc::clone(region))
    }

    /// Remove a listener from one region, or from the all-regions scope
    ///
    /// Discards the listener's undelivered events and its directory entry.
    /// Returns `Ok(false)` when the listener is not registered there.
    pub fn unregister(&self, scope: &RegionScope, listener_id: ListenerId) -> RegistryResult<bool> {
        let region = match scope {
            RegionScope::All => Some(Arc::clone(&self.all_regions)),
            RegionScope::Region(name) => self.region(name),
        };
        let Some(region) = region else {
            log::debug!(
                "Listener {} not removed: region '{}' has no listeners",
                listener_id,
                scope
            );
            return Ok(false);
        };

        let removed = {
            let mut maps = handle_rwlock_write(region.maps.write(), |message| {
                RegistryError::Synchronisation { message }
            })?;
            let removed = match maps.local.remove(&listener_id) {
                Some(queue) => Some(queue),
                None => maps.cluster.remove(&listener_id),
            };
            if removed.is_some() {
                self.directory.remove(listener_id);
            }
            removed
        };

        match removed {
            Some(queue) => {
                let discarded = queue.destroy();
                log::info!(
                    "Removed listener {} from region '{}' ({} undelivered event(s) discarded)",
                    listener_id,
                    scope,
                    discarded
                );
                Ok(true)
            }
            None => {
                log::debug!(
                    "Listener {} is not registered for region '{}'",
                    listener_id,
                    scope
                );
                Ok(false)
            }
        }
    }

    /// Remove a listener from every region and the all-regions scope
    ///
    /// Returns the number of registrations removed.
    pub fn unregister_everywhere(&self, listener_id: ListenerId) -> RegistryResult<usize> {
        let mut scopes: Vec<RegionScope> = self
            .region_names()
            .into_iter()
            .map(RegionScope::Region)
            .collect();
        scopes.push(RegionScope::All);

        let mut removed = 0;
        for scope in &scopes {
            if self.unregister(scope, listener_id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn region(&self, name: &str) -> Option<Arc<RegionListeners>> {
        read_recover(&self.regions).get(name).cloned()
    }

    pub fn all_regions(&self) -> &Arc<RegionListeners> {
        &self.all_regions
    }

    /// Snapshot of a region's listeners; empty for an unknown region
    pub fn lookup(&self, scope: &RegionScope) -> ListenerSnapshot {
        match scope {
            RegionScope::All => self.all_regions.snapshot(),
            RegionScope::Region(name) => self
                .region(name)
                .map(|region| region.snapshot())
                .unwrap_or_default(),
        }
    }

    pub fn listener_counts(&self, scope: &RegionScope) -> ListenerCounts {
        match scope {
            RegionScope::All => self.all_regions.counts(),
            RegionScope::Region(name) => self
                .region(name)
                .map(|region| region.counts())
                .unwrap_or_default(),
        }
    }

    pub fn region_names(&self) -> Vec<String> {
        let mut names: Vec<String> = read_recover(&self.regions).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn remote_type(&self, listener_id: ListenerId) -> Option<RemoteType> {
        self.directory.remote_type(listener_id)
    }

    pub fn extra_info(&self, listener_id: ListenerId) -> Option<String> {
        self.directory.extra_info(listener_id)
    }

    /// Queue statistics for every registered listener, ordered by id
    pub fn queue_stats(&self) -> Vec<EventQueueStats> {
        let mut regions: Vec<Arc<RegionListeners>> =
            read_recover(&self.regions).values().cloned().collect();
        regions.push(Arc::clone(&self.all_regions));

        let mut stats: Vec<EventQueueStats> = regions
            .iter()
            .flat_map(|region| region.queues())
            .map(|queue| queue.stats())
            .collect();
        stats.sort_by_key(|stats| stats.listener_id);
        stats
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Refuse new registrations and drop every existing one
    ///
    /// Returns the number of listeners removed.
    pub fn close(&self) -> usize {
        self.closed.store(true, Ordering::SeqCst);

        let mut regions: Vec<Arc<RegionListeners>> =
            read_recover(&self.regions).values().cloned().collect();
        regions.push(Arc::clone(&self.all_regions));

        let mut removed = 0;
        for region in regions {
            let maps = std::mem::take(&mut *write_recover(&region.maps));
            for (listener_id, queue) in maps.local.into_iter().chain(maps.cluster) {
                self.directory.remove(listener_id);
                queue.destroy();
                removed += 1;
            }
        }

        log::info!("Listener registry closed ({} listener(s) removed)", removed);
        removed
    }
}
