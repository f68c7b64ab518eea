//! Mutation fan-out
//!
//! For a mutation on region R originated by listener O the targets are:
//!
//! ```text
//!  R.cluster     minus O   always
//!  R.local       minus O   unless O is a cluster listener and local
//!                          cluster consistency is off
//!  ALL.local     minus O   always
//!  ALL.cluster   minus O   always
//! ```
//!
//! An origin of `ListenerId::NONE`, or an id that is not registered, is
//! anonymous: nobody is excluded and local listeners are always included.
//! Each target gets its own copy of the event on its own queue; the caller
//! only waits for the enqueue, never for delivery.

use crate::events::api::{CacheEvent, EventQueue};
use crate::listeners::api::{ListenerId, ListenerRegistry, RegionScope, RemoteType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners selected to receive the event
    pub targets: usize,
    pub enqueued: usize,
    /// Targets whose queue was destroyed between selection and enqueue
    pub skipped: usize,
    /// Targets whose queue could not schedule delivery
    pub failed: usize,
}

/// Whether a mutation from a listener of `origin_type` reaches local listeners
///
/// `None` is an anonymous origin.
pub fn forward_to_locals(origin_type: Option<RemoteType>, local_cluster_consistency: bool) -> bool {
    match origin_type {
        Some(RemoteType::Cluster) => local_cluster_consistency,
        Some(RemoteType::Local) | None => true,
    }
}

#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<ListenerRegistry>,
    local_cluster_consistency: AtomicBool,
}

impl Dispatcher {
    pub fn new(registry: Arc<ListenerRegistry>, local_cluster_consistency: bool) -> Self {
        Self {
            registry,
            local_cluster_consistency: AtomicBool::new(local_cluster_consistency),
        }
    }

    pub fn local_cluster_consistency(&self) -> bool {
        self.local_cluster_consistency.load(Ordering::SeqCst)
    }

    pub fn set_local_cluster_consistency(&self, enabled: bool) {
        let previous = self
            .local_cluster_consistency
            .swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            log::info!("Local cluster consistency set to {}", enabled);
        }
    }

    /// The queues a mutation on `region_name` from `origin` is delivered to
    pub fn targets(&self, region_name: &str, origin: ListenerId) -> Vec<Arc<EventQueue>> {
        let origin_type = if origin.is_none() {
            None
        } else {
            self.registry.remote_type(origin)
        };
        let include_locals = forward_to_locals(origin_type, self.local_cluster_consistency());

        let region = self.registry.lookup(&RegionScope::region(region_name));
        let everywhere = self.registry.all_regions().snapshot();

        let mut selected = region.cluster;
        if include_locals {
            selected.extend(region.local);
        }
        selected.extend(everywhere.local);
        selected.extend(everywhere.cluster);

        let targets: Vec<Arc<EventQueue>> = selected
            .into_iter()
            .filter(|(listener_id, _)| origin.is_none() || *listener_id != origin)
            .map(|(_, queue)| queue)
            .collect();

        log::trace!(
            "Region '{}' origin {} ({}): {} target(s), locals {}",
            region_name,
            origin,
            origin_type.map_or_else(|| "anonymous".to_string(), |t| t.to_string()),
            targets.len(),
            if include_locals { "included" } else { "excluded" }
        );
        targets
    }

    /// Enqueue `event` for every target listener
    pub async fn dispatch(&self, origin: ListenerId, event: CacheEvent) -> DispatchReport {
        let targets = self.targets(event.region_name(), origin);
        let mut report = DispatchReport {
            targets: targets.len(),
            ..DispatchReport::default()
        };

        for queue in &targets {
            match queue.enqueue(event.clone()).await {
                Ok(true) => report.enqueued += 1,
                Ok(false) => report.skipped += 1,
                Err(error) => {
                    report.failed += 1;
                    log::error!("Could not enqueue {}: {}", event, error);
                }
            }
        }

        log::trace!("Dispatched {} from {}: {:?}", event, origin, report);
        report
    }
}
