//! Per-queue delivery statistics

use crate::core::sync::{read_recover, write_recover};
use crate::listeners::api::ListenerId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Instant;

/// Counters maintained by an event queue
#[derive(Debug)]
pub struct EventQueueStatistics {
    queue_size: AtomicUsize,
    delivered: AtomicUsize,
    failed: AtomicUsize,
    backlog_warnings: AtomicUsize,
    last_delivery_time: RwLock<Option<Instant>>,
    last_failure_time: RwLock<Option<Instant>>,
}

impl Default for EventQueueStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueueStatistics {
    pub fn new() -> Self {
        Self {
            queue_size: AtomicUsize::new(0),
            delivered: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            backlog_warnings: AtomicUsize::new(0),
            last_delivery_time: RwLock::new(None),
            last_failure_time: RwLock::new(None),
        }
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size.load(Ordering::Relaxed)
    }

    pub(crate) fn set_queue_size(&self, size: usize) {
        self.queue_size.store(size, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        *write_recover(&self.last_delivery_time) = Some(Instant::now());
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    pub(crate) fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        *write_recover(&self.last_failure_time) = Some(Instant::now());
    }

    /// Times the backlog crossed the high water mark
    pub fn backlog_warnings(&self) -> usize {
        self.backlog_warnings.load(Ordering::Relaxed)
    }

    pub(crate) fn record_backlog_warning(&self) {
        self.backlog_warnings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_delivery_time(&self) -> Option<Instant> {
        *read_recover(&self.last_delivery_time)
    }

    pub fn last_failure_time(&self) -> Option<Instant> {
        *read_recover(&self.last_failure_time)
    }
}

/// Point-in-time view of one listener's queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQueueStats {
    pub listener_id: ListenerId,
    pub alive: bool,
    pub working: bool,
    pub pending: usize,
    pub delivered: usize,
    pub failed: usize,
}
