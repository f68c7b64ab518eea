//! Listener directory: registration metadata keyed by listener id
//!
//! Holds the requester's extra info (typically its address) along with the
//! listener's type and scope. Lookups never fail; an unknown id is simply
//! absent.

use crate::core::sync::{read_recover, write_recover};
use crate::listeners::id::ListenerId;
use crate::listeners::types::{RegionScope, RemoteType};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerRecord {
    pub listener_id: ListenerId,
    pub remote_type: RemoteType,
    pub scope: RegionScope,
    pub extra_info: Option<String>,
}

#[derive(Debug, Default)]
pub struct ListenerDirectory {
    records: RwLock<HashMap<ListenerId, ListenerRecord>>,
}

impl ListenerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, record: ListenerRecord) {
        write_recover(&self.records).insert(record.listener_id, record);
    }

    pub(crate) fn remove(&self, listener_id: ListenerId) -> Option<ListenerRecord> {
        write_recover(&self.records).remove(&listener_id)
    }

    pub fn get(&self, listener_id: ListenerId) -> Option<ListenerRecord> {
        read_recover(&self.records).get(&listener_id).cloned()
    }

    pub fn extra_info(&self, listener_id: ListenerId) -> Option<String> {
        read_recover(&self.records)
            .get(&listener_id)
            .and_then(|record| record.extra_info.clone())
    }

    pub fn remote_type(&self, listener_id: ListenerId) -> Option<RemoteType> {
        read_recover(&self.records)
            .get(&listener_id)
            .map(|record| record.remote_type)
    }

    pub fn contains(&self, listener_id: ListenerId) -> bool {
        read_recover(&self.records).contains_key(&listener_id)
    }

    pub fn len(&self) -> usize {
        read_recover(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records ordered by listener id
    pub fn records(&self) -> Vec<ListenerRecord> {
        let mut records: Vec<ListenerRecord> =
            read_recover(&self.records).values().cloned().collect();
        records.sort_by_key(|record| record.listener_id);
        records
    }
}
