//! Region store collaborator
//!
//! The server delegates the data side of every operation to a
//! `RegionStore` before it fans a mutation out to listeners.
//! `MemoryRegionStore` keeps regions in process memory.

use crate::core::sync::{read_recover, write_recover};
use crate::events::api::CacheElement;
use async_trait::async_trait;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid key pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Region '{region}' is unavailable: {message}")]
    Unavailable { region: String, message: String },
}

/// Result type for region store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Elements keyed by their cache key, in key order
pub type ElementMap = BTreeMap<String, Arc<CacheElement>>;

#[async_trait]
pub trait RegionStore: Send + Sync {
    async fn put(&self, element: Arc<CacheElement>) -> StoreResult<()>;

    async fn get(&self, region_name: &str, key: &str) -> StoreResult<Option<Arc<CacheElement>>>;

    /// Elements whose key matches the regular expression `pattern`
    async fn get_matching(&self, region_name: &str, pattern: &str) -> StoreResult<ElementMap>;

    /// Elements for the requested keys that are present
    async fn get_multiple(&self, region_name: &str, keys: &[String]) -> StoreResult<ElementMap>;

    /// Returns whether an element was removed
    async fn remove(&self, region_name: &str, key: &str) -> StoreResult<bool>;

    async fn remove_all(&self, region_name: &str) -> StoreResult<()>;

    /// Drop the region and everything in it
    async fn dispose(&self, region_name: &str) -> StoreResult<()>;
}

/// In-memory store with lazily created regions
#[derive(Debug, Default)]
pub struct MemoryRegionStore {
    regions: RwLock<HashMap<String, HashMap<String, Arc<CacheElement>>>>,
}

impl MemoryRegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region_names(&self) -> Vec<String> {
        let mut names: Vec<String> = read_recover(&self.regions).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self, region_name: &str) -> usize {
        read_recover(&self.regions)
            .get(region_name)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl RegionStore for MemoryRegionStore {
    async fn put(&self, element: Arc<CacheElement>) -> StoreResult<()> {
        let mut regions = write_recover(&self.regions);
        regions
            .entry(element.region_name.clone())
            .or_default()
            .insert(element.key.clone(), element);
        Ok(())
    }

    async fn get(&self, region_name: &str, key: &str) -> StoreResult<Option<Arc<CacheElement>>> {
        Ok(read_recover(&self.regions)
            .get(region_name)
            .and_then(|region| region.get(key))
            .cloned())
    }

    async fn get_matching(&self, region_name: &str, pattern: &str) -> StoreResult<ElementMap> {
        let matcher = Regex::new(pattern).map_err(|e| StoreError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(read_recover(&self.regions)
            .get(region_name)
            .map(|region| {
                region
                    .iter()
                    .filter(|(key, _)| matcher.is_match(key))
                    .map(|(key, element)| (key.clone(), Arc::clone(element)))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_multiple(&self, region_name: &str, keys: &[String]) -> StoreResult<ElementMap> {
        let regions = read_recover(&self.regions);
        let Some(region) = regions.get(region_name) else {
            return Ok(ElementMap::new());
        };
        Ok(keys
            .iter()
            .filter_map(|key| {
                region
                    .get(key)
                    .map(|element| (key.clone(), Arc::clone(element)))
            })
            .collect())
    }

    async fn remove(&self, region_name: &str, key: &str) -> StoreResult<bool> {
        Ok(write_recover(&self.regions)
            .get_mut(region_name)
            .and_then(|region| region.remove(key))
            .is_some())
    }

    async fn remove_all(&self, region_name: &str) -> StoreResult<()> {
        if let Some(region) = write_recover(&self.regions).get_mut(region_name) {
            region.clear();
        }
        Ok(())
    }

    async fn dispose(&self, region_name: &str) -> StoreResult<()> {
        if write_recover(&self.regions).remove(region_name).is_some() {
            log::debug!("Disposed store region '{}'", region_name);
        }
        Ok(())
    }
}
