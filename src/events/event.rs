//! Delivery events pushed onto listener queues

use crate::events::element::CacheElement;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheEventKind {
    Put,
    Remove,
    RemoveAll,
    Dispose,
}

impl CacheEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheEventKind::Put => "put",
            CacheEventKind::Remove => "remove",
            CacheEventKind::RemoveAll => "remove_all",
            CacheEventKind::Dispose => "dispose",
        }
    }
}

impl fmt::Display for CacheEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation to be delivered to one listener
///
/// Put elements are shared between all listener queues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    Put(Arc<CacheElement>),
    Remove { region_name: String, key: String },
    RemoveAll { region_name: String },
    Dispose { region_name: String },
}

impl CacheEvent {
    pub fn put(element: CacheElement) -> Self {
        CacheEvent::Put(Arc::new(element))
    }

    pub fn remove(region_name: impl Into<String>, key: impl Into<String>) -> Self {
        CacheEvent::Remove {
            region_name: region_name.into(),
            key: key.into(),
        }
    }

    pub fn remove_all(region_name: impl Into<String>) -> Self {
        CacheEvent::RemoveAll {
            region_name: region_name.into(),
        }
    }

    pub fn dispose(region_name: impl Into<String>) -> Self {
        CacheEvent::Dispose {
            region_name: region_name.into(),
        }
    }

    pub fn kind(&self) -> CacheEventKind {
        match self {
            CacheEvent::Put(_) => CacheEventKind::Put,
            CacheEvent::Remove { .. } => CacheEventKind::Remove,
            CacheEvent::RemoveAll { .. } => CacheEventKind::RemoveAll,
            CacheEvent::Dispose { .. } => CacheEventKind::Dispose,
        }
    }

    pub fn region_name(&self) -> &str {
        match self {
            CacheEvent::Put(element) => &element.region_name,
            CacheEvent::Remove { region_name, .. }
            | CacheEvent::RemoveAll { region_name }
            | CacheEvent::Dispose { region_name } => region_name,
        }
    }

    /// The key the event refers to, if it concerns a single entry
    pub fn key(&self) -> Option<&str> {
        match self {
            CacheEvent::Put(element) => Some(&element.key),
            CacheEvent::Remove { key, .. } => Some(key),
            CacheEvent::RemoveAll { .. } | CacheEvent::Dispose { .. } => None,
        }
    }
}

impl fmt::Display for CacheEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key() {
            Some(key) => write!(f, "{} {}:{}", self.kind(), self.region_name(), key),
            None => write!(f, "{} {}", self.kind(), self.region_name()),
        }
    }
}
