//! Listener registration types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a listener is a directly connected client or a peer server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteType {
    Local,
    Cluster,
}

impl fmt::Display for RemoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteType::Local => f.write_str("LOCAL"),
            RemoteType::Cluster => f.write_str("CLUSTER"),
        }
    }
}

/// The region a listener subscribes to, or every region
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegionScope {
    Region(String),
    All,
}

impl RegionScope {
    pub fn region(name: impl Into<String>) -> Self {
        RegionScope::Region(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            RegionScope::Region(name) => Some(name),
            RegionScope::All => None,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RegionScope::All)
    }
}

impl From<&str> for RegionScope {
    fn from(name: &str) -> Self {
        RegionScope::Region(name.to_string())
    }
}

impl From<String> for RegionScope {
    fn from(name: String) -> Self {
        RegionScope::Region(name)
    }
}

/// `None` subscribes to every region
impl From<Option<String>> for RegionScope {
    fn from(name: Option<String>) -> Self {
        name.map_or(RegionScope::All, RegionScope::Region)
    }
}

impl fmt::Display for RegionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionScope::Region(name) => f.write_str(name),
            RegionScope::All => f.write_str("ALL"),
        }
    }
}

/// Number of listeners per type for one region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerCounts {
    pub local: usize,
    pub cluster: usize,
}

impl ListenerCounts {
    pub fn total(&self) -> usize {
        self.local + self.cluster
    }
}
