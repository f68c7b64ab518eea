//! Cache element carried by put events and returned by reads

use serde::{Deserialize, Serialize};

/// A keyed value stored in a named region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheElement {
    pub region_name: String,
    pub key: String,
    pub value: Vec<u8>,
}

impl CacheElement {
    pub fn new(
        region_name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            region_name: region_name.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// The value as UTF-8 text, if it is valid UTF-8
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}
