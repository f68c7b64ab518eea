//! Public API for listener registration
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::listeners::directory::{ListenerDirectory, ListenerRecord};
pub use crate::listeners::error::{RegistryError, RegistryResult};
pub use crate::listeners::id::{ListenerId, ListenerIdAllocator};
pub use crate::listeners::registry::{ListenerRegistry, ListenerSnapshot, RegionListeners};
pub use crate::listeners::traits::{CacheListener, ListenerError};
pub use crate::listeners::types::{ListenerCounts, RegionScope, RemoteType};
