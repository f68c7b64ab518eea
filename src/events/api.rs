//! Public API for cache events and listener queues
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::events::config::{EventQueueSettings, QueueKind};
pub use crate::events::element::CacheElement;
pub use crate::events::error::{DeliveryError, EventQueueError, EventQueueResult};
pub use crate::events::event::{CacheEvent, CacheEventKind};
pub use crate::events::factory::EventQueueFactory;
pub use crate::events::queue::EventQueue;
pub use crate::events::statistics::{EventQueueStatistics, EventQueueStats};
