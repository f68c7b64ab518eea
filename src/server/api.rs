//! Public API for the remote cache server
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::server::dispatch::{forward_to_locals, DispatchReport, Dispatcher};
pub use crate::server::error::{ServerError, ServerResult};
pub use crate::server::event_logger::{
    event_names, CacheEventDescriptor, CacheEventLogger, LogEventLogger,
};
pub use crate::server::server::{
    RegionStatistics, RemoteCacheServer, RemoteCacheServerBuilder, ServerStatistics,
};
pub use crate::server::settings::{LoggingSettings, ServerSettings, SettingsError, SettingsResult};
pub use crate::server::store::{
    ElementMap, MemoryRegionStore, RegionStore, StoreError, StoreResult,
};
