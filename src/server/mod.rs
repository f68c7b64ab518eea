//! Remote Cache Server
//!
//! The server facade, the dispatcher that fans mutations out to listener
//! queues, and the collaborators the server delegates to: the region store
//! and the cache event logger.

pub(crate) mod dispatch;
pub(crate) mod error;
pub(crate) mod event_logger;
#[allow(clippy::module_inception)]
pub(crate) mod server;
pub(crate) mod settings;
pub(crate) mod store;

pub mod api;

#[cfg(test)]
mod tests;
