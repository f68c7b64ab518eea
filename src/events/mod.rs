//! Cache Events and Per-Listener Delivery Queues
//!
//! Mutations accepted by the server become `CacheEvent`s, one copy per
//! target listener, appended to that listener's `EventQueue`. Queues deliver
//! in order, retry failed deliveries and never let one listener's failures
//! reach the caller or any other listener.

pub(crate) mod config;
pub(crate) mod element;
pub(crate) mod error;
pub(crate) mod event;
pub(crate) mod factory;
pub(crate) mod queue;
pub(crate) mod statistics;

pub mod api;

#[cfg(test)]
mod tests;
