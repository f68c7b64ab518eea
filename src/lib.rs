//! Remote cache server core
//!
//! Keeps a registry of listeners per cache region, fans every mutation out
//! to the interested listeners through per-listener event queues, and runs
//! deliveries on named elastic worker pools.

pub mod app;
pub mod core;
pub mod events;
pub mod listeners;
pub mod pool;
pub mod server;
