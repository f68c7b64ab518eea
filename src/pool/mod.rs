//! Elastic Worker Pool
//!
//! Named pools of async workers that execute delivery work for the event
//! queues. A pool grows on demand up to its maximum size and can be resized
//! while busy; shrinking converges as workers finish their current task.

pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod manager;
pub(crate) mod worker_pool;

pub mod api;

#[cfg(test)]
mod tests;
