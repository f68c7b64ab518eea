//! Listener Registration
//!
//! Allocates listener ids, records who registered them, and keeps the
//! per-region maps of local and cluster listeners together with each
//! listener's event queue.

pub(crate) mod directory;
pub(crate) mod error;
pub(crate) mod id;
pub(crate) mod registry;
pub(crate) mod traits;
pub(crate) mod types;

pub mod api;

#[cfg(test)]
pub(crate) mod tests;
