//! Callback capability of a registered listener

use crate::events::api::CacheElement;
use crate::listeners::id::ListenerId;
use async_trait::async_trait;
use std::sync::Arc;

/// Error returned by a listener callback
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Receives the mutations of the regions it is registered for
///
/// Callbacks run on delivery workers, never on the thread that performed
/// the mutation. An error or panic is retried and then logged; it never
/// reaches the mutating caller.
#[async_trait]
pub trait CacheListener: Send + Sync {
    async fn handle_put(&self, element: Arc<CacheElement>) -> Result<(), ListenerError>;

    async fn handle_remove(&self, region_name: &str, key: &str) -> Result<(), ListenerError>;

    async fn handle_remove_all(&self, region_name: &str) -> Result<(), ListenerError>;

    async fn handle_dispose(&self, region_name: &str) -> Result<(), ListenerError>;

    /// Called once with the id assigned at registration
    fn on_registered(&self, _listener_id: ListenerId) {}
}
