//! Event Queue Error Types

use crate::core::error_handling::ContextualError;
use crate::listeners::api::ListenerId;
use crate::pool::api::PoolError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventQueueError {
    #[error("Invalid event queue configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Could not schedule delivery for listener {listener_id}: {source}")]
    Scheduling {
        listener_id: ListenerId,
        #[source]
        source: PoolError,
    },

    #[error("No tokio runtime available to deliver events for listener {listener_id}")]
    NoRuntime { listener_id: ListenerId },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl ContextualError for EventQueueError {
    fn is_user_actionable(&self) -> bool {
        match self {
            EventQueueError::InvalidConfig { .. } => true,
            EventQueueError::Pool(error) => error.is_user_actionable(),
            _ => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            EventQueueError::InvalidConfig { message } => Some(message),
            EventQueueError::Pool(error) => error.user_message(),
            _ => None,
        }
    }
}

/// Why a single delivery attempt failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("listener returned an error: {0}")]
    Listener(String),

    #[error("listener panicked: {0}")]
    Panicked(String),
}

/// Result type for event queue operations
pub type EventQueueResult<T> = Result<T, EventQueueError>;
