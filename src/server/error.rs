//! Server Error Types

use crate::core::error_handling::ContextualError;
use crate::events::api::EventQueueError;
use crate::listeners::api::RegistryError;
use crate::pool::api::PoolError;
use crate::server::settings::SettingsError;
use crate::server::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Region store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    EventQueue(#[from] EventQueueError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("Remote cache server has been shut down")]
    ShutDown,
}

impl ContextualError for ServerError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ServerError::Settings(error) => error.is_user_actionable(),
            ServerError::Registry(error) => error.is_user_actionable(),
            ServerError::EventQueue(error) => error.is_user_actionable(),
            ServerError::Pool(error) => error.is_user_actionable(),
            ServerError::Store(StoreError::InvalidPattern { .. }) => true,
            _ => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ServerError::Settings(error) => error.user_message(),
            ServerError::Registry(error) => error.user_message(),
            ServerError::EventQueue(error) => error.user_message(),
            ServerError::Pool(error) => error.user_message(),
            ServerError::Store(StoreError::InvalidPattern { message, .. }) => Some(message),
            _ => None,
        }
    }
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;
