//! Worker Pool Error Types

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("Invalid configuration for pool '{pool}': {message}")]
    InvalidConfig { pool: String, message: String },

    #[error("Task queue of pool '{pool}' is full (boundary size: {boundary_size})")]
    QueueFull { pool: String, boundary_size: usize },

    #[error("Pool '{pool}' has been shut down")]
    ShutDown { pool: String },

    #[error("No tokio runtime available to run workers for pool '{pool}'")]
    NoRuntime { pool: String },
}

impl crate::core::error_handling::ContextualError for PoolError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, PoolError::InvalidConfig { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PoolError::InvalidConfig { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result type for worker pool operations
pub type PoolResult<T> = Result<T, PoolError>;
