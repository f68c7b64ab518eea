//! Listener Registry Error Types

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid listener registration: {message}")]
    InvalidRegistration { message: String },

    #[error("Listener registry synchronisation failure: {message}")]
    Synchronisation { message: String },

    #[error("Listener registry has been shut down")]
    ShutDown,
}

impl crate::core::error_handling::ContextualError for RegistryError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, RegistryError::InvalidRegistration { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            RegistryError::InvalidRegistration { message } => Some(message),
            _ => None,
        }
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
