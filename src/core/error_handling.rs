//! Generic error reporting utilities
//!
//! Lets the binary report fatal errors from any domain with the right level
//! of detail: configuration and registration mistakes are shown verbatim,
//! internal failures are summarised with the detail logged at debug level.

/// Errors that know whether the operator can act on them
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)`; otherwise it should return `None`.
pub trait ContextualError: std::error::Error {
    /// True when the message is something the operator can fix
    /// (bad settings, malformed registration input).
    fn is_user_actionable(&self) -> bool;

    /// The operator-facing message for user-actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with detail appropriate to its kind
///
/// # Examples
/// ```rust,no_run
/// # use remcache::core::error_handling::log_error_with_context;
/// # use remcache::server::api::SettingsError;
/// let error = SettingsError::Invalid { message: "max-workers must be at least 1".to_string() };
/// log_error_with_context(&error, "Loading server settings");
/// // Logs: "FATAL: max-workers must be at least 1"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
