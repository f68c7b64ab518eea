//! Cache event logging hooks
//!
//! The server reports the start and end of every operation, or the error
//! that ended it, to a `CacheEventLogger`. Registration changes are
//! reported as application events.

use chrono::{DateTime, Utc};
use std::fmt;

/// Operation names reported to the event logger
pub mod event_names {
    pub const UPDATE: &str = "update";
    pub const GET: &str = "get";
    pub const GET_MATCHING: &str = "get_matching";
    pub const GET_MULTIPLE: &str = "get_multiple";
    pub const REMOVE: &str = "remove";
    pub const REMOVE_ALL: &str = "remove_all";
    pub const DISPOSE: &str = "dispose";
    pub const ADD_LISTENER: &str = "add_listener";
    pub const REMOVE_LISTENER: &str = "remove_listener";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEventDescriptor {
    pub source: String,
    pub region_name: String,
    pub event_name: String,
    /// Free-form details, typically the requesting listener
    pub details: String,
    pub key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for CacheEventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} region={}", self.source, self.event_name, self.region_name)?;
        if let Some(key) = &self.key {
            write!(f, " key={}", key)?;
        }
        if !self.details.is_empty() {
            write!(f, " {}", self.details)?;
        }
        Ok(())
    }
}

pub trait CacheEventLogger: Send + Sync {
    fn create_event(
        &self,
        source: &str,
        region_name: &str,
        event_name: &str,
        details: &str,
        key: Option<&str>,
    ) -> CacheEventDescriptor {
        CacheEventDescriptor {
            source: source.to_string(),
            region_name: region_name.to_string(),
            event_name: event_name.to_string(),
            details: details.to_string(),
            key: key.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn log_start(&self, event: &CacheEventDescriptor);

    fn log_end(&self, event: &CacheEventDescriptor);

    fn log_error(&self, event: &CacheEventDescriptor, error: &str);

    fn log_application_event(&self, source: &str, event_name: &str, details: &str);
}

/// Writes cache events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventLogger;

impl CacheEventLogger for LogEventLogger {
    fn log_start(&self, event: &CacheEventDescriptor) {
        log::trace!("start {}", event);
    }

    fn log_end(&self, event: &CacheEventDescriptor) {
        let elapsed = Utc::now().signed_duration_since(event.created_at);
        log::debug!("end {} ({} ms)", event, elapsed.num_milliseconds());
    }

    fn log_error(&self, event: &CacheEventDescriptor, error: &str) {
        log::warn!("error {}: {}", event, error);
    }

    fn log_application_event(&self, source: &str, event_name: &str, details: &str) {
        log::info!("{} {}: {}", source, event_name, details);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_display() {
        let logger = LogEventLogger;
        let event = logger.create_event("server", "users", event_names::UPDATE, "requester=3", Some("k1"));
        assert_eq!(event.to_string(), "server update region=users key=k1 requester=3");

        let event = logger.create_event("server", "users", event_names::REMOVE_ALL, "", None);
        assert_eq!(event.to_string(), "server remove_all region=users");
    }
}
