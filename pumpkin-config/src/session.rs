use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// How many inbound menu events may be queued for a session before senders wait.
    pub event_queue_size: usize,
    /// Whether a panicking plugin handler is treated like a failed one instead of unwinding
    /// through the session.
    pub catch_handler_panics: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_queue_size: 64,
            catch_handler_panics: true,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_queue_size == 0 {
            return Err(ConfigError::Invalid(
                "session.event_queue_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
