use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Fraction of the menu's slots that may be out of sync before the whole content is resent
    /// instead of single slot updates. `1.0` never falls back to a full resend.
    pub full_resync_ratio: f32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            full_resync_ratio: 0.5,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.full_resync_ratio) {
            return Err(ConfigError::Invalid(format!(
                "sync.full_resync_ratio must be between 0.0 and 1.0, is {}",
                self.full_resync_ratio
            )));
        }
        Ok(())
    }
}
