use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Default wall-clock budget of one pass, listing and mutations included.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// What a pass does when a mutation fails with anything other than "not found".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and move on to the next resource.
    #[default]
    Continue,
    /// Stop the pass at the first failure.
    AbortOnFirstError,
}

/// Settings shared by every reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassConfig {
    /// Hard ceiling for the whole pass, in seconds.
    pub timeout_secs: u64,
    /// Behavior on mutation failures.
    pub failure_policy: FailurePolicy,
}

impl PassConfig {
    /// Returns the pass timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::TimeoutZero);
        }

        Ok(())
    }
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            failure_policy: FailurePolicy::default(),
        }
    }
}
