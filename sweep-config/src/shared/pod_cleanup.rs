use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{CredentialsConfig, PassConfig, SentryConfig, ValidationError};

/// Pod phases treated as terminal by default.
///
/// `Completed` and `Error` are not phases Kubernetes reports, but they are kept so that
/// clusters with admission hooks rewriting the phase are still swept.
pub const DEFAULT_TERMINAL_PHASES: [&str; 4] = ["Succeeded", "Failed", "Completed", "Error"];

/// Pod status reasons treated as terminal by default.
pub const DEFAULT_TERMINAL_REASONS: [&str; 1] = ["Evicted"];

/// How dependents of a deleted resource are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropagationPolicy {
    /// Dependents are deleted before the owner is gone.
    #[default]
    Foreground,
    /// The owner is deleted immediately and dependents are collected afterwards.
    Background,
    /// Dependents are left behind.
    Orphan,
}

/// Configuration of the `pod-cleanup` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PodCleanupConfig {
    /// Timeout and failure policy of the pass.
    pub pass: PassConfig,
    /// Cluster credentials.
    pub credentials: CredentialsConfig,
    /// Restricts the sweep to one namespace. All namespaces when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Label selector passed to the API server when listing pods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
    /// Field selector passed to the API server when listing pods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_selector: Option<String>,
    /// Values of `status.phase` selecting a pod for deletion.
    pub terminal_phases: Vec<String>,
    /// Values of `status.reason` selecting a pod for deletion.
    pub terminal_reasons: Vec<String>,
    /// Propagation policy used for deletes.
    pub propagation_policy: PropagationPolicy,
    /// Name of the cluster, attached to every JSON log line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentry: Option<SentryConfig>,
}

impl PodCleanupConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pass.validate()?;

        if self.terminal_phases.is_empty() && self.terminal_reasons.is_empty() {
            return Err(ValidationError::NoTerminalStates);
        }

        if self.namespace.as_deref().is_some_and(str::is_empty) {
            return Err(ValidationError::EmptyNamespace);
        }

        Ok(())
    }
}

impl Default for PodCleanupConfig {
    fn default() -> Self {
        Self {
            pass: PassConfig::default(),
            credentials: CredentialsConfig::default(),
            namespace: None,
            label_selector: None,
            field_selector: None,
            terminal_phases: DEFAULT_TERMINAL_PHASES.map(String::from).to_vec(),
            terminal_reasons: DEFAULT_TERMINAL_REASONS.map(String::from).to_vec(),
            propagation_policy: PropagationPolicy::default(),
            cluster_name: None,
            sentry: None,
        }
    }
}

impl Config for PodCleanupConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &["terminal_phases", "terminal_reasons"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PodCleanupConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.pass.timeout_secs, 30);
        assert_eq!(config.propagation_policy, PropagationPolicy::Foreground);
        assert_eq!(config.terminal_reasons, vec!["Evicted".to_owned()]);
    }

    #[test]
    fn rejects_empty_terminal_states() {
        let config = PodCleanupConfig {
            terminal_phases: vec![],
            terminal_reasons: vec![],
            ..PodCleanupConfig::default()
        };

        assert_eq!(config.validate(), Err(ValidationError::NoTerminalStates));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = PodCleanupConfig::default();
        config.pass.timeout_secs = 0;

        assert_eq!(config.validate(), Err(ValidationError::TimeoutZero));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: PodCleanupConfig = serde_json::from_str(
            r#"{"pass": {"failure_policy": "abort_on_first_error"}, "propagation_policy": "Background"}"#,
        )
        .unwrap();

        assert_eq!(config.pass.timeout_secs, 30);
        assert_eq!(
            config.pass.failure_policy,
            crate::shared::FailurePolicy::AbortOnFirstError
        );
        assert_eq!(config.propagation_policy, PropagationPolicy::Background);
        assert_eq!(config.terminal_phases.len(), 4);
    }
}
