use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{CredentialsConfig, PassConfig, SentryConfig, ValidationError, validate_label};

/// Namespaces never labeled by default.
pub const DEFAULT_RESERVED_NAMESPACES: [&str; 1] = ["kube-system"];

const DEFAULT_LABEL_KEY: &str = "test";

const DEFAULT_LABEL_VALUE: &str = "true";

/// Configuration of the `namespace-labeler` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceLabelerConfig {
    /// Timeout and failure policy of the pass.
    pub pass: PassConfig,
    /// Cluster credentials.
    pub credentials: CredentialsConfig,
    /// Namespaces left untouched.
    pub reserved_namespaces: Vec<String>,
    /// Label selector passed to the API server when listing namespaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
    /// Key of the label merged into every selected namespace.
    pub label_key: String,
    /// Value of the label merged into every selected namespace.
    pub label_value: String,
    /// Name of the cluster, attached to every JSON log line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentry: Option<SentryConfig>,
}

impl NamespaceLabelerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pass.validate()?;
        validate_label(&self.label_key, &self.label_value)
    }
}

impl Default for NamespaceLabelerConfig {
    fn default() -> Self {
        Self {
            pass: PassConfig::default(),
            credentials: CredentialsConfig::default(),
            reserved_namespaces: DEFAULT_RESERVED_NAMESPACES.map(String::from).to_vec(),
            label_selector: None,
            label_key: DEFAULT_LABEL_KEY.to_owned(),
            label_value: DEFAULT_LABEL_VALUE.to_owned(),
            cluster_name: None,
            sentry: None,
        }
    }
}

impl Config for NamespaceLabelerConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &["reserved_namespaces"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::CredentialsConfig;

    #[test]
    fn defaults_label_test_true_and_reserve_kube_system() {
        let config = NamespaceLabelerConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.label_key, "test");
        assert_eq!(config.label_value, "true");
        assert_eq!(config.reserved_namespaces, vec!["kube-system".to_owned()]);
    }

    #[test]
    fn rejects_empty_label_key() {
        let config = NamespaceLabelerConfig {
            label_key: String::new(),
            ..NamespaceLabelerConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidLabel { .. })
        ));
    }

    #[test]
    fn deserializes_kubeconfig_credentials() {
        let config: NamespaceLabelerConfig = serde_json::from_str(
            r#"{"credentials": {"mode": "kubeconfig", "context": "staging"}}"#,
        )
        .unwrap();

        assert_eq!(
            config.credentials,
            CredentialsConfig::Kubeconfig {
                path: None,
                context: Some("staging".to_owned()),
            }
        );
    }
}
