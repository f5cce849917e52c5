use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How a binary authenticates against the cluster.
///
/// Selected with `credentials.mode`, e.g. `APP_CREDENTIALS__MODE=in_cluster`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CredentialsConfig {
    /// Try the local kubeconfig first and fall back to the in-cluster service account.
    #[default]
    Infer,
    /// Use the service account mounted into the pod.
    InCluster,
    /// Read a kubeconfig file.
    Kubeconfig {
        /// Path to the kubeconfig. Defaults to `$KUBECONFIG` or `~/.kube/config`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
        /// Context to use instead of the file's current context.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },
}
