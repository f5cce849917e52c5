use std::path::PathBuf;

use async_trait::async_trait;
use kube::Client;
use kube::config::{Config, KubeConfigOptions, Kubeconfig};
use sweep_config::shared::CredentialsConfig;
use tracing::info;

use crate::error::{ErrorKind, SweepResult};
use crate::k8s::KubeClusterClient;
use crate::sweep_error;

/// Produces the client configuration used to reach the cluster.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolves a [`kube::Config`], failing with [`ErrorKind::AuthenticationFailed`].
    async fn load(&self) -> SweepResult<Config>;
}

/// Reads the service account token and CA mounted into the pod.
#[derive(Debug, Default)]
pub struct InClusterCredentials;

#[async_trait]
impl CredentialProvider for InClusterCredentials {
    fn name(&self) -> &'static str {
        "in_cluster"
    }

    async fn load(&self) -> SweepResult<Config> {
        Ok(Config::incluster()?)
    }
}

/// Reads a kubeconfig file.
#[derive(Debug, Default)]
pub struct KubeconfigCredentials {
    /// File to read. `$KUBECONFIG` or `~/.kube/config` when unset.
    pub path: Option<PathBuf>,
    /// Context overriding the file's current context.
    pub context: Option<String>,
}

#[async_trait]
impl CredentialProvider for KubeconfigCredentials {
    fn name(&self) -> &'static str {
        "kubeconfig"
    }

    async fn load(&self) -> SweepResult<Config> {
        let options = KubeConfigOptions {
            context: self.context.clone(),
            ..KubeConfigOptions::default()
        };

        let config = match &self.path {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)?;
                Config::from_custom_kubeconfig(kubeconfig, &options).await?
            }
            None => Config::from_kubeconfig(&options).await?,
        };

        Ok(config)
    }
}

/// Lets `kube` pick: a local kubeconfig if there is one, the in-cluster environment
/// otherwise.
#[derive(Debug, Default)]
pub struct InferredCredentials;

#[async_trait]
impl CredentialProvider for InferredCredentials {
    fn name(&self) -> &'static str {
        "infer"
    }

    async fn load(&self) -> SweepResult<Config> {
        Ok(Config::infer().await?)
    }
}

/// Builds the provider selected by the configuration.
pub fn credential_provider(config: &CredentialsConfig) -> Box<dyn CredentialProvider> {
    match config {
        CredentialsConfig::Infer => Box::new(InferredCredentials),
        CredentialsConfig::InCluster => Box::new(InClusterCredentials),
        CredentialsConfig::Kubeconfig { path, context } => Box::new(KubeconfigCredentials {
            path: path.clone(),
            context: context.clone(),
        }),
    }
}

/// Resolves credentials and builds a [`KubeClusterClient`].
///
/// No request is sent here. Rejected credentials show up on the first listing.
pub async fn connect(provider: &dyn CredentialProvider) -> SweepResult<KubeClusterClient> {
    let config = provider.load().await?;

    info!(
        provider = provider.name(),
        cluster_url = %config.cluster_url,
        "resolved cluster credentials"
    );

    let client = Client::try_from(config).map_err(|err| {
        sweep_error!(
            ErrorKind::AuthenticationFailed,
            "Failed to build a Kubernetes client",
            err
        )
    })?;

    Ok(KubeClusterClient::new(client))
}
