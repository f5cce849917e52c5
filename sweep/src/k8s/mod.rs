//! Kubernetes integration.
//!
//! [`KubeClusterClient`] implements [`crate::cluster::ResourceLister`] and
//! [`crate::cluster::ResourceMutator`] on top of the [`kube`] crate. How it
//! authenticates is decided by a [`CredentialProvider`], chosen at startup from
//! [`sweep_config::shared::CredentialsConfig`] rather than hard-coded per binary.

mod client;
mod credentials;

pub use client::*;
pub use credentials::*;
