use std::fmt::Debug;
use std::time::Duration;

use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::{DeleteParams, ListParams, Patch, PatchParams};
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::action::{MutationAction, PropagationPolicy};
use crate::cluster::{ResourceLister, ResourceMutator};
use crate::error::{ErrorKind, SweepError, SweepResult};
use crate::resource::{Candidate, ListRequest, ObservedState, ResourceKind, ResourceRef, Scope};
use crate::sweep_error;

/// Lister and mutator backed by a [`kube::Client`].
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pods(&self, scope: &Scope) -> Api<Pod> {
        match scope {
            Scope::AllNamespaces => Api::all(self.client.clone()),
            Scope::Namespace(namespace) => Api::namespaced(self.client.clone(), namespace),
        }
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }
}

impl ResourceLister for KubeClusterClient {
    async fn list(
        &self,
        request: &ListRequest,
        time_bound: Duration,
    ) -> SweepResult<Vec<Candidate>> {
        let params = list_params(request, time_bound);

        let candidates: Vec<Candidate> = match request.kind {
            ResourceKind::Pod => self
                .pods(&request.scope)
                .list(&params)
                .await
                .map_err(listing_error)?
                .items
                .iter()
                .map(pod_candidate)
                .collect(),
            // Namespaces are cluster-scoped, the scope does not narrow them.
            ResourceKind::Namespace => self
                .namespaces()
                .list(&params)
                .await
                .map_err(listing_error)?
                .items
                .iter()
                .map(namespace_candidate)
                .collect(),
        };

        debug!(
            kind = %request.kind,
            count = candidates.len(),
            "listed resources from the api server"
        );

        Ok(candidates)
    }
}

impl ResourceMutator for KubeClusterClient {
    async fn mutate(&self, target: &ResourceRef, action: &MutationAction) -> SweepResult<()> {
        match target.kind() {
            ResourceKind::Pod => {
                let Some(namespace) = target.namespace() else {
                    return Err(sweep_error!(
                        ErrorKind::InvalidData,
                        "Pod reference has no namespace",
                        target
                    ));
                };

                let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
                apply(api, target.name(), action).await
            }
            ResourceKind::Namespace => apply(self.namespaces(), target.name(), action).await,
        }
    }
}

async fn apply<K>(api: Api<K>, name: &str, action: &MutationAction) -> SweepResult<()>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    match action {
        MutationAction::Delete { propagation } => {
            api.delete(name, &delete_params(*propagation))
                .await
                .map_err(mutation_error)?;
        }
        MutationAction::MergeLabels { labels } => {
            // A JSON merge patch on `metadata.labels` only touches the given keys.
            let patch = json!({ "metadata": { "labels": labels } });
            api.patch(name, &PatchParams::default(), &Patch::Merge(&patch))
                .await
                .map_err(mutation_error)?;
        }
    }

    Ok(())
}

fn list_params(request: &ListRequest, time_bound: Duration) -> ListParams {
    // The server rejects a zero timeout, and a sub-second budget still deserves a try.
    let timeout_secs = time_bound.as_secs().clamp(1, u32::MAX as u64) as u32;
    let mut params = ListParams::default().timeout(timeout_secs);

    if let Some(label_selector) = &request.filter.label_selector {
        params = params.labels(label_selector);
    }
    if let Some(field_selector) = &request.filter.field_selector {
        params = params.fields(field_selector);
    }

    params
}

fn delete_params(propagation: PropagationPolicy) -> DeleteParams {
    match propagation {
        PropagationPolicy::Foreground => DeleteParams::foreground(),
        PropagationPolicy::Background => DeleteParams::background(),
        PropagationPolicy::Orphan => DeleteParams::orphan(),
    }
}

fn pod_candidate(pod: &Pod) -> Candidate {
    let status = pod.status.as_ref();

    Candidate::new(
        ResourceRef::namespaced(
            ResourceKind::Pod,
            pod.namespace().unwrap_or_default(),
            pod.name_any(),
        ),
        ObservedState {
            phase: status.and_then(|status| status.phase.clone()),
            reason: status.and_then(|status| status.reason.clone()),
            labels: pod.labels().clone(),
        },
    )
}

fn namespace_candidate(namespace: &Namespace) -> Candidate {
    Candidate::new(
        ResourceRef::cluster_scoped(ResourceKind::Namespace, namespace.name_any()),
        ObservedState {
            phase: namespace
                .status
                .as_ref()
                .and_then(|status| status.phase.clone()),
            reason: None,
            labels: namespace.labels().clone(),
        },
    )
}

/// Maps an error returned while listing.
///
/// Rejected credentials surface here, since building a client never contacts the
/// server.
fn listing_error(err: kube::Error) -> SweepError {
    match SweepError::from(err) {
        err if err.kind() == ErrorKind::AuthenticationFailed => err,
        err => sweep_error!(ErrorKind::ListingFailed, "Failed to list resources", err),
    }
}

/// Maps an error returned by a delete or patch call.
fn mutation_error(err: kube::Error) -> SweepError {
    match SweepError::from(err) {
        err if err.is_not_found() => err,
        err => sweep_error!(ErrorKind::MutationFailed, "Failed to mutate resource", err),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::api::core::v1::{NamespaceStatus, PodStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use kube::core::ErrorResponse;

    use super::*;
    use crate::resource::ListFilter;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_owned(),
            message: "test".to_owned(),
            reason: "Test".to_owned(),
            code,
        })
    }

    #[test]
    fn evicted_pod_keeps_phase_and_reason_apart() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("worker-1".to_owned()),
                namespace: Some("batch".to_owned()),
                labels: Some(BTreeMap::from([("app".to_owned(), "worker".to_owned())])),
                ..ObjectMeta::default()
            },
            status: Some(PodStatus {
                phase: Some("Failed".to_owned()),
                reason: Some("Evicted".to_owned()),
                ..PodStatus::default()
            }),
            ..Pod::default()
        };

        let candidate = pod_candidate(&pod);

        assert_eq!(candidate.resource.to_string(), "batch/worker-1");
        assert_eq!(candidate.state.phase.as_deref(), Some("Failed"));
        assert_eq!(candidate.state.reason.as_deref(), Some("Evicted"));
        assert_eq!(candidate.state.labels["app"], "worker");
    }

    #[test]
    fn namespace_is_cluster_scoped() {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some("billing".to_owned()),
                ..ObjectMeta::default()
            },
            status: Some(NamespaceStatus {
                phase: Some("Active".to_owned()),
                ..NamespaceStatus::default()
            }),
            ..Namespace::default()
        };

        let candidate = namespace_candidate(&namespace);

        assert_eq!(candidate.resource.namespace(), None);
        assert_eq!(candidate.resource.name(), "billing");
        assert!(candidate.state.labels.is_empty());
    }

    #[test]
    fn list_params_forward_selectors_and_time_bound() {
        let request = ListRequest {
            kind: ResourceKind::Pod,
            scope: Scope::AllNamespaces,
            filter: ListFilter {
                label_selector: Some("app=worker".to_owned()),
                field_selector: Some("status.phase!=Running".to_owned()),
            },
        };

        let params = list_params(&request, Duration::from_millis(250));

        assert_eq!(params.label_selector.as_deref(), Some("app=worker"));
        assert_eq!(params.field_selector.as_deref(), Some("status.phase!=Running"));
        assert_eq!(params.timeout, Some(1));
    }

    #[test]
    fn delete_params_follow_propagation_policy() {
        let params = delete_params(PropagationPolicy::Foreground);

        assert!(matches!(
            params.propagation_policy,
            Some(kube::api::PropagationPolicy::Foreground)
        ));
    }

    #[test]
    fn listing_errors_are_classified() {
        assert_eq!(
            listing_error(api_error(401)).kind(),
            ErrorKind::AuthenticationFailed
        );
        assert_eq!(listing_error(api_error(500)).kind(), ErrorKind::ListingFailed);
    }

    #[test]
    fn mutation_errors_keep_not_found() {
        assert_eq!(
            mutation_error(api_error(404)).kind(),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(mutation_error(api_error(409)).kind(), ErrorKind::MutationFailed);
    }
}
