use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::action::MutationAction;
use crate::bail;
use crate::cluster::{ResourceLister, ResourceMutator};
use crate::error::{ErrorKind, SweepError, SweepResult};
use crate::resource::{Candidate, ListRequest, ObservedState, ResourceKind, ResourceRef, Scope};
use crate::sweep_error;

/// Reference to a pod.
pub fn pod_ref(namespace: &str, name: &str) -> ResourceRef {
    ResourceRef::namespaced(ResourceKind::Pod, namespace, name)
}

/// Reference to a namespace.
pub fn namespace_ref(name: &str) -> ResourceRef {
    ResourceRef::cluster_scoped(ResourceKind::Namespace, name)
}

#[derive(Debug, Default)]
struct Inner {
    resources: Vec<Candidate>,
    list_calls: usize,
    list_error: Option<SweepError>,
    list_delay: Option<Duration>,
    vanishing: HashSet<ResourceRef>,
    failing: HashMap<ResourceRef, SweepError>,
    mutation_delay: Option<Duration>,
    mutations: Vec<(ResourceRef, MutationAction)>,
}

/// A cluster living in memory, listing resources in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryCluster {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_pod(&self, namespace: &str, name: &str, phase: &str) {
        self.add(Candidate::new(
            pod_ref(namespace, name),
            ObservedState {
                phase: Some(phase.to_owned()),
                ..ObservedState::default()
            },
        ))
        .await;
    }

    pub async fn add_pod_with_reason(
        &self,
        namespace: &str,
        name: &str,
        phase: &str,
        reason: &str,
    ) {
        self.add(Candidate::new(
            pod_ref(namespace, name),
            ObservedState {
                phase: Some(phase.to_owned()),
                reason: Some(reason.to_owned()),
                ..ObservedState::default()
            },
        ))
        .await;
    }

    pub async fn add_namespace(&self, name: &str) {
        self.add_namespace_with_labels(name, &[]).await;
    }

    pub async fn add_namespace_with_labels(&self, name: &str, labels: &[(&str, &str)]) {
        self.add(Candidate::new(
            namespace_ref(name),
            ObservedState {
                phase: Some("Active".to_owned()),
                reason: None,
                labels: labels
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            },
        ))
        .await;
    }

    pub async fn add(&self, candidate: Candidate) {
        let mut inner = self.inner.lock().await;
        inner.resources.push(candidate);
    }

    /// Makes the next listing fail with `err`.
    pub async fn fail_next_listing(&self, err: SweepError) {
        let mut inner = self.inner.lock().await;
        inner.list_error = Some(err);
    }

    /// Makes every mutation of `resource` fail with an error of `kind`.
    pub async fn fail_mutations_of(&self, resource: ResourceRef, kind: ErrorKind) {
        let mut inner = self.inner.lock().await;
        let err = sweep_error!(kind, "Injected mutation failure", &resource);
        inner.failing.insert(resource, err);
    }

    /// Removes `resource` right after the next listing returned it, as if another
    /// actor deleted it concurrently.
    pub async fn vanish_after_listing(&self, resource: ResourceRef) {
        let mut inner = self.inner.lock().await;
        inner.vanishing.insert(resource);
    }

    pub async fn set_list_delay(&self, delay: Duration) {
        let mut inner = self.inner.lock().await;
        inner.list_delay = Some(delay);
    }

    pub async fn set_mutation_delay(&self, delay: Duration) {
        let mut inner = self.inner.lock().await;
        inner.mutation_delay = Some(delay);
    }

    /// Returns the stored resource, if it still exists.
    pub async fn get(&self, resource: &ResourceRef) -> Option<Candidate> {
        let inner = self.inner.lock().await;
        inner
            .resources
            .iter()
            .find(|candidate| &candidate.resource == resource)
            .cloned()
    }

    pub async fn labels_of(&self, resource: &ResourceRef) -> Option<BTreeMap<String, String>> {
        self.get(resource).await.map(|candidate| candidate.state.labels)
    }

    pub async fn resources(&self) -> Vec<Candidate> {
        let inner = self.inner.lock().await;
        inner.resources.clone()
    }

    /// Every mutation attempted so far, in order, including failed ones.
    pub async fn mutations(&self) -> Vec<(ResourceRef, MutationAction)> {
        let inner = self.inner.lock().await;
        inner.mutations.clone()
    }

    pub async fn list_calls(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.list_calls
    }
}

impl ResourceLister for MemoryCluster {
    async fn list(
        &self,
        request: &ListRequest,
        _time_bound: Duration,
    ) -> SweepResult<Vec<Candidate>> {
        let delay = {
            let mut inner = self.inner.lock().await;
            inner.list_calls += 1;
            inner.list_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock().await;

        if let Some(err) = inner.list_error.take() {
            return Err(err);
        }

        let listed = inner
            .resources
            .iter()
            .filter(|candidate| matches_request(candidate, request))
            .cloned()
            .collect::<Vec<_>>();

        let vanishing = std::mem::take(&mut inner.vanishing);
        inner
            .resources
            .retain(|candidate| !vanishing.contains(&candidate.resource));

        Ok(listed)
    }
}

impl ResourceMutator for MemoryCluster {
    async fn mutate(&self, target: &ResourceRef, action: &MutationAction) -> SweepResult<()> {
        let delay = {
            let mut inner = self.inner.lock().await;
            inner.mutations.push((target.clone(), action.clone()));
            inner.mutation_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock().await;

        if let Some(err) = inner.failing.get(target) {
            return Err(err.clone());
        }

        let Some(position) = inner
            .resources
            .iter()
            .position(|candidate| &candidate.resource == target)
        else {
            bail!(
                ErrorKind::ResourceNotFound,
                "Resource not found in memory cluster",
                target
            );
        };

        match action {
            MutationAction::Delete { .. } => {
                inner.resources.remove(position);
            }
            MutationAction::MergeLabels { labels } => {
                inner.resources[position]
                    .state
                    .labels
                    .extend(labels.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        Ok(())
    }
}

fn matches_request(candidate: &Candidate, request: &ListRequest) -> bool {
    let resource = &candidate.resource;

    if resource.kind() != request.kind {
        return false;
    }

    if let Scope::Namespace(namespace) = &request.scope
        && request.kind.is_namespaced()
        && resource.namespace() != Some(namespace.as_str())
    {
        return false;
    }

    let labels_match = request
        .filter
        .label_selector
        .as_deref()
        .is_none_or(|selector| matches_label_selector(&candidate.state.labels, selector));

    let fields_match = request
        .filter
        .field_selector
        .as_deref()
        .is_none_or(|selector| matches_field_selector(candidate, selector));

    labels_match && fields_match
}

/// Supports the equality-based subset of label selectors: `k=v`, `k==v`, `k!=v`,
/// `k` and `!k`, joined by commas.
fn matches_label_selector(labels: &BTreeMap<String, String>, selector: &str) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| {
            if let Some((key, value)) = term.split_once("!=") {
                labels.get(key.trim()).map(String::as_str) != Some(value.trim())
            } else if let Some((key, value)) = term
                .split_once("==")
                .or_else(|| term.split_once('='))
            {
                labels.get(key.trim()).map(String::as_str) == Some(value.trim())
            } else if let Some(key) = term.strip_prefix('!') {
                !labels.contains_key(key.trim())
            } else {
                labels.contains_key(term)
            }
        })
}

/// Supports `metadata.name`, `metadata.namespace`, `status.phase` and `status.reason`
/// with `=`, `==` and `!=`. Unknown fields never match.
fn matches_field_selector(candidate: &Candidate, selector: &str) -> bool {
    let field_value = |field: &str| -> Option<Option<&str>> {
        match field {
            "metadata.name" => Some(Some(candidate.resource.name())),
            "metadata.namespace" => Some(candidate.resource.namespace()),
            "status.phase" => Some(candidate.state.phase.as_deref()),
            "status.reason" => Some(candidate.state.reason.as_deref()),
            _ => None,
        }
    };

    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| {
            let (field, expected, negated) = if let Some((field, value)) = term.split_once("!=") {
                (field, value, true)
            } else if let Some((field, value)) =
                term.split_once("==").or_else(|| term.split_once('='))
            {
                (field, value, false)
            } else {
                return false;
            };

            match field_value(field.trim()) {
                Some(actual) => (actual.unwrap_or_default() == expected.trim()) != negated,
                None => false,
            }
        })
}
