//! The resource model shared by listers, criteria, mutations and the pass.

use std::collections::BTreeMap;
use std::fmt;

/// Kinds of Kubernetes resources a sweep can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pod,
    Namespace,
}

impl ResourceKind {
    /// Returns `true` if resources of this kind live inside a namespace.
    pub fn is_namespaced(&self) -> bool {
        matches!(self, ResourceKind::Pod)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Pod => f.write_str("pod"),
            ResourceKind::Namespace => f.write_str("namespace"),
        }
    }
}

/// Identifies one resource obtained from a listing.
///
/// `namespace` is `None` for cluster-scoped kinds. A [`ResourceRef`] is never
/// modified after the listing produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    kind: ResourceKind,
    namespace: Option<String>,
    name: String,
}

impl ResourceRef {
    /// Creates a reference to a namespaced resource.
    pub fn namespaced(
        kind: ResourceKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Creates a reference to a cluster-scoped resource.
    pub fn cluster_scoped(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: None,
            name: name.into(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceRef {
    /// Formats as `namespace/name`, or just `name` for cluster-scoped resources.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{namespace}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// The parts of a resource's state a criterion may look at.
///
/// `phase` and `reason` are kept apart: a pod evicted by the kubelet reports phase
/// `Failed` and reason `Evicted`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedState {
    pub phase: Option<String>,
    pub reason: Option<String>,
    pub labels: BTreeMap<String, String>,
}

/// One listed resource together with its observed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub resource: ResourceRef,
    pub state: ObservedState,
}

impl Candidate {
    pub fn new(resource: ResourceRef, state: ObservedState) -> Self {
        Self { resource, state }
    }
}

/// Where to list resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    AllNamespaces,
    Namespace(String),
}

impl Scope {
    /// Builds a scope from an optional namespace, `None` meaning all namespaces.
    pub fn from_namespace(namespace: Option<&str>) -> Self {
        match namespace {
            Some(namespace) => Scope::Namespace(namespace.to_owned()),
            None => Scope::AllNamespaces,
        }
    }
}

/// Server-side filters forwarded verbatim to the lister.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
}

/// Everything a lister needs to produce candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub kind: ResourceKind,
    pub scope: Scope,
    pub filter: ListFilter,
}
