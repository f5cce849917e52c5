use std::future::Future;
use std::time::Duration;

use crate::action::MutationAction;
use crate::error::SweepResult;
use crate::resource::{Candidate, ListRequest, ResourceRef};

/// Reads candidate resources from a cluster.
///
/// [`crate::k8s::KubeClusterClient`] talks to a real API server; the in-memory cluster
/// in `test_utils` backs the tests.
pub trait ResourceLister {
    /// Lists the resources described by `request`, in the order the server returns them.
    ///
    /// `time_bound` is the time left in the pass. Implementations forward it to the
    /// server when they can; the pass enforces it regardless.
    fn list(
        &self,
        request: &ListRequest,
        time_bound: Duration,
    ) -> impl Future<Output = SweepResult<Vec<Candidate>>> + Send;
}

/// Applies mutations to single resources.
pub trait ResourceMutator {
    /// Applies `action` to `target`.
    ///
    /// A target that no longer exists must be reported with
    /// [`crate::error::ErrorKind::ResourceNotFound`] so the pass can treat it as done.
    fn mutate(
        &self,
        target: &ResourceRef,
        action: &MutationAction,
    ) -> impl Future<Output = SweepResult<()>> + Send;
}
