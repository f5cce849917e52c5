//! The reconciliation pass: list once, filter, mutate each match in order.
//!
//! A pass is a single bounded sweep. It lists resources with one remote call, keeps
//! the candidates accepted by the plan's [`SelectionCriterion`] and applies the plan's
//! [`MutationAction`] to each of them, strictly sequentially and in listing order.
//! Every matched resource is attempted exactly once; nothing is retried.
//!
//! Outcomes are classified per resource:
//! - success counts as `mutated`;
//! - a target that disappeared since the listing counts as `skipped_not_found`, since
//!   the desired end state already holds;
//! - anything else counts as `failed` and is kept with its [`ResourceRef`].
//!
//! A single deadline covers the listing and all mutations. Once it passes, no new
//! mutation is issued and the pass returns a [`PassError`] carrying what was done.

use metrics::counter;
use sweep_config::shared::{FailurePolicy, PassConfig};
use thiserror::Error;
use tokio::time::{Instant, timeout_at};
use tracing::{error, info, warn};

use crate::action::MutationAction;
use crate::cluster::{ResourceLister, ResourceMutator};
use crate::criterion::SelectionCriterion;
use crate::error::{ErrorKind, SweepError};
use crate::metrics::{
    SWEEP, SWEEP_RESOURCES_FAILED_TOTAL, SWEEP_RESOURCES_MATCHED_TOTAL,
    SWEEP_RESOURCES_MUTATED_TOTAL, SWEEP_RESOURCES_NOT_FOUND_TOTAL, register_metrics,
};
use crate::plan::SweepPlan;
use crate::resource::ResourceRef;
use crate::sweep_error;

/// Aggregate outcome of one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassResult {
    /// Candidates accepted by the criterion and attempted.
    pub matched: usize,
    /// Mutations that succeeded.
    pub mutated: usize,
    /// Mutations whose target was already gone.
    pub skipped_not_found: usize,
    /// Mutations that failed for any other reason.
    pub failed: usize,
    /// The failed resources, in the order they were attempted.
    pub failures: Vec<(ResourceRef, SweepError)>,
}

impl PassResult {
    /// Returns `true` if no mutation failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    fn record_failure(&mut self, resource: ResourceRef, err: SweepError) {
        self.failed += 1;
        self.failures.push((resource, err));
    }
}

/// A pass that could not complete.
///
/// Raised when the listing fails, when the deadline passes, or on the first failed
/// mutation under [`FailurePolicy::AbortOnFirstError`]. Mutations applied before the
/// error stay applied.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct PassError {
    /// Everything the pass completed before stopping.
    pub partial: PassResult,
    /// Why the pass stopped.
    pub source: SweepError,
}

impl PassError {
    fn new(partial: PassResult, source: SweepError) -> Self {
        Self { partial, source }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Receives per-resource progress from a pass.
pub trait PassObserver {
    fn on_mutated(&self, _resource: &ResourceRef, _action: &MutationAction) {}

    fn on_not_found(&self, _resource: &ResourceRef) {}

    fn on_failed(&self, _resource: &ResourceRef, _err: &SweepError) {}
}

/// Observer ignoring all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PassObserver for NoopObserver {}

/// Runs [`SweepPlan`]s against a cluster.
#[derive(Debug, Clone)]
pub struct ReconciliationPass<C> {
    cluster: C,
    config: PassConfig,
}

impl<C> ReconciliationPass<C>
where
    C: ResourceLister + ResourceMutator,
{
    pub fn new(cluster: C, config: PassConfig) -> Self {
        Self { cluster, config }
    }

    /// Runs `plan` once and returns its aggregate result.
    ///
    /// Failed mutations under [`FailurePolicy::Continue`] do not make this return an
    /// error; check [`PassResult::is_clean`].
    pub async fn run<S, O>(
        &self,
        plan: &SweepPlan<S>,
        observer: &O,
    ) -> Result<PassResult, PassError>
    where
        S: SelectionCriterion,
        O: PassObserver,
    {
        register_metrics();

        let timeout = self.config.timeout();
        let deadline = Instant::now() + timeout;
        let mut result = PassResult::default();

        info!(
            sweep = plan.name,
            kind = %plan.request.kind,
            action = %plan.action,
            timeout_secs = timeout.as_secs(),
            "starting reconciliation pass"
        );

        let listing = timeout_at(deadline, self.cluster.list(&plan.request, timeout)).await;
        let candidates = match listing {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(err)) => {
                error!(
                    sweep = plan.name,
                    error = %err,
                    "listing failed, nothing was attempted"
                );
                return Err(PassError::new(result, err));
            }
            Err(_) => {
                let err = sweep_error!(
                    ErrorKind::TimeoutExceeded,
                    "Pass timed out while listing resources",
                    format!("timeout {timeout:?}")
                );
                error!(sweep = plan.name, error = %err, "listing timed out");
                return Err(PassError::new(result, err));
            }
        };

        info!(
            sweep = plan.name,
            candidates = candidates.len(),
            "listed candidates"
        );

        for candidate in candidates {
            if !plan.criterion.matches(&candidate) {
                continue;
            }

            let resource = candidate.resource;

            if Instant::now() >= deadline {
                let err = sweep_error!(
                    ErrorKind::TimeoutExceeded,
                    "Pass timed out before all matched resources were mutated",
                    format!("next resource {resource}")
                );
                warn!(
                    sweep = plan.name,
                    matched = result.matched,
                    "pass deadline reached"
                );
                return Err(PassError::new(result, err));
            }

            result.matched += 1;
            counter!(SWEEP_RESOURCES_MATCHED_TOTAL, SWEEP => plan.name).increment(1);

            let mutation = self.cluster.mutate(&resource, &plan.action);
            let outcome = timeout_at(deadline, mutation).await;

            match outcome {
                Ok(Ok(())) => {
                    result.mutated += 1;
                    counter!(SWEEP_RESOURCES_MUTATED_TOTAL, SWEEP => plan.name).increment(1);
                    info!(
                        sweep = plan.name,
                        resource = %resource,
                        action = plan.action.verb(),
                        "mutated resource"
                    );
                    observer.on_mutated(&resource, &plan.action);
                }
                Ok(Err(err)) if err.is_not_found() => {
                    result.skipped_not_found += 1;
                    counter!(SWEEP_RESOURCES_NOT_FOUND_TOTAL, SWEEP => plan.name).increment(1);
                    info!(sweep = plan.name, resource = %resource, "resource already gone");
                    observer.on_not_found(&resource);
                }
                Ok(Err(err)) => {
                    counter!(SWEEP_RESOURCES_FAILED_TOTAL, SWEEP => plan.name).increment(1);
                    error!(
                        sweep = plan.name,
                        resource = %resource,
                        error = %err,
                        "mutation failed"
                    );
                    observer.on_failed(&resource, &err);

                    if self.config.failure_policy == FailurePolicy::AbortOnFirstError {
                        let abort = sweep_error!(
                            ErrorKind::MutationFailed,
                            "Pass aborted on the first failed mutation",
                            format!("{resource}: {err}")
                        );
                        result.record_failure(resource, err);
                        return Err(PassError::new(result, abort));
                    }

                    result.record_failure(resource, err);
                }
                Err(_) => {
                    // The call was cut off, its effect on the cluster is unknown.
                    let err = sweep_error!(
                        ErrorKind::TimeoutExceeded,
                        "Pass timed out while mutating a resource",
                        &resource
                    );
                    counter!(SWEEP_RESOURCES_FAILED_TOTAL, SWEEP => plan.name).increment(1);
                    warn!(
                        sweep = plan.name,
                        resource = %resource,
                        "pass deadline reached during mutation"
                    );
                    observer.on_failed(&resource, &err);
                    result.record_failure(resource, err.clone());
                    return Err(PassError::new(result, err));
                }
            }
        }

        info!(
            sweep = plan.name,
            matched = result.matched,
            mutated = result.mutated,
            skipped_not_found = result.skipped_not_found,
            failed = result.failed,
            "reconciliation pass finished"
        );

        Ok(result)
    }
}
