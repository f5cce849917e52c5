//! Bulk maintenance sweeps for Kubernetes clusters.
//!
//! A sweep is a single reconciliation pass: list resources once, keep the ones
//! matching a [`criterion::SelectionCriterion`], apply a [`action::MutationAction`]
//! to each and report the outcome as a [`pass::PassResult`]. Two plans ship with the
//! crate, see [`plan::SweepPlan::pod_cleanup`] and
//! [`plan::SweepPlan::namespace_labeling`].

pub mod action;
pub mod cluster;
pub mod criterion;
pub mod error;
pub mod k8s;
mod macros;
pub mod metrics;
pub mod pass;
pub mod plan;
pub mod report;
pub mod resource;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
