//! Predicates deciding which listed resources a pass mutates.

use std::collections::{BTreeMap, BTreeSet};

use crate::resource::Candidate;

/// A pure predicate over a listed resource.
///
/// Criteria must not have side effects: the pass evaluates each exactly once per
/// candidate, in listing order. Closures taking a [`Candidate`] are criteria too.
pub trait SelectionCriterion {
    fn matches(&self, candidate: &Candidate) -> bool;

    /// Matches candidates accepted by both `self` and `other`.
    fn and<T>(self, other: T) -> And<Self, T>
    where
        Self: Sized,
        T: SelectionCriterion,
    {
        And {
            first: self,
            second: other,
        }
    }
}

impl<F> SelectionCriterion for F
where
    F: Fn(&Candidate) -> bool,
{
    fn matches(&self, candidate: &Candidate) -> bool {
        self(candidate)
    }
}

/// Matches pods whose phase or status reason marks them as finished.
///
/// `reasons` catches pods such as evicted ones, whose terminal signal is carried by
/// `status.reason` rather than by `status.phase`.
#[derive(Debug, Clone)]
pub struct TerminalPodCriterion {
    phases: BTreeSet<String>,
    reasons: BTreeSet<String>,
}

impl TerminalPodCriterion {
    pub fn new<P, R>(phases: P, reasons: R) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            phases: phases.into_iter().map(Into::into).collect(),
            reasons: reasons.into_iter().map(Into::into).collect(),
        }
    }
}

impl SelectionCriterion for TerminalPodCriterion {
    fn matches(&self, candidate: &Candidate) -> bool {
        let state = &candidate.state;

        state
            .phase
            .as_ref()
            .is_some_and(|phase| self.phases.contains(phase))
            || state
                .reason
                .as_ref()
                .is_some_and(|reason| self.reasons.contains(reason))
    }
}

/// Matches every resource whose name is not reserved.
#[derive(Debug, Clone)]
pub struct NamespaceExclusionCriterion {
    reserved: BTreeSet<String>,
}

impl NamespaceExclusionCriterion {
    pub fn new<I>(reserved: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            reserved: reserved.into_iter().map(Into::into).collect(),
        }
    }
}

impl SelectionCriterion for NamespaceExclusionCriterion {
    fn matches(&self, candidate: &Candidate) -> bool {
        !self.reserved.contains(candidate.resource.name())
    }
}

/// Matches resources missing at least one of the given labels, or carrying it with
/// another value.
///
/// Resources already holding every label are left out, so a second labeling pass on
/// an unchanged cluster has nothing to do.
#[derive(Debug, Clone)]
pub struct MissingLabelsCriterion {
    labels: BTreeMap<String, String>,
}

impl MissingLabelsCriterion {
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }
}

impl SelectionCriterion for MissingLabelsCriterion {
    fn matches(&self, candidate: &Candidate) -> bool {
        let current = &candidate.state.labels;

        self.labels
            .iter()
            .any(|(key, value)| current.get(key) != Some(value))
    }
}

/// Conjunction of two criteria, built with [`SelectionCriterion::and`].
#[derive(Debug, Clone)]
pub struct And<A, B> {
    first: A,
    second: B,
}

impl<A, B> SelectionCriterion for And<A, B>
where
    A: SelectionCriterion,
    B: SelectionCriterion,
{
    fn matches(&self, candidate: &Candidate) -> bool {
        self.first.matches(candidate) && self.second.matches(candidate)
    }
}
