//! Mutations a pass applies to matched resources.

use std::collections::BTreeMap;
use std::fmt;

pub use sweep_config::shared::PropagationPolicy;

/// The side effect applied to every matched resource.
///
/// Both variants are idempotent: deleting an absent resource is reported as "not
/// found", and merging labels that are already present changes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationAction {
    /// Deletes the resource.
    Delete { propagation: PropagationPolicy },
    /// Adds or overwrites the given labels, keeping every other label.
    MergeLabels { labels: BTreeMap<String, String> },
}

impl MutationAction {
    /// Deletes with the given propagation policy.
    pub fn delete(propagation: PropagationPolicy) -> Self {
        MutationAction::Delete { propagation }
    }

    /// Merges a single `key=value` label.
    pub fn merge_label(key: impl Into<String>, value: impl Into<String>) -> Self {
        MutationAction::MergeLabels {
            labels: BTreeMap::from([(key.into(), value.into())]),
        }
    }

    /// Short verb used in logs and metrics labels.
    pub fn verb(&self) -> &'static str {
        match self {
            MutationAction::Delete { .. } => "delete",
            MutationAction::MergeLabels { .. } => "label",
        }
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationAction::Delete { propagation } => {
                write!(f, "delete (propagation {propagation:?})")
            }
            MutationAction::MergeLabels { labels } => {
                f.write_str("merge labels ")?;
                f.write_str(&format_labels(labels))
            }
        }
    }
}

/// Formats labels as `k1=v1,k2=v2`, the label selector syntax.
pub fn format_labels(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}
