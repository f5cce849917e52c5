use std::collections::BTreeMap;

use sweep_config::shared::{NamespaceLabelerConfig, PodCleanupConfig};

use crate::action::MutationAction;
use crate::criterion::{
    And, MissingLabelsCriterion, NamespaceExclusionCriterion, SelectionCriterion,
    TerminalPodCriterion,
};
use crate::resource::{ListFilter, ListRequest, ResourceKind, Scope};

/// What a reconciliation pass lists, which listed resources it keeps and what it
/// does to them.
#[derive(Debug, Clone)]
pub struct SweepPlan<S> {
    /// Name used in logs and as metrics label.
    pub name: &'static str,
    pub request: ListRequest,
    pub criterion: S,
    pub action: MutationAction,
}

impl SweepPlan<TerminalPodCriterion> {
    /// Deletes finished pods, across all namespaces unless one is configured.
    pub fn pod_cleanup(config: &PodCleanupConfig) -> Self {
        Self {
            name: "pod_cleanup",
            request: ListRequest {
                kind: ResourceKind::Pod,
                scope: Scope::from_namespace(config.namespace.as_deref()),
                filter: ListFilter {
                    label_selector: config.label_selector.clone(),
                    field_selector: config.field_selector.clone(),
                },
            },
            criterion: TerminalPodCriterion::new(
                config.terminal_phases.iter().cloned(),
                config.terminal_reasons.iter().cloned(),
            ),
            action: MutationAction::delete(config.propagation_policy),
        }
    }
}

/// Criterion of the namespace labeling plan: not reserved and not labeled yet.
pub type NamespaceLabelingCriterion = And<NamespaceExclusionCriterion, MissingLabelsCriterion>;

impl SweepPlan<NamespaceLabelingCriterion> {
    /// Merges the configured label into every namespace that is not reserved and
    /// does not carry it already.
    pub fn namespace_labeling(config: &NamespaceLabelerConfig) -> Self {
        let labels = BTreeMap::from([(config.label_key.clone(), config.label_value.clone())]);

        Self {
            name: "namespace_labeling",
            request: ListRequest {
                kind: ResourceKind::Namespace,
                scope: Scope::AllNamespaces,
                filter: ListFilter {
                    label_selector: config.label_selector.clone(),
                    field_selector: None,
                },
            },
            criterion: NamespaceExclusionCriterion::new(config.reserved_namespaces.iter().cloned())
                .and(MissingLabelsCriterion::new(labels.clone())),
            action: MutationAction::MergeLabels { labels },
        }
    }
}
