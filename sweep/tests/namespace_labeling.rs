use std::collections::BTreeMap;

use sweep::pass::{NoopObserver, ReconciliationPass};
use sweep::plan::SweepPlan;
use sweep::test_utils::cluster::{MemoryCluster, namespace_ref};
use sweep::test_utils::observer::RecordingObserver;
use sweep_config::shared::{NamespaceLabelerConfig, PassConfig};
use sweep_telemetry::init_test_tracing;

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[tokio::test]
async fn labels_every_namespace_except_kube_system() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster.add_namespace("kube-system").await;
    cluster.add_namespace("default").await;
    cluster.add_namespace("billing").await;

    let plan = SweepPlan::namespace_labeling(&NamespaceLabelerConfig::default());
    let observer = RecordingObserver::new();
    let pass = ReconciliationPass::new(cluster.clone(), PassConfig::default());
    let result = pass.run(&plan, &observer).await.unwrap();

    assert_eq!(result.matched, 2);
    assert_eq!(result.mutated, 2);
    assert_eq!(observer.mutated_names(), vec!["default", "billing"]);
    assert_eq!(
        cluster.labels_of(&namespace_ref("default")).await.unwrap(),
        labels(&[("test", "true")])
    );
    assert_eq!(
        cluster.labels_of(&namespace_ref("billing")).await.unwrap(),
        labels(&[("test", "true")])
    );
    assert!(
        cluster
            .labels_of(&namespace_ref("kube-system"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn existing_labels_are_preserved() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster
        .add_namespace_with_labels("payments", &[("env", "prod")])
        .await;

    let plan = SweepPlan::namespace_labeling(&NamespaceLabelerConfig::default());
    let pass = ReconciliationPass::new(cluster.clone(), PassConfig::default());
    pass.run(&plan, &NoopObserver).await.unwrap();

    assert_eq!(
        cluster.labels_of(&namespace_ref("payments")).await.unwrap(),
        labels(&[("env", "prod"), ("test", "true")])
    );
}

#[tokio::test]
async fn second_run_has_nothing_left_to_label() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster.add_namespace("kube-system").await;
    cluster.add_namespace("default").await;
    cluster.add_namespace("billing").await;

    let plan = SweepPlan::namespace_labeling(&NamespaceLabelerConfig::default());
    let pass = ReconciliationPass::new(cluster.clone(), PassConfig::default());

    let first = pass.run(&plan, &NoopObserver).await.unwrap();
    let after_first = cluster.labels_of(&namespace_ref("default")).await;
    let observer = RecordingObserver::new();
    let second = pass.run(&plan, &observer).await.unwrap();
    let after_second = cluster.labels_of(&namespace_ref("default")).await;

    assert_eq!(first.matched, 2);
    assert_eq!(first.mutated, 2);
    assert_eq!(second.matched, 0);
    assert_eq!(second.mutated, 0);
    assert!(second.is_clean());
    assert!(observer.events().is_empty());
    assert_eq!(after_first, after_second);
    assert_eq!(cluster.mutations().await.len(), 2);
}

#[tokio::test]
async fn already_labeled_namespaces_are_not_matched() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster
        .add_namespace_with_labels("default", &[("test", "true")])
        .await;
    cluster
        .add_namespace_with_labels("staging", &[("test", "false")])
        .await;

    let plan = SweepPlan::namespace_labeling(&NamespaceLabelerConfig::default());
    let observer = RecordingObserver::new();
    let pass = ReconciliationPass::new(cluster.clone(), PassConfig::default());
    let result = pass.run(&plan, &observer).await.unwrap();

    assert_eq!(result.matched, 1);
    assert_eq!(result.mutated, 1);
    assert_eq!(observer.mutated_names(), vec!["staging"]);
    assert_eq!(
        cluster.labels_of(&namespace_ref("staging")).await.unwrap(),
        labels(&[("test", "true")])
    );
}

#[tokio::test]
async fn custom_label_and_reserved_namespaces() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster.add_namespace("kube-system").await;
    cluster.add_namespace("kube-public").await;
    cluster.add_namespace("team-a").await;

    let config = NamespaceLabelerConfig {
        reserved_namespaces: vec!["kube-system".to_owned(), "kube-public".to_owned()],
        label_key: "sweep.example.com/owner".to_owned(),
        label_value: "platform".to_owned(),
        ..NamespaceLabelerConfig::default()
    };
    let plan = SweepPlan::namespace_labeling(&config);
    let pass = ReconciliationPass::new(cluster.clone(), PassConfig::default());
    let result = pass.run(&plan, &NoopObserver).await.unwrap();

    assert_eq!(result.matched, 1);
    assert_eq!(
        cluster.labels_of(&namespace_ref("team-a")).await.unwrap(),
        labels(&[("sweep.example.com/owner", "platform")])
    );
}

#[tokio::test]
async fn namespace_deleted_mid_pass_is_skipped() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster.add_namespace("ephemeral").await;
    cluster.add_namespace("default").await;
    cluster.vanish_after_listing(namespace_ref("ephemeral")).await;

    let plan = SweepPlan::namespace_labeling(&NamespaceLabelerConfig::default());
    let pass = ReconciliationPass::new(cluster.clone(), PassConfig::default());
    let result = pass.run(&plan, &NoopObserver).await.unwrap();

    assert_eq!(result.matched, 2);
    assert_eq!(result.mutated, 1);
    assert_eq!(result.skipped_not_found, 1);
    assert!(result.is_clean());
}
