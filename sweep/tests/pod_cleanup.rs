use sweep::error::ErrorKind;
use sweep::pass::{NoopObserver, ReconciliationPass};
use sweep::plan::SweepPlan;
use sweep::test_utils::cluster::{MemoryCluster, pod_ref};
use sweep::test_utils::observer::{ObservedEvent, RecordingObserver};
use sweep_config::shared::{PassConfig, PodCleanupConfig, PropagationPolicy};
use sweep_telemetry::init_test_tracing;

fn pass(cluster: &MemoryCluster) -> ReconciliationPass<MemoryCluster> {
    ReconciliationPass::new(cluster.clone(), PassConfig::default())
}

#[tokio::test]
async fn deletes_succeeded_and_failed_pods_only() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster.add_pod("default", "a", "Running").await;
    cluster.add_pod("default", "b", "Succeeded").await;
    cluster.add_pod("default", "c", "Failed").await;

    let plan = SweepPlan::pod_cleanup(&PodCleanupConfig::default());
    let observer = RecordingObserver::new();
    let result = pass(&cluster).run(&plan, &observer).await.unwrap();

    assert_eq!(result.matched, 2);
    assert_eq!(result.mutated, 2);
    assert_eq!(result.failed, 0);
    assert!(result.is_clean());
    assert_eq!(observer.mutated_names(), vec!["b", "c"]);

    let remaining = cluster.resources().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].resource, pod_ref("default", "a"));
}

#[tokio::test]
async fn deletes_with_foreground_propagation() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster.add_pod("jobs", "done", "Succeeded").await;

    let plan = SweepPlan::pod_cleanup(&PodCleanupConfig::default());
    pass(&cluster).run(&plan, &NoopObserver).await.unwrap();

    let mutations = cluster.mutations().await;
    assert_eq!(mutations.len(), 1);
    assert_eq!(
        mutations[0].1,
        sweep::action::MutationAction::delete(PropagationPolicy::Foreground)
    );
}

#[tokio::test]
async fn evicted_pods_are_detected_through_their_reason() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster
        .add_pod_with_reason("default", "evicted", "Failed", "Evicted")
        .await;
    cluster.add_pod("default", "running", "Running").await;

    // Only the reason marks the pod as terminal here.
    let config = PodCleanupConfig {
        terminal_phases: vec!["Succeeded".to_owned()],
        ..PodCleanupConfig::default()
    };
    let plan = SweepPlan::pod_cleanup(&config);
    let result = pass(&cluster).run(&plan, &NoopObserver).await.unwrap();

    assert_eq!(result.matched, 1);
    assert!(cluster.get(&pod_ref("default", "evicted")).await.is_none());
}

#[tokio::test]
async fn pods_gone_before_deletion_are_skipped_not_failed() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster.add_pod("default", "b", "Succeeded").await;
    cluster.add_pod("default", "c", "Failed").await;
    cluster.vanish_after_listing(pod_ref("default", "b")).await;

    let plan = SweepPlan::pod_cleanup(&PodCleanupConfig::default());
    let observer = RecordingObserver::new();
    let result = pass(&cluster).run(&plan, &observer).await.unwrap();

    assert_eq!(result.matched, 2);
    assert_eq!(result.mutated, 1);
    assert_eq!(result.skipped_not_found, 1);
    assert_eq!(result.failed, 0);
    assert_eq!(
        observer.events(),
        vec![
            ObservedEvent::NotFound(pod_ref("default", "b")),
            ObservedEvent::Mutated(pod_ref("default", "c")),
        ]
    );
}

#[tokio::test]
async fn second_run_finds_nothing_left_to_delete() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster.add_pod("default", "a", "Running").await;
    cluster.add_pod("default", "b", "Succeeded").await;

    let plan = SweepPlan::pod_cleanup(&PodCleanupConfig::default());
    let pass = pass(&cluster);

    let first = pass.run(&plan, &NoopObserver).await.unwrap();
    let second = pass.run(&plan, &NoopObserver).await.unwrap();

    assert_eq!(first.mutated, 1);
    assert_eq!(second.matched, 0);
    assert_eq!(second.mutated, 0);
    assert!(second.is_clean());
}

#[tokio::test]
async fn scoped_cleanup_leaves_other_namespaces_alone() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster.add_pod("ci", "build-1", "Succeeded").await;
    cluster.add_pod("prod", "migration-1", "Succeeded").await;

    let config = PodCleanupConfig {
        namespace: Some("ci".to_owned()),
        ..PodCleanupConfig::default()
    };
    let plan = SweepPlan::pod_cleanup(&config);
    let result = pass(&cluster).run(&plan, &NoopObserver).await.unwrap();

    assert_eq!(result.mutated, 1);
    assert!(cluster.get(&pod_ref("prod", "migration-1")).await.is_some());
}

#[tokio::test]
async fn forbidden_delete_is_recorded_as_failure() {
    init_test_tracing();
    let cluster = MemoryCluster::new();
    cluster.add_pod("locked", "b", "Succeeded").await;
    cluster
        .fail_mutations_of(pod_ref("locked", "b"), ErrorKind::MutationFailed)
        .await;

    let plan = SweepPlan::pod_cleanup(&PodCleanupConfig::default());
    let result = pass(&cluster).run(&plan, &NoopObserver).await.unwrap();

    assert_eq!(result.failed, 1);
    assert!(!result.is_clean());
    assert_eq!(result.failures[0].0, pod_ref("locked", "b"));
    assert_eq!(result.failures[0].1.kind(), ErrorKind::MutationFailed);
}
