use sweep::k8s::{connect, credential_provider};
use sweep::pass::{PassError, PassResult, ReconciliationPass};
use sweep::plan::SweepPlan;
use sweep::report::StdoutObserver;
use sweep_config::shared::{PassConfig, PodCleanupConfig};
use tracing::{info, warn};

/// Deletes every finished pod the configuration selects.
///
/// Resolves credentials, runs a single reconciliation pass and fails if the pass did
/// not complete or if any pod could not be deleted. Pods already gone when their
/// delete is issued do not count as failures.
pub async fn start_pod_cleanup_with_config(
    pod_cleanup_config: PodCleanupConfig,
) -> anyhow::Result<()> {
    info!("starting pod cleanup");

    log_config(&pod_cleanup_config);

    let provider = credential_provider(&pod_cleanup_config.credentials);
    let cluster = connect(provider.as_ref()).await?;

    let plan = SweepPlan::pod_cleanup(&pod_cleanup_config);
    let pass = ReconciliationPass::new(cluster, pod_cleanup_config.pass);

    let result = check_pass_outcome(pass.run(&plan, &StdoutObserver).await)?;

    info!(
        deleted = result.mutated,
        already_gone = result.skipped_not_found,
        "pod cleanup completed"
    );

    Ok(())
}

/// Turns the outcome of a pass into the result of the binary.
///
/// A pass that stopped early and a pass with any failed deletion are both errors.
/// Pods already gone count as deleted.
fn check_pass_outcome(outcome: Result<PassResult, PassError>) -> anyhow::Result<PassResult> {
    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            log_partial_result(&err.partial);
            return Err(err.into());
        }
    };

    if !result.is_clean() {
        anyhow::bail!(
            "{} of {} matched pods could not be deleted",
            result.failed,
            result.matched
        );
    }

    Ok(result)
}

fn log_config(config: &PodCleanupConfig) {
    log_pass_config(&config.pass);
    info!(
        credentials = ?config.credentials,
        namespace = config.namespace.as_deref().unwrap_or("<all>"),
        label_selector = config.label_selector.as_deref(),
        field_selector = config.field_selector.as_deref(),
        terminal_phases = ?config.terminal_phases,
        terminal_reasons = ?config.terminal_reasons,
        propagation_policy = ?config.propagation_policy,
        "pod cleanup config"
    );
}

fn log_pass_config(config: &PassConfig) {
    info!(
        timeout_secs = config.timeout_secs,
        failure_policy = ?config.failure_policy,
        "pass config"
    );
}

fn log_partial_result(partial: &PassResult) {
    warn!(
        matched = partial.matched,
        deleted = partial.mutated,
        already_gone = partial.skipped_not_found,
        failed = partial.failed,
        "pod cleanup stopped early, deletions issued so far stay applied"
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sweep::error::ErrorKind;
    use sweep::pass::NoopObserver;
    use sweep::sweep_error;
    use sweep::test_utils::cluster::{MemoryCluster, pod_ref};
    use sweep_config::shared::FailurePolicy;

    use super::*;

    async fn run_cleanup(
        cluster: &MemoryCluster,
        pass_config: PassConfig,
    ) -> anyhow::Result<PassResult> {
        let plan = SweepPlan::pod_cleanup(&PodCleanupConfig::default());
        let pass = ReconciliationPass::new(cluster.clone(), pass_config);

        check_pass_outcome(pass.run(&plan, &NoopObserver).await)
    }

    #[tokio::test]
    async fn empty_cluster_succeeds() {
        let cluster = MemoryCluster::new();

        let result = run_cleanup(&cluster, PassConfig::default()).await.unwrap();

        assert_eq!(result, PassResult::default());
    }

    #[tokio::test]
    async fn pods_already_gone_still_succeed() {
        let cluster = MemoryCluster::new();
        cluster.add_pod("default", "done", "Succeeded").await;
        cluster.vanish_after_listing(pod_ref("default", "done")).await;

        let result = run_cleanup(&cluster, PassConfig::default()).await.unwrap();

        assert_eq!(result.skipped_not_found, 1);
    }

    #[tokio::test]
    async fn failed_delete_under_continue_is_an_error() {
        let cluster = MemoryCluster::new();
        cluster.add_pod("default", "locked", "Failed").await;
        cluster.add_pod("default", "done", "Succeeded").await;
        cluster
            .fail_mutations_of(pod_ref("default", "locked"), ErrorKind::MutationFailed)
            .await;

        let err = run_cleanup(&cluster, PassConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "1 of 2 matched pods could not be deleted");
        // The pass still went on to the next pod.
        assert_eq!(cluster.resources().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_listing_is_an_error() {
        let cluster = MemoryCluster::new();
        cluster
            .fail_next_listing(sweep_error!(ErrorKind::ListingFailed, "Listing refused"))
            .await;

        let err = run_cleanup(&cluster, PassConfig::default())
            .await
            .unwrap_err();

        let pass_error = err.downcast_ref::<PassError>().unwrap();
        assert_eq!(pass_error.kind(), ErrorKind::ListingFailed);
    }

    #[tokio::test]
    async fn abort_on_first_error_is_an_error() {
        let cluster = MemoryCluster::new();
        cluster.add_pod("default", "locked", "Failed").await;
        cluster
            .fail_mutations_of(pod_ref("default", "locked"), ErrorKind::MutationFailed)
            .await;
        let pass_config = PassConfig {
            failure_policy: FailurePolicy::AbortOnFirstError,
            ..PassConfig::default()
        };

        let err = run_cleanup(&cluster, pass_config).await.unwrap_err();

        let pass_error = err.downcast_ref::<PassError>().unwrap();
        assert_eq!(pass_error.kind(), ErrorKind::MutationFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_an_error() {
        let cluster = MemoryCluster::new();
        cluster.add_pod("default", "done", "Succeeded").await;
        cluster.set_list_delay(Duration::from_secs(60)).await;
        let pass_config = PassConfig {
            timeout_secs: 5,
            ..PassConfig::default()
        };

        let err = run_cleanup(&cluster, pass_config).await.unwrap_err();

        let pass_error = err.downcast_ref::<PassError>().unwrap();
        assert_eq!(pass_error.kind(), ErrorKind::TimeoutExceeded);
    }
}
