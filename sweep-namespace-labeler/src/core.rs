use sweep::k8s::{connect, credential_provider};
use sweep::pass::{PassError, PassResult, ReconciliationPass};
use sweep::plan::SweepPlan;
use sweep::report::StdoutObserver;
use sweep_config::shared::NamespaceLabelerConfig;
use tracing::{info, warn};

/// Merges the configured label into every namespace that is not reserved.
///
/// Existing labels are preserved. Namespaces already carrying the label are not
/// matched, so they are neither patched nor reported.
pub async fn start_namespace_labeler_with_config(
    namespace_labeler_config: NamespaceLabelerConfig,
) -> anyhow::Result<()> {
    info!("starting namespace labeler");

    log_config(&namespace_labeler_config);

    let provider = credential_provider(&namespace_labeler_config.credentials);
    let cluster = connect(provider.as_ref()).await?;

    let plan = SweepPlan::namespace_labeling(&namespace_labeler_config);
    let pass = ReconciliationPass::new(cluster, namespace_labeler_config.pass);

    let result = check_pass_outcome(pass.run(&plan, &StdoutObserver).await)?;

    info!(
        labeled = result.mutated,
        already_gone = result.skipped_not_found,
        "namespace labeling completed"
    );

    Ok(())
}

/// Fails unless every matched namespace was labeled or already gone.
fn check_pass_outcome(outcome: Result<PassResult, PassError>) -> anyhow::Result<PassResult> {
    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            warn!(
                matched = err.partial.matched,
                labeled = err.partial.mutated,
                failed = err.partial.failed,
                "namespace labeling stopped early"
            );
            return Err(err.into());
        }
    };

    if !result.is_clean() {
        anyhow::bail!(
            "{} of {} matched namespaces could not be labeled",
            result.failed,
            result.matched
        );
    }

    Ok(result)
}

fn log_config(config: &NamespaceLabelerConfig) {
    info!(
        timeout_secs = config.pass.timeout_secs,
        failure_policy = ?config.pass.failure_policy,
        credentials = ?config.credentials,
        reserved_namespaces = ?config.reserved_namespaces,
        label_selector = config.label_selector.as_deref(),
        label = %format_args!("{}={}", config.label_key, config.label_value),
        "namespace labeler config"
    );
}
