use std::sync::Arc;

use sweep_config::Environment;
use sweep_config::shared::NamespaceLabelerConfig;
use sweep_telemetry::init_tracing;
use tracing::{error, info};

use crate::config::load_namespace_labeler_config;
use crate::core::start_namespace_labeler_with_config;

mod config;
mod core;

fn main() -> anyhow::Result<()> {
    // Load namespace labeler config
    let namespace_labeler_config = load_namespace_labeler_config()?;

    // Initialize tracing, tagging JSON lines with the cluster name if one is set
    let _log_flusher = init_tracing(
        env!("CARGO_BIN_NAME"),
        namespace_labeler_config.cluster_name.clone(),
    )?;

    // Initialize Sentry before the async runtime starts
    let _sentry_guard = init_sentry(&namespace_labeler_config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(namespace_labeler_config))?;

    Ok(())
}

async fn async_main(namespace_labeler_config: NamespaceLabelerConfig) -> anyhow::Result<()> {
    if let Err(err) = start_namespace_labeler_with_config(namespace_labeler_config).await {
        let source: &dyn std::error::Error = err.as_ref();
        sentry::capture_error(source);
        error!("namespace labeling did not complete: {err:#}");

        return Err(err);
    }

    Ok(())
}

/// Initializes Sentry if a DSN is configured.
///
/// Errors and panics are tagged with the "namespace-labeler" service.
fn init_sentry(
    config: &NamespaceLabelerConfig,
) -> anyhow::Result<Option<sentry::ClientInitGuard>> {
    let Some(sentry_config) = &config.sentry else {
        info!("sentry not configured for namespace labeler, skipping initialization");
        return Ok(None);
    };

    info!("initializing sentry with supplied dsn");

    let environment = Environment::load()?;
    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(sentry_config.dsn.parse()?),
        environment: Some(environment.to_string().into()),
        integrations: vec![Arc::new(
            sentry::integrations::panic::PanicIntegration::new(),
        )],
        ..Default::default()
    });

    sentry::configure_scope(|scope| {
        scope.set_tag("service", "namespace-labeler");
    });

    Ok(Some(guard))
}
