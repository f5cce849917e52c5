use sweep_config::load_config;
use sweep_config::shared::PodCleanupConfig;

/// Loads the [`PodCleanupConfig`] and validates it.
pub fn load_pod_cleanup_config() -> anyhow::Result<PodCleanupConfig> {
    let config = load_config::<PodCleanupConfig>()?;
    config.validate()?;

    Ok(config)
}
