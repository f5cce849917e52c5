use sweep_config::load_config;
use sweep_config::shared::NamespaceLabelerConfig;

/// Loads the [`NamespaceLabelerConfig`] and validates it.
pub fn load_namespace_labeler_config() -> anyhow::Result<NamespaceLabelerConfig> {
    let config = load_config::<NamespaceLabelerConfig>()?;
    config.validate()?;

    Ok(config)
}
