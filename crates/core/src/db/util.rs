use anyhow::{Context, Result};

use crate::db::{GadgetCache, HomeLayout, ResolverConfig};

/// Load the resolver config JSON for a given layout; a missing file yields defaults.
pub fn load_resolver_config(layout: &HomeLayout) -> Result<ResolverConfig> {
    if !layout.config_path.exists() {
        return Ok(ResolverConfig::default());
    }
    let config_json = std::fs::read_to_string(&layout.config_path).with_context(|| {
        format!("Failed to read resolver config at {}", layout.config_path.display())
    })?;
    let config: ResolverConfig =
        serde_json::from_str(&config_json).context("Failed to parse resolver config JSON")?;
    Ok(config)
}

/// Write `config` as pretty JSON to the layout's config path.
pub fn write_resolver_config(layout: &HomeLayout, config: &ResolverConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&layout.config_path, json).with_context(|| {
        format!("Failed to write resolver config: {}", layout.config_path.display())
    })?;
    Ok(())
}

/// Open the gadget cache for a layout, creating the home directory if needed.
pub fn open_gadget_cache(layout: &HomeLayout) -> Result<GadgetCache> {
    std::fs::create_dir_all(&layout.root)
        .with_context(|| format!("Failed to create home dir: {}", layout.root.display()))?;
    GadgetCache::open(&layout.cache_db_path).with_context(|| {
        format!("Failed to open gadget cache at {}", layout.cache_db_path.display())
    })
}
