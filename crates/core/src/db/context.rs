use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::db::{load_resolver_config, open_gadget_cache, GadgetCache, HomeLayout, ResolverConfig};
use crate::services::sources::BuildsDirectory;
use crate::services::{GadgetFetcher, Resolver};
use crate::update::UpdateChecker;

/// Settings that take precedence over `config.json` (CLI flags, env).
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    pub remote_url: Option<String>,
}

/// Convenience wrapper bundling layout, config, the open cache, and a wired resolver.
pub struct ResolverContext {
    pub layout: HomeLayout,
    pub config: ResolverConfig,
    pub cache: GadgetCache,
    pub resolver: Resolver,
}

impl ResolverContext {
    /// Load config, open the cache, and build the source chain for a given home.
    ///
    /// Source order: cache, builds directory, then the remote service when a
    /// URL is configured.
    pub fn from_home(home: impl AsRef<Path>, overrides: ContextOverrides) -> Result<Self> {
        let layout = HomeLayout::new(home);
        let mut config = load_resolver_config(&layout)?;
        if overrides.remote_url.is_some() {
            config.remote_url = overrides.remote_url;
        }
        let cache = open_gadget_cache(&layout)?;

        let builds_dir = match &config.builds_dir {
            Some(dir) => layout.resolve(dir),
            None => layout.builds_dir.clone(),
        };
        let mut fetcher = GadgetFetcher::new()
            .with_source(cache.clone())
            .with_source(BuildsDirectory::new(builds_dir));

        if let Some(url) = &config.remote_url {
            push_remote(&mut fetcher, url, &config);
        }
        debug!(sources = ?fetcher.source_names(), "resolver wired");

        Ok(Self { layout, config, cache, resolver: Resolver::new(fetcher) })
    }

    /// Update checker configured for this home.
    pub fn update_checker(&self) -> UpdateChecker {
        UpdateChecker::new(&self.layout.update_stamp_path, self.config.update_interval_days)
    }
}

#[cfg(feature = "remote")]
fn push_remote(fetcher: &mut GadgetFetcher, url: &str, config: &ResolverConfig) {
    let timeout = std::time::Duration::from_secs(config.timeout_secs);
    fetcher.push_source(Box::new(crate::services::sources::RemoteSource::new(
        url,
        timeout,
        config.max_attempts,
    )));
}

#[cfg(not(feature = "remote"))]
fn push_remote(_fetcher: &mut GadgetFetcher, url: &str, _config: &ResolverConfig) {
    tracing::warn!(url, "built without remote support; ignoring remote_url");
}
