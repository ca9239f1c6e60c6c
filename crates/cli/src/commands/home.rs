use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gadget_core::db::{open_gadget_cache, write_resolver_config, HomeLayout, ResolverConfig};

use crate::commands::print_dir_status;

/// Create the home layout: directories, default config (unless one exists), and the cache.
pub fn init_home_command(home: &Path) -> Result<HomeLayout> {
    let layout = HomeLayout::new(home);

    fs::create_dir_all(&layout.root)
        .with_context(|| format!("Failed to create home dir: {}", layout.root.display()))?;
    fs::create_dir_all(&layout.builds_dir).with_context(|| {
        format!("Failed to create builds dir: {}", layout.builds_dir.display())
    })?;

    let wrote_config = if layout.config_path.exists() {
        false
    } else {
        write_resolver_config(&layout, &ResolverConfig::default())?;
        true
    };

    // Create the cache now so later commands can rely on its presence.
    open_gadget_cache(&layout)?;

    println!("Initialized one-gadget home:");
    println!("  Root: {}", layout.root.display());
    println!(
        "  Config: {}{}",
        layout.config_path.display(),
        if wrote_config { "" } else { " (kept existing)" }
    );
    println!("  Cache: {}", layout.cache_db_path.display());
    print_dir_status("Builds dir", &layout.builds_dir);

    Ok(layout)
}
