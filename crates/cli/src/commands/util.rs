use std::path::Path;

use anyhow::Result;
use gadget_core::db::{ContextOverrides, ResolverContext};

/// Open the resolver context for `home`, applying CLI overrides.
pub fn open_context(home: &Path, remote_url: Option<String>) -> Result<ResolverContext> {
    ResolverContext::from_home(home, ContextOverrides { remote_url })
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Offsets as space-separated decimal numbers.
pub fn format_offsets(offsets: &[u64]) -> String {
    offsets.iter().map(u64::to_string).collect::<Vec<_>>().join(" ")
}
