use std::path::Path;

use anyhow::{anyhow, Context, Result};
use gadget_core::db::ResolverContext;
use gadget_core::model::BuildRecord;
use gadget_core::services::sources::read_build_file;

/// Load a JSON/YAML build file into the gadget cache.
pub fn import_build_command(ctx: &ResolverContext, path: &str) -> Result<BuildRecord> {
    let file = Path::new(path);
    if !file.is_file() {
        return Err(anyhow!("Build file does not exist: {}", file.display()));
    }

    let mut record = read_build_file(file)
        .with_context(|| format!("Failed to read build file {}", file.display()))?;
    if record.name.is_none() {
        record.name = infer_build_name(file, &record);
    }

    ctx.cache.insert_build(&record).context("Failed to insert build into cache")?;

    println!("Imported build:");
    println!("  Build id: {}", record.build_id);
    println!("  Name: {}", record.name.as_deref().unwrap_or("(none)"));
    println!("  Gadgets: {}", record.gadgets.len());
    println!("  Cache: {}", ctx.layout.cache_db_path.display());

    Ok(record)
}

/// Name a build after its file, minus the `-<build_id>` suffix.
///
/// Files named by the bare build id carry no name.
pub fn infer_build_name(path: &Path, record: &BuildRecord) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let suffix = format!("-{}", record.build_id);
    let name = stem.strip_suffix(&suffix).unwrap_or(stem);
    if name.is_empty() || name == record.build_id.as_str() {
        None
    } else {
        Some(name.to_string())
    }
}

/// List all builds in the gadget cache.
pub fn list_builds_command(ctx: &ResolverContext, json: bool) -> Result<()> {
    let builds = ctx.cache.list_builds().context("Failed to list builds")?;

    if json {
        let serialized = serde_json::to_string_pretty(&builds)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Builds:");
    if builds.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for build in builds {
        println!(
            "- {} (name: {}, gadgets: {}, imported: {})",
            build.build_id,
            build.name.as_deref().unwrap_or("(unnamed)"),
            build.gadget_count,
            build.imported_at
        );
    }

    Ok(())
}
