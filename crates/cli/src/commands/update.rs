use std::time::Duration;

use anyhow::Result;
use gadget_core::db::ResolverContext;
use gadget_core::update::{HttpVersionSource, UpdateStatus};

/// Run the update check now, or turn checks off with `disable`.
pub fn check_update_command(ctx: &ResolverContext, disable: bool) -> Result<()> {
    let checker = ctx.update_checker();

    if disable {
        checker.disable()?;
        println!("Update checks disabled ({}).", checker.stamp_path().display());
        return Ok(());
    }

    let Some(url) = ctx.config.update_url.as_deref() else {
        println!("No update_url configured in {}.", ctx.layout.config_path.display());
        return Ok(());
    };

    let source = HttpVersionSource::new(url, Duration::from_secs(ctx.config.timeout_secs));
    let status = checker.check(&source)?;
    println!("{}", describe_update(&status));
    Ok(())
}

/// One-line, human-readable summary of an update check.
pub fn describe_update(status: &UpdateStatus) -> String {
    match status {
        UpdateStatus::Disabled => "Update checks are disabled.".to_string(),
        UpdateStatus::Skipped { last_checked } => {
            format!("Skipped: last checked at {}.", last_checked.to_rfc3339())
        }
        UpdateStatus::UpToDate { current } => format!("one-gadget {current} is up to date."),
        UpdateStatus::UpdateAvailable { current, latest } => {
            format!("A newer version is available: {latest} (installed: {current}).")
        }
        UpdateStatus::Unavailable { reason } => format!("Could not check for updates: {reason}"),
    }
}
