use std::path::PathBuf;

use anyhow::{Context, Result};
use gadget_core::db::ResolverContext;
use gadget_core::services::{Resolution, ResolutionRequest, ResolveOptions};

use crate::commands::format_offsets;

/// Arguments of the `resolve` command, as parsed by clap.
#[derive(Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Positional build id or file path.
    pub target: Option<String>,
    pub build_id: Option<String>,
    pub file: Option<String>,
    pub force_file: bool,
    pub level: i32,
    /// Print bare decimal offsets instead of gadget details.
    pub raw: bool,
    pub json: bool,
}

impl ResolveArgs {
    /// Turn CLI arguments into a request. The positional target is only
    /// classified when neither `--build-id` nor `--file` is given.
    pub fn to_request(&self) -> ResolutionRequest {
        let explicit = self.build_id.is_some() || self.file.is_some();
        let classified =
            self.target.as_deref().filter(|_| !explicit).map(ResolutionRequest::from_target);
        let (target_id, target_file) = match classified {
            Some(req) => (req.build_id, req.file),
            None => (None, None),
        };
        ResolutionRequest {
            build_id: self.build_id.clone().or(target_id),
            file: self.file.as_ref().map(PathBuf::from).or(target_file),
            options: ResolveOptions { details: !self.raw, force_file: self.force_file, level: self.level },
        }
    }
}

/// Resolve a target and print the result.
pub fn resolve_command(ctx: &ResolverContext, args: &ResolveArgs) -> Result<()> {
    let resolution = ctx.resolver.resolve(&args.to_request())?;
    println!("{}", render_resolution(&resolution, args.json)?);
    Ok(())
}

/// Render a resolution for stdout.
pub fn render_resolution(resolution: &Resolution, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(resolution)
            .context("Failed to serialize resolution to JSON");
    }
    Ok(match resolution {
        Resolution::Offsets(offsets) => format_offsets(offsets),
        Resolution::Gadgets(gadgets) => {
            gadgets.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n\n")
        }
    })
}
