use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod commands;

/// Directory name used under the user's home when no home is given.
pub const DEFAULT_HOME_DIR: &str = ".one_gadget";

/// Make `path` absolute, canonicalizing it when it already exists.
pub fn canonicalize_or_current(path: &str) -> Result<PathBuf> {
    let path = Path::new(path);
    if path == Path::new(".") {
        Ok(env::current_dir().context("Failed to get current directory")?)
    } else {
        // The home may not exist yet (e.g. before init-home).
        match path.canonicalize() {
            Ok(p) => Ok(p),
            Err(_) if path.is_absolute() => Ok(path.to_path_buf()),
            Err(_) => {
                let cwd = env::current_dir().context("Failed to get current directory")?;
                Ok(cwd.join(path))
            }
        }
    }
}

/// Pick the resolver home: the explicit value (flag or `ONE_GADGET_HOME`),
/// else `~/.one_gadget`.
pub fn resolve_home(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(home) => canonicalize_or_current(home),
        None => default_home_from(dirs::home_dir()),
    }
}

/// Default home given the user's home directory, if known.
pub fn default_home_from(user_home: Option<PathBuf>) -> Result<PathBuf> {
    let user_home = user_home
        .filter(|h| !h.as_os_str().is_empty())
        .context("Failed to determine home directory; pass --home or set ONE_GADGET_HOME")?;
    Ok(user_home.join(DEFAULT_HOME_DIR))
}
