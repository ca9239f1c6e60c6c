use std::path::{Path, PathBuf};

/// Logical layout of a resolver home directory on disk.
///
/// This is derived from a chosen home path. It does *not* perform any IO itself.
/// The CLI or other frontends are responsible for actually creating directories
/// and files based on this layout.
#[derive(Debug, Clone)]
pub struct HomeLayout {
    /// Root of the home directory.
    pub root: PathBuf,
    /// Path to the resolver config file (JSON).
    pub config_path: PathBuf,
    /// Path to the SQLite gadget cache.
    pub cache_db_path: PathBuf,
    /// Default directory for build files (`<name>-<build_id>.json|yaml`).
    pub builds_dir: PathBuf,
    /// File recording when the last update check ran.
    pub update_stamp_path: PathBuf,
}

impl HomeLayout {
    /// Compute the default layout for a home rooted at `root`.
    ///
    /// This does *not* touch the filesystem.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let config_path = root.join("config.json");
        let cache_db_path = root.join("gadgets.db");
        let builds_dir = root.join("builds");
        let update_stamp_path = root.join("update-stamp");

        Self { root, config_path, cache_db_path, builds_dir, update_stamp_path }
    }

    /// Resolve a configured path: absolute paths are kept, relative ones are
    /// taken relative to the home root.
    pub fn resolve(&self, configured: &str) -> PathBuf {
        let p = Path::new(configured);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }
}
