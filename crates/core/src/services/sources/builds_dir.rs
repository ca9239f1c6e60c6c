use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{BuildId, GadgetSet};
use crate::services::fetcher::{GadgetSource, Locality, StoreError, StoreResult};
use crate::services::sources::read_build_file;

const BUILD_FILE_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Directory of shipped build files, one per known build.
///
/// Files are named `<name>-<build_id>.<ext>` (or just `<build_id>.<ext>`), and
/// the build id inside the file must agree with the file name.
#[derive(Debug, Clone)]
pub struct BuildsDirectory {
    root: PathBuf,
}

impl BuildsDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build files whose name ends in `build_id`, sorted by path.
    fn candidates(&self, build_id: &BuildId) -> StoreResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let suffix = format!("-{build_id}");
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let ext_ok = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| BUILD_FILE_EXTENSIONS.contains(&e));
            let stem_ok = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s == build_id.as_str() || s.ends_with(&suffix));
            if ext_ok && stem_ok && path.is_file() {
                out.push(path);
            }
        }
        out.sort();
        Ok(out)
    }
}

impl GadgetSource for BuildsDirectory {
    fn name(&self) -> &str {
        "builds-dir"
    }

    fn locality(&self) -> Locality {
        Locality::Local
    }

    fn lookup_build_id(&self, build_id: &BuildId) -> StoreResult<Option<GadgetSet>> {
        let Some(path) = self.candidates(build_id)?.into_iter().next() else {
            return Ok(None);
        };
        let record = read_build_file(&path)?;
        if record.build_id != *build_id {
            return Err(StoreError::Corrupt {
                location: path.display().to_string(),
                reason: format!("file declares build id {}", record.build_id),
            });
        }
        Ok(Some(record.gadgets))
    }
}
