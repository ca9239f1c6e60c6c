pub mod builds_dir;
#[cfg(feature = "remote")]
pub mod remote;

use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::db::GadgetCache;
use crate::model::{BuildId, BuildRecord, GadgetSet};
use crate::services::fetcher::{GadgetSource, Locality, StoreError, StoreResult};

pub use builds_dir::BuildsDirectory;
#[cfg(feature = "remote")]
pub use remote::RemoteSource;

impl GadgetSource for GadgetCache {
    fn name(&self) -> &str {
        "cache"
    }

    fn locality(&self) -> Locality {
        Locality::Local
    }

    fn lookup_build_id(&self, build_id: &BuildId) -> StoreResult<Option<GadgetSet>> {
        Ok(self.load_build(build_id)?.map(|record| record.gadgets))
    }
}

/// Read a build file; YAML unless the extension is `.json`.
pub fn read_build_file(path: &Path) -> StoreResult<BuildRecord> {
    let bytes = fs::read(path)?;
    let parsed = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_slice(&bytes).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_slice(&bytes).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| StoreError::Corrupt { location: path.display().to_string(), reason })
}

/// Compute the SHA-256 hash of a file and return it as a hex string.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
