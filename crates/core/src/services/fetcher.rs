use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::db::DbError;
use crate::model::{BuildId, GadgetSet};

/// Errors raised by gadget sources.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    /// Stored gadget data exists but cannot be used.
    #[error("Corrupt gadget data at {location}: {reason}")]
    Corrupt { location: String, reason: String },

    /// Network or remote-service failure. Collapsed to "absent" by the fetcher.
    #[error("Transport error from {origin}: {message}")]
    Transport { origin: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Transport { .. })
    }
}

/// Convenience result type for source lookups.
pub type StoreResult<T> = Result<T, StoreError>;

/// Where a source keeps its data. Local sources are always consulted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    Local,
    Remote,
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locality::Local => "local",
            Locality::Remote => "remote",
        })
    }
}

/// Trait implemented by gadget data sources (SQLite cache, build files, remote service).
///
/// Lookups are read-only and idempotent. `Ok(None)` means "no entry".
pub trait GadgetSource: Send + Sync {
    fn name(&self) -> &str;
    fn locality(&self) -> Locality;
    fn lookup_build_id(&self, build_id: &BuildId) -> StoreResult<Option<GadgetSet>>;

    /// Content-keyed lookup. Sources that cannot match on file content return `Ok(None)`.
    fn lookup_content(&self, _path: &Path) -> StoreResult<Option<GadgetSet>> {
        Ok(None)
    }
}

/// Ordered list of gadget sources.
///
/// Build-id lookups visit every local source before any remote one, in
/// registration order within each group. New sources are appended with
/// [`GadgetFetcher::with_source`].
#[derive(Default)]
pub struct GadgetFetcher {
    sources: Vec<Box<dyn GadgetSource>>,
}

impl GadgetFetcher {
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    pub fn with_source<S: GadgetSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn push_source(&mut self, source: Box<dyn GadgetSource>) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Registered source names, in registration order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Look up a build by id: local sources first, then remote ones when `allow_remote`.
    pub fn by_build_id(
        &self,
        build_id: &BuildId,
        allow_remote: bool,
    ) -> StoreResult<Option<GadgetSet>> {
        for locality in [Locality::Local, Locality::Remote] {
            if locality == Locality::Remote && !allow_remote {
                break;
            }
            for source in self.sources.iter().filter(|s| s.locality() == locality) {
                debug!(source = source.name(), %locality, %build_id, "looking up build id");
                if let Some(set) = collapse(source.as_ref(), source.lookup_build_id(build_id))? {
                    debug!(source = source.name(), count = set.len(), "build id found");
                    return Ok(Some(set));
                }
            }
        }
        Ok(None)
    }

    /// Look up a build by the content of `path`.
    pub fn by_file(&self, path: &Path) -> StoreResult<Option<GadgetSet>> {
        for source in &self.sources {
            debug!(source = source.name(), path = %path.display(), "looking up file content");
            if let Some(set) = collapse(source.as_ref(), source.lookup_content(path))? {
                return Ok(Some(set));
            }
        }
        Ok(None)
    }
}

fn collapse(
    source: &dyn GadgetSource,
    result: StoreResult<Option<GadgetSet>>,
) -> StoreResult<Option<GadgetSet>> {
    match result {
        Err(e) if e.is_transport() => {
            warn!(source = source.name(), error = %e, "lookup failed; treating as absent");
            Ok(None)
        }
        other => other,
    }
}
