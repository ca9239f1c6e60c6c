use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::identity::{ElfBuildIdExtractor, IdentityExtractor};
use crate::model::{BuildId, Gadget, GadgetSet, InvalidBuildId};
use crate::services::fetcher::{GadgetFetcher, StoreError, StoreResult};
use crate::services::refine::refine;

/// Key that was queried when a resolution came up empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    BuildId(BuildId),
    File(PathBuf),
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::BuildId(id) => write!(f, "build id {id}"),
            LookupKey::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid path {}: {source}", .path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    InvalidBuildId(#[from] InvalidBuildId),
    #[error("No gadgets found for {0}")]
    NotFound(LookupKey),
    #[error("Either a file or a build id is required")]
    MissingTarget,
    #[error("Gadget store error: {0}")]
    Store(#[from] StoreError),
}

/// Output-shaping and lookup knobs shared by every entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Return full gadgets instead of bare offsets.
    pub details: bool,
    /// Skip the build-id fast path for files.
    pub force_file: bool,
    /// Refinement level; `<= 0` keeps only the least-constrained gadgets.
    pub level: i32,
}

/// What to resolve. When both are set, the build id wins.
#[derive(Debug, Clone, Default)]
pub struct ResolutionRequest {
    pub file: Option<PathBuf>,
    pub build_id: Option<String>,
    pub options: ResolveOptions,
}

impl ResolutionRequest {
    pub fn for_build_id(build_id: impl Into<String>) -> Self {
        Self { build_id: Some(build_id.into()), ..Self::default() }
    }

    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self { file: Some(path.into()), ..Self::default() }
    }

    /// Classify a single argument as a build id or a file path.
    pub fn from_target(arg: &str) -> Self {
        match classify_target(arg) {
            Target::BuildId(id) => Self::for_build_id(id.as_str()),
            Target::File(path) => Self::for_file(path),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }
}

/// A single positional argument, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    BuildId(BuildId),
    File(PathBuf),
}

/// Anything that fully matches the build-id format is a build id, even if a
/// file of that name exists.
pub fn classify_target(arg: &str) -> Target {
    match BuildId::parse(arg) {
        Ok(id) => Target::BuildId(id),
        Err(_) => Target::File(PathBuf::from(arg)),
    }
}

/// Resolved gadgets, shaped by `ResolveOptions::details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resolution {
    Gadgets(Vec<Gadget>),
    Offsets(Vec<u64>),
}

impl Resolution {
    fn project(gadgets: GadgetSet, details: bool) -> Self {
        if details {
            Resolution::Gadgets(gadgets)
        } else {
            Resolution::Offsets(gadgets.iter().map(Gadget::offset).collect())
        }
    }

    pub fn offsets(&self) -> Vec<u64> {
        match self {
            Resolution::Gadgets(gs) => gs.iter().map(Gadget::offset).collect(),
            Resolution::Offsets(os) => os.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Resolution::Gadgets(gs) => gs.len(),
            Resolution::Offsets(os) => os.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entry point: build-id extraction, lookup, refinement, and output shaping.
pub struct Resolver {
    extractor: Box<dyn IdentityExtractor>,
    fetcher: GadgetFetcher,
}

impl Resolver {
    pub fn new(fetcher: GadgetFetcher) -> Self {
        Self { extractor: Box::new(ElfBuildIdExtractor), fetcher }
    }

    pub fn with_extractor<E: IdentityExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn fetcher(&self) -> &GadgetFetcher {
        &self.fetcher
    }

    pub fn resolve(&self, request: &ResolutionRequest) -> Result<Resolution, ResolveError> {
        let gadgets = self.lookup(request)?;
        let refined = refine(gadgets, request.options.level);
        Ok(Resolution::project(refined, request.options.details))
    }

    /// Resolve a single positional argument (build id or file path).
    pub fn resolve_target(
        &self,
        arg: &str,
        options: ResolveOptions,
    ) -> Result<Resolution, ResolveError> {
        self.resolve(&ResolutionRequest::from_target(arg).with_options(options))
    }

    fn lookup(&self, request: &ResolutionRequest) -> Result<GadgetSet, ResolveError> {
        if let Some(raw) = &request.build_id {
            let build_id = BuildId::parse(raw)?;
            return non_empty(self.fetcher.by_build_id(&build_id, true)?)
                .ok_or(ResolveError::NotFound(LookupKey::BuildId(build_id)));
        }

        let file = request.file.as_deref().ok_or(ResolveError::MissingTarget)?;
        let path = absolute_file(file)?;

        let from_build = if request.options.force_file {
            None
        } else {
            non_empty(self.try_from_build(&path)?)
        };
        let found = match from_build {
            Some(set) => Some(set),
            None => non_empty(self.fetcher.by_file(&path)?),
        };
        found.ok_or(ResolveError::NotFound(LookupKey::File(path)))
    }

    /// Local-only lookup keyed by the file's build id, if it has one.
    fn try_from_build(&self, path: &Path) -> StoreResult<Option<GadgetSet>> {
        let Some(build_id) = self.extractor.extract(path) else {
            debug!(path = %path.display(), "no build id; falling back to file lookup");
            return Ok(None);
        };
        debug!(path = %path.display(), %build_id, "trying local build id lookup");
        self.fetcher.by_build_id(&build_id, false)
    }
}

/// An empty entry is never a successful resolution.
fn non_empty(set: Option<GadgetSet>) -> Option<GadgetSet> {
    set.filter(|s| !s.is_empty())
}

fn absolute_file(path: &Path) -> Result<PathBuf, ResolveError> {
    let canonical = path
        .canonicalize()
        .map_err(|source| ResolveError::InvalidPath { path: path.to_path_buf(), source })?;
    if !canonical.is_file() {
        return Err(ResolveError::InvalidPath {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    Ok(canonical)
}
