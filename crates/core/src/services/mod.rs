pub mod fetcher;
pub mod refine;
pub mod resolver;
pub mod sources;

pub use fetcher::{GadgetFetcher, GadgetSource, Locality, StoreError, StoreResult};
pub use refine::refine;
pub use resolver::{
    classify_target, LookupKey, Resolution, ResolutionRequest, ResolveError, ResolveOptions,
    Resolver, Target,
};
