//! Home directory layout, resolver configuration, and the SQLite gadget cache.
//!
//! - `HomeLayout`: computed paths under the resolver home.
//! - `ResolverConfig`: serializable settings (`config.json`).
//! - `GadgetCache`: SQLite store of imported builds with versioned schema.
//! - `ResolverContext`: everything above plus a wired `Resolver`.

pub mod cache;
pub mod config;
pub mod context;
pub mod layout;
pub mod models;
pub mod util;

pub use cache::*;
pub use config::*;
pub use context::*;
pub use layout::*;
pub use models::*;
pub use util::*;
