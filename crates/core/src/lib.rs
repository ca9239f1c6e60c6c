//! gadget-core
//!
//! Core library for resolving one-gadget locations of known C runtime builds.
//!
//! A library file (or its GNU build-id) is mapped to the precomputed gadget
//! set of that exact build, looked up in local sources first and a remote
//! service second, then narrowed to the least-constrained gadgets.
//!
//! All substantive logic lives here so it is fully testable and reusable
//! from multiple frontends.

pub mod db;
pub mod identity;
pub mod model;
pub mod services;
pub mod update;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
