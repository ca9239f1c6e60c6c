//! Core data model: gadgets, build identities, and stored build records.
//!
//! Everything here is produced by a store or by identity extraction and is
//! only read by the resolution pipeline. Gadgets expose no mutable access to
//! their constraints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of hex characters in a GNU build-id (SHA-1 digest).
pub const BUILD_ID_LEN: usize = 40;

/// One reachable command-execution primitive inside a library image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gadget {
    offset: u64,
    #[serde(default)]
    constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    effect: Option<String>,
}

impl Gadget {
    pub fn new<I, S>(offset: u64, constraints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { offset, constraints: constraints.into_iter().map(Into::into).collect(), effect: None }
    }

    /// Builder-style helper to attach the call this gadget ends up performing.
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    /// Byte offset inside the library image where execution must land.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Preconditions that must all hold when execution reaches `offset`.
    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }

    pub fn effect(&self) -> Option<&str> {
        self.effect.as_deref()
    }
}

impl fmt::Display for Gadget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.offset)?;
        if let Some(effect) = &self.effect {
            write!(f, " {effect}")?;
        }
        if !self.constraints.is_empty() {
            f.write_str("\nconstraints:")?;
            for c in &self.constraints {
                write!(f, "\n  {c}")?;
            }
        }
        Ok(())
    }
}

/// All gadgets known for one build, in store order.
pub type GadgetSet = Vec<Gadget>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid build id '{0}': expected 40 lowercase hex characters")]
pub struct InvalidBuildId(pub String);

/// GNU build-id of a library build, as 40 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuildId(String);

impl BuildId {
    /// Returns true when `s` is exactly a build-id (`[0-9a-f]{40}`).
    pub fn matches_format(s: &str) -> bool {
        s.len() == BUILD_ID_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    pub fn parse(s: &str) -> Result<Self, InvalidBuildId> {
        if Self::matches_format(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidBuildId(s.to_string()))
        }
    }

    /// Hex-encode raw note bytes; only a 20-byte digest yields a build-id.
    pub fn from_digest(bytes: &[u8]) -> Option<Self> {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Self::parse(&hex).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BuildId {
    type Err = InvalidBuildId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BuildId {
    type Error = InvalidBuildId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BuildId> for String {
    fn from(value: BuildId) -> Self {
        value.0
    }
}

/// Stored unit of gadget data: one build and its gadgets.
///
/// This is the shape of build files on disk and of remote lookup responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub build_id: BuildId,
    /// Human-friendly build name (e.g., "libc-2.27").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub gadgets: GadgetSet,
}

impl BuildRecord {
    pub fn new(build_id: BuildId, gadgets: GadgetSet) -> Self {
        Self { build_id, name: None, gadgets }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }
}
