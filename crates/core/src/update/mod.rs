//! Optional "is there a newer release?" check.
//!
//! Nothing here runs on its own. Frontends call [`UpdateChecker::check`] when
//! they want to, and the checker rate-limits itself through a stamp file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

/// Stamp file content that turns update checks off for good.
pub const DISABLED_STAMP: &str = "never";

/// Source of the latest published version string.
pub trait VersionSource {
    fn latest_version(&self) -> Result<String>;
}

/// Fetches `{"version": "x.y.z"}` from an HTTP endpoint.
#[cfg(feature = "remote")]
pub struct HttpVersionSource {
    url: String,
    agent: ureq::Agent,
}

#[cfg(feature = "remote")]
impl HttpVersionSource {
    pub fn new(url: impl Into<String>, timeout: std::time::Duration) -> Self {
        let config = ureq::Agent::config_builder().timeout_global(Some(timeout)).build();
        Self { url: url.into(), agent: config.into() }
    }
}

#[cfg(feature = "remote")]
impl VersionSource for HttpVersionSource {
    fn latest_version(&self) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct Latest {
            version: String,
        }

        let mut response = self
            .agent
            .get(&self.url)
            .call()
            .with_context(|| format!("Failed to query latest version from {}", self.url))?;
        let latest: Latest =
            response.body_mut().read_json().context("Failed to parse latest version JSON")?;
        Ok(latest.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The stamp file says `never`.
    Disabled,
    /// Checked recently enough; nothing was queried.
    Skipped { last_checked: DateTime<Utc> },
    UpToDate { current: String },
    UpdateAvailable { current: String, latest: String },
    /// The version source could not be reached.
    Unavailable { reason: String },
}

/// Rate-limited update check backed by a stamp file.
#[derive(Debug, Clone)]
pub struct UpdateChecker {
    stamp_path: PathBuf,
    interval: TimeDelta,
    current_version: String,
}

impl UpdateChecker {
    pub fn new(stamp_path: impl Into<PathBuf>, interval_days: i64) -> Self {
        Self {
            stamp_path: stamp_path.into(),
            interval: TimeDelta::try_days(interval_days).unwrap_or(TimeDelta::MAX),
            current_version: crate::version().to_string(),
        }
    }

    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = version.into();
        self
    }

    pub fn stamp_path(&self) -> &Path {
        &self.stamp_path
    }

    pub fn check(&self, source: &dyn VersionSource) -> Result<UpdateStatus> {
        self.check_at(source, Utc::now())
    }

    /// Run the check as if the current time were `now`.
    pub fn check_at(&self, source: &dyn VersionSource, now: DateTime<Utc>) -> Result<UpdateStatus> {
        match self.read_stamp()? {
            Stamp::Disabled => return Ok(UpdateStatus::Disabled),
            // A stamp from the future (clock skew) counts as never checked.
            Stamp::At(last) if last <= now && now.signed_duration_since(last) < self.interval => {
                debug!(%last, "update check skipped");
                return Ok(UpdateStatus::Skipped { last_checked: last });
            }
            _ => {}
        }

        // Recorded before querying so an unreachable source is not hammered.
        self.write_stamp(&now.to_rfc3339())?;

        let latest = match source.latest_version() {
            Ok(v) => v,
            Err(e) => return Ok(UpdateStatus::Unavailable { reason: format!("{e:#}") }),
        };
        let current = self.current_version.clone();
        if is_newer(&latest, &current) {
            info!(%current, %latest, "a newer version is available");
            Ok(UpdateStatus::UpdateAvailable { current, latest })
        } else {
            Ok(UpdateStatus::UpToDate { current })
        }
    }

    /// Turn update checks off permanently for this stamp file.
    pub fn disable(&self) -> Result<()> {
        self.write_stamp(DISABLED_STAMP)
    }

    fn read_stamp(&self) -> Result<Stamp> {
        if !self.stamp_path.exists() {
            return Ok(Stamp::Missing);
        }
        let body = fs::read_to_string(&self.stamp_path).with_context(|| {
            format!("Failed to read update stamp at {}", self.stamp_path.display())
        })?;
        let body = body.trim();
        if body == DISABLED_STAMP {
            return Ok(Stamp::Disabled);
        }
        Ok(DateTime::parse_from_rfc3339(body)
            .map(|t| Stamp::At(t.with_timezone(&Utc)))
            .unwrap_or(Stamp::Missing))
    }

    fn write_stamp(&self, body: &str) -> Result<()> {
        if let Some(parent) = self.stamp_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.stamp_path, body).with_context(|| {
            format!("Failed to write update stamp at {}", self.stamp_path.display())
        })
    }
}

enum Stamp {
    Missing,
    Disabled,
    At(DateTime<Utc>),
}

/// Compare dotted numeric versions; non-numeric parts count as zero.
pub fn is_newer(latest: &str, current: &str) -> bool {
    fn parts(v: &str) -> Vec<u64> {
        v.trim_start_matches('v').split('.').map(|p| p.trim().parse().unwrap_or(0)).collect()
    }
    let (mut a, mut b) = (parts(latest), parts(current));
    let len = a.len().max(b.len());
    a.resize(len, 0);
    b.resize(len, 0);
    a > b
}
