use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_UPDATE_INTERVAL_DAYS: i64 = 30;

/// Serializable resolver configuration.
///
/// This lives at `config.json` in the home directory. Every field has a
/// default, so a partial (or missing) file is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Schema/config version. This is about the config format.
    #[serde(default = "default_config_version")]
    pub config_version: String,
    /// Base URL of the remote gadget lookup service. Remote lookups are
    /// disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// Per-request timeout for remote lookups.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts per remote request before it counts as a transport failure.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Directory of build files; relative to the home root unless absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builds_dir: Option<String>,
    /// Endpoint answering `{"version": "..."}` for update checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,
    #[serde(default = "default_update_interval_days")]
    pub update_interval_days: i64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            remote_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            builds_dir: None,
            update_url: None,
            update_interval_days: DEFAULT_UPDATE_INTERVAL_DAYS,
        }
    }
}

fn default_config_version() -> String {
    "0.1.0".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_update_interval_days() -> i64 {
    DEFAULT_UPDATE_INTERVAL_DAYS
}
