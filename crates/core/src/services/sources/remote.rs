use std::fmt;
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::model::{BuildId, BuildRecord, GadgetSet};
use crate::services::fetcher::{GadgetSource, Locality, StoreError, StoreResult};
use crate::services::sources::sha256_file;

const INITIAL_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF_MS: u64 = 2000;

/// Remote gadget lookup service over HTTP.
///
/// - `GET {base}/builds/{build_id}` answers a build record by build id.
/// - `GET {base}/sha256/{digest}` answers a build record by file content hash.
///
/// A 404 means "no entry"; other failures are retried and then reported as
/// transport errors.
#[derive(Clone)]
pub struct RemoteSource {
    base_url: String,
    agent: ureq::Agent,
    max_attempts: u32,
}

impl fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSource")
            .field("base_url", &self.base_url)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

enum Attempt {
    Found(BuildRecord),
    Missing,
    Retry(String),
    Fatal(String),
}

impl RemoteSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration, max_attempts: u32) -> Self {
        let config = ureq::Agent::config_builder().timeout_global(Some(timeout)).build();
        let agent: ureq::Agent = config.into();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn attempt(&self, url: &str) -> Attempt {
        match self.agent.get(url).call() {
            Ok(mut response) => match response.body_mut().read_json::<BuildRecord>() {
                Ok(record) => Attempt::Found(record),
                Err(e) => Attempt::Fatal(format!("invalid response body from {url}: {e}")),
            },
            Err(ureq::Error::StatusCode(404)) => Attempt::Missing,
            Err(ureq::Error::StatusCode(code)) if code < 500 && code != 429 => {
                Attempt::Fatal(format!("{url} answered HTTP {code}"))
            }
            Err(e) => Attempt::Retry(format!("{url}: {e}")),
        }
    }

    fn fetch(&self, url: &str) -> StoreResult<Option<BuildRecord>> {
        let mut backoff_ms = INITIAL_BACKOFF_MS;
        let mut attempt = 1;
        loop {
            debug!(url, attempt, "remote lookup");
            let message = match self.attempt(url) {
                Attempt::Found(record) => return Ok(Some(record)),
                Attempt::Missing => return Ok(None),
                Attempt::Fatal(message) => message,
                Attempt::Retry(message) if attempt < self.max_attempts => {
                    warn!(
                        "Remote lookup failed (attempt {}/{}): {}, retrying in {}ms",
                        attempt, self.max_attempts, message, backoff_ms
                    );
                    thread::sleep(Duration::from_millis(backoff_ms));
                    backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                    attempt += 1;
                    continue;
                }
                Attempt::Retry(message) => message,
            };
            return Err(StoreError::Transport { origin: self.base_url.clone(), message });
        }
    }
}

impl GadgetSource for RemoteSource {
    fn name(&self) -> &str {
        "remote"
    }

    fn locality(&self) -> Locality {
        Locality::Remote
    }

    fn lookup_build_id(&self, build_id: &BuildId) -> StoreResult<Option<GadgetSet>> {
        let url = format!("{}/builds/{}", self.base_url, build_id);
        match self.fetch(&url)? {
            Some(record) if record.build_id == *build_id => Ok(Some(record.gadgets)),
            Some(record) => {
                warn!(
                    requested = %build_id,
                    returned = %record.build_id,
                    "remote answered a different build; ignoring"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn lookup_content(&self, path: &Path) -> StoreResult<Option<GadgetSet>> {
        // An unreadable file cannot be asked about; treat like any failed request.
        let digest = sha256_file(path).map_err(|e| StoreError::Transport {
            origin: self.base_url.clone(),
            message: format!("cannot hash {}: {e}", path.display()),
        })?;
        let url = format!("{}/sha256/{}", self.base_url, digest);
        Ok(self.fetch(&url)?.map(|record| record.gadgets))
    }
}
