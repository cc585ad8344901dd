//! Configuration types for unpacker

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unpacker behavior configuration
///
/// Every field has a serde default, so an empty JSON object (or
/// [`UnpackConfig::default()`]) gives the stock behavior: probe before extracting,
/// let sibling RAR streams finish after a failure, keep partial output, and never
/// time out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpackConfig {
    /// Probe ZIP and 7z archives for integrity before extracting (default: true)
    #[serde(default = "default_true")]
    pub test_before_extract: bool,

    /// Maximum number of RAR entries streamed to disk at once (default: 8)
    #[serde(default = "default_max_concurrent_entries")]
    pub max_concurrent_entries: usize,

    /// Cancel in-flight RAR entry streams once one of them fails (default: false)
    ///
    /// When false, sibling streams run to completion and the first error is
    /// reported afterwards, leaving as much extracted output as possible.
    #[serde(default)]
    pub abort_siblings_on_failure: bool,

    /// Remove the randomized destination directory if the request fails (default: false)
    ///
    /// Only directories created by the request itself are removed; a caller-supplied
    /// destination is never touched.
    #[serde(default)]
    pub cleanup_on_failure: bool,

    /// Upper bound on the extraction phase of a request, in seconds (default: none)
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,
}

impl Default for UnpackConfig {
    fn default() -> Self {
        Self {
            test_before_extract: true,
            max_concurrent_entries: default_max_concurrent_entries(),
            abort_siblings_on_failure: false,
            cleanup_on_failure: false,
            timeout: None,
        }
    }
}

impl UnpackConfig {
    /// Check the configuration for values the unpacker cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_entries == 0 {
            return Err(Error::Config {
                message: "max_concurrent_entries must be at least 1".to_string(),
                key: Some("max_concurrent_entries".to_string()),
            });
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_entries() -> usize {
    8
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
