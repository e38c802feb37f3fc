//! Configuration for reassembly and rendering.

use serde::Deserialize;
use std::time::Duration;

/// Environment variable overriding [`StreamConfig::release_threshold`].
pub const ENV_RELEASE_THRESHOLD: &str = "TYPECAST_RELEASE_THRESHOLD";

/// Environment variable overriding [`StreamConfig::unit_delay`], in milliseconds.
pub const ENV_UNIT_DELAY_MS: &str = "TYPECAST_UNIT_DELAY_MS";

/// Tuning knobs for a stream of responses.
///
/// The release threshold trades latency for smoothness: a larger value
/// delays the first visible text but avoids releasing a burst one
/// fragment at a time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Contiguous fragments required before an early release.
    pub release_threshold: usize,
    /// Delay between two emitted units.
    #[serde(rename = "unit_delay_ms", deserialize_with = "millis::deserialize")]
    pub unit_delay: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            release_threshold: 5,
            unit_delay: Duration::from_millis(15),
        }
    }
}

impl StreamConfig {
    /// Set the release threshold. Zero behaves like one.
    #[must_use]
    pub const fn with_release_threshold(mut self, threshold: usize) -> Self {
        self.release_threshold = threshold;
        self
    }

    /// Set the delay between emitted units.
    #[must_use]
    pub const fn with_unit_delay(mut self, delay: Duration) -> Self {
        self.unit_delay = delay;
        self
    }

    /// Defaults overridden by `TYPECAST_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_RELEASE_THRESHOLD) {
            match raw.trim().parse() {
                Ok(threshold) => config.release_threshold = threshold,
                Err(err) => tracing::warn!(%raw, %err, "ignoring {ENV_RELEASE_THRESHOLD}"),
            }
        }

        if let Some(raw) = lookup(ENV_UNIT_DELAY_MS) {
            match raw.trim().parse() {
                Ok(ms) => config.unit_delay = Duration::from_millis(ms),
                Err(err) => tracing::warn!(%raw, %err, "ignoring {ENV_UNIT_DELAY_MS}"),
            }
        }

        config
    }

    /// Effective threshold, never below one.
    pub(crate) fn effective_threshold(&self) -> usize {
        self.release_threshold.max(1)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        u64::deserialize(de).map(Duration::from_millis)
    }
}
