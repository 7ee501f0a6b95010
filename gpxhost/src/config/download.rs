//! Download configuration.

use std::time::Duration;

use super::defaults::{DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS};

/// Configuration for upstream tile downloads.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gpxhost::config::DownloadConfig;
///
/// let config = DownloadConfig::default();
/// assert_eq!(config.timeout(), Duration::from_secs(10));
/// assert_eq!(config.max_retries(), 3);
///
/// let config = DownloadConfig::new()
///     .with_timeout(Duration::from_secs(30))
///     .with_max_retries(5);
/// assert_eq!(config.attempts(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Per-request timeout
    timeout: Duration,
    /// Maximum number of attempts per tile
    max_retries: u32,
    /// Pause between failed attempts
    retry_delay: Duration,
}

impl DownloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request timeout. Default: 10 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of attempts per tile. Default: 3.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the pause between failed attempts. Default: 1 second.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Number of attempts actually made; zero retries still means one try.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_CLIENT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}
