//! Worker configuration, with environment overrides.

use std::time::Duration;

use crate::decoder::Backend;

/// Default pixel ceiling for a single frame (64 MP)
pub const DEFAULT_MAX_PIXELS: usize = 64 * 1024 * 1024;

fn parse_env_u64(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

fn parse_env_backend(name: &str) -> Option<Backend> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Settings for one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Decoder backend the worker wraps
    pub backend: Backend,
    /// Frames with more pixels are rejected
    pub max_pixels: usize,
    /// Retry on the inverted image when nothing is found
    pub try_inverted: bool,
    /// Caller-side limit on how long `call` waits for the reply
    pub call_timeout: Option<Duration>,
    /// OS thread name; defaults to `qr-worker-<backend>`
    pub thread_name: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            max_pixels: DEFAULT_MAX_PIXELS,
            try_inverted: true,
            call_timeout: None,
            thread_name: None,
        }
    }
}

impl WorkerConfig {
    /// Defaults for the given backend
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// Defaults overridden by `QR_WORKER_*` environment variables.
    ///
    /// Unparsable values are ignored:
    /// - `QR_WORKER_BACKEND` — `rqrr` or `quirc`
    /// - `QR_WORKER_MAX_PIXELS`
    /// - `QR_WORKER_TRY_INVERTED` — `0` or `1`
    /// - `QR_WORKER_TIMEOUT_MS` — `0` disables the timeout
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: parse_env_backend("QR_WORKER_BACKEND").unwrap_or(defaults.backend),
            max_pixels: parse_env_usize("QR_WORKER_MAX_PIXELS", defaults.max_pixels).max(1),
            try_inverted: parse_env_bool_u8("QR_WORKER_TRY_INVERTED", defaults.try_inverted),
            call_timeout: match parse_env_u64("QR_WORKER_TIMEOUT_MS") {
                Some(0) | None => None,
                Some(ms) => Some(Duration::from_millis(ms)),
            },
            thread_name: None,
        }
    }

    /// Use another backend
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Change the pixel ceiling
    pub fn with_max_pixels(mut self, max_pixels: usize) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Enable or disable the inverted retry
    pub fn with_try_inverted(mut self, try_inverted: bool) -> Self {
        self.try_inverted = try_inverted;
        self
    }

    /// Bound how long callers wait for a reply
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Name the worker thread
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    pub(crate) fn resolved_thread_name(&self, backend: &str) -> String {
        self.thread_name
            .clone()
            .unwrap_or_else(|| format!("qr-worker-{backend}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.backend, Backend::Rqrr);
        assert!(config.try_inverted);
        assert_eq!(config.call_timeout, None);
        assert_eq!(config.resolved_thread_name("rqrr"), "qr-worker-rqrr");
    }

    #[test]
    fn test_builders() {
        let config = WorkerConfig::new(Backend::Quirc)
            .with_max_pixels(10)
            .with_try_inverted(false)
            .with_call_timeout(Duration::from_millis(5))
            .with_thread_name("scanner");
        assert_eq!(config.backend, Backend::Quirc);
        assert_eq!(config.max_pixels, 10);
        assert!(!config.try_inverted);
        assert_eq!(config.call_timeout, Some(Duration::from_millis(5)));
        assert_eq!(config.resolved_thread_name("quirc"), "scanner");
    }

    #[test]
    fn test_env_parsers_fall_back() {
        assert_eq!(parse_env_usize("QR_WORKER_TEST_UNSET_VARIABLE", 7), 7);
        assert!(parse_env_bool_u8("QR_WORKER_TEST_UNSET_VARIABLE", true));
        assert_eq!(parse_env_u64("QR_WORKER_TEST_UNSET_VARIABLE"), None);
        assert_eq!(parse_env_backend("QR_WORKER_TEST_UNSET_VARIABLE"), None);
    }
}
