use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

// ── Top-level config ──────────────────────────────────────────

/// Runtime configuration, typically parsed from TOML.
///
/// ```toml
/// [pool]
/// num_workers = 4
/// request_queue_size = 0
/// result_queue_size = 0
/// poll_timeout_ms = 5000
///
/// [executor]
/// mode = "parallel"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LesConfig {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
}

impl LesConfig {
    /// Parse config from a TOML string, apply `LES_*` env overrides, validate.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Defaults plus env overrides, for running without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup.
    ///
    /// Convention: `LES_SECTION_KEY` overrides `section.key`. Unparseable
    /// values are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        override_parsed(&lookup, "LES_POOL_WORKERS", &mut self.pool.num_workers);
        override_parsed(
            &lookup,
            "LES_POOL_REQUEST_QUEUE_SIZE",
            &mut self.pool.request_queue_size,
        );
        override_parsed(
            &lookup,
            "LES_POOL_RESULT_QUEUE_SIZE",
            &mut self.pool.result_queue_size,
        );
        override_parsed(&lookup, "LES_POOL_POLL_TIMEOUT_MS", &mut self.pool.poll_timeout_ms);
        override_parsed(&lookup, "LES_EXECUTOR_MODE", &mut self.executor.mode);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.poll_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "pool.poll_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  pool:      workers={}, request_queue={}, result_queue={}, poll_timeout={}ms",
            self.pool.resolved_workers(),
            self.pool.request_queue_size,
            self.pool.result_queue_size,
            self.pool.poll_timeout_ms
        );
        tracing::info!("  executor:  mode={}", self.executor.mode);
    }
}

fn override_parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    if let Some(raw) = lookup(key).filter(|v| !v.is_empty()) {
        match raw.parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!(key, value = %raw, "ignoring unparseable config override"),
        }
    }
}

// ── Pool ──────────────────────────────────────────────────────

/// Worker pool sizing and queue capacities.
///
/// When both queues are bounded and results are not polled promptly,
/// submitters and workers can block on each other indefinitely. Keep at least
/// one queue unbounded or submit with a timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of worker threads. 0 = available parallelism.
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,
    /// Capacity of the submission queue. 0 = unbounded.
    #[serde(default)]
    pub request_queue_size: usize,
    /// Capacity of the result queue. 0 = unbounded.
    #[serde(default)]
    pub result_queue_size: usize,
    /// How often an idle worker re-checks its dismissal flag.
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

fn default_num_workers() -> usize { 0 }
fn default_poll_timeout_ms() -> u64 { 5000 }

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: default_num_workers(),
            request_queue_size: 0,
            result_queue_size: 0,
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

impl PoolConfig {
    /// Resolve worker count (0 means use available parallelism).
    pub fn resolved_workers(&self) -> usize {
        if self.num_workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.num_workers
        }
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

// ── Executor ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => f.write_str("sequential"),
            ExecutionMode::Parallel => f.write_str("parallel"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(ExecutionMode::Sequential),
            "parallel" => Ok(ExecutionMode::Parallel),
            other => Err(format!("unknown execution mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default)]
    pub mode: ExecutionMode,
}
