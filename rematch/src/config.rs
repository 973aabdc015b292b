//! Runtime configuration
//!
//! Read once from the environment:
//!
//! - `REMATCH_OFFLOAD`: `auto` (default), `always` or `never`
//! - `REMATCH_WORKERS`: worker count for the offload pool (positive integer)
//!
//! Values that do not parse are logged and replaced by the default.

use std::fmt;
use std::str::FromStr;

pub const OFFLOAD_VAR: &str = "REMATCH_OFFLOAD";
pub const WORKERS_VAR: &str = "REMATCH_WORKERS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown offload mode `{0}` (expected auto, always or never)")]
    Offload(String),
    #[error("worker count must be a positive integer, got `{0}`")]
    Workers(String),
}

/// Whether work runs on the caller's thread or on a dedicated pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Offload {
    /// Offload when more than one CPU is available
    #[default]
    Auto,
    Always,
    Never,
}

impl fmt::Display for Offload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offload::Auto => write!(f, "auto"),
            Offload::Always => write!(f, "always"),
            Offload::Never => write!(f, "never"),
        }
    }
}

impl FromStr for Offload {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Offload::Auto),
            "always" | "on" => Ok(Offload::Always),
            "never" | "off" => Ok(Offload::Never),
            _ => Err(ConfigError::Offload(s.to_string())),
        }
    }
}

pub(crate) fn parse_workers(s: &str) -> Result<usize, ConfigError> {
    s.trim()
        .parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| ConfigError::Workers(s.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    pub offload: Offload,
    /// Pool size; `None` lets the pool pick one thread per CPU
    pub workers: Option<usize>,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, e.g. a map in tests
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let offload = lookup(OFFLOAD_VAR)
            .map(|raw| {
                raw.parse::<Offload>().unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "using default offload mode");
                    Offload::default()
                })
            })
            .unwrap_or_default();

        let workers = lookup(WORKERS_VAR).and_then(|raw| {
            parse_workers(&raw)
                .inspect_err(|e| tracing::warn!(error = %e, "using default worker count"))
                .ok()
        });

        RuntimeConfig { offload, workers }
    }

    /// Whether this configuration asks for a worker pool on a machine with
    /// `cpus` available CPUs
    pub fn wants_pool(&self, cpus: usize) -> bool {
        match self.offload {
            Offload::Always => true,
            Offload::Never => false,
            Offload::Auto => cpus > 1,
        }
    }
}
