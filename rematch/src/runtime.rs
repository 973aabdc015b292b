//! Offload executor
//!
//! Matching is CPU bound and can run long on large subjects. Hosts that must
//! not block their own scheduler threads run every operation on a dedicated
//! rayon pool instead. The choice is made once per process.

use crate::config::RuntimeConfig;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::sync::OnceLock;

/// Where host operations run
#[derive(Debug)]
pub enum Executor {
    /// On the calling thread
    Inline,
    /// On a dedicated worker pool; the caller blocks until the result is ready
    Pool(ThreadPool),
}

impl Executor {
    /// Build the executor a configuration asks for. A pool that cannot be
    /// started degrades to inline execution.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let cpus = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        if !config.wants_pool(cpus) {
            return Executor::Inline;
        }

        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("rematch-cpu-{i}"));
        if let Some(workers) = config.workers {
            builder = builder.num_threads(workers);
        }
        match builder.build() {
            Ok(pool) => Executor::Pool(pool),
            Err(e) => {
                tracing::warn!(error = %e, "could not start worker pool, running inline");
                Executor::Inline
            }
        }
    }

    /// The process-wide executor, configured from the environment on first use
    pub fn global() -> &'static Executor {
        static GLOBAL: OnceLock<Executor> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let config = RuntimeConfig::from_env();
            let executor = Executor::from_config(&config);
            tracing::info!(
                offload = %config.offload,
                workers = executor.workers(),
                "selected executor"
            );
            executor
        })
    }

    /// Run `op` and wait for its result
    pub fn run<F, R>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match self {
            Executor::Inline => op(),
            Executor::Pool(pool) => pool.install(op),
        }
    }

    pub fn is_offloaded(&self) -> bool {
        matches!(self, Executor::Pool(_))
    }

    /// Number of worker threads; zero when running inline
    pub fn workers(&self) -> usize {
        match self {
            Executor::Inline => 0,
            Executor::Pool(pool) => pool.current_num_threads(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Offload;

    #[test]
    fn test_never_runs_inline() {
        let config = RuntimeConfig {
            offload: Offload::Never,
            workers: Some(4),
        };
        let executor = Executor::from_config(&config);
        assert!(!executor.is_offloaded());
        assert_eq!(executor.workers(), 0);
        assert_eq!(executor.run(|| 2 + 2), 4);
    }

    #[test]
    fn test_always_runs_on_pool_threads() {
        let config = RuntimeConfig {
            offload: Offload::Always,
            workers: Some(2),
        };
        let executor = Executor::from_config(&config);
        assert!(executor.is_offloaded());
        assert_eq!(executor.workers(), 2);

        let name = executor.run(|| std::thread::current().name().map(str::to_string));
        assert!(name.is_some_and(|n| n.starts_with("rematch-cpu-")));
    }
}
