//! # Runtime
//!
//! Tokio runtime profiles shared by docket binaries.
//!
//! ## Profiles
//! * **Server**: request-serving processes; larger stacks and longer keep-alive.
//! * **Default**: general purpose tooling and tests.
//!
//! Worker count comes from `DOCKET_WORKER_THREADS` when set to a value in `1..=1024`,
//! otherwise from the available parallelism of the host.
//!
//! ## Example
//!
//! ```rust,ignore
//! #[docket_runtime::main(server)]
//! async fn main() -> anyhow::Result<()> {
//!     tracing::info!("serving");
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use docket_derive::main;

use anyhow::anyhow;
use std::{sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Environment variable overriding the worker count.
pub const WORKER_THREADS_ENV: &str = "DOCKET_WORKER_THREADS";

const DEFAULT_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 1024;
/// 3 `MiB`.
const DEFAULT_STACK_SIZE: usize = 3 * 1024 * 1024;
/// 1 `MiB`.
const MIN_STACK_SIZE: usize = 1024 * 1024;
/// 16 `MiB`.
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);
const DEFAULT_THREAD_NAME: &str = "docket-worker";

static WORKER_THREADS: OnceLock<usize> = OnceLock::new();

fn worker_threads() -> usize {
    *WORKER_THREADS.get_or_init(|| {
        parse_worker_threads(std::env::var(WORKER_THREADS_ENV).ok().as_deref()).unwrap_or_else(
            || {
                available_parallelism()
                    .map(std::num::NonZero::get)
                    .unwrap_or(DEFAULT_WORKER_THREADS)
            },
        )
    })
}

fn parse_worker_threads(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| (1..=MAX_WORKER_THREADS).contains(&n))
}

fn thread_name_or_default(name: String) -> String {
    if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name }
}

/// Configuration for the Tokio runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
    /// How long `main` waits for outstanding blocking tasks once the async body returned.
    pub shutdown_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: worker_threads(),
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            thread_keep_alive: THREAD_KEEP_ALIVE,
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}

impl RuntimeConfig {
    /// Preset for request-serving processes.
    #[must_use = "Use this configuration for server processes"]
    pub fn server() -> Self {
        Self {
            worker_threads: worker_threads(),
            stack_size: 4 * 1024 * 1024,
            thread_name: "docket-server".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
            shutdown_timeout: Duration::from_secs(5),
        }
    }

    #[must_use = "Customize the number of worker threads for the runtime"]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    #[must_use = "Customize the stack size for worker threads"]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use = "Customize the thread name"]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = thread_name_or_default(name.into());
        self
    }

    #[must_use = "Customize how long idle threads stay alive"]
    pub const fn with_thread_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.thread_keep_alive = keep_alive;
        self
    }

    #[must_use = "Customize how long shutdown waits for blocking tasks"]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    fn normalized(&self) -> Self {
        Self {
            worker_threads: self.worker_threads.clamp(1, MAX_WORKER_THREADS),
            stack_size: self.stack_size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE),
            thread_name: thread_name_or_default(self.thread_name.clone()),
            thread_keep_alive: self.thread_keep_alive,
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}

/// Creates a multi-threaded Tokio runtime with every driver enabled.
///
/// Out-of-range values in `config` are clamped rather than rejected.
///
/// # Errors
///
/// Returns an [`anyhow::Error`] if the OS refuses to create the runtime threads.
pub fn build_runtime(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.normalized();
    debug!(config = ?config, "Building tokio runtime");

    let mut builder = Builder::new_multi_thread();
    builder
        .worker_threads(config.worker_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all();

    builder.build().map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_threads_are_clamped() {
        let config = RuntimeConfig::default().with_worker_threads(0);
        assert_eq!(config.worker_threads, 1);

        let config = RuntimeConfig::default().with_worker_threads(2000);
        assert_eq!(config.worker_threads, MAX_WORKER_THREADS);
    }

    #[test]
    fn stack_size_is_clamped() {
        let config = RuntimeConfig::default().with_stack_size(100);
        assert_eq!(config.stack_size, MIN_STACK_SIZE);

        let config = RuntimeConfig::default().with_stack_size(100 * 1024 * 1024);
        assert_eq!(config.stack_size, MAX_STACK_SIZE);
    }

    #[test]
    fn blank_thread_name_falls_back() {
        let config = RuntimeConfig::server().with_thread_name("  ");
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn worker_override_must_be_in_range() {
        assert_eq!(parse_worker_threads(Some("8")), Some(8));
        assert_eq!(parse_worker_threads(Some(" 2 ")), Some(2));
        assert_eq!(parse_worker_threads(Some("0")), None);
        assert_eq!(parse_worker_threads(Some("4096")), None);
        assert_eq!(parse_worker_threads(Some("many")), None);
        assert_eq!(parse_worker_threads(None), None);
    }

    #[test]
    fn normalized_config_builds_a_working_runtime() {
        let mut config = RuntimeConfig::default().with_shutdown_timeout(Duration::from_millis(50));
        config.worker_threads = 0;
        config.stack_size = 1;

        let runtime = build_runtime(&config).unwrap();
        let answer = runtime.block_on(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            42
        });
        assert_eq!(answer, 42);
        runtime.shutdown_timeout(config.shutdown_timeout);
    }
}
