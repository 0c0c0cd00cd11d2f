//! # Runtime
//!
//! Tokio runtime profiles shared by the Tally binaries.
//!
//! * [`RuntimeProfile::server`]: every available core, roomy stacks, long-lived idle threads.
//! * [`RuntimeProfile::tool`]: two workers for short-lived CLI invocations.
//!
//! ```rust,ignore
//! #[tally_runtime::main(server)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use tally_derive::main;

use anyhow::Context;
use std::num::NonZeroUsize;
use std::thread::available_parallelism;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const FALLBACK_WORKERS: usize = 4;
const MAX_WORKERS: usize = 1024;
const MIN_STACK_SIZE: usize = 1024 * 1024;
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
const DEFAULT_THREAD_NAME: &str = "tally-worker";

/// Worker count from `TOKIO_WORKER_THREADS`, falling back to the available cores.
fn detect_workers() -> usize {
    std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|&n| (1..=MAX_WORKERS).contains(&n))
        .unwrap_or_else(|| {
            available_parallelism().map(NonZeroUsize::get).unwrap_or(FALLBACK_WORKERS)
        })
}

/// Settings for a multi-threaded Tokio runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeProfile {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub keep_alive: Duration,
}

impl Default for RuntimeProfile {
    fn default() -> Self {
        Self {
            worker_threads: detect_workers(),
            stack_size: 2 * 1024 * 1024,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            keep_alive: Duration::from_secs(60),
        }
    }
}

impl RuntimeProfile {
    /// Long-running HTTP server.
    #[must_use]
    pub fn server() -> Self {
        Self {
            worker_threads: detect_workers(),
            stack_size: 4 * 1024 * 1024,
            thread_name: "tally-server".to_owned(),
            keep_alive: Duration::from_secs(300),
        }
    }

    /// Short-lived command line tool.
    #[must_use]
    pub fn tool() -> Self {
        Self {
            worker_threads: detect_workers().min(2),
            stack_size: 2 * 1024 * 1024,
            thread_name: "tally-tool".to_owned(),
            keep_alive: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKERS);
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = bytes.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.thread_name = if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name };
        self
    }

    /// Clamps every field into its supported range.
    #[must_use]
    pub fn normalized(&self) -> Self {
        self.clone()
            .with_worker_threads(self.worker_threads)
            .with_stack_size(self.stack_size)
            .with_thread_name(self.thread_name.clone())
    }
}

/// Builds a multi-threaded runtime with I/O and timers enabled.
///
/// # Errors
/// Fails when the OS refuses to spawn the worker threads.
pub fn build_runtime(profile: &RuntimeProfile) -> Result<Runtime> {
    let profile = profile.normalized();
    debug!(?profile, "Building tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(profile.worker_threads)
        .thread_name(&profile.thread_name)
        .thread_stack_size(profile.stack_size)
        .thread_keep_alive(profile.keep_alive)
        .enable_all()
        .build()
        .context("Failed to initialize tokio runtime")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_threads_are_clamped() {
        assert_eq!(RuntimeProfile::default().with_worker_threads(0).worker_threads, 1);
        assert_eq!(RuntimeProfile::default().with_worker_threads(5000).worker_threads, MAX_WORKERS);
    }

    #[test]
    fn stack_size_is_clamped() {
        assert_eq!(RuntimeProfile::default().with_stack_size(10).stack_size, MIN_STACK_SIZE);
        assert_eq!(RuntimeProfile::default().with_stack_size(usize::MAX).stack_size, MAX_STACK_SIZE);
    }

    #[test]
    fn blank_thread_name_falls_back() {
        let profile = RuntimeProfile::tool().with_thread_name("   ");
        assert_eq!(profile.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn tool_profile_is_small() {
        assert!(RuntimeProfile::tool().worker_threads <= 2);
    }

    #[test]
    fn runtime_runs_futures() {
        let runtime = build_runtime(&RuntimeProfile::tool()).unwrap();
        assert_eq!(runtime.block_on(async { 40 + 2 }), 42);
    }
}
