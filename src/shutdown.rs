//! Termination signal watcher.
//!
//! A small tokio runtime waits for SIGINT, SIGTERM or SIGHUP and only flips a
//! shared flag. The game loop polls the flag between operations and does the
//! auto-save itself, so no game state is ever touched from the signal task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::runtime::{Builder, Runtime};
use tracing::{info, warn};

/// Cloneable "please stop" flag
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Running signal watcher; dropping it stops the watcher.
pub struct ShutdownWatcher {
    _rt: Runtime,
    flag: ShutdownFlag,
}

impl ShutdownWatcher {
    pub fn start() -> Result<Self> {
        let rt = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("tui-2048-signals")
            .enable_all()
            .build()?;
        let flag = ShutdownFlag::new();

        let task_flag = flag.clone();
        rt.spawn(async move {
            match wait_for_signal().await {
                Ok(name) => {
                    info!(signal = name, "shutdown requested");
                    task_flag.request();
                }
                Err(e) => warn!(error = %e, "signal handlers unavailable"),
            }
        });

        Ok(Self { _rt: rt, flag })
    }

    pub fn flag(&self) -> ShutdownFlag {
        self.flag.clone()
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = interrupt.recv() => Ok("SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
        _ = hangup.recv() => Ok("SIGHUP"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_is_shared_between_clones() {
        let flag = ShutdownFlag::new();
        let seen_by_loop = flag.clone();
        assert!(!seen_by_loop.is_requested());
        flag.request();
        assert!(seen_by_loop.is_requested());
    }

    #[test]
    fn test_watcher_starts_without_request() {
        let watcher = ShutdownWatcher::start().unwrap();
        assert!(!watcher.flag().is_requested());
    }
}
