//! Shutdown coordination
//!
//! A process-wide flag set once by the signal listener and polled by the
//! rotation loop and the inter-visit wait. The listener also races a cleanup
//! of the in-flight session against a grace delay, then hard-exits so
//! shutdown latency stays bounded even if the browser hangs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::session::VisitSession;

/// Cloneable handle to the shared shutdown state.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<ShutdownState>,
}

struct ShutdownState {
    flag: AtomicBool,
    current: Mutex<Option<Arc<VisitSession>>>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ShutdownState {
                flag: AtomicBool::new(false),
                current: Mutex::new(None),
            }),
        }
    }

    /// True once a termination signal was received (never reset within a run)
    pub fn is_shutting_down(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Set the flag directly. The signal listener uses this; tests too.
    pub fn request(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
    }

    /// Publish the session the loop is about to run, so the signal path can
    /// clean it up mid-flight
    pub async fn set_current(&self, session: Arc<VisitSession>) {
        *self.inner.current.lock().await = Some(session);
    }

    /// Drop the published session once its visit finished
    pub async fn clear_current(&self) {
        *self.inner.current.lock().await = None;
    }

    /// Spawn the signal listener. On SIGINT/SIGTERM it sets the flag, starts
    /// cleanup of any in-flight session, and exits the process after the
    /// grace delay whether or not cleanup finished.
    pub fn listen(&self, grace: Duration) {
        let state = self.inner.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            println!("\n🛑 Shutdown signal received, cleaning up...");
            state.flag.store(true, Ordering::SeqCst);

            if let Some(session) = state.current.lock().await.clone() {
                // Raced against the grace delay, not awaited: a hung close
                // must not delay process exit
                tokio::spawn(async move {
                    session.cleanup().await;
                });
            }

            sleep(grace).await;
            std::process::exit(0);
        });
    }

    /// Sleep for `total`, polling the flag every `poll` and returning early,
    /// without error, the moment it is set.
    pub async fn wait_interruptible(&self, total: Duration, poll: Duration) {
        let deadline = Instant::now() + total;

        loop {
            if self.is_shutting_down() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            sleep((deadline - now).min(poll)).await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flag_starts_unset() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_shutting_down());

        shutdown.request();
        assert!(shutdown.is_shutting_down());
    }

    #[tokio::test]
    async fn test_wait_runs_full_interval_when_undisturbed() {
        let shutdown = Shutdown::new();
        let started = Instant::now();
        shutdown
            .wait_interruptible(Duration::from_millis(120), Duration::from_millis(20))
            .await;
        assert!(started.elapsed() >= Duration::from_millis(120));
    }

    #[tokio::test]
    async fn test_wait_returns_early_on_request() {
        let shutdown = Shutdown::new();

        let signaller = shutdown.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(40)).await;
            signaller.request();
        });

        let started = Instant::now();
        shutdown
            .wait_interruptible(Duration::from_secs(30), Duration::from_millis(10))
            .await;

        // Must return within roughly one polling granularity of the request,
        // not after the full interval
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_already_set() {
        let shutdown = Shutdown::new();
        shutdown.request();

        let started = Instant::now();
        shutdown
            .wait_interruptible(Duration::from_secs(30), Duration::from_millis(10))
            .await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
