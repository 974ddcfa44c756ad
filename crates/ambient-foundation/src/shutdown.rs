use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Notify;

/// Ctrl-C shutdown signal shared by the runtime wiring.
///
/// Stopping one stream never stops the other; this guard is only
/// consulted by whole-process shutdown.
pub struct ShutdownGuard {
    requested: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownGuard {
    /// Install the Ctrl-C handler. Must be called from within a tokio
    /// runtime.
    pub fn install() -> Self {
        let requested = Arc::new(AtomicBool::new(false));
        let notify = Arc::new(Notify::new());

        let task_requested = Arc::clone(&requested);
        let task_notify = Arc::clone(&notify);
        tokio::spawn(async move {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to install Ctrl-C handler: {}", e);
                return;
            }
            tracing::info!("Shutdown requested via Ctrl-C");
            task_requested.store(true, Ordering::SeqCst);
            task_notify.notify_waiters();
        });

        Self { requested, notify }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Wait until shutdown has been requested.
    pub async fn wait(&self) {
        // notify_waiters does not wake tasks that register later, so a
        // request that already landed must short-circuit here.
        if self.is_requested() {
            return;
        }
        self.notify.notified().await;
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }
}
