//! Shutdown coordination for the server process
//!
//! Turns process signals into a broadcast that the server loop can await.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Coordinates graceful shutdown across the process
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);
        let coordinator = Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        };
        (coordinator, shutdown_rx)
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Install signal handlers that trigger this coordinator
    ///
    /// A second signal after the first forces an immediate exit. Must be
    /// called from within a tokio runtime.
    pub fn install_signal_handlers(&self) {
        let signal_count = Arc::new(AtomicUsize::new(0));

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let signals = [
                SignalKind::interrupt(),
                SignalKind::terminate(),
                SignalKind::hangup(),
                SignalKind::quit(),
            ];

            for kind in signals {
                let tx = self.shutdown_tx.clone();
                let requested = Arc::clone(&self.shutdown_requested);
                let counter = Arc::clone(&signal_count);

                tokio::spawn(async move {
                    if let Ok(mut sig) = signal(kind) {
                        while sig.recv().await.is_some() {
                            on_signal(&tx, &requested, &counter);
                        }
                    }
                });
            }
        }

        let tx = self.shutdown_tx.clone();
        let requested = Arc::clone(&self.shutdown_requested);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_signal(&tx, &requested, &signal_count);
            }
        });
    }

    /// Wait until shutdown is triggered
    pub async fn wait(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        if self.is_shutdown_requested() {
            return;
        }
        let _ = shutdown_rx.recv().await;
    }
}

fn on_signal(tx: &broadcast::Sender<()>, requested: &AtomicBool, counter: &AtomicUsize) {
    let previous = counter.fetch_add(1, Ordering::AcqRel);
    requested.store(true, Ordering::Release);
    let _ = tx.send(());
    if previous >= 1 {
        log::warn!("Second shutdown signal received; exiting immediately");
        std::process::exit(130);
    }
    log::info!("Shutdown signal received");
}
