use tracing::{info, warn};

/// Closing side of the shutdown channel. Dropping it also requests shutdown.
pub struct ShutdownTrigger(async_channel::Sender<()>);

/// Cancellation token observed by the input loop between poll cycles.
#[derive(Clone)]
pub struct Shutdown(async_channel::Receiver<()>);

pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (sender, receiver) = async_channel::bounded(1);
    (ShutdownTrigger(sender), Shutdown(receiver))
}

impl ShutdownTrigger {
    pub fn fire(self) {
        self.0.close();
    }
}

impl Shutdown {
    pub fn is_requested(&self) -> bool {
        self.0.is_closed()
    }

    /// Resolves once shutdown has been requested.
    pub async fn requested(&self) {
        while self.0.recv().await.is_ok() {}
    }
}

/// Waits for SIGINT (or SIGTERM on unix) and fires the trigger.
pub async fn listen_for_signals(trigger: ShutdownTrigger) {
    wait_for_signal().await;
    info!("Exiting...");
    trigger.fire();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            warn!("SIGTERM handler unavailable, listening for SIGINT only: {e}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for CTRL+C: {e}");
        std::future::pending::<()>().await;
    }
}
