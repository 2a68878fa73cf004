use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::broadcast;

pub trait Shutdown {
    fn subscribe(&self) -> broadcast::Receiver<()>;
    fn is_shutdown(&self) -> bool;
}

/// Broadcast based shutdown signal.
///
/// The closed flag is sticky: a receiver subscribed after the signal was
/// sent still sees `is_shutdown() == true`.
#[derive(Clone)]
pub struct ShutdownChannel {
    shutdown: broadcast::Sender<()>,
    closed: Arc<AtomicBool>,
}

impl ShutdownChannel {
    pub fn new(shutdown: broadcast::Sender<()>) -> Self {
        Self {
            shutdown,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fires the signal. Returns `false` if it had already been fired.
    pub fn trigger(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        // No receivers means nothing is running, which is fine.
        let _ = self.shutdown.send(());
        true
    }
}

impl Default for ShutdownChannel {
    fn default() -> Self {
        let (shutdown, _) = broadcast::channel(1);
        Self::new(shutdown)
    }
}

impl Shutdown for ShutdownChannel {
    fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }

    fn is_shutdown(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
