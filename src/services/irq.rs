//! Interrupt hand-off.
//!
//! The interrupt-side half does as little as possible: it signals that the
//! edge register has something in it and returns. The deferred handler
//! reads and decodes the register later, outside interrupt context.

use tokio::sync::mpsc;
use tracing::warn;

/// Fast-path end of the interrupt channel.
///
/// Cheap to clone. [`raise`](Self::raise) never blocks and never takes the
/// chronometer lock.
#[derive(Clone, Debug)]
pub struct InterruptLine {
    tx: mpsc::Sender<()>,
}

/// Deferred-side end of the interrupt channel.
#[derive(Debug)]
pub struct InterruptReceiver {
    rx: mpsc::Receiver<()>,
}

/// Creates a connected line and receiver holding up to `depth` pending
/// activations.
pub fn interrupt_channel(depth: usize) -> (InterruptLine, InterruptReceiver) {
    let (tx, rx) = mpsc::channel(depth.max(1));
    (InterruptLine { tx }, InterruptReceiver { rx })
}

impl InterruptLine {
    /// Signals one activation.
    ///
    /// Returns `false` when the activation was not queued. A full queue is
    /// harmless because the latched register is read by the already-queued
    /// activation.
    pub fn raise(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(())) => {
                warn!("interrupt queue full, activation coalesced");
                false
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                warn!("interrupt raised with no handler attached");
                false
            }
        }
    }

    /// Whether the deferred side is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl InterruptReceiver {
    /// Waits for the next activation. Returns `false` once every line is
    /// dropped.
    pub async fn wait(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}
