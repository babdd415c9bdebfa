// src/playback/ticker.rs

//! Cancellable periodic tick source.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// A background task that sends its epoch on `tick_tx` once per period.
///
/// The period is read from a `watch` channel before each sleep, so a speed
/// change takes effect from the next tick without restarting the source.
/// Dropping the source cancels it.
#[derive(Debug)]
pub struct TickSource {
    epoch: u64,
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TickSource {
    pub fn spawn(
        epoch: u64,
        interval_rx: watch::Receiver<Duration>,
        tick_tx: mpsc::Sender<u64>,
    ) -> Self {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(run_ticks(epoch, interval_rx, tick_tx, cancel_rx));
        debug!(epoch, "tick source started");

        Self {
            epoch,
            cancel: Some(cancel_tx),
            handle,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop ticking. Ticks already queued by this source carry its epoch and
    /// are discarded by the receiver.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The task may already be gone; that is fine.
            let _ = cancel.send(());
            debug!(epoch = self.epoch, "tick source cancelled");
        }
        self.handle.abort();
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticks(
    epoch: u64,
    interval_rx: watch::Receiver<Duration>,
    tick_tx: mpsc::Sender<u64>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    loop {
        let period = *interval_rx.borrow();

        tokio::select! {
            _ = &mut cancel_rx => {
                trace!(epoch, "tick source received cancel");
                break;
            }
            _ = tokio::time::sleep(period) => {
                if tick_tx.send(epoch).await.is_err() {
                    trace!(epoch, "tick receiver dropped; stopping");
                    break;
                }
            }
        }
    }
}
