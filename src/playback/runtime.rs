// src/playback/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::errors::Result;
use crate::playback::{
    FrameSink, PlaybackCommand, PlaybackController, PlaybackEffect, PlaybackState, PlaybackStep,
    TickSource,
};
use crate::race::RaceReport;

/// Observable position of the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub cursor: usize,
    pub interval: Duration,
}

#[derive(Debug)]
enum Control {
    Command(PlaybackCommand),
    Shutdown,
}

/// Drives a [`PlaybackController`] from commands and ticks.
///
/// Owns at most one [`TickSource`]. Every start bumps the epoch, and ticks
/// carrying an older epoch are dropped, so a cancelled source can never
/// advance the cursor.
pub struct PlaybackRuntime<S: FrameSink> {
    controller: PlaybackController,
    control_rx: mpsc::Receiver<Control>,
    tick_tx: mpsc::Sender<u64>,
    tick_rx: mpsc::Receiver<u64>,
    interval_tx: watch::Sender<Duration>,
    status_tx: watch::Sender<PlaybackStatus>,
    ticker: Option<TickSource>,
    epoch: u64,
    sink: S,
}

impl<S: FrameSink> fmt::Debug for PlaybackRuntime<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackRuntime")
            .field("controller", &self.controller)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl<S: FrameSink> PlaybackRuntime<S> {
    /// Main loop. Returns when shut down or when every handle is dropped.
    pub async fn run(mut self) -> Result<()> {
        info!(
            interval_ms = self.controller.interval().as_millis() as u64,
            "playback runtime started"
        );

        loop {
            let (step, reload) = tokio::select! {
                biased;

                control = self.control_rx.recv() => match control {
                    Some(Control::Command(command)) => {
                        debug!(?command, "playback received command");
                        let reload = matches!(command, PlaybackCommand::Load(_));
                        (self.controller.apply(command), reload)
                    }
                    Some(Control::Shutdown) => {
                        info!("playback shutdown requested");
                        break;
                    }
                    None => {
                        info!("playback control channel closed; exiting");
                        break;
                    }
                },

                Some(epoch) = self.tick_rx.recv() => {
                    if epoch != self.epoch || self.ticker.is_none() {
                        trace!(epoch, current = self.epoch, "discarding stale tick");
                        continue;
                    }
                    (self.controller.tick(), false)
                }
            };

            self.execute(step, reload);
        }

        self.stop_ticking();
        info!("playback runtime exiting");
        Ok(())
    }

    /// Carry out `step`'s effects and publish the new status.
    ///
    /// The sink hears about every state change, and about every load even
    /// when the state is unchanged (Finished to Finished for two races
    /// without laps).
    fn execute(&mut self, step: PlaybackStep, reload: bool) {
        let before = self.status_tx.borrow().state;

        let notify_load = reload && step.accepted;
        for effect in step.effects {
            match effect {
                PlaybackEffect::StartTicking => self.start_ticking(),
                PlaybackEffect::StopTicking => self.stop_ticking(),
                PlaybackEffect::Retime(interval) => {
                    self.interval_tx.send_replace(interval);
                }
                PlaybackEffect::Present => {
                    if let Some(frame) = self.controller.current_frame() {
                        self.sink.present(&frame, self.controller.state());
                    }
                }
            }
        }

        let status = PlaybackStatus {
            state: self.controller.state(),
            cursor: self.controller.cursor(),
            interval: self.controller.interval(),
        };
        self.status_tx.send_replace(status);

        if status.state != before || notify_load {
            self.sink.state_changed(status.state);
        }
    }

    fn start_ticking(&mut self) {
        self.stop_ticking();
        self.epoch += 1;
        self.ticker = Some(TickSource::spawn(
            self.epoch,
            self.interval_tx.subscribe(),
            self.tick_tx.clone(),
        ));
    }

    fn stop_ticking(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}

/// Cloneable front door to a running [`PlaybackRuntime`].
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    control_tx: mpsc::Sender<Control>,
    status_rx: watch::Receiver<PlaybackStatus>,
}

impl PlaybackHandle {
    async fn send(&self, control: Control) -> Result<()> {
        self.control_tx
            .send(control)
            .await
            .map_err(anyhow::Error::from)?;
        Ok(())
    }

    pub async fn load(&self, report: RaceReport) -> Result<()> {
        self.send(Control::Command(PlaybackCommand::Load(report))).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(Control::Command(PlaybackCommand::Pause)).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.send(Control::Command(PlaybackCommand::Resume)).await
    }

    pub async fn toggle(&self) -> Result<()> {
        self.send(Control::Command(PlaybackCommand::Toggle)).await
    }

    pub async fn set_speed(&self, interval: Duration) -> Result<()> {
        self.send(Control::Command(PlaybackCommand::SetSpeed(interval)))
            .await
    }

    pub async fn unload(&self) -> Result<()> {
        self.send(Control::Command(PlaybackCommand::Unload)).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(Control::Shutdown).await
    }

    /// Non-blocking unload used from `Drop` impls.
    pub fn try_unload(&self) -> bool {
        self.control_tx
            .try_send(Control::Command(PlaybackCommand::Unload))
            .is_ok()
    }

    pub fn status(&self) -> PlaybackStatus {
        *self.status_rx.borrow()
    }

    /// Wait until the automaton reaches `state`.
    pub async fn wait_for_state(&self, state: PlaybackState) -> Result<PlaybackStatus> {
        let mut rx = self.status_rx.clone();
        let status = rx
            .wait_for(|s| s.state == state)
            .await
            .map_err(anyhow::Error::from)?;
        Ok(*status)
    }
}

/// Spawn a playback runtime on the current Tokio runtime.
pub fn spawn_playback<S>(sink: S, interval: Duration) -> (PlaybackHandle, JoinHandle<Result<()>>)
where
    S: FrameSink + 'static,
{
    let (control_tx, control_rx) = mpsc::channel::<Control>(32);
    let (tick_tx, tick_rx) = mpsc::channel::<u64>(8);

    let controller = PlaybackController::new(interval);
    let (interval_tx, _) = watch::channel(controller.interval());
    let (status_tx, status_rx) = watch::channel(PlaybackStatus {
        state: controller.state(),
        cursor: controller.cursor(),
        interval: controller.interval(),
    });

    let runtime = PlaybackRuntime {
        controller,
        control_rx,
        tick_tx,
        tick_rx,
        interval_tx,
        status_tx,
        ticker: None,
        epoch: 0,
        sink,
    };

    let join = tokio::spawn(runtime.run());
    (
        PlaybackHandle {
            control_tx,
            status_rx,
        },
        join,
    )
}
