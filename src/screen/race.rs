// src/screen/race.rs

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::backend::Backend;
use crate::config::PlaybackSection;
use crate::errors::Result;
use crate::playback::{FrameSink, PlaybackHandle, PlaybackStatus, spawn_playback};
use crate::types::PlaybackSpeed;

/// Coordinator for the race replay screen.
///
/// Owns the playback runtime for as long as the screen is open. Leaving the
/// screen (or dropping it) unloads the race, which cancels the tick source.
#[derive(Debug)]
pub struct RaceScreen<B: Backend> {
    backend: B,
    playback: PlaybackHandle,
    join: Option<JoinHandle<Result<()>>>,
    base_interval: Duration,
    speed: PlaybackSpeed,
}

impl<B: Backend> RaceScreen<B> {
    /// Open the screen and start its playback runtime.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<S>(backend: B, sink: S, cfg: &PlaybackSection) -> Self
    where
        S: FrameSink + 'static,
    {
        let (playback, join) = spawn_playback(sink, cfg.interval());
        Self {
            backend,
            playback,
            join: Some(join),
            base_interval: cfg.base_interval(),
            speed: cfg.speed,
        }
    }

    pub fn playback(&self) -> &PlaybackHandle {
        &self.playback
    }

    pub fn status(&self) -> PlaybackStatus {
        self.playback.status()
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    /// Fetch the race result and start replaying it from lap one.
    pub async fn start(&mut self) -> Result<()> {
        let report = self.backend.fetch_race().await?;
        info!(
            track = %report.track_name,
            laps = report.race_log.as_ref().map_or(0, Vec::len),
            "race result received"
        );
        self.playback.load(report).await
    }

    /// Play/pause button.
    pub async fn toggle(&mut self) -> Result<()> {
        self.playback.toggle().await
    }

    pub async fn set_speed(&mut self, speed: PlaybackSpeed) -> Result<()> {
        debug!(?speed, "speed preset selected");
        self.speed = speed;
        self.playback
            .set_speed(speed.interval(self.base_interval))
            .await
    }

    /// Unload the race and wait for the playback runtime to stop.
    pub async fn leave(mut self) -> Result<()> {
        self.playback.unload().await?;
        self.playback.shutdown().await?;

        if let Some(join) = self.join.take() {
            join.await.map_err(anyhow::Error::from)??;
        }
        Ok(())
    }
}

impl<B: Backend> Drop for RaceScreen<B> {
    fn drop(&mut self) {
        if self.join.is_some() && self.playback.try_unload() {
            debug!("race screen dropped; playback unloaded");
        }
    }
}
