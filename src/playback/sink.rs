// src/playback/sink.rs

//! Where playback frames end up.

use std::fmt::Write as _;
use std::io::Write;

use tracing::warn;

use crate::playback::{Frame, PlaybackState};

/// Receives frames from the playback runtime.
pub trait FrameSink: Send {
    /// Show `frame`; `state` is the automaton state after the transition.
    fn present(&mut self, frame: &Frame<'_>, state: PlaybackState);

    /// Called whenever the automaton changes state.
    fn state_changed(&mut self, _state: PlaybackState) {}
}

/// Render a standings table for `frame`.
///
/// Columns: position, driver, team, gap, tire (compound initial and remaining
/// life) and pit stops.
pub fn render_frame(frame: &Frame<'_>, state: PlaybackState) -> String {
    let mut out = String::new();

    let header = match frame {
        Frame::Lap { snapshot, total, .. } if state == PlaybackState::Finished => {
            format!("Race Classification (lap {} / {total})", snapshot.lap)
        }
        Frame::Lap { snapshot, total, .. } => format!("Lap {} / {total}", snapshot.lap),
        Frame::Final { lap: Some(lap), .. } => format!("Race Classification (lap {lap})"),
        Frame::Final { lap: None, .. } => "Race Classification".to_string(),
    };
    let _ = writeln!(out, "{header}");

    for (pos, entrant) in frame.standings().iter().enumerate() {
        let gap = frame.gap_label(pos).unwrap_or_else(|| "-".to_string());
        let tire = match (entrant.compound, entrant.tire_life()) {
            (Some(c), Some(life)) => format!("{} {life:>3.0}%", c.initial()),
            (Some(c), None) => c.initial().to_string(),
            (None, Some(life)) => format!("{life:>3.0}%"),
            (None, None) => "-".to_string(),
        };
        let stops = entrant
            .stops
            .map_or_else(|| "-".to_string(), |s| s.to_string());

        let _ = writeln!(
            out,
            "{:>3}  {:<20} {:<16} {:>10}  {:<6} {:>2}",
            pos + 1,
            entrant.driver,
            entrant.team,
            gap,
            tire,
            stops
        );
    }

    out
}

/// Writes each frame as a plain-text table to stdout.
#[derive(Debug, Default)]
pub struct TableSink;

impl FrameSink for TableSink {
    fn present(&mut self, frame: &Frame<'_>, state: PlaybackState) {
        let table = render_frame(frame, state);
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{table}") {
            warn!(error = %err, "failed to write frame to stdout");
        }
    }
}
