use std::sync::{Arc, Mutex};

use paddock::playback::{Frame, FrameSink, PlaybackState};

/// One presented frame, reduced to what tests assert on.
#[derive(Debug, Clone, PartialEq)]
pub struct Presented {
    /// Lap number shown in the header.
    pub lap: Option<u32>,
    /// Cursor position for log frames; `None` for the final classification.
    pub index: Option<usize>,
    pub state: PlaybackState,
    pub leader: Option<String>,
}

#[derive(Debug, Default)]
struct Recorded {
    frames: Vec<Presented>,
    states: Vec<PlaybackState>,
}

/// A frame sink that records everything it is shown.
///
/// Clones share the recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<Presented> {
        self.inner.lock().unwrap().frames.clone()
    }

    /// Lap numbers of all presented frames, in order.
    pub fn laps(&self) -> Vec<u32> {
        self.frames().iter().filter_map(|f| f.lap).collect()
    }

    pub fn frame_count(&self) -> usize {
        self.inner.lock().unwrap().frames.len()
    }

    pub fn states(&self) -> Vec<PlaybackState> {
        self.inner.lock().unwrap().states.clone()
    }
}

impl FrameSink for RecordingSink {
    fn present(&mut self, frame: &Frame<'_>, state: PlaybackState) {
        let index = match frame {
            Frame::Lap { index, .. } => Some(*index),
            Frame::Final { .. } => None,
        };
        let presented = Presented {
            lap: frame.lap(),
            index,
            state,
            leader: frame.standings().first().map(|e| e.driver.clone()),
        };
        self.inner.lock().unwrap().frames.push(presented);
    }

    fn state_changed(&mut self, state: PlaybackState) {
        self.inner.lock().unwrap().states.push(state);
    }
}
