//! Frame scheduling on top of window redraws.

use std::time::{Duration, Instant};

use crate::scheduler::{FrameScheduler, FrameToken};

/// Schedules at most one frame, due one frame interval after the previous.
///
/// The event loop asks for [`deadline`](Self::deadline) to decide how long
/// to sleep and requests a redraw once it passes; the redraw handler then
/// collects the token with [`take_due`](Self::take_due).
#[derive(Debug)]
pub struct RedrawScheduler {
    interval: Duration,
    next_id: u64,
    pending: Option<(FrameToken, Instant)>,
    last_frame: Option<Instant>,
}

impl RedrawScheduler {
    pub fn new(frame_rate: f32) -> Self {
        let rate = if frame_rate > 0.0 && frame_rate.is_finite() { frame_rate } else { 20.0 };
        Self {
            interval: Duration::from_nanos((1e9 / rate as f64).round() as u64),
            next_id: 0,
            pending: None,
            last_frame: None,
        }
    }

    /// When the pending frame becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, due)| due)
    }

    /// Take the pending frame if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<FrameToken> {
        match self.pending {
            Some((token, due)) if due <= now => {
                self.pending = None;
                self.last_frame = Some(now);
                Some(token)
            }
            _ => None,
        }
    }

    fn schedule_at(&mut self, now: Instant) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        let due = match self.last_frame {
            Some(last) => (last + self.interval).max(now),
            None => now,
        };
        self.pending = Some((token, due));
        token
    }
}

impl FrameScheduler for RedrawScheduler {
    fn schedule_next_frame(&mut self) -> FrameToken {
        self.schedule_at(Instant::now())
    }

    fn cancel(&mut self, token: FrameToken) {
        if matches!(self.pending, Some((pending, _)) if pending == token) {
            self.pending = None;
        }
    }
}
