//! Cancellable frame scheduling.
//!
//! The controller never draws on its own initiative. It asks a
//! [`FrameScheduler`] for the next frame and receives a [`FrameToken`]; when
//! the host later delivers that token to
//! [`Controller::on_frame`](crate::controller::Controller::on_frame), one
//! frame is drawn. Cancelling a token, or starting over with a new one, makes
//! any late delivery of the old token a no-op.

use std::collections::VecDeque;

/// Identifies one scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(pub u64);

/// Source of frame callbacks.
pub trait FrameScheduler {
    /// Request one future frame.
    fn schedule_next_frame(&mut self) -> FrameToken;

    /// Withdraw a previously scheduled frame. Unknown tokens are ignored.
    fn cancel(&mut self, token: FrameToken);
}

/// Host-driven scheduler: frames are delivered when the host asks for them.
///
/// Used by tests and by the headless renderer.
///
/// ```ignore
/// let mut controller = Controller::new(grid, config, ManualScheduler::new());
/// controller.start(origin, 800, 600, bounds, options)?;
/// for _ in 0..100 {
///     controller.pump();
/// }
/// ```
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: VecDeque<FrameToken>,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the oldest scheduled frame.
    pub fn take_due(&mut self) -> Option<FrameToken> {
        self.pending.pop_front()
    }

    /// Frames scheduled and not yet taken or cancelled.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// How many scheduled frames were withdrawn.
    pub fn cancelled_count(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_next_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        self.pending.push_back(token);
        token
    }

    fn cancel(&mut self, token: FrameToken) {
        let before = self.pending.len();
        self.pending.retain(|t| *t != token);
        self.cancelled += before - self.pending.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let mut s = ManualScheduler::new();
        let a = s.schedule_next_frame();
        let b = s.schedule_next_frame();
        assert_ne!(a, b);
        assert_eq!(s.pending_count(), 2);
        assert_eq!(s.take_due(), Some(a));
        assert_eq!(s.take_due(), Some(b));
        assert_eq!(s.take_due(), None);
    }

    #[test]
    fn test_cancel() {
        let mut s = ManualScheduler::new();
        let a = s.schedule_next_frame();
        s.cancel(a);
        s.cancel(a);
        s.cancel(FrameToken(999));
        assert_eq!(s.pending_count(), 0);
        assert_eq!(s.cancelled_count(), 1);
    }
}
