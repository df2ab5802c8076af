// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Cooperative Frame Scheduling
//
// The host owns the real animation-frame clock. Each engine keeps a FrameLoop
// that hands out one token per requested frame; a frame only runs if it
// presents the token that is still pending, so a stop() always wins over a
// callback that was already queued.

use serde::{Deserialize, Serialize};

/// Cap on the delta passed to a step, so a backgrounded tab does not explode
/// the simulation when it resumes.
pub const MAX_FRAME_DELTA_MS: f64 = 100.0;

/// Nominal display refresh interval.
pub const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopState {
    Idle,
    Running,
}

#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: LoopState,
    pending: Option<FrameToken>,
    next_token: u64,
    last_timestamp: Option<f64>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            pending: None,
            next_token: 1,
            last_timestamp: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Enter Running and request the first frame. Starting an already
    /// running loop returns the frame that is already pending.
    pub fn start(&mut self) -> FrameToken {
        if let (LoopState::Running, Some(token)) = (self.state, self.pending) {
            return token;
        }
        self.state = LoopState::Running;
        self.last_timestamp = None;
        self.issue()
    }

    /// Back to Idle. Returns the cancelled frame so the host can drop its
    /// scheduled callback.
    pub fn stop(&mut self) -> Option<FrameToken> {
        self.state = LoopState::Idle;
        self.last_timestamp = None;
        self.pending.take()
    }

    /// Consume `token` at `now_ms`. Returns the elapsed milliseconds since the
    /// previous frame (nominal on the first one), or `None` when the token is
    /// stale or the loop is idle.
    pub fn begin_frame(&mut self, token: FrameToken, now_ms: f64) -> Option<f64> {
        if self.state != LoopState::Running || self.pending != Some(token) {
            return None;
        }
        self.pending = None;
        let delta = match self.last_timestamp {
            Some(last) if now_ms.is_finite() && now_ms >= last => {
                (now_ms - last).min(MAX_FRAME_DELTA_MS)
            }
            _ => NOMINAL_FRAME_MS,
        };
        if now_ms.is_finite() {
            self.last_timestamp = Some(now_ms);
        }
        Some(delta)
    }

    /// Request the next frame if still running.
    pub fn reschedule(&mut self) -> Option<FrameToken> {
        if self.state != LoopState::Running {
            return None;
        }
        match self.pending {
            Some(token) => Some(token),
            None => Some(self.issue()),
        }
    }

    fn issue(&mut self) -> FrameToken {
        let token = FrameToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(token);
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_token_is_ignored_after_stop() {
        let mut frames = FrameLoop::new();
        let first = frames.start();
        assert_eq!(frames.stop(), Some(first));
        assert_eq!(frames.begin_frame(first, 16.0), None);

        let second = frames.start();
        assert_ne!(first, second);
        assert_eq!(frames.begin_frame(first, 16.0), None);
        assert_eq!(frames.begin_frame(second, 16.0), Some(NOMINAL_FRAME_MS));
    }

    #[test]
    fn deltas_track_timestamps() {
        let mut frames = FrameLoop::new();
        let t = frames.start();
        frames.begin_frame(t, 1000.0);
        let t = frames.reschedule().expect("test: running");
        assert_eq!(frames.begin_frame(t, 1020.0), Some(20.0));
        let t = frames.reschedule().expect("test: running");
        assert_eq!(frames.begin_frame(t, 5000.0), Some(MAX_FRAME_DELTA_MS));
    }

    #[test]
    fn token_is_single_use() {
        let mut frames = FrameLoop::new();
        let t = frames.start();
        assert!(frames.begin_frame(t, 0.0).is_some());
        assert!(frames.begin_frame(t, 16.0).is_none());
    }

    #[test]
    fn idle_loop_does_not_reschedule() {
        let mut frames = FrameLoop::new();
        assert_eq!(frames.reschedule(), None);
        frames.start();
        frames.stop();
        assert_eq!(frames.reschedule(), None);
        assert_eq!(frames.pending(), None);
    }

    #[test]
    fn double_start_keeps_single_pending_frame() {
        let mut frames = FrameLoop::new();
        let a = frames.start();
        let b = frames.start();
        assert_eq!(a, b);
    }
}
