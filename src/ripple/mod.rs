// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Ripple Renderer
//
// Two interchangeable decorative effects fired when the bubbles settle:
// a height-field wave (`wave`) and expanding concentric rings (`rings`).
// Both honour the same trigger contract, so the host can swap them freely.

pub mod rings;
pub mod wave;

pub use rings::{RingDraw, Ripple, RippleRing, RippleRings};
pub use wave::WaveField;

use crate::frame_loop::{FrameLoop, FrameToken, LoopState};
use crate::types::BubbleSnapshot;

/// Trigger contract shared by every ripple design.
pub trait RippleEffect {
    /// Fire the effect for `bubbles`. Edge-triggered: only the first call of
    /// an activation period does anything; later calls return `false` until
    /// [`deactivate`](Self::deactivate). Invalid bubbles are skipped.
    fn activate(&mut self, bubbles: &[BubbleSnapshot]) -> bool;

    /// End the activation period and drop all effect state.
    fn deactivate(&mut self);

    /// One frame, `delta_ms` after the previous one. Returns `true` while the
    /// effect still wants frames.
    fn advance(&mut self, delta_ms: f64) -> bool;

    fn is_active(&self) -> bool;
}

/// Ties a ripple effect to its own frame loop.
pub struct RippleLoop<E> {
    effect: E,
    frames: FrameLoop,
}

impl<E: RippleEffect> RippleLoop<E> {
    pub fn new(effect: E) -> Self {
        Self {
            effect,
            frames: FrameLoop::new(),
        }
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    pub fn state(&self) -> LoopState {
        self.frames.state()
    }

    /// Activation edge: triggers the effect and requests the first frame.
    /// `None` when this activation period already fired.
    pub fn activate(&mut self, bubbles: &[BubbleSnapshot]) -> Option<FrameToken> {
        if !self.effect.activate(bubbles) {
            return None;
        }
        Some(self.frames.start())
    }

    /// Deactivation edge: stops the loop synchronously and clears the effect.
    /// Returns the frame the host should cancel.
    pub fn deactivate(&mut self) -> Option<FrameToken> {
        let cancelled = self.frames.stop();
        self.effect.deactivate();
        cancelled
    }

    /// Host frame callback; returns the next frame to request.
    pub fn frame(&mut self, token: FrameToken, now_ms: f64) -> Option<FrameToken> {
        let delta = self.frames.begin_frame(token, now_ms)?;
        if self.effect.advance(delta) {
            self.frames.reschedule()
        } else {
            self.frames.stop();
            None
        }
    }
}
