// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Bubble Force Model
//
// The ambient motion of the bubble cluster: a centering pull toward a slowly
// wandering point, a weak swirl around it, and per-body drift. All terms are
// accelerations in px / frame², evaluated at simulation time `t` in seconds.

use crate::geometry::{clamp01, ease_out_quad};
use crate::types::Vec2;

/// Peak extra centering strength right after a flick, per unit of flick strength.
const BOOST_GAIN: f64 = 1.1;

/// Point the cluster is pulled toward: the canvas center plus a slow
/// out-of-phase sine/cosine wander.
pub(super) fn wander_center(width: f64, height: f64, wander: f64, t: f64) -> Vec2 {
    Vec2::new(
        width / 2.0 + (t * 0.31).sin() * width * wander,
        height / 2.0 + (t * 0.23).cos() * height * wander,
    )
}

/// Slow breathing of the centering strength.
pub(super) fn pulse(t: f64) -> f64 {
    1.0 + 0.2 * (t * 0.9).sin()
}

pub(super) fn centering(position: Vec2, target: Vec2, strength: f64) -> Vec2 {
    (target - position) * strength
}

/// Perpendicular push around `target` whose direction flips slowly over time.
pub(super) fn swirl(position: Vec2, target: Vec2, strength: f64, t: f64) -> Vec2 {
    let radial = position - target;
    let distance = radial.length();
    if distance < 1e-6 {
        return Vec2::ZERO;
    }
    (radial / distance).perp() * (strength * (t * 0.13).sin())
}

/// Per-body wobble; `phase` is fixed for the lifetime of the body.
pub(super) fn drift(phase: f64, strength: f64, t: f64) -> Vec2 {
    Vec2::new(
        (t * 0.7 + phase).sin() + 0.5 * (t * 1.9 + phase * 2.0).sin(),
        (t * 0.6 + phase).cos() + 0.5 * (t * 1.7 + phase * 1.5).cos(),
    ) * strength
}

/// Temporary centering multiplier armed by a flick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct ClusterBoost {
    armed_at_ms: Option<f64>,
    strength: f64,
    duration_ms: f64,
}

impl ClusterBoost {
    pub(super) fn new(duration_ms: f64) -> Self {
        Self {
            armed_at_ms: None,
            strength: 0.0,
            duration_ms,
        }
    }

    pub(super) fn arm(&mut self, now_ms: f64, strength: f64) {
        self.armed_at_ms = Some(now_ms);
        self.strength = clamp01(strength);
    }

    pub(super) fn reset(&mut self) {
        self.armed_at_ms = None;
        self.strength = 0.0;
    }

    /// `1 + strength * 1.1 * ease_out_quad(remaining)`, where `remaining`
    /// falls from 1 to 0 across the boost window.
    pub(super) fn factor(&mut self, now_ms: f64) -> f64 {
        let Some(armed_at) = self.armed_at_ms else {
            return 1.0;
        };
        let elapsed = now_ms - armed_at;
        if elapsed >= self.duration_ms {
            self.reset();
            return 1.0;
        }
        let remaining = 1.0 - clamp01(elapsed / self.duration_ms);
        1.0 + self.strength * BOOST_GAIN * ease_out_quad(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_decays_to_baseline() {
        let mut boost = ClusterBoost::new(900.0);
        assert_eq!(boost.factor(0.0), 1.0);

        boost.arm(1000.0, 1.0);
        assert!((boost.factor(1000.0) - 2.1).abs() < 1e-9);
        let mid = boost.factor(1450.0);
        assert!(mid > 1.0 && mid < 2.1);
        assert_eq!(boost.factor(1900.0), 1.0);
        assert_eq!(boost.factor(1000.0), 1.0);
    }

    #[test]
    fn boost_strength_is_capped() {
        let mut boost = ClusterBoost::new(900.0);
        boost.arm(0.0, 7.0);
        assert!((boost.factor(0.0) - 2.1).abs() < 1e-9);
    }

    #[test]
    fn swirl_is_perpendicular() {
        let position = Vec2::new(10.0, 0.0);
        let force = swirl(position, Vec2::ZERO, 1.0, 5.0);
        assert!(force.dot(position).abs() < 1e-12);
        assert_eq!(swirl(Vec2::ZERO, Vec2::ZERO, 1.0, 5.0), Vec2::ZERO);
    }

    #[test]
    fn centering_points_at_target() {
        let force = centering(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 0.01);
        assert_eq!(force, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn wander_stays_near_center() {
        for step in 0..200 {
            let c = wander_center(400.0, 300.0, 0.06, step as f64 * 0.5);
            assert!((c.x - 200.0).abs() <= 24.0 + 1e-9);
            assert!((c.y - 150.0).abs() <= 18.0 + 1e-9);
        }
    }

    #[test]
    fn drift_is_bounded() {
        for step in 0..200 {
            let d = drift(1.3, 0.01, step as f64 * 0.25);
            assert!(d.x.abs() <= 0.015 + 1e-12);
            assert!(d.y.abs() <= 0.015 + 1e-12);
        }
    }
}
