// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Concentric Ring Ripple
//
// One ripple per bubble, each a staggered set of expanding circles. Ring `i`
// starts `i * ring_delay_ms` after activation and runs for `ring_duration_ms`:
//
//   radius  r -> r * min(2 + 0.5 i, max_radius_multiplier)   ease-out-quart
//   opacity initial_opacity -> 0                             ease-out-cubic
//   stroke  initial_stroke -> final_stroke                   linear
//
// When every ring has finished the completion callback fires once and the
// draw list empties.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RippleConfig;
use crate::geometry::{clamp01, ease_out_cubic, ease_out_quart, lerp};
use crate::types::BubbleSnapshot;

use super::RippleEffect;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RippleRing {
    pub delay_ms: f64,
    pub max_radius: f64,
    pub progress: f64,
    pub radius: f64,
    pub opacity: f64,
    pub stroke_width: f64,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ripple {
    pub x: f64,
    pub y: f64,
    pub base_radius: f64,
    pub rings: Vec<RippleRing>,
}

impl Ripple {
    fn new(bubble: &BubbleSnapshot, config: &RippleConfig) -> Self {
        let rings = (0..config.ring_count)
            .map(|i| {
                let multiplier = (2.0 + 0.5 * i as f64).min(config.max_radius_multiplier);
                RippleRing {
                    delay_ms: i as f64 * config.ring_delay_ms,
                    max_radius: bubble.radius * multiplier,
                    progress: 0.0,
                    radius: bubble.radius,
                    opacity: config.initial_opacity,
                    stroke_width: config.initial_stroke,
                    completed: false,
                }
            })
            .collect();
        Self {
            x: bubble.x,
            y: bubble.y,
            base_radius: bubble.radius,
            rings,
        }
    }

    fn update(&mut self, elapsed_ms: f64, config: &RippleConfig) {
        for ring in &mut self.rings {
            let progress = clamp01((elapsed_ms - ring.delay_ms) / config.ring_duration_ms);
            ring.progress = progress;
            ring.radius = lerp(self.base_radius, ring.max_radius, ease_out_quart(progress));
            ring.opacity = config.initial_opacity * (1.0 - ease_out_cubic(progress));
            ring.stroke_width = lerp(config.initial_stroke, config.final_stroke, progress);
            ring.completed = progress >= 1.0;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.rings.iter().all(|ring| ring.completed)
    }
}

/// A circle to stroke this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RingDraw {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub opacity: f64,
    pub stroke_width: f64,
}

pub struct RippleRings {
    config: RippleConfig,
    ripples: Vec<Ripple>,
    elapsed_ms: f64,
    active: bool,
    triggered: bool,
    finished: bool,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl RippleRings {
    pub fn new(config: RippleConfig) -> Self {
        Self {
            config: config.clamped(),
            ripples: Vec::new(),
            elapsed_ms: 0.0,
            active: false,
            triggered: false,
            finished: false,
            on_complete: None,
        }
    }

    /// Called once each time a ring animation finishes.
    pub fn on_complete(&mut self, callback: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total animation length: the last ring's delay plus one ring duration.
    pub fn total_duration_ms(&self) -> f64 {
        let last = self.config.ring_count.saturating_sub(1) as f64;
        last * self.config.ring_delay_ms + self.config.ring_duration_ms
    }

    /// Rings that have started and are still visible. Empty once finished.
    pub fn draw_list(&self) -> Vec<RingDraw> {
        if self.finished {
            return Vec::new();
        }
        self.ripples
            .iter()
            .flat_map(|ripple| {
                ripple
                    .rings
                    .iter()
                    .filter(|ring| ring.progress > 0.0 && !ring.completed)
                    .map(move |ring| RingDraw {
                        x: ripple.x,
                        y: ripple.y,
                        radius: ring.radius,
                        opacity: ring.opacity,
                        stroke_width: ring.stroke_width,
                    })
            })
            .collect()
    }

    fn finish(&mut self) {
        self.finished = true;
        debug!(ripples = self.ripples.len(), elapsed_ms = self.elapsed_ms, "ring ripple complete");
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }
}

impl RippleEffect for RippleRings {
    fn activate(&mut self, bubbles: &[BubbleSnapshot]) -> bool {
        if self.triggered {
            return false;
        }
        self.triggered = true;
        self.active = true;
        self.finished = false;
        self.elapsed_ms = 0.0;

        let config = &self.config;
        self.ripples = bubbles
            .iter()
            .filter(|bubble| {
                let valid = bubble.is_valid();
                if !valid {
                    warn!(?bubble, "ring ripple: skipping invalid bubble");
                }
                valid
            })
            .map(|bubble| Ripple::new(bubble, config))
            .collect();
        debug!(ripples = self.ripples.len(), "ring ripple activated");
        true
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.triggered = false;
        self.finished = false;
        self.elapsed_ms = 0.0;
        self.ripples.clear();
    }

    fn advance(&mut self, delta_ms: f64) -> bool {
        if !self.active || self.finished {
            return false;
        }
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.elapsed_ms += delta_ms;
        }
        for ripple in &mut self.ripples {
            ripple.update(self.elapsed_ms, &self.config);
        }
        if self.ripples.iter().all(Ripple::is_complete) {
            self.finish();
            return false;
        }
        true
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn bubble() -> BubbleSnapshot {
        BubbleSnapshot {
            x: 100.0,
            y: 100.0,
            radius: 50.0,
        }
    }

    #[test]
    fn one_bubble_gets_four_rings() {
        let mut rings = RippleRings::new(RippleConfig::default());
        rings.activate(&[bubble()]);
        assert_eq!(rings.ripples().len(), 1);
        let ripple = &rings.ripples()[0];
        assert_eq!(ripple.rings.len(), 4);
        let delays: Vec<f64> = ripple.rings.iter().map(|r| r.delay_ms).collect();
        assert_eq!(delays, vec![0.0, 120.0, 240.0, 360.0]);
        let maxima: Vec<f64> = ripple.rings.iter().map(|r| r.max_radius).collect();
        assert_eq!(maxima, vec![100.0, 125.0, 150.0, 175.0]);
    }

    #[test]
    fn multiplier_is_capped() {
        let config = RippleConfig {
            ring_count: 6,
            ..RippleConfig::default()
        };
        let mut rings = RippleRings::new(config);
        rings.activate(&[bubble()]);
        let last = rings.ripples()[0].rings.last().expect("test: six rings");
        assert_eq!(last.max_radius, 175.0);
    }

    #[test]
    fn ring_interpolation() {
        let mut rings = RippleRings::new(RippleConfig::default());
        rings.activate(&[bubble()]);
        rings.advance(700.0);
        let first = &rings.ripples()[0].rings[0];
        assert_eq!(first.progress, 0.5);
        assert!((first.radius - (50.0 + 50.0 * ease_out_quart(0.5))).abs() < 1e-9);
        assert!((first.opacity - 0.6 * 0.125).abs() < 1e-9);
        assert!((first.stroke_width - 1.75).abs() < 1e-9);
    }

    #[test]
    fn completes_after_last_ring() {
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let mut rings = RippleRings::new(RippleConfig::default());
        rings.on_complete(move || counter.set(counter.get() + 1));
        rings.activate(&[bubble()]);
        assert_eq!(rings.total_duration_ms(), 1760.0);

        assert!(rings.advance(1400.0));
        assert!(!rings.draw_list().is_empty());
        assert!(!rings.advance(360.0));
        assert!(rings.is_finished());
        assert!(rings.ripples()[0].rings.iter().all(|r| r.completed));
        assert!(rings.draw_list().is_empty());
        assert_eq!(fired.get(), 1);

        // further frames do not re-fire
        assert!(!rings.advance(16.0));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn unstarted_rings_are_not_drawn() {
        let mut rings = RippleRings::new(RippleConfig::default());
        rings.activate(&[bubble()]);
        rings.advance(60.0);
        assert_eq!(rings.draw_list().len(), 1);
        rings.advance(100.0);
        assert_eq!(rings.draw_list().len(), 2);
    }

    #[test]
    fn edge_triggered_until_deactivated() {
        let mut rings = RippleRings::new(RippleConfig::default());
        assert!(rings.activate(&[bubble()]));
        assert!(!rings.activate(&[bubble(), bubble()]));
        assert_eq!(rings.ripples().len(), 1);

        rings.deactivate();
        assert!(rings.ripples().is_empty());
        assert!(!rings.is_active());
        assert!(rings.activate(&[bubble(), bubble()]));
        assert_eq!(rings.ripples().len(), 2);
    }

    #[test]
    fn zero_duration_still_completes() {
        let config = RippleConfig {
            ring_duration_ms: 0.0,
            ring_delay_ms: -10.0,
            ..RippleConfig::default()
        };
        let mut rings = RippleRings::new(config);
        rings.activate(&[bubble()]);
        assert_eq!(rings.total_duration_ms(), 1.0);
        assert!(!rings.advance(16.0));
        assert!(rings.is_finished());
    }

    #[test]
    fn invalid_bubbles_are_skipped() {
        let mut rings = RippleRings::new(RippleConfig::default());
        let bad = BubbleSnapshot {
            x: 10.0,
            y: 10.0,
            radius: 0.0,
        };
        rings.activate(&[bad, bubble()]);
        assert_eq!(rings.ripples().len(), 1);
    }
}
