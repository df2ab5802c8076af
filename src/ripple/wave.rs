// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Height-Field Wave Ripple
//
// A square grid of heights driven by the discrete wave equation. Activation
// stamps a depression under every bubble; each frame propagates, damps, and
// shades the field. Two buffers are swapped per step:
//
//     next = (left + right + up + down) / 2 - next
//     next *= damping
//
// Border cells stay pinned at zero.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::config::RippleConfig;
use crate::types::BubbleSnapshot;

use super::RippleEffect;

/// Impulse depth for a bubble of `REFERENCE_RADIUS`.
const IMPULSE_DEPTH: f64 = 64.0;
const REFERENCE_RADIUS: f64 = 40.0;
/// Share of the bubble radius covered by its impulse.
const IMPULSE_SPREAD: f64 = 0.6;
/// Height gradient to surface-normal tilt.
const NORMAL_SCALE: f64 = 0.05;

const HIGHLIGHT_RGB: [u8; 3] = [255, 255, 255];
const SHADOW_RGB: [u8; 3] = [15, 23, 42];
const MAX_HIGHLIGHT_ALPHA: f64 = 180.0;
const MAX_SHADOW_ALPHA: f64 = 120.0;

/// Unit light direction, from the upper left toward the viewer.
fn light() -> [f64; 3] {
    let (x, y, z) = (-1.0_f64, -1.0_f64, 1.2_f64);
    let len = (x * x + y * y + z * z).sqrt();
    [x / len, y / len, z / len]
}

pub struct WaveField {
    config: RippleConfig,
    width: f64,
    height: f64,
    current: Vec<f64>,
    previous: Vec<f64>,
    pixels: Vec<u8>,
    active: bool,
    triggered: bool,
    rng: ChaCha8Rng,
}

impl WaveField {
    pub fn new(config: RippleConfig, width: f64, height: f64) -> Self {
        let config = config.clamped();
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            width,
            height,
            current: Vec::new(),
            previous: Vec::new(),
            pixels: Vec::new(),
            active: false,
            triggered: false,
            rng,
        }
    }

    pub fn grid_size(&self) -> usize {
        self.config.grid_size
    }

    /// Canvas size in px. Impulses are mapped from canvas to grid coordinates.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn height_at(&self, x: usize, y: usize) -> f64 {
        let size = self.config.grid_size;
        if x >= size || y >= size {
            return 0.0;
        }
        self.current.get(y * size + x).copied().unwrap_or(0.0)
    }

    /// Last rendered RGBA frame; empty while inactive.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Sum of absolute heights across the field.
    pub fn energy(&self) -> f64 {
        self.current.iter().map(|h| h.abs()).sum()
    }

    fn canvas_ready(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    fn allocate(&mut self) {
        let cells = self.config.grid_size * self.config.grid_size;
        self.current = vec![0.0; cells];
        self.previous = vec![0.0; cells];
        self.pixels = vec![0; cells * 4];
    }

    fn stamp(&mut self, bubble: &BubbleSnapshot) {
        let size = self.config.grid_size;
        let scale_x = size as f64 / self.width;
        let scale_y = size as f64 / self.height;
        let gx = bubble.x * scale_x;
        let gy = bubble.y * scale_y;

        let max_reach = (size as f64 / 8.0).max(2.0);
        let reach = (bubble.radius * scale_x.min(scale_y) * IMPULSE_SPREAD).clamp(2.0, max_reach);
        let depth = IMPULSE_DEPTH
            * (bubble.radius / REFERENCE_RADIUS).clamp(0.5, 2.0)
            * self.rng.gen_range(0.8..1.2);

        let reach_sq = reach * reach;
        let lo_x = (gx - reach).floor().max(1.0) as usize;
        let hi_x = ((gx + reach).ceil() as usize).min(size - 2);
        let lo_y = (gy - reach).floor().max(1.0) as usize;
        let hi_y = ((gy + reach).ceil() as usize).min(size - 2);
        if gx + reach < 1.0 || gy + reach < 1.0 || lo_x > hi_x || lo_y > hi_y {
            return;
        }

        for y in lo_y..=hi_y {
            for x in lo_x..=hi_x {
                let dx = x as f64 - gx;
                let dy = y as f64 - gy;
                let d_sq = dx * dx + dy * dy;
                if d_sq < reach_sq {
                    self.current[y * size + x] -= depth * (1.0 - d_sq / reach_sq);
                }
            }
        }
    }

    /// One propagation step.
    pub fn step(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let size = self.config.grid_size;
        let damping = self.config.damping;
        for y in 1..size - 1 {
            for x in 1..size - 1 {
                let i = y * size + x;
                let neighbours = self.current[i - 1]
                    + self.current[i + 1]
                    + self.current[i - size]
                    + self.current[i + size];
                self.previous[i] = (neighbours / 2.0 - self.previous[i]) * damping;
            }
        }
        std::mem::swap(&mut self.current, &mut self.previous);
    }

    /// Shade the field into an RGBA buffer of `grid_size²` pixels. Flat water
    /// is fully transparent; slopes facing the light get a white highlight,
    /// slopes facing away a dark shadow.
    pub fn render(&mut self) -> &[u8] {
        if self.current.is_empty() {
            return &self.pixels;
        }
        let size = self.config.grid_size;
        let [lx, ly, lz] = light();
        let highlight = self.config.highlight_threshold;
        let shadow = self.config.shadow_threshold;

        self.pixels.iter_mut().for_each(|p| *p = 0);
        for y in 1..size - 1 {
            for x in 1..size - 1 {
                let i = y * size + x;
                let gx = (self.current[i + 1] - self.current[i - 1]) * NORMAL_SCALE;
                let gy = (self.current[i + size] - self.current[i - size]) * NORMAL_SCALE;
                let len = (gx * gx + gy * gy + 1.0).sqrt();
                let intensity = (-gx * lx - gy * ly + lz) / len;

                let (rgb, alpha) = if intensity > highlight {
                    let t = ((intensity - highlight) / (1.0 - highlight).max(1e-6)).min(1.0);
                    (HIGHLIGHT_RGB, t * MAX_HIGHLIGHT_ALPHA)
                } else if intensity < shadow {
                    let t = ((shadow - intensity) / shadow.max(1e-6)).min(1.0);
                    (SHADOW_RGB, t * MAX_SHADOW_ALPHA)
                } else {
                    continue;
                };

                let p = i * 4;
                self.pixels[p..p + 3].copy_from_slice(&rgb);
                self.pixels[p + 3] = alpha.round() as u8;
            }
        }
        &self.pixels
    }
}

impl RippleEffect for WaveField {
    fn activate(&mut self, bubbles: &[BubbleSnapshot]) -> bool {
        if self.triggered {
            return false;
        }
        if !self.canvas_ready() {
            debug!(width = self.width, height = self.height, "wave ripple: canvas not sized");
            return false;
        }
        self.triggered = true;
        self.active = true;
        self.allocate();

        let mut stamped = 0;
        for bubble in bubbles {
            if !bubble.is_valid() {
                warn!(?bubble, "wave ripple: skipping invalid bubble");
                continue;
            }
            self.stamp(bubble);
            stamped += 1;
        }
        debug!(stamped, grid = self.config.grid_size, "wave ripple activated");
        true
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.triggered = false;
        self.current.clear();
        self.previous.clear();
        self.pixels.clear();
    }

    fn advance(&mut self, _delta_ms: f64) -> bool {
        if !self.active {
            return false;
        }
        self.step();
        self.render();
        true
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> WaveField {
        WaveField::new(RippleConfig::default(), 200.0, 200.0)
    }

    fn bubble() -> BubbleSnapshot {
        BubbleSnapshot {
            x: 100.0,
            y: 100.0,
            radius: 50.0,
        }
    }

    #[test]
    fn flat_light_is_neutral() {
        let [_, _, z] = light();
        assert!((z - 0.647).abs() < 1e-3);
        let config = RippleConfig::default();
        assert!(z > config.shadow_threshold && z < config.highlight_threshold);
    }

    #[test]
    fn flat_field_renders_transparent() {
        let mut wave = field();
        assert!(wave.activate(&[]));
        assert!(wave.render().iter().all(|&b| b == 0));
        assert_eq!(wave.render().len(), 128 * 128 * 4);
    }

    #[test]
    fn impulse_depresses_under_bubble() {
        let mut wave = field();
        wave.activate(&[bubble()]);
        assert!(wave.height_at(64, 64) < 0.0);
        assert_eq!(wave.height_at(5, 5), 0.0);
        assert_eq!(wave.height_at(0, 64), 0.0);
    }

    #[test]
    fn impulse_is_shaded() {
        let mut wave = field();
        wave.activate(&[bubble()]);
        let pixels = wave.render();
        let lit = pixels.chunks(4).filter(|p| p[3] > 0 && p[0] == 255).count();
        let shaded = pixels.chunks(4).filter(|p| p[3] > 0 && p[0] == 15).count();
        assert!(lit > 0, "no highlights");
        assert!(shaded > 0, "no shadows");
    }

    #[test]
    fn activation_is_edge_triggered() {
        let mut wave = field();
        assert!(wave.activate(&[bubble()]));
        let energy = wave.energy();
        assert!(!wave.activate(&[bubble()]));
        assert_eq!(wave.energy(), energy);
    }

    #[test]
    fn invalid_bubbles_are_skipped() {
        let mut wave = field();
        let bad = BubbleSnapshot {
            x: f64::NAN,
            y: 10.0,
            radius: 20.0,
        };
        assert!(wave.activate(&[bad]));
        assert_eq!(wave.energy(), 0.0);
    }

    #[test]
    fn damping_settles_the_field() {
        let mut wave = field();
        wave.activate(&[bubble()]);
        let initial = wave.energy();
        for _ in 0..600 {
            wave.advance(16.0);
        }
        assert!(wave.energy() < initial * 0.05, "energy {}", wave.energy());
    }

    #[test]
    fn deactivate_releases_buffers() {
        let mut wave = field();
        wave.activate(&[bubble()]);
        wave.advance(16.0);
        wave.deactivate();
        assert!(!wave.is_active());
        assert_eq!(wave.energy(), 0.0);
        assert!(!wave.advance(16.0));
    }

    #[test]
    fn unsized_canvas_does_not_fire() {
        let mut wave = WaveField::new(RippleConfig::default(), 0.0, 0.0);
        assert!(!wave.activate(&[bubble()]));
        wave.resize(200.0, 200.0);
        assert!(wave.activate(&[bubble()]));
    }

    #[test]
    fn degenerate_grid_is_clamped() {
        let config = RippleConfig {
            grid_size: 1,
            ..RippleConfig::default()
        };
        let mut wave = WaveField::new(config, 30.0, 30.0);
        assert_eq!(wave.grid_size(), 3);
        assert!(wave.activate(&[BubbleSnapshot {
            x: 15.0,
            y: 15.0,
            radius: 10.0,
        }]));
        assert!(wave.advance(16.0));
        assert_eq!(wave.pixels().len(), 3 * 3 * 4);
    }

    #[test]
    fn bubble_off_canvas_is_clipped() {
        let mut wave = field();
        let far = BubbleSnapshot {
            x: -500.0,
            y: 900.0,
            radius: 30.0,
        };
        assert!(wave.activate(&[far]));
        assert_eq!(wave.energy(), 0.0);
    }
}
