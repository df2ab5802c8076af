// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Bubble Physics Simulation
//
// Positions one circle body per account bubble inside the canvas. The host
// drives frames through the FrameLoop token protocol; the simulation is the
// only writer of body state and exposes positions as a read-only snapshot.

mod forces;
pub mod world;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::config::PhysicsConfig;
use crate::frame_loop::{FrameLoop, FrameToken, LoopState, NOMINAL_FRAME_MS};
use crate::types::{BodyPosition, BubbleNode, BubbleSnapshot, Vec2};
use forces::ClusterBoost;
use world::{Body, Walls, World};

/// Shockwave reach as a multiple of the flicked bubble's radius.
const SHOCKWAVE_RADIUS_FACTOR: f64 = 4.0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhysicsError {
    #[error("no bubble with id {0:?} in the simulation")]
    UnknownBody(String),
}

// ---------------------------------------------------------------------------
// BubbleSimulation
// ---------------------------------------------------------------------------

pub struct BubbleSimulation {
    config: PhysicsConfig,
    nodes: Vec<BubbleNode>,
    width: f64,
    height: f64,
    /// `None` until there is something to simulate.
    world: Option<World>,
    ids: Vec<String>,
    phases: Vec<f64>,
    positions: HashMap<String, BodyPosition>,
    frames: FrameLoop,
    elapsed_ms: f64,
    boost: ClusterBoost,
    rng: ChaCha8Rng,
}

impl BubbleSimulation {
    pub fn new(config: PhysicsConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let boost = ClusterBoost::new(config.boost_duration_ms);
        Self {
            config,
            nodes: Vec::new(),
            width: 0.0,
            height: 0.0,
            world: None,
            ids: Vec::new(),
            phases: Vec::new(),
            positions: HashMap::new(),
            frames: FrameLoop::new(),
            elapsed_ms: 0.0,
            boost,
            rng,
        }
    }

    pub fn state(&self) -> LoopState {
        self.frames.state()
    }

    pub fn is_constructed(&self) -> bool {
        self.world.is_some()
    }

    pub fn body_count(&self) -> usize {
        self.world.as_ref().map_or(0, |w| w.bodies.len())
    }

    /// Replace the node set; bodies are rebuilt immediately.
    pub fn set_nodes(&mut self, nodes: Vec<BubbleNode>) {
        self.nodes = nodes;
        self.rebuild();
    }

    /// New canvas size; bodies are rebuilt immediately.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = if width.is_finite() { width } else { 0.0 };
        self.height = if height.is_finite() { height } else { 0.0 };
        self.rebuild();
    }

    /// Idle → Running. Rebuilds the bodies if a previous stop released them.
    pub fn start(&mut self) -> FrameToken {
        if self.world.is_none() {
            self.rebuild();
        }
        self.frames.start()
    }

    /// Running → Idle. Cancels the pending frame and releases all bodies so
    /// the next start begins from a clean slate.
    pub fn stop(&mut self) -> Option<FrameToken> {
        let cancelled = self.frames.stop();
        self.release();
        cancelled
    }

    /// Host frame callback. Steps once and returns the next frame to request,
    /// or `None` when the token is stale or the loop has stopped.
    pub fn frame(&mut self, token: FrameToken, now_ms: f64) -> Option<FrameToken> {
        let delta = self.frames.begin_frame(token, now_ms)?;
        self.step(delta);
        self.frames.reschedule()
    }

    /// Advance the simulation by `delta_ms` regardless of loop state.
    pub fn step(&mut self, delta_ms: f64) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let delta_ms = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
        let time_scale = (delta_ms / NOMINAL_FRAME_MS).clamp(0.25, 3.0);
        self.elapsed_ms += delta_ms;

        let c = &self.config;
        let t = self.elapsed_ms / 1000.0;
        let target = forces::wander_center(self.width, self.height, c.center_wander, t);
        let strength = c.center_strength * forces::pulse(t) * self.boost.factor(self.elapsed_ms);

        for (body, &phase) in world.bodies.iter_mut().zip(&self.phases) {
            let acceleration = forces::centering(body.position, target, strength)
                + forces::swirl(body.position, target, c.swirl_strength, t)
                + forces::drift(phase, c.drift_strength, t);
            body.apply_acceleration(acceleration);
        }

        world.step(time_scale);
        self.publish();
    }

    /// Throw bubble `id` with pointer velocity `(vx, vy)` in px/s.
    ///
    /// Returns `Ok(false)` for a zero or non-finite velocity, which changes
    /// nothing.
    pub fn flick(&mut self, id: &str, vx: f64, vy: f64) -> Result<bool, PhysicsError> {
        let index = self
            .ids
            .iter()
            .position(|known| known == id)
            .ok_or_else(|| PhysicsError::UnknownBody(id.to_string()))?;
        let Some(world) = self.world.as_mut() else {
            return Err(PhysicsError::UnknownBody(id.to_string()));
        };

        let input = Vec2::new(vx, vy);
        let speed = input.length();
        if !speed.is_finite() || speed <= 0.0 {
            return Ok(false);
        }

        let c = &self.config;
        let clamped_speed = speed.min(c.max_flick_speed);
        let speed_ratio = clamped_speed / c.max_flick_speed;
        let direction = input / speed;

        let mut delta = direction * (clamped_speed * c.flick_velocity_scale);
        let delta_len = delta.length();
        if delta_len > c.max_flick_delta {
            delta *= c.max_flick_delta / delta_len;
        }

        let spin_sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let (origin, radius) = {
            let body = &mut world.bodies[index];
            body.velocity += delta;
            body.angular_velocity += spin_sign * delta.length() * c.angular_kick;
            (body.position, body.radius)
        };

        let influence = (radius * SHOCKWAVE_RADIUS_FACTOR)
            .clamp(c.shockwave_min_radius, c.shockwave_max_radius);
        let peak = c.shockwave_strength * speed_ratio;
        for (other_index, other) in world.bodies.iter_mut().enumerate() {
            if other_index == index {
                continue;
            }
            let offset = other.position - origin;
            let distance = offset.length();
            if distance >= influence {
                continue;
            }
            let away = if distance > 1e-6 {
                offset / distance
            } else {
                let angle = (other_index as f64) * 0.618_034 * TAU;
                Vec2::new(angle.cos(), angle.sin())
            };
            other.velocity += away * (peak * (1.0 - distance / influence));
        }

        self.boost.arm(self.elapsed_ms, speed_ratio);
        tracing::debug!(id, speed, influence, "bubble flicked");
        Ok(true)
    }

    pub fn positions(&self) -> &HashMap<String, BodyPosition> {
        &self.positions
    }

    pub fn position(&self, id: &str) -> Option<BodyPosition> {
        self.positions.get(id).copied()
    }

    pub fn velocity(&self, id: &str) -> Option<Vec2> {
        let index = self.ids.iter().position(|known| known == id)?;
        self.world.as_ref().map(|w| w.bodies[index].velocity)
    }

    /// Bubble centers and radii, in node order, for triggering ripples.
    pub fn snapshots(&self) -> Vec<BubbleSnapshot> {
        self.world.as_ref().map_or_else(Vec::new, |w| {
            w.bodies
                .iter()
                .map(|b| BubbleSnapshot {
                    x: b.position.x,
                    y: b.position.y,
                    radius: b.radius,
                })
                .collect()
        })
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.world
            .as_ref()
            .map_or(0.0, |w| w.bodies.iter().map(Body::kinetic_energy).sum())
    }

    pub fn walls(&self) -> Option<Walls> {
        self.world.as_ref().map(World::walls)
    }

    // -----------------------------------------------------------------------
    // Internal lifecycle
    // -----------------------------------------------------------------------

    fn rebuild(&mut self) {
        if self.width <= 0.0 || self.height <= 0.0 || self.nodes.is_empty() {
            tracing::debug!(
                width = self.width,
                height = self.height,
                nodes = self.nodes.len(),
                "bubble simulation not constructed"
            );
            self.release();
            return;
        }

        // surviving bodies keep their position, motion and drift phase
        let previous: HashMap<&str, (&Body, f64)> = match &self.world {
            Some(world) => self
                .ids
                .iter()
                .zip(world.bodies.iter().zip(&self.phases))
                .map(|(id, (body, &phase))| (id.as_str(), (body, phase)))
                .collect(),
            None => HashMap::new(),
        };

        let c = &self.config;
        let mut world = World::new(
            Walls::around(self.width, self.height, c.wall_margin),
            c.air_friction,
            c.restitution,
        );
        let mut phases = Vec::with_capacity(self.nodes.len());
        let mut kept = 0usize;
        for node in &self.nodes {
            let mut body = Body::new(Vec2::ZERO, node.radius);
            let r = body.radius;
            match previous.get(node.id.as_str()) {
                Some(&(old, phase)) if old.position.is_finite() => {
                    kept += 1;
                    body.position = Vec2::new(
                        clamp_axis(old.position.x, r, self.width),
                        clamp_axis(old.position.y, r, self.height),
                    );
                    body.velocity = old.velocity;
                    body.angle = old.angle;
                    body.angular_velocity = old.angular_velocity;
                    phases.push(phase);
                }
                _ => {
                    body.position = Vec2::new(
                        random_axis(&mut self.rng, r, self.width),
                        random_axis(&mut self.rng, r, self.height),
                    );
                    phases.push(self.rng.gen_range(0.0..TAU));
                }
            }
            world.bodies.push(body);
        }

        tracing::debug!(
            bodies = world.bodies.len(),
            kept,
            width = self.width,
            height = self.height,
            "bubble simulation rebuilt"
        );
        self.ids = self.nodes.iter().map(|n| n.id.clone()).collect();
        self.phases = phases;
        self.world = Some(world);
        self.publish();
    }

    fn release(&mut self) {
        self.world = None;
        self.ids.clear();
        self.phases.clear();
        self.positions.clear();
        self.elapsed_ms = 0.0;
        self.boost.reset();
    }

    fn publish(&mut self) {
        let Some(world) = self.world.as_ref() else {
            return;
        };
        self.positions.clear();
        for (id, body) in self.ids.iter().zip(&world.bodies) {
            self.positions.insert(
                id.clone(),
                BodyPosition {
                    x: body.position.x,
                    y: body.position.y,
                    angle: body.angle,
                },
            );
        }
    }
}

/// Keep a coordinate inside `[r, extent - r]`, or centered when it cannot fit.
fn clamp_axis(value: f64, r: f64, extent: f64) -> f64 {
    if extent <= 2.0 * r {
        extent / 2.0
    } else {
        value.clamp(r, extent - r)
    }
}

fn random_axis(rng: &mut ChaCha8Rng, r: f64, extent: f64) -> f64 {
    if extent <= 2.0 * r {
        extent / 2.0
    } else {
        rng.gen_range(r..=extent - r)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, radius: f64) -> BubbleNode {
        BubbleNode {
            id: id.to_string(),
            radius,
            color: "#3b82f6".to_string(),
            label: id.to_string(),
            value: radius * 10.0,
        }
    }

    fn sim(nodes: &[(&str, f64)]) -> BubbleSimulation {
        let mut sim = BubbleSimulation::new(PhysicsConfig::default());
        sim.resize(400.0, 300.0);
        sim.set_nodes(nodes.iter().map(|(id, r)| node(id, *r)).collect());
        sim
    }

    #[test]
    fn zero_size_or_empty_suppresses_construction() {
        let mut s = BubbleSimulation::new(PhysicsConfig::default());
        s.set_nodes(vec![node("a", 20.0)]);
        assert!(!s.is_constructed());
        s.resize(400.0, 0.0);
        assert!(!s.is_constructed());
        s.resize(400.0, 300.0);
        assert!(s.is_constructed());
        s.set_nodes(Vec::new());
        assert!(!s.is_constructed());
        assert!(s.positions().is_empty());
    }

    #[test]
    fn initial_positions_are_inside_canvas() {
        let s = sim(&[("a", 20.0), ("b", 35.0), ("c", 0.0)]);
        for (id, pos) in s.positions() {
            let r = if id == "b" { 35.0 } else if id == "a" { 20.0 } else { 1.0 };
            assert!(pos.x >= r && pos.x <= 400.0 - r, "{id} x {}", pos.x);
            assert!(pos.y >= r && pos.y <= 300.0 - r, "{id} y {}", pos.y);
        }
    }

    #[test]
    fn rebuild_preserves_surviving_positions() {
        let mut s = sim(&[("a", 20.0), ("b", 20.0)]);
        let before = s.position("a").expect("test: a exists");
        s.set_nodes(vec![node("a", 20.0), node("c", 20.0)]);
        assert_eq!(s.position("a"), Some(before));
        assert!(s.position("b").is_none());
        assert!(s.position("c").is_some());
    }

    #[test]
    fn rebuild_carries_motion_and_phase() {
        let mut s = sim(&[("a", 20.0), ("b", 20.0)]);
        for _ in 0..30 {
            s.step(NOMINAL_FRAME_MS);
        }
        s.flick("a", 900.0, -300.0).expect("test: flick");
        let velocity = s.velocity("a").expect("test: a exists");
        let phase = s.phases[0];
        let angle = s.position("a").expect("test: a exists").angle;

        s.resize(420.0, 320.0);
        assert_eq!(s.velocity("a"), Some(velocity));
        assert_eq!(s.phases[0], phase);
        assert_eq!(s.position("a").map(|p| p.angle), Some(angle));

        s.set_nodes(vec![node("c", 20.0), node("a", 20.0)]);
        assert_eq!(s.velocity("a"), Some(velocity));
        assert_eq!(s.phases[1], phase);
        assert_eq!(s.velocity("c"), Some(Vec2::ZERO));
    }

    #[test]
    fn shrink_clamps_kept_positions() {
        let mut s = sim(&[("a", 20.0)]);
        s.resize(60.0, 40.0);
        let pos = s.position("a").expect("test: a exists");
        assert!(pos.x >= 20.0 && pos.x <= 40.0);
        // too short to fit the bubble: centered
        assert_eq!(pos.y, 20.0);
    }

    #[test]
    fn zero_velocity_flick_is_noop() {
        let mut s = sim(&[("a", 20.0), ("b", 20.0)]);
        let before = s.velocity("a");
        assert_eq!(s.flick("a", 0.0, 0.0), Ok(false));
        assert_eq!(s.flick("a", f64::NAN, 1.0), Ok(false));
        assert_eq!(s.velocity("a"), before);
        assert_eq!(s.velocity("b"), Some(Vec2::ZERO));
    }

    #[test]
    fn flick_unknown_body_errors() {
        let mut s = sim(&[("a", 20.0)]);
        assert_eq!(
            s.flick("zzz", 100.0, 0.0),
            Err(PhysicsError::UnknownBody("zzz".to_string()))
        );
    }

    #[test]
    fn flick_delta_is_capped() {
        let config = PhysicsConfig::default();
        let mut s = sim(&[("a", 20.0)]);
        assert_eq!(s.flick("a", 1.0e6, 0.0), Ok(true));
        let v = s.velocity("a").expect("test: a exists");
        let expected = (config.max_flick_speed * config.flick_velocity_scale).min(config.max_flick_delta);
        assert!((v.x - expected).abs() < 1e-9);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn flick_shockwave_pushes_neighbours_away() {
        let mut s = sim(&[("a", 30.0), ("b", 20.0)]);
        let a = s.position("a").expect("test: a");
        let b = s.position("b").expect("test: b");
        let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        s.flick("a", 0.0, -1200.0).expect("test: flick");
        let vb = s.velocity("b").expect("test: b");
        if distance < 120.0 {
            let away = Vec2::new(b.x - a.x, b.y - a.y);
            assert!(vb.dot(away) > 0.0);
        } else {
            assert_eq!(vb, Vec2::ZERO);
        }
    }

    #[test]
    fn stop_releases_and_start_rebuilds() {
        let mut s = sim(&[("a", 20.0)]);
        let token = s.start();
        assert_eq!(s.state(), LoopState::Running);
        let next = s.frame(token, 0.0).expect("test: reschedules");
        assert_eq!(s.stop(), Some(next));
        assert!(!s.is_constructed());
        assert!(s.frame(next, 16.0).is_none());

        s.start();
        assert!(s.is_constructed());
        assert_eq!(s.body_count(), 1);
    }

    #[test]
    fn bodies_settle_near_center() {
        let mut s = sim(&[("a", 20.0), ("b", 25.0), ("c", 15.0), ("d", 30.0)]);
        for _ in 0..1200 {
            s.step(NOMINAL_FRAME_MS);
        }
        let walls = s.walls().expect("test: constructed");
        for pos in s.positions().values() {
            assert!(pos.x.is_finite() && pos.y.is_finite());
            assert!(pos.x > walls.min_x && pos.x < walls.max_x);
            assert!((pos.x - 200.0).abs() < 150.0);
            assert!((pos.y - 150.0).abs() < 120.0);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let a = sim(&[("a", 20.0), ("b", 25.0)]);
        let b = sim(&[("a", 20.0), ("b", 25.0)]);
        assert_eq!(a.positions(), b.positions());
    }
}
