// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Circle Body Integrator
//
// Minimal rigid-body substrate: circles only, semi-implicit Euler, uniform air
// friction, pairwise collision with positional correction and a restitution
// impulse, four static walls. Forces are supplied per step by the caller as
// accelerations (px / frame²).

use crate::types::Vec2;

/// Positional correction applied per step, as a share of the overlap.
const CORRECTION_SHARE: f64 = 0.8;
/// Overlap below this is left for the next step.
const CORRECTION_SLOP: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f64,
    pub angular_velocity: f64,
    pub radius: f64,
    inverse_mass: f64,
    acceleration: Vec2,
}

impl Body {
    /// `radius` is floored at 1.
    pub fn new(position: Vec2, radius: f64) -> Self {
        let radius = if radius.is_finite() { radius.max(1.0) } else { 1.0 };
        Self {
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            radius,
            inverse_mass: 1.0 / (radius * radius),
            acceleration: Vec2::ZERO,
        }
    }

    pub fn apply_acceleration(&mut self, acceleration: Vec2) {
        if acceleration.is_finite() {
            self.acceleration += acceleration;
        }
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.velocity.length_sq() / self.inverse_mass
    }
}

/// Inner faces of the four walls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Walls {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Walls {
    /// Walls sitting `margin` outside a `width` × `height` canvas.
    pub fn around(width: f64, height: f64, margin: f64) -> Self {
        Self {
            min_x: -margin,
            min_y: -margin,
            max_x: width + margin,
            max_y: height + margin,
        }
    }
}

#[derive(Debug, Clone)]
pub struct World {
    pub bodies: Vec<Body>,
    walls: Walls,
    air_friction: f64,
    restitution: f64,
}

impl World {
    pub fn new(walls: Walls, air_friction: f64, restitution: f64) -> Self {
        Self {
            bodies: Vec::new(),
            walls,
            air_friction: air_friction.clamp(0.0, 0.999),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    pub fn walls(&self) -> Walls {
        self.walls
    }

    /// Advance one step. `time_scale` is the step length in 60 Hz frames.
    pub fn step(&mut self, time_scale: f64) {
        let friction = (1.0 - self.air_friction).powf(time_scale);
        for body in &mut self.bodies {
            body.velocity += body.acceleration * time_scale;
            body.velocity *= friction;
            body.position += body.velocity * time_scale;
            body.angular_velocity *= friction;
            body.angle += body.angular_velocity * time_scale;
            body.acceleration = Vec2::ZERO;
        }
        self.resolve_collisions();
        self.resolve_walls();
    }

    fn resolve_collisions(&mut self) {
        let count = self.bodies.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (head, tail) = self.bodies.split_at_mut(j);
                resolve_pair(&mut head[i], &mut tail[0], i, j, self.restitution);
            }
        }
    }

    fn resolve_walls(&mut self) {
        let walls = self.walls;
        let restitution = self.restitution;
        for body in &mut self.bodies {
            let r = body.radius;
            if body.position.x - r < walls.min_x {
                body.position.x = walls.min_x + r;
                body.velocity.x = body.velocity.x.abs() * restitution;
            } else if body.position.x + r > walls.max_x {
                body.position.x = walls.max_x - r;
                body.velocity.x = -body.velocity.x.abs() * restitution;
            }
            if body.position.y - r < walls.min_y {
                body.position.y = walls.min_y + r;
                body.velocity.y = body.velocity.y.abs() * restitution;
            } else if body.position.y + r > walls.max_y {
                body.position.y = walls.max_y - r;
                body.velocity.y = -body.velocity.y.abs() * restitution;
            }
        }
    }
}

fn resolve_pair(a: &mut Body, b: &mut Body, ia: usize, ib: usize, restitution: f64) {
    let delta = b.position - a.position;
    let min_distance = a.radius + b.radius;
    let distance_sq = delta.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let normal = if distance > 1e-6 {
        delta / distance
    } else {
        let angle = ((ia as f64) * 0.618_034 + (ib as f64) * 0.414_214) * std::f64::consts::TAU;
        Vec2::new(angle.cos(), angle.sin())
    };

    let inverse_total = a.inverse_mass + b.inverse_mass;
    let overlap = min_distance - distance;
    if overlap > CORRECTION_SLOP {
        let correction = normal * (overlap * CORRECTION_SHARE / inverse_total);
        a.position -= correction * a.inverse_mass;
        b.position += correction * b.inverse_mass;
    }

    let approach = (b.velocity - a.velocity).dot(normal);
    if approach < 0.0 {
        let impulse = -(1.0 + restitution) * approach / inverse_total;
        a.velocity -= normal * (impulse * a.inverse_mass);
        b.velocity += normal * (impulse * b.inverse_mass);
    }
}
