// Seeded workload generator: bubbles, flicks, account books
// Every draw comes from one ChaCha8Rng so a run is fully reproducible from its seed

use ledger_viz_engine::adapter::{to_cents, to_decimal};
use ledger_viz_engine::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const MIN_RADIUS: f64 = 18.0;
const MAX_RADIUS: f64 = 64.0;
const MIN_FLICK_SPEED: f64 = 200.0;
const MAX_FLICK_SPEED: f64 = 3200.0;

pub struct Workload {
    rng: ChaCha8Rng,
}

impl Workload {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn bubble_nodes(&mut self, count: usize) -> Vec<BubbleNode> {
        (0..count)
            .map(|i| {
                let value = self.log_uniform(10.0, 1_000_000.0);
                BubbleNode {
                    id: format!("b{i}"),
                    radius: self.rng.gen_range(MIN_RADIUS..MAX_RADIUS),
                    color: "#3b82f6".to_string(),
                    label: format!("bubble {i}"),
                    value,
                }
            })
            .collect()
    }

    /// Pointer release velocity in px/s, uniformly random direction.
    pub fn flick(&mut self) -> (f64, f64) {
        let angle = self.rng.gen_range(0.0..std::f64::consts::TAU);
        let speed = self.rng.gen_range(MIN_FLICK_SPEED..MAX_FLICK_SPEED);
        (angle.cos() * speed, angle.sin() * speed)
    }

    pub fn pick(&mut self, count: usize) -> usize {
        self.rng.gen_range(0..count.max(1))
    }

    pub fn bubbles(&mut self, count: usize, width: f64, height: f64) -> Vec<BubbleSnapshot> {
        (0..count)
            .map(|_| BubbleSnapshot {
                x: self.rng.gen_range(0.0..width),
                y: self.rng.gen_range(0.0..height),
                radius: self.rng.gen_range(MIN_RADIUS..MAX_RADIUS),
            })
            .collect()
    }

    /// Skewed amounts, a few of them zero.
    pub fn amounts(&mut self, count: usize) -> Vec<f64> {
        (0..count)
            .map(|_| {
                if self.rng.gen_bool(0.1) {
                    0.0
                } else {
                    self.log_uniform(1.0, 1_000_000.0)
                }
            })
            .collect()
    }

    pub fn accounts(&mut self, count: usize) -> Vec<Account> {
        (0..count)
            .map(|i| {
                let group = GroupId::ALL[self.pick(GroupId::ALL.len())];
                let balance = to_cents(to_decimal(self.log_uniform(1.0, 1_000_000.0)));
                Account {
                    id: format!("acc{i}"),
                    name: format!("Account {i}"),
                    group,
                    balance,
                    updated_at: 0,
                }
            })
            .collect()
    }

    fn log_uniform(&mut self, lo: f64, hi: f64) -> f64 {
        let exponent = self.rng.gen_range(lo.ln()..hi.ln());
        exponent.exp()
    }
}
