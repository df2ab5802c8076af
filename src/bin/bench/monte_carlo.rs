// Monte Carlo Infrastructure: N runs per scenario with statistical aggregation
// Run i uses seed base+i for both the workload and the engine's own generator

use ledger_viz_engine::config::{PhysicsConfig, RadialConfig, RippleConfig};
use ledger_viz_engine::frame_loop::{FrameToken, NOMINAL_FRAME_MS};
use ledger_viz_engine::grouping::{default_groups, group_accounts};
use ledger_viz_engine::percent::allocate_integer_percents;
use ledger_viz_engine::radial::process_segments;
use ledger_viz_engine::*;
use tracing::{debug, warn};

use crate::report::*;
use crate::scenarios::{PassCriteria, Scenario, ScenarioKind};
use crate::workload::Workload;

use std::time::Instant;

// ─── Physics probe ──────────────────────────────────────────────────────────

#[derive(Default)]
struct PhysicsProbe {
    frames: u64,
    escaped: u32,
    peak: f64,
    last: f64,
}

impl PhysicsProbe {
    fn sample(&mut self, sim: &BubbleSimulation) {
        self.frames += 1;
        let energy = sim.kinetic_energy();
        self.peak = self.peak.max(energy);
        self.last = energy;
        if let Some(walls) = sim.walls() {
            let escaped = sim
                .positions()
                .values()
                .filter(|p| p.x < walls.min_x || p.x > walls.max_x || p.y < walls.min_y || p.y > walls.max_y)
                .count();
            self.escaped += escaped as u32;
        }
    }

    fn energy_ratio(&self) -> f64 {
        if self.peak > 0.0 { self.last / self.peak } else { 0.0 }
    }
}

/// Runs the host side of the frame protocol at a steady 60 Hz.
struct Host {
    token: Option<FrameToken>,
    now_ms: f64,
}

impl Host {
    fn start(sim: &mut BubbleSimulation) -> Self {
        Self { token: Some(sim.start()), now_ms: 0.0 }
    }

    fn run(&mut self, sim: &mut BubbleSimulation, probe: &mut PhysicsProbe, duration_ms: f64) {
        let end = self.now_ms + duration_ms;
        while self.now_ms < end {
            let Some(token) = self.token else { return };
            self.token = sim.frame(token, self.now_ms);
            probe.sample(sim);
            self.now_ms += NOMINAL_FRAME_MS;
        }
    }
}

fn simulation(seed: u64, workload: &mut Workload, bubbles: usize, width: f64, height: f64) -> BubbleSimulation {
    let mut sim = BubbleSimulation::new(PhysicsConfig { seed, ..PhysicsConfig::default() });
    sim.set_nodes(workload.bubble_nodes(bubbles));
    sim.resize(width, height);
    sim
}

// ─── Single run ─────────────────────────────────────────────────────────────

/// Run a single scenario iteration with a specific seed.
pub fn run_single(scenario: &Scenario, seed: u64) -> BenchResult {
    let start = Instant::now();
    let mut workload = Workload::new(seed);
    let mut result = BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        ..Default::default()
    };

    match scenario.kind {
        ScenarioKind::Settle { bubbles, width, height, seconds } => {
            let mut sim = simulation(seed, &mut workload, bubbles, width, height);
            let mut probe = PhysicsProbe::default();
            Host::start(&mut sim).run(&mut sim, &mut probe, seconds * 1000.0);
            record_physics(&mut result, &probe);
        }
        ScenarioKind::FlickStorm { bubbles, width, height, flicks, flick_every_ms, tail_seconds } => {
            let mut sim = simulation(seed, &mut workload, bubbles, width, height);
            let mut probe = PhysicsProbe::default();
            let mut host = Host::start(&mut sim);
            for _ in 0..flicks {
                let id = format!("b{}", workload.pick(bubbles));
                let (vx, vy) = workload.flick();
                if let Err(err) = sim.flick(&id, vx, vy) {
                    warn!(%err, "flick rejected");
                    result.violations += 1;
                }
                host.run(&mut sim, &mut probe, flick_every_ms);
            }
            host.run(&mut sim, &mut probe, tail_seconds * 1000.0);
            record_physics(&mut result, &probe);
        }
        ScenarioKind::Resize { bubbles, sizes, seconds_per_size } => {
            let (width, height) = sizes.first().copied().unwrap_or((400.0, 300.0));
            let mut sim = simulation(seed, &mut workload, bubbles, width, height);
            let mut probe = PhysicsProbe::default();
            let mut host = Host::start(&mut sim);
            for &(width, height) in sizes {
                sim.resize(width, height);
                host.run(&mut sim, &mut probe, seconds_per_size * 1000.0);
            }
            record_physics(&mut result, &probe);
        }
        ScenarioKind::Wave { bubbles, width, height, frames } => {
            let config = RippleConfig { seed, ..RippleConfig::default() };
            let mut wave = WaveField::new(config, width, height);
            wave.activate(&workload.bubbles(bubbles, width, height));
            let initial = wave.energy();
            for _ in 0..frames {
                wave.advance(NOMINAL_FRAME_MS);
            }
            result.frames = u64::from(frames);
            result.wave_decay = if initial > 0.0 { wave.energy() / initial } else { 0.0 };
        }
        ScenarioKind::Rings { bubbles, frame_ms } => {
            let mut rings = RippleRings::new(RippleConfig { seed, ..RippleConfig::default() });
            rings.activate(&workload.bubbles(bubbles, 400.0, 400.0));
            let nominal = rings.total_duration_ms();
            while rings.advance(frame_ms) {
                result.frames += 1;
            }
            result.frames += 1;
            result.completion_ms = rings.elapsed_ms() - nominal;
            if !rings.is_finished() {
                result.violations += 1;
            }
        }
        ScenarioKind::Percent { items, trials } => {
            for _ in 0..trials {
                let amounts = workload.amounts(items);
                let percents = allocate_integer_percents(&amounts);
                if !percents_hold(&amounts, &percents) {
                    debug!(?amounts, ?percents, "percent invariant broken");
                    result.violations += 1;
                }
                result.frames += 1;
            }
        }
        ScenarioKind::Radial { accounts, trials } => {
            let config = RadialConfig::default();
            let groups = default_groups();
            for _ in 0..trials {
                let grouped = group_accounts(&workload.accounts(accounts), &groups);
                let chart = RadialChart::new(config.clone(), true);
                let view = chart.view(&grouped);
                if !radial_holds(&process_segments(&grouped), &view, &config) {
                    result.violations += 1;
                }
                result.frames += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    result.elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    result.frames_per_sec = result.frames as f64 / elapsed.as_secs_f64().max(1e-6);
    result.pass = evaluate(&scenario.criteria, &result);
    result
}

fn record_physics(result: &mut BenchResult, probe: &PhysicsProbe) {
    result.frames = probe.frames;
    result.escaped_bodies = probe.escaped;
    result.peak_kinetic_energy = probe.peak;
    result.final_kinetic_energy = probe.last;
    result.energy_ratio = probe.energy_ratio();
}

fn percents_hold(amounts: &[f64], percents: &[u32]) -> bool {
    let positive = amounts.iter().filter(|&&a| a > 0.0).count();
    if positive == 0 || positive > 100 {
        return percents.iter().all(|&p| p == 0);
    }
    let every_positive_visible = amounts
        .iter()
        .zip(percents)
        .all(|(&a, &p)| a <= 0.0 || p >= 1);
    percents.iter().sum::<u32>() == 100 && every_positive_visible
}

fn radial_holds(segments: &[RingSegment], view: &RadialView, config: &RadialConfig) -> bool {
    let closes = segments
        .last()
        .map_or(true, |last| (last.end_angle - 360.0).abs() < 1e-6);
    let percent_total: f64 = segments.iter().map(|s| s.percent).sum();
    let percents_ok = segments.is_empty() || (percent_total - 100.0).abs() < 1e-6;
    let petals_ok = view.petals.len() <= config.max_petals + 1;
    let paths_ok = view.primitives.iter().all(|p| !p.path.is_empty());
    closes && percents_ok && petals_ok && paths_ok
}

fn evaluate(criteria: &PassCriteria, result: &BenchResult) -> bool {
    let mut pass = true;
    if criteria.require_contained && result.escaped_bodies > 0 {
        pass = false;
    }
    if let Some(max) = criteria.max_energy_ratio {
        if result.energy_ratio > max {
            pass = false;
        }
    }
    if let Some(max) = criteria.max_wave_decay {
        if result.wave_decay > max {
            pass = false;
        }
    }
    if let Some(max) = criteria.max_completion_overshoot_ms {
        if result.completion_ms < 0.0 || result.completion_ms > max {
            pass = false;
        }
    }
    if let Some(max) = criteria.max_violations {
        if result.violations > max {
            pass = false;
        }
    }
    pass
}

// ─── Aggregation ────────────────────────────────────────────────────────────

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(scenario: &Scenario, n_runs: usize, base_seed: u64) -> MonteCarloReport {
    let results: Vec<BenchResult> = (0..n_runs)
        .map(|i| run_single(scenario, base_seed + i as u64))
        .collect();
    aggregate(scenario, results)
}

fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let stats = |metric: fn(&BenchResult) -> f64| {
        Stats::from_samples(&results.iter().map(metric).collect::<Vec<_>>())
    };

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate: if n > 0 { passed as f64 / n as f64 } else { 0.0 },
        elapsed_ms: stats(|r| r.elapsed_ms),
        frames_per_sec: stats(|r| r.frames_per_sec),
        energy_ratio: stats(|r| r.energy_ratio),
        wave_decay: stats(|r| r.wave_decay),
        completion_ms: stats(|r| r.completion_ms),
        violations: stats(|r| f64::from(r.violations)),
        individual_runs: results,
    }
}
