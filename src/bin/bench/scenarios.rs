// Scenario Definitions: physics, ripple, and layout workloads
// Each scenario is pure data; the runner in monte_carlo.rs interprets it

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub kind: ScenarioKind,
    pub criteria: PassCriteria,
}

pub enum ScenarioKind {
    /// Let a fresh cluster settle with no input.
    Settle {
        bubbles: usize,
        width: f64,
        height: f64,
        seconds: f64,
    },
    /// Random flicks at a fixed cadence, then a quiet tail.
    FlickStorm {
        bubbles: usize,
        width: f64,
        height: f64,
        flicks: usize,
        flick_every_ms: f64,
        tail_seconds: f64,
    },
    /// Canvas size changes while running.
    Resize {
        bubbles: usize,
        sizes: &'static [(f64, f64)],
        seconds_per_size: f64,
    },
    /// Height-field ripple stamped under random bubbles.
    Wave {
        bubbles: usize,
        width: f64,
        height: f64,
        frames: u32,
    },
    /// Concentric rings driven at a fixed frame interval until done.
    Rings { bubbles: usize, frame_ms: f64 },
    /// Integer percent allocation over random amount vectors.
    Percent { items: usize, trials: usize },
    /// Full radial layout over random account books.
    Radial { accounts: usize, trials: usize },
}

#[derive(Default)]
pub struct PassCriteria {
    /// Every body stays inside the walls at every sampled frame.
    pub require_contained: bool,
    /// Kinetic energy at the end over the peak seen during the run.
    pub max_energy_ratio: Option<f64>,
    /// Wave field energy at the end over the energy right after activation.
    pub max_wave_decay: Option<f64>,
    /// Slack allowed past the nominal ring duration.
    pub max_completion_overshoot_ms: Option<f64>,
    /// Number of trials allowed to break an invariant.
    pub max_violations: Option<u32>,
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "SETTLE_SMALL",
            label: "Settle: 8 bubbles, 400x300",
            category: "physics",
            kind: ScenarioKind::Settle {
                bubbles: 8,
                width: 400.0,
                height: 300.0,
                seconds: 20.0,
            },
            criteria: PassCriteria {
                require_contained: true,
                ..Default::default()
            },
        },
        Scenario {
            name: "SETTLE_CROWDED",
            label: "Settle: 40 bubbles, 360x640",
            category: "physics",
            kind: ScenarioKind::Settle {
                bubbles: 40,
                width: 360.0,
                height: 640.0,
                seconds: 20.0,
            },
            criteria: PassCriteria {
                require_contained: true,
                ..Default::default()
            },
        },
        Scenario {
            name: "FLICK_STORM",
            label: "Flick storm: 20 flicks, 12 bubbles",
            category: "physics",
            kind: ScenarioKind::FlickStorm {
                bubbles: 12,
                width: 420.0,
                height: 420.0,
                flicks: 20,
                flick_every_ms: 150.0,
                tail_seconds: 10.0,
            },
            criteria: PassCriteria {
                require_contained: true,
                max_energy_ratio: Some(0.2),
                ..Default::default()
            },
        },
        Scenario {
            name: "RESIZE_CHURN",
            label: "Resize churn: portrait/landscape flips",
            category: "physics",
            kind: ScenarioKind::Resize {
                bubbles: 10,
                sizes: &[(400.0, 300.0), (300.0, 400.0), (120.0, 80.0), (800.0, 600.0)],
                seconds_per_size: 3.0,
            },
            criteria: PassCriteria {
                require_contained: true,
                ..Default::default()
            },
        },
        Scenario {
            name: "WAVE_DECAY",
            label: "Wave ripple: 10 bubbles, 600 frames",
            category: "ripple",
            kind: ScenarioKind::Wave {
                bubbles: 10,
                width: 400.0,
                height: 400.0,
                frames: 600,
            },
            criteria: PassCriteria {
                max_wave_decay: Some(0.05),
                ..Default::default()
            },
        },
        Scenario {
            name: "RINGS_60HZ",
            label: "Ring ripple: 10 bubbles at 60 Hz",
            category: "ripple",
            kind: ScenarioKind::Rings {
                bubbles: 10,
                frame_ms: 1000.0 / 60.0,
            },
            criteria: PassCriteria {
                max_completion_overshoot_ms: Some(1000.0 / 60.0),
                ..Default::default()
            },
        },
        Scenario {
            name: "RINGS_JANKY",
            label: "Ring ripple: 10 bubbles at 12 Hz",
            category: "ripple",
            kind: ScenarioKind::Rings {
                bubbles: 10,
                frame_ms: 1000.0 / 12.0,
            },
            criteria: PassCriteria {
                max_completion_overshoot_ms: Some(1000.0 / 12.0),
                ..Default::default()
            },
        },
        Scenario {
            name: "PERCENT_SMALL",
            label: "Percent: 6 items x 500",
            category: "layout",
            kind: ScenarioKind::Percent {
                items: 6,
                trials: 500,
            },
            criteria: PassCriteria {
                max_violations: Some(0),
                ..Default::default()
            },
        },
        Scenario {
            name: "PERCENT_WIDE",
            label: "Percent: 90 items x 200",
            category: "layout",
            kind: ScenarioKind::Percent {
                items: 90,
                trials: 200,
            },
            criteria: PassCriteria {
                max_violations: Some(0),
                ..Default::default()
            },
        },
        Scenario {
            name: "RADIAL_BOOKS",
            label: "Radial layout: 30 accounts x 200",
            category: "layout",
            kind: ScenarioKind::Radial {
                accounts: 30,
                trials: 200,
            },
            criteria: PassCriteria {
                max_violations: Some(0),
                ..Default::default()
            },
        },
    ]
}
