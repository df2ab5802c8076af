// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Tunable Parameters
//
// Every engine reads its constants from here. Hosts may override any subset
// from JSON; missing fields keep their defaults.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value: {field} {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

// ---------------------------------------------------------------------------
// VizConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VizConfig {
    pub radial: RadialConfig,
    pub physics: PhysicsConfig,
    pub ripple: RippleConfig,
}

impl VizConfig {
    /// Parse and validate a (possibly partial) JSON override.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: VizConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.radial.validate()?;
        self.physics.validate()?;
        self.ripple.validate()
    }
}

fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason })
    }
}

// ---------------------------------------------------------------------------
// RadialConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialConfig {
    /// Individual petals before the rest collapse into `others`.
    pub max_petals: usize,
    pub padding_deg: f64,
    pub center: f64,
    /// Inner ring, inner edge.
    pub ring_inner_radius: f64,
    /// Inner ring, outer edge; petals grow out from here.
    pub ring_outer_radius: f64,
    pub max_petal_radius: f64,
    pub others_tone: String,
    /// Total entrance duration in ms.
    pub entrance_duration_ms: f64,
    pub petal_duration_ms: f64,
    pub petal_stagger_ms: f64,
    pub dim_segment_opacity: f64,
    pub dim_petal_opacity: f64,
    pub sibling_petal_opacity: f64,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            max_petals: 12,
            padding_deg: crate::geometry::DEFAULT_PADDING_DEG,
            center: 160.0,
            ring_inner_radius: 58.0,
            ring_outer_radius: 82.0,
            max_petal_radius: 150.0,
            others_tone: "#9ca3af".to_string(),
            entrance_duration_ms: 1200.0,
            petal_duration_ms: 600.0,
            petal_stagger_ms: 40.0,
            dim_segment_opacity: 0.35,
            dim_petal_opacity: 0.25,
            sibling_petal_opacity: 0.6,
        }
    }
}

impl RadialConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check(self.max_petals > 0, "radial.maxPetals", "must be positive")?;
        check(
            (0.0..360.0).contains(&self.padding_deg),
            "radial.paddingDeg",
            "must be in [0, 360)",
        )?;
        check(
            self.ring_inner_radius >= 0.0 && self.ring_inner_radius < self.ring_outer_radius,
            "radial.ringInnerRadius",
            "must be non-negative and below ringOuterRadius",
        )?;
        check(
            self.max_petal_radius >= self.ring_outer_radius,
            "radial.maxPetalRadius",
            "must not be below ringOuterRadius",
        )?;
        check(
            crate::geometry::parse_hex(&self.others_tone).is_ok(),
            "radial.othersTone",
            "must be a hex color",
        )
    }
}

// ---------------------------------------------------------------------------
// PhysicsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsConfig {
    pub seed: u64,
    /// Fraction of velocity lost per 60 Hz step.
    pub air_friction: f64,
    pub restitution: f64,
    /// Distance of the invisible walls outside the visible canvas.
    pub wall_margin: f64,
    pub center_strength: f64,
    pub center_wander: f64,
    pub swirl_strength: f64,
    pub drift_strength: f64,
    pub max_flick_speed: f64,
    pub flick_velocity_scale: f64,
    pub max_flick_delta: f64,
    pub angular_kick: f64,
    pub shockwave_strength: f64,
    pub shockwave_min_radius: f64,
    pub shockwave_max_radius: f64,
    pub boost_duration_ms: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            air_friction: 0.04,
            restitution: 0.6,
            wall_margin: 160.0,
            center_strength: 0.0012,
            center_wander: 0.06,
            swirl_strength: 0.012,
            drift_strength: 0.01,
            max_flick_speed: 2400.0,
            flick_velocity_scale: 1.0 / 120.0,
            max_flick_delta: 18.0,
            angular_kick: 0.004,
            shockwave_strength: 6.0,
            shockwave_min_radius: 120.0,
            shockwave_max_radius: 320.0,
            boost_duration_ms: 900.0,
        }
    }
}

impl PhysicsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check(
            (0.0..1.0).contains(&self.air_friction),
            "physics.airFriction",
            "must be in [0, 1)",
        )?;
        check(
            (0.0..=1.0).contains(&self.restitution),
            "physics.restitution",
            "must be in [0, 1]",
        )?;
        check(self.max_flick_speed > 0.0, "physics.maxFlickSpeed", "must be positive")?;
        check(self.max_flick_delta > 0.0, "physics.maxFlickDelta", "must be positive")?;
        check(
            self.shockwave_min_radius <= self.shockwave_max_radius,
            "physics.shockwaveMinRadius",
            "must not exceed shockwaveMaxRadius",
        )?;
        check(self.boost_duration_ms > 0.0, "physics.boostDurationMs", "must be positive")
    }
}

// ---------------------------------------------------------------------------
// RippleConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RippleConfig {
    pub seed: u64,
    // Design A: height field
    pub grid_size: usize,
    pub damping: f64,
    pub highlight_threshold: f64,
    pub shadow_threshold: f64,
    // Design B: rings
    pub ring_count: usize,
    pub ring_delay_ms: f64,
    pub ring_duration_ms: f64,
    pub max_radius_multiplier: f64,
    pub initial_opacity: f64,
    pub initial_stroke: f64,
    pub final_stroke: f64,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            seed: 0xa11ce,
            grid_size: 128,
            damping: 0.985,
            highlight_threshold: 0.8,
            shadow_threshold: 0.5,
            ring_count: 4,
            ring_delay_ms: 120.0,
            ring_duration_ms: 1400.0,
            max_radius_multiplier: 3.5,
            initial_opacity: 0.6,
            initial_stroke: 3.0,
            final_stroke: 0.5,
        }
    }
}

/// Smallest grid with an interior cell.
const MIN_GRID_SIZE: usize = 3;
const MIN_RING_DURATION_MS: f64 = 1.0;

impl RippleConfig {
    /// Force the values the ripple engines index or divide by into range, for
    /// native callers that skip `validate`.
    pub fn clamped(mut self) -> Self {
        self.grid_size = self.grid_size.max(MIN_GRID_SIZE);
        if !self.ring_duration_ms.is_finite() || self.ring_duration_ms < MIN_RING_DURATION_MS {
            self.ring_duration_ms = MIN_RING_DURATION_MS;
        }
        if !self.ring_delay_ms.is_finite() || self.ring_delay_ms < 0.0 {
            self.ring_delay_ms = 0.0;
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check(
            self.grid_size >= MIN_GRID_SIZE,
            "ripple.gridSize",
            "must be at least 3",
        )?;
        check(
            self.damping > 0.0 && self.damping < 1.0,
            "ripple.damping",
            "must be in (0, 1)",
        )?;
        check(
            self.shadow_threshold < self.highlight_threshold,
            "ripple.shadowThreshold",
            "must be below highlightThreshold",
        )?;
        check(self.ring_count > 0, "ripple.ringCount", "must be positive")?;
        check(self.ring_duration_ms > 0.0, "ripple.ringDurationMs", "must be positive")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(VizConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = VizConfig::from_json(r#"{"radial":{"maxPetals":8},"ripple":{"ringCount":3}}"#)
            .expect("test: partial override");
        assert_eq!(config.radial.max_petals, 8);
        assert_eq!(config.radial.padding_deg, 2.0);
        assert_eq!(config.ripple.ring_count, 3);
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        let err = VizConfig::from_json(r#"{"physics":{"airFriction":1.5}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "physics.airFriction", .. }));

        let err = VizConfig::from_json(r#"{"radial":{"othersTone":"grey"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "radial.othersTone", .. }));

        let err = VizConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn clamped_ripple_config_is_usable() {
        let config = RippleConfig {
            grid_size: 0,
            ring_duration_ms: -5.0,
            ring_delay_ms: f64::NAN,
            ..RippleConfig::default()
        }
        .clamped();
        assert_eq!(config.grid_size, 3);
        assert_eq!(config.ring_duration_ms, 1.0);
        assert_eq!(config.ring_delay_ms, 0.0);
        assert_eq!(RippleConfig::default().clamped(), RippleConfig::default());
    }
}
