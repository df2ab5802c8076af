// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Geometry Kernel
//
// Pure layout math shared by the radial chart and the bubble view. Angles are
// in degrees with 0° pointing up and increasing clockwise (screen space, y down).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Write;

/// Default gap between equal-angle petals.
pub const DEFAULT_PADDING_DEG: f64 = 2.0;

/// Brightness offsets applied by [`color_variant`], cycled by index.
const VARIANT_OFFSETS: [i32; 5] = [-20, -10, 0, 10, 20];

/// Arcs are never drawn as a full closed circle (start and end would coincide).
const MAX_ARC_SPAN: f64 = 359.99;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from parsing a hex color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("color {0:?} must be #rgb or #rrggbb")]
    InvalidLength(String),

    #[error("color {0:?} contains a non-hex digit")]
    InvalidDigit(String),
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Shift every channel by `offset`, saturating at the channel bounds.
    pub fn shifted(self, offset: i32) -> Rgb {
        let shift = |c: u8| (c as i32 + offset).clamp(0, 255) as u8;
        Rgb {
            r: shift(self.r),
            g: shift(self.g),
            b: shift(self.b),
        }
    }

    /// WCAG 2.x relative luminance in `[0, 1]`.
    pub fn relative_luminance(self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = channel as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }
}

/// Parse `#rgb` or `#rrggbb` (leading `#` optional, case-insensitive).
pub fn parse_hex(input: &str) -> Result<Rgb, ColorError> {
    let digits = input.trim().trim_start_matches('#');
    if !digits.is_ascii() {
        return Err(ColorError::InvalidDigit(input.to_string()));
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(ColorError::InvalidLength(input.to_string())),
    };
    let channel = |at: usize| {
        u8::from_str_radix(&expanded[at..at + 2], 16)
            .map_err(|_| ColorError::InvalidDigit(input.to_string()))
    };
    Ok(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Brightness variant of `base_hex` for the `index`-th member of a group.
///
/// Periodic with period 5 in `index`. Unparseable input is treated as black,
/// so the result is always a valid lower-case `#rrggbb`.
pub fn color_variant(base_hex: &str, index: usize) -> String {
    let base = parse_hex(base_hex).unwrap_or(Rgb::BLACK);
    base.shifted(VARIANT_OFFSETS[index % VARIANT_OFFSETS.len()])
        .to_hex()
}

/// WCAG contrast ratio between two colors, in `[1, 21]`.
pub fn contrast_ratio(hex1: &str, hex2: &str) -> f64 {
    let l1 = parse_hex(hex1).unwrap_or(Rgb::BLACK).relative_luminance();
    let l2 = parse_hex(hex2).unwrap_or(Rgb::BLACK).relative_luminance();
    let (light, dark) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (light + 0.05) / (dark + 0.05)
}

// ---------------------------------------------------------------------------
// Angles
// ---------------------------------------------------------------------------

/// One angular slot of a ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleSpan {
    pub start_angle: f64,
    pub end_angle: f64,
    pub percent: f64,
}

impl AngleSpan {
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}

/// Proportional, contiguous spans starting at 0°.
///
/// Returns empty when there are no items or `total <= 0`. Non-finite amounts
/// take no space.
pub fn allocate_angles(amounts: &[f64], total: f64) -> Vec<AngleSpan> {
    if amounts.is_empty() || !total.is_finite() || total <= 0.0 {
        return Vec::new();
    }

    let mut cursor = 0.0;
    amounts
        .iter()
        .map(|&amount| {
            let amount = if amount.is_finite() { amount } else { 0.0 };
            let fraction = amount / total;
            let start = cursor;
            cursor += fraction * 360.0;
            AngleSpan {
                start_angle: start,
                end_angle: cursor,
                percent: fraction * 100.0,
            }
        })
        .collect()
}

/// `count` equal slots of width `360/count - padding`, slot `i` starting at
/// `i * 360/count`.
pub fn equal_angles(count: usize, padding_deg: f64) -> Vec<AngleSpan> {
    if count == 0 {
        return Vec::new();
    }

    let padding = if padding_deg.is_finite() { padding_deg.max(0.0) } else { 0.0 };
    let step = 360.0 / count as f64;
    let width = (step - padding).max(0.0);
    let percent = 100.0 / count as f64;
    (0..count)
        .map(|i| {
            let start = i as f64 * step;
            AngleSpan {
                start_angle: start,
                end_angle: start + width,
                percent,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Radii & paths
// ---------------------------------------------------------------------------

/// Square-root radius scaling for outer petals, always in `[inner_r, max_outer_r]`.
pub fn petal_radius(balance: f64, max_balance: f64, inner_r: f64, max_outer_r: f64) -> f64 {
    if !balance.is_finite() || !max_balance.is_finite() || max_balance <= 0.0 || balance < 0.0 {
        return inner_r;
    }
    let ratio = balance.min(max_balance) / max_balance;
    let radius = inner_r + (max_outer_r - inner_r) * (0.35 + 0.65 * ratio.sqrt());
    radius.clamp(inner_r.min(max_outer_r), max_outer_r.max(inner_r))
}

pub fn polar_to_cartesian(cx: f64, cy: f64, r: f64, deg: f64) -> (f64, f64) {
    let rad = (deg - 90.0) * PI / 180.0;
    (cx + r * rad.cos(), cy + r * rad.sin())
}

/// SVG path of an annular sector: outer arc, radial edge, inner arc, radial edge.
///
/// An `inner_r` of zero produces a pie wedge. Returns an empty path for
/// non-finite input or an empty span.
pub fn arc_path(cx: f64, cy: f64, inner_r: f64, outer_r: f64, start_deg: f64, end_deg: f64) -> String {
    let inputs = [cx, cy, inner_r, outer_r, start_deg, end_deg];
    if inputs.iter().any(|v| !v.is_finite()) || end_deg <= start_deg || outer_r <= 0.0 {
        return String::new();
    }

    let end_deg = end_deg.min(start_deg + MAX_ARC_SPAN);
    let large_arc = u8::from(end_deg - start_deg > 180.0);
    let inner_r = inner_r.max(0.0);

    let (osx, osy) = polar_to_cartesian(cx, cy, outer_r, start_deg);
    let (oex, oey) = polar_to_cartesian(cx, cy, outer_r, end_deg);

    let mut path = String::new();
    let _ = write!(
        path,
        "M {} {} A {} {} 0 {} 1 {} {}",
        fmt_num(osx),
        fmt_num(osy),
        fmt_num(outer_r),
        fmt_num(outer_r),
        large_arc,
        fmt_num(oex),
        fmt_num(oey),
    );

    if inner_r > 0.0 {
        let (iex, iey) = polar_to_cartesian(cx, cy, inner_r, end_deg);
        let (isx, isy) = polar_to_cartesian(cx, cy, inner_r, start_deg);
        let _ = write!(
            path,
            " L {} {} A {} {} 0 {} 0 {} {} Z",
            fmt_num(iex),
            fmt_num(iey),
            fmt_num(inner_r),
            fmt_num(inner_r),
            large_arc,
            fmt_num(isx),
            fmt_num(isy),
        );
    } else {
        let _ = write!(path, " L {} {} Z", fmt_num(cx), fmt_num(cy));
    }
    path
}

fn fmt_num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{rounded:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

pub fn stagger_delay(index: usize, base: f64, interval: f64) -> f64 {
    base + index as f64 * interval
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn clamp01(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

pub fn ease_out_quad(t: f64) -> f64 {
    let t = clamp01(t);
    1.0 - (1.0 - t).powi(2)
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = clamp01(t);
    1.0 - (1.0 - t).powi(3)
}

pub fn ease_out_quart(t: f64) -> f64 {
    let t = clamp01(t);
    1.0 - (1.0 - t).powi(4)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn allocate_angles_is_proportional_and_contiguous() {
        let spans = allocate_angles(&[1000.0, 500.0, 500.0], 2000.0);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].start_angle, 0.0);
        assert!((spans[0].span() - 180.0).abs() < 1e-9);
        assert!((spans[1].span() - 90.0).abs() < 1e-9);
        assert_eq!(spans[1].start_angle, spans[0].end_angle);
        assert!((spans[2].end_angle - 360.0).abs() < 1e-9);
        assert!((spans[0].percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn allocate_angles_degenerate_total() {
        assert!(allocate_angles(&[1.0, 2.0], 0.0).is_empty());
        assert!(allocate_angles(&[1.0], -5.0).is_empty());
        assert!(allocate_angles(&[], 10.0).is_empty());
        assert!(allocate_angles(&[1.0], f64::NAN).is_empty());
    }

    #[test]
    fn equal_angles_leaves_padding_gaps() {
        let slots = equal_angles(4, 2.0);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].start_angle, 0.0);
        assert_eq!(slots[0].end_angle, 88.0);
        assert_eq!(slots[1].start_angle, 90.0);
        assert_eq!(slots[3].end_angle, 358.0);
        assert!(equal_angles(0, 2.0).is_empty());
    }

    #[test]
    fn petal_radius_bounds() {
        assert_eq!(petal_radius(50.0, 0.0, 60.0, 120.0), 60.0);
        assert_eq!(petal_radius(-1.0, 100.0, 60.0, 120.0), 60.0);
        assert_eq!(petal_radius(f64::NAN, 100.0, 60.0, 120.0), 60.0);
        assert!((petal_radius(100.0, 100.0, 60.0, 120.0) - 120.0).abs() < 1e-9);
        // zero balance still gets the 35% floor
        assert!((petal_radius(0.0, 100.0, 60.0, 120.0) - 81.0).abs() < 1e-9);
        // balances above max are clipped
        assert!((petal_radius(500.0, 100.0, 60.0, 120.0) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn color_variant_cycles() {
        assert_eq!(color_variant("#3b82f6", 2), "#3b82f6");
        assert_eq!(color_variant("#3B82F6", 4), "#4f96ff");
        assert_eq!(color_variant("#3b82f6", 0), "#276ee2");
        assert_eq!(color_variant("#000000", 0), "#000000");
        assert_eq!(color_variant("#ffffff", 4), "#ffffff");
        assert_eq!(color_variant("not a color", 3), "#0a0a0a");
    }

    #[test]
    fn parse_hex_accepts_short_form() {
        assert_eq!(parse_hex("#fff"), Ok(Rgb { r: 255, g: 255, b: 255 }));
        assert!(matches!(parse_hex("#12345"), Err(ColorError::InvalidLength(_))));
        assert!(matches!(parse_hex("#zzzzzz"), Err(ColorError::InvalidDigit(_))));
        assert!(parse_hex("#ééé").is_err());
    }

    #[test]
    fn contrast_ratio_extremes() {
        assert!((contrast_ratio("#000000", "#ffffff") - 21.0).abs() < 0.1);
        assert!((contrast_ratio("#3b82f6", "#3b82f6") - 1.0).abs() < 1e-12);
        let a = contrast_ratio("#3b82f6", "#f59e0b");
        let b = contrast_ratio("#f59e0b", "#3b82f6");
        assert_eq!(a, b);
    }

    #[test]
    fn arc_path_shape() {
        let path = arc_path(100.0, 100.0, 50.0, 80.0, 0.0, 90.0);
        assert_eq!(path, "M 100 20 A 80 80 0 0 1 180 100 L 150 100 A 50 50 0 0 0 100 50 Z");

        let large = arc_path(0.0, 0.0, 10.0, 20.0, 0.0, 270.0);
        assert!(large.contains("A 20 20 0 1 1"));

        let wedge = arc_path(0.0, 0.0, 0.0, 20.0, 0.0, 90.0);
        assert!(wedge.ends_with("L 0 0 Z"));

        assert!(arc_path(f64::NAN, 0.0, 10.0, 20.0, 0.0, 90.0).is_empty());
        assert!(arc_path(0.0, 0.0, 10.0, 20.0, 90.0, 90.0).is_empty());
    }

    #[test]
    fn full_circle_arc_is_drawable() {
        let path = arc_path(0.0, 0.0, 10.0, 20.0, 0.0, 360.0);
        assert!(path.starts_with("M 0 -20 A 20 20 0 1 1"));
        assert!(!path.contains("1 0 -20 L"));
    }

    #[test]
    fn lerp_and_stagger() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.5), 4.0);
        assert_eq!(stagger_delay(0, 100.0, 40.0), 100.0);
        assert_eq!(stagger_delay(3, 100.0, 40.0), 220.0);
    }

    #[test]
    fn easing_endpoints() {
        for ease in [ease_out_quad, ease_out_cubic, ease_out_quart] {
            assert_eq!(ease(0.0), 0.0);
            assert_eq!(ease(1.0), 1.0);
            assert_eq!(ease(2.0), 1.0);
            assert!(ease(0.5) > 0.5);
        }
    }

    proptest! {
        #[test]
        fn prop_equal_angles(n in 1usize..64, padding in 0.0f64..5.0) {
            prop_assume!(padding < 360.0 / n as f64);
            let slots = equal_angles(n, padding);
            prop_assert_eq!(slots.len(), n);
            prop_assert_eq!(slots[0].start_angle, 0.0);
            let step = 360.0 / n as f64;
            let mut covered = 0.0;
            for (i, slot) in slots.iter().enumerate() {
                prop_assert!((slot.span() - (step - padding)).abs() < 1e-9);
                if i > 0 {
                    let gap = slot.start_angle - slots[i - 1].end_angle;
                    prop_assert!((gap - padding).abs() < 1e-9);
                }
                covered += slot.span();
            }
            prop_assert!((covered - (360.0 - n as f64 * padding)).abs() < 1e-6);
        }

        #[test]
        fn prop_allocate_angles_sum(amounts in proptest::collection::vec(0.01f64..1e7, 1..20)) {
            let total: f64 = amounts.iter().sum();
            let spans = allocate_angles(&amounts, total);
            let sum: f64 = spans.iter().map(AngleSpan::span).sum();
            prop_assert!((sum - 360.0).abs() < 1e-3);
            for (i, span) in spans.iter().enumerate() {
                prop_assert!((span.span() - amounts[i] / total * 360.0).abs() < 1e-6);
                if i > 0 {
                    prop_assert_eq!(span.start_angle, spans[i - 1].end_angle);
                }
            }
        }

        #[test]
        fn prop_petal_radius_bounded_monotonic(
            a in 0.0f64..1e6,
            b in 0.0f64..1e6,
            max in 1.0f64..1e6,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let r_lo = petal_radius(lo, max, 60.0, 140.0);
            let r_hi = petal_radius(hi, max, 60.0, 140.0);
            prop_assert!((60.0..=140.0).contains(&r_lo));
            prop_assert!((60.0..=140.0).contains(&r_hi));
            prop_assert!(r_lo <= r_hi);
        }

        #[test]
        fn prop_color_variant_periodic(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255, i in 0usize..1000) {
            let hex = Rgb { r, g, b }.to_hex();
            let v = color_variant(&hex, i);
            prop_assert_eq!(&v, &color_variant(&hex, i + 5));
            prop_assert_eq!(&v, &color_variant(&hex, i + 10));
            prop_assert_eq!(v.len(), 7);
            prop_assert!(v.starts_with('#'));
            prop_assert!(v[1..].chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }

        #[test]
        fn prop_contrast_symmetric(a in 0u32..0x1000000, b in 0u32..0x1000000) {
            let ha = format!("#{a:06x}");
            let hb = format!("#{b:06x}");
            let ratio = contrast_ratio(&ha, &hb);
            prop_assert_eq!(ratio, contrast_ratio(&hb, &ha));
            prop_assert!((1.0..=21.0 + 1e-9).contains(&ratio));
        }

        #[test]
        fn prop_lerp_monotonic(a in -1e6f64..1e6, b in -1e6f64..1e6, t1 in 0.0f64..1.0, t2 in 0.0f64..1.0) {
            let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            if a <= b {
                prop_assert!(lerp(a, b, lo) <= lerp(a, b, hi) + 1e-9);
            } else {
                prop_assert!(lerp(a, b, lo) + 1e-9 >= lerp(a, b, hi));
            }
        }
    }
}
