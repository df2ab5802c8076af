// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine - Radial Chart Layout
//
// Inner ring: one proportional arc per asset group (debt excluded).
// Outer rose: one equal-angle petal per account, length scaled by balance.
// The two rings are independent on purpose; petals do not line up with
// their group's arc.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::adapter::from_decimal;
use crate::config::RadialConfig;
use crate::geometry::{
    allocate_angles, arc_path, clamp01, color_variant, ease_out_cubic, equal_angles, lerp,
    petal_radius, stagger_delay,
};
use crate::types::{
    Account, CenterText, GroupId, GroupedAccounts, PetalDatum, RingSegment, SelectionState,
};

pub const NET_WORTH_LABEL: &str = "净资产";
pub const OTHERS_ID: &str = "others";
pub const OTHERS_LABEL: &str = "其他";

// ---------------------------------------------------------------------------
// Data processing
// ---------------------------------------------------------------------------

/// Inner-ring segments: non-debt groups with a positive total, in group order,
/// sized against the sum of the drawn groups so the ring always closes. That
/// sum is `assets_total` unless some non-debt group nets negative.
pub fn process_segments(grouped: &GroupedAccounts) -> Vec<RingSegment> {
    let cards: Vec<_> = grouped
        .group_cards
        .iter()
        .filter(|c| !c.group.id.is_debt() && c.total > Decimal::ZERO)
        .collect();
    let drawn_total: Decimal = cards.iter().map(|c| c.total).sum();
    let amounts: Vec<f64> = cards.iter().map(|c| from_decimal(c.total)).collect();
    let spans = allocate_angles(&amounts, from_decimal(drawn_total));

    cards
        .iter()
        .zip(spans)
        .map(|(card, span)| RingSegment {
            id: card.group.id,
            name: card.group.name.clone(),
            tone: card.group.tone.clone(),
            amount: card.total,
            percent: span.percent,
            start_angle: span.start_angle,
            end_angle: span.end_angle,
        })
        .collect()
}

/// Outer petals: positive non-debt accounts, largest first, capped at
/// `max_petals` with the remainder folded into a trailing `others` petal.
pub fn process_petals(grouped: &GroupedAccounts, config: &RadialConfig) -> Vec<PetalDatum> {
    let mut flat: Vec<(&Account, &str)> = grouped
        .group_cards
        .iter()
        .filter(|c| !c.group.id.is_debt())
        .flat_map(|c| {
            c.accounts
                .iter()
                .filter(|a| a.balance > Decimal::ZERO)
                .map(move |a| (a, c.group.tone.as_str()))
        })
        .collect();
    // stable: equal balances keep group order
    flat.sort_by(|a, b| b.0.balance.cmp(&a.0.balance));

    let keep = flat.len().min(config.max_petals);
    let rest: Decimal = flat[keep..].iter().map(|(a, _)| a.balance).sum();
    let aggregated = flat.len() > keep;
    let petal_count = keep + usize::from(aggregated);

    let spans = equal_angles(petal_count, config.padding_deg);
    let max_amount = flat[..keep]
        .iter()
        .map(|(a, _)| a.balance)
        .chain(aggregated.then_some(rest))
        .max()
        .map(from_decimal)
        .unwrap_or(0.0);
    let radius_of = |amount: Decimal| {
        petal_radius(
            from_decimal(amount),
            max_amount,
            config.ring_outer_radius,
            config.max_petal_radius,
        )
    };

    let mut running: HashMap<GroupId, usize> = HashMap::new();
    let mut petals: Vec<PetalDatum> = flat[..keep]
        .iter()
        .zip(&spans)
        .enumerate()
        .map(|(index, ((account, tone), span))| {
            let slot = running.entry(account.group).or_insert(0);
            let variant = color_variant(tone, *slot);
            *slot += 1;
            PetalDatum {
                id: account.id.clone(),
                name: account.name.clone(),
                amount: account.balance,
                group_id: Some(account.group),
                group_tone: tone.to_string(),
                color_variant: variant,
                index,
                start_angle: span.start_angle,
                end_angle: span.end_angle,
                target_radius: radius_of(account.balance),
            }
        })
        .collect();

    if aggregated {
        let span = spans[keep];
        petals.push(PetalDatum {
            id: OTHERS_ID.to_string(),
            name: OTHERS_LABEL.to_string(),
            amount: rest,
            group_id: None,
            group_tone: config.others_tone.clone(),
            color_variant: config.others_tone.clone(),
            index: keep,
            start_angle: span.start_angle,
            end_angle: span.end_angle,
            target_radius: radius_of(rest),
        });
    }
    petals
}

/// What the chart center shows: selected account, else selected group, else
/// net worth. A stale selection id falls through to the next level.
pub fn center_display(selection: &SelectionState, grouped: &GroupedAccounts) -> CenterText {
    if let Some(account) = selection
        .selected_account_id
        .as_deref()
        .and_then(|id| grouped.find_account(id))
    {
        return CenterText {
            label: account.name.clone(),
            amount: account.balance,
        };
    }
    if let Some(card) = selection.selected_group_id.and_then(|id| grouped.card(id)) {
        return CenterText {
            label: card.group.name.clone(),
            amount: card.total,
        };
    }
    CenterText {
        label: NET_WORTH_LABEL.to_string(),
        amount: grouped.net_worth,
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Receives selection changes caused by taps on the chart.
pub trait SelectionSink {
    fn on_select_group(&mut self, _group: Option<GroupId>) {}
    fn on_select_account(&mut self, _account_id: Option<&str>) {}
}

impl SelectionSink for () {}

impl SelectionState {
    /// Tap on an inner-ring segment: toggles the group and drops any account.
    pub fn toggle_group(&mut self, group: GroupId, sink: &mut dyn SelectionSink) {
        let next = if self.selected_group_id == Some(group) {
            None
        } else {
            Some(group)
        };
        self.selected_group_id = next;
        sink.on_select_group(next);
        if self.selected_account_id.take().is_some() {
            sink.on_select_account(None);
        }
    }

    /// Tap on a petal: toggles the account; the petal's group becomes (or
    /// stays) selected either way. The `others` petal is not selectable.
    pub fn toggle_petal(&mut self, petal: &PetalDatum, sink: &mut dyn SelectionSink) {
        let Some(group) = petal.group_id else {
            return;
        };
        if self.selected_account_id.as_deref() == Some(petal.id.as_str()) {
            self.selected_account_id = None;
            sink.on_select_account(None);
        } else {
            self.selected_account_id = Some(petal.id.clone());
            sink.on_select_account(Some(&petal.id));
        }
        if self.selected_group_id != Some(group) {
            self.selected_group_id = Some(group);
            sink.on_select_group(Some(group));
        }
    }

    pub fn clear(&mut self, sink: &mut dyn SelectionSink) {
        if self.selected_account_id.take().is_some() {
            sink.on_select_account(None);
        }
        if self.selected_group_id.take().is_some() {
            sink.on_select_group(None);
        }
    }

    fn segment_opacity(&self, id: GroupId, config: &RadialConfig) -> f64 {
        match self.selected_group_id {
            Some(selected) if selected != id => config.dim_segment_opacity,
            _ => 1.0,
        }
    }

    fn petal_opacity(&self, petal: &PetalDatum, config: &RadialConfig) -> f64 {
        if let Some(account) = self.selected_account_id.as_deref() {
            if petal.id == account {
                1.0
            } else if petal.group_id.is_some() && petal.group_id == self.selected_group_id {
                config.sibling_petal_opacity
            } else {
                config.dim_petal_opacity
            }
        } else {
            match self.selected_group_id {
                Some(group) if petal.group_id != Some(group) => config.dim_petal_opacity,
                _ => 1.0,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entrance animation
// ---------------------------------------------------------------------------

/// One external progress value in `[0, 1]` drives the whole entrance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntranceAnimation {
    progress: f64,
    reduced_motion: bool,
}

impl EntranceAnimation {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            progress: if reduced_motion { 1.0 } else { 0.0 },
            reduced_motion,
        }
    }

    /// Fully played; what a static render shows.
    pub fn finished() -> Self {
        Self {
            progress: 1.0,
            reduced_motion: false,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = if self.reduced_motion { 1.0 } else { clamp01(progress) };
    }

    /// Progress after `elapsed_ms` of wall time.
    pub fn set_elapsed(&mut self, elapsed_ms: f64, config: &RadialConfig) {
        let duration = self.duration_ms(config);
        let progress = if duration > 0.0 { elapsed_ms / duration } else { 1.0 };
        self.set_progress(progress);
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
        if reduced {
            self.progress = 1.0;
        }
    }

    pub fn duration_ms(&self, config: &RadialConfig) -> f64 {
        if self.reduced_motion {
            0.0
        } else {
            config.entrance_duration_ms
        }
    }

    pub fn petal_delay_ms(&self, index: usize, config: &RadialConfig) -> f64 {
        if self.reduced_motion {
            0.0
        } else {
            stagger_delay(index, 0.0, config.petal_stagger_ms)
        }
    }

    pub fn ring_opacity(&self) -> f64 {
        self.progress
    }

    pub fn ring_scale(&self) -> f64 {
        0.85 + 0.15 * self.progress
    }

    /// Eased growth of petal `index`, `0` before its stagger delay has passed.
    pub fn petal_progress(&self, index: usize, config: &RadialConfig) -> f64 {
        if self.reduced_motion || self.progress >= 1.0 {
            return 1.0;
        }
        let elapsed = self.progress * config.entrance_duration_ms;
        let local = elapsed - self.petal_delay_ms(index, config);
        if config.petal_duration_ms <= 0.0 {
            return if local >= 0.0 { 1.0 } else { 0.0 };
        }
        ease_out_cubic(local / config.petal_duration_ms)
    }

    pub fn petal_radius(&self, petal: &PetalDatum, config: &RadialConfig) -> f64 {
        lerp(
            config.ring_outer_radius,
            petal.target_radius,
            self.petal_progress(petal.index, config),
        )
    }

    /// Center text stays hidden for the first half, then fades in linearly.
    pub fn center_opacity(&self) -> f64 {
        clamp01((self.progress - 0.5) / 0.5)
    }
}

impl Default for EntranceAnimation {
    fn default() -> Self {
        Self::new(false)
    }
}

// ---------------------------------------------------------------------------
// Rendering strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Segment,
    Petal,
    Wedge,
}

/// A filled path ready for an SVG or canvas surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPrimitive {
    pub id: String,
    pub kind: PrimitiveKind,
    pub path: String,
    pub fill: String,
    pub opacity: f64,
}

/// One way of turning grouped accounts into primitives.
pub trait ChartLayout {
    fn layout(
        &self,
        data: &GroupedAccounts,
        selection: &SelectionState,
        animation: &EntranceAnimation,
    ) -> Vec<ChartPrimitive>;
}

/// Proportional group ring only.
pub struct InnerRingLayout<'a> {
    pub config: &'a RadialConfig,
}

impl ChartLayout for InnerRingLayout<'_> {
    fn layout(
        &self,
        data: &GroupedAccounts,
        selection: &SelectionState,
        animation: &EntranceAnimation,
    ) -> Vec<ChartPrimitive> {
        let c = self.config;
        let scale = animation.ring_scale();
        process_segments(data)
            .into_iter()
            .map(|seg| ChartPrimitive {
                id: seg.id.as_str().to_string(),
                kind: PrimitiveKind::Segment,
                path: arc_path(
                    c.center,
                    c.center,
                    c.ring_inner_radius * scale,
                    c.ring_outer_radius * scale,
                    seg.start_angle,
                    seg.end_angle,
                ),
                fill: seg.tone.clone(),
                opacity: selection.segment_opacity(seg.id, c) * animation.ring_opacity(),
            })
            .collect()
    }
}

/// Inner ring plus the outer rose of account petals.
pub struct RoseLayout<'a> {
    pub config: &'a RadialConfig,
}

impl ChartLayout for RoseLayout<'_> {
    fn layout(
        &self,
        data: &GroupedAccounts,
        selection: &SelectionState,
        animation: &EntranceAnimation,
    ) -> Vec<ChartPrimitive> {
        let c = self.config;
        let mut primitives = InnerRingLayout { config: c }.layout(data, selection, animation);
        primitives.extend(process_petals(data, c).into_iter().map(|petal| {
            ChartPrimitive {
                path: arc_path(
                    c.center,
                    c.center,
                    c.ring_outer_radius,
                    animation.petal_radius(&petal, c),
                    petal.start_angle,
                    petal.end_angle,
                ),
                fill: petal.color_variant.clone(),
                opacity: selection.petal_opacity(&petal, c),
                kind: PrimitiveKind::Petal,
                id: petal.id,
            }
        }));
        primitives
    }
}

/// Legacy pie: solid proportional wedges with a thin equal-slice account band.
pub struct PieLayout<'a> {
    pub config: &'a RadialConfig,
}

const PIE_BAND_GAP: f64 = 4.0;
const PIE_BAND_WIDTH: f64 = 24.0;

impl ChartLayout for PieLayout<'_> {
    fn layout(
        &self,
        data: &GroupedAccounts,
        selection: &SelectionState,
        animation: &EntranceAnimation,
    ) -> Vec<ChartPrimitive> {
        let c = self.config;
        let radius = c.ring_outer_radius * animation.ring_scale();
        let mut primitives: Vec<ChartPrimitive> = process_segments(data)
            .into_iter()
            .map(|seg| ChartPrimitive {
                id: seg.id.as_str().to_string(),
                kind: PrimitiveKind::Wedge,
                path: arc_path(c.center, c.center, 0.0, radius, seg.start_angle, seg.end_angle),
                fill: seg.tone.clone(),
                opacity: selection.segment_opacity(seg.id, c) * animation.ring_opacity(),
            })
            .collect();

        let band_inner = radius + PIE_BAND_GAP;
        primitives.extend(process_petals(data, c).into_iter().map(|petal| {
            let band_outer = lerp(
                band_inner,
                band_inner + PIE_BAND_WIDTH,
                animation.petal_progress(petal.index, c),
            );
            ChartPrimitive {
                path: arc_path(
                    c.center,
                    c.center,
                    band_inner,
                    band_outer,
                    petal.start_angle,
                    petal.end_angle,
                ),
                fill: petal.color_variant.clone(),
                opacity: selection.petal_opacity(&petal, c),
                kind: PrimitiveKind::Petal,
                id: petal.id,
            }
        }));
        primitives
    }
}

// ---------------------------------------------------------------------------
// RadialChart
// ---------------------------------------------------------------------------

/// Everything the host needs to draw one frame of the dual-layer chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadialView {
    pub segments: Vec<RingSegment>,
    pub petals: Vec<PetalDatum>,
    pub primitives: Vec<ChartPrimitive>,
    pub center: CenterText,
    pub center_opacity: f64,
    pub selection: SelectionState,
}

/// Selection plus entrance state for one mounted chart.
#[derive(Debug, Clone, Default)]
pub struct RadialChart {
    config: RadialConfig,
    selection: SelectionState,
    animation: EntranceAnimation,
}

impl RadialChart {
    pub fn new(config: RadialConfig, reduced_motion: bool) -> Self {
        Self {
            config,
            selection: SelectionState::default(),
            animation: EntranceAnimation::new(reduced_motion),
        }
    }

    pub fn config(&self) -> &RadialConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn animation(&self) -> &EntranceAnimation {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut EntranceAnimation {
        &mut self.animation
    }

    pub fn click_segment(&mut self, group: GroupId, sink: &mut dyn SelectionSink) {
        self.selection.toggle_group(group, sink);
    }

    pub fn click_petal(&mut self, petal: &PetalDatum, sink: &mut dyn SelectionSink) {
        self.selection.toggle_petal(petal, sink);
    }

    pub fn center(&self, grouped: &GroupedAccounts) -> CenterText {
        center_display(&self.selection, grouped)
    }

    pub fn view_with(&self, grouped: &GroupedAccounts, layout: &dyn ChartLayout) -> RadialView {
        RadialView {
            segments: process_segments(grouped),
            petals: process_petals(grouped, &self.config),
            primitives: layout.layout(grouped, &self.selection, &self.animation),
            center: self.center(grouped),
            center_opacity: self.animation.center_opacity(),
            selection: self.selection.clone(),
        }
    }

    pub fn view(&self, grouped: &GroupedAccounts) -> RadialView {
        self.view_as(grouped, LayoutKind::Rose)
    }

    pub fn view_as(&self, grouped: &GroupedAccounts, kind: LayoutKind) -> RadialView {
        let config = &self.config;
        match kind {
            LayoutKind::Ring => self.view_with(grouped, &InnerRingLayout { config }),
            LayoutKind::Rose => self.view_with(grouped, &RoseLayout { config }),
            LayoutKind::Pie => self.view_with(grouped, &PieLayout { config }),
        }
    }

    /// Drop both selection levels, notifying `sink` of each one that changes.
    pub fn clear_selection(&mut self, sink: &mut dyn SelectionSink) {
        self.selection.clear(sink);
    }

    /// Restore a selection held by the host, without notifying.
    pub fn set_selection(&mut self, selection: SelectionState) {
        self.selection = selection;
    }
}

/// Built-in layouts, selectable by name from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Ring,
    #[default]
    Rose,
    Pie,
}

impl LayoutKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ring" => Some(Self::Ring),
            "rose" => Some(Self::Rose),
            "pie" => Some(Self::Pie),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
