// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ledger Visualization Engine

pub mod adapter;
pub mod config;
pub mod frame_loop;
pub mod geometry;
pub mod grouping;
pub mod percent;
pub mod physics;
pub mod radial;
pub mod ripple;
pub mod types;

pub use config::{ConfigError, VizConfig};
pub use physics::{BubbleSimulation, PhysicsError};
pub use radial::{LayoutKind, RadialChart, RadialView};
pub use ripple::{RippleEffect, RippleLoop, RippleRings, WaveField};
pub use types::*;

use frame_loop::FrameToken;
use grouping::{default_groups, group_accounts};
use js_sys::Function;
use radial::SelectionSink;
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::prelude::*;

// ─── Native core ─────────────────────────────────────────────────────────────

/// Group `accounts`, apply `selection`, and lay the chart out at entrance
/// `progress` (0..=1).
pub fn layout_radial_core(
    accounts: &[Account],
    selection: SelectionState,
    progress: f64,
    kind: LayoutKind,
    config: &config::RadialConfig,
) -> RadialView {
    let grouped = group_accounts(accounts, &default_groups());
    let mut chart = RadialChart::new(config.clone(), false);
    chart.set_selection(selection);
    chart.animation_mut().set_progress(progress);
    chart.view_as(&grouped, kind)
}

pub fn center_text_core(accounts: &[Account], selection: &SelectionState) -> CenterText {
    let grouped = group_accounts(accounts, &default_groups());
    radial::center_display(selection, &grouped)
}

fn load_config(json: Option<String>) -> Result<VizConfig, ConfigError> {
    match json {
        Some(json) => VizConfig::from_json(&json),
        None => Ok(VizConfig::default()),
    }
}

fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// Frame tokens cross as plain JS numbers.
fn token_in(token: f64) -> FrameToken {
    FrameToken(token as u64)
}

fn token_out(token: Option<FrameToken>) -> Option<f64> {
    token.map(|t| t.0 as f64)
}

fn parse_layout(layout: Option<String>) -> Result<LayoutKind, JsValue> {
    match layout {
        None => Ok(LayoutKind::default()),
        Some(name) => {
            LayoutKind::parse(&name).ok_or_else(|| js_error(format!("unknown layout {name:?}")))
        }
    }
}

fn parse_selection(selection: JsValue) -> Result<SelectionState, JsValue> {
    if selection.is_undefined() || selection.is_null() {
        return Ok(SelectionState::default());
    }
    serde_wasm_bindgen::from_value(selection).map_err(js_error)
}

fn parse_bubbles(bubbles: JsValue) -> Result<Vec<BubbleSnapshot>, JsValue> {
    serde_wasm_bindgen::from_value(bubbles).map_err(js_error)
}

/// Invoke a host callback with one argument. The argument is only built when
/// a callback is registered.
fn call_host(callback: Option<&Function>, arg: impl FnOnce() -> JsValue) {
    let Some(callback) = callback else {
        return;
    };
    if let Err(err) = callback.call1(&JsValue::NULL, &arg()) {
        warn!(?err, "host callback threw");
    }
}

/// Forwards chart taps to `onSelectGroup(id | null)` and
/// `onSelectAccount(id | null)`.
struct HostSelection<'a> {
    on_group: Option<&'a Function>,
    on_account: Option<&'a Function>,
}

impl SelectionSink for HostSelection<'_> {
    fn on_select_group(&mut self, group: Option<GroupId>) {
        call_host(self.on_group, || {
            group.map_or(JsValue::NULL, |g| JsValue::from_str(g.as_str()))
        });
    }

    fn on_select_account(&mut self, account_id: Option<&str>) {
        call_host(self.on_account, || account_id.map_or(JsValue::NULL, JsValue::from_str));
    }
}

#[wasm_bindgen]
pub fn layout_radial(
    accounts: JsValue,
    selection: JsValue,
    progress: f64,
    layout: Option<String>,
) -> Result<JsValue, JsValue> {
    let accounts: Vec<Account> = serde_wasm_bindgen::from_value(accounts).map_err(js_error)?;
    let selection = parse_selection(selection)?;
    let kind = parse_layout(layout)?;
    let view = layout_radial_core(
        &accounts,
        selection,
        progress,
        kind,
        &config::RadialConfig::default(),
    );
    Ok(to_js(&view))
}

#[wasm_bindgen]
pub fn center_text(accounts: JsValue, selection: JsValue) -> Result<JsValue, JsValue> {
    let accounts: Vec<Account> = serde_wasm_bindgen::from_value(accounts).map_err(js_error)?;
    let selection = parse_selection(selection)?;
    Ok(to_js(&center_text_core(&accounts, &selection)))
}

#[wasm_bindgen]
pub fn allocate_percents(amounts: Vec<f64>) -> Vec<u32> {
    percent::allocate_integer_percents(&amounts)
}

/// Stateful dual-layer chart: keeps the selection and entrance timeline
/// between host renders.
#[wasm_bindgen]
pub struct RadialEngine {
    chart: RadialChart,
    grouped: GroupedAccounts,
    on_select_group: Option<Function>,
    on_select_account: Option<Function>,
}

#[wasm_bindgen]
impl RadialEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, reduced_motion: bool) -> Result<RadialEngine, JsValue> {
        install_panic_hook();
        let config = load_config(config_json).map_err(js_error)?;
        Ok(Self {
            chart: RadialChart::new(config.radial, reduced_motion),
            grouped: group_accounts(&[], &default_groups()),
            on_select_group: None,
            on_select_account: None,
        })
    }

    /// Register the selection callbacks; either may be omitted.
    pub fn set_on_select(&mut self, on_group: Option<Function>, on_account: Option<Function>) {
        self.on_select_group = on_group;
        self.on_select_account = on_account;
    }

    pub fn set_accounts(&mut self, accounts: JsValue) -> Result<(), JsValue> {
        let accounts: Vec<Account> = serde_wasm_bindgen::from_value(accounts).map_err(js_error)?;
        self.grouped = group_accounts(&accounts, &default_groups());
        Ok(())
    }

    pub fn set_elapsed(&mut self, elapsed_ms: f64) {
        let config = self.chart.config().clone();
        self.chart.animation_mut().set_elapsed(elapsed_ms, &config);
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.chart.animation_mut().set_reduced_motion(reduced);
    }

    pub fn click_segment(&mut self, group: &str) -> Result<(), JsValue> {
        let id = GroupId::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == group)
            .ok_or_else(|| js_error(format!("unknown group {group:?}")))?;
        let mut sink = HostSelection {
            on_group: self.on_select_group.as_ref(),
            on_account: self.on_select_account.as_ref(),
        };
        self.chart.click_segment(id, &mut sink);
        Ok(())
    }

    pub fn click_petal(&mut self, petal_id: &str) -> Result<(), JsValue> {
        let petal = radial::process_petals(&self.grouped, self.chart.config())
            .into_iter()
            .find(|p| p.id == petal_id)
            .ok_or_else(|| js_error(format!("unknown petal {petal_id:?}")))?;
        let mut sink = HostSelection {
            on_group: self.on_select_group.as_ref(),
            on_account: self.on_select_account.as_ref(),
        };
        self.chart.click_petal(&petal, &mut sink);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        let mut sink = HostSelection {
            on_group: self.on_select_group.as_ref(),
            on_account: self.on_select_account.as_ref(),
        };
        self.chart.clear_selection(&mut sink);
    }

    pub fn selection(&self) -> JsValue {
        to_js(self.chart.selection())
    }

    pub fn view(&self, layout: Option<String>) -> Result<JsValue, JsValue> {
        let kind = parse_layout(layout)?;
        Ok(to_js(&self.chart.view_as(&self.grouped, kind)))
    }
}

#[wasm_bindgen]
pub struct BubbleEngine {
    sim: BubbleSimulation,
}

#[wasm_bindgen]
impl BubbleEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<BubbleEngine, JsValue> {
        install_panic_hook();
        let config = load_config(config_json).map_err(js_error)?;
        Ok(Self {
            sim: BubbleSimulation::new(config.physics),
        })
    }

    pub fn set_nodes(&mut self, nodes: JsValue) -> Result<(), JsValue> {
        let nodes: Vec<BubbleNode> = serde_wasm_bindgen::from_value(nodes).map_err(js_error)?;
        self.sim.set_nodes(nodes);
        Ok(())
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.sim.resize(width, height);
    }

    /// Returns the first frame token to request.
    pub fn start(&mut self) -> f64 {
        self.sim.start().0 as f64
    }

    /// Returns the frame token to cancel, if one was pending.
    pub fn stop(&mut self) -> Option<f64> {
        token_out(self.sim.stop())
    }

    pub fn frame(&mut self, token: f64, now_ms: f64) -> Option<f64> {
        token_out(self.sim.frame(token_in(token), now_ms))
    }

    pub fn flick(&mut self, id: &str, vx: f64, vy: f64) -> Result<bool, JsValue> {
        self.sim.flick(id, vx, vy).map_err(js_error)
    }

    pub fn positions(&self) -> JsValue {
        to_js(self.sim.positions())
    }

    pub fn snapshots(&self) -> JsValue {
        to_js(&self.sim.snapshots())
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }
}

/// Design A ripple: height-field wave shaded into an RGBA buffer.
#[wasm_bindgen]
pub struct WaveRipples {
    ripples: RippleLoop<WaveField>,
}

#[wasm_bindgen]
impl WaveRipples {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, width: f64, height: f64) -> Result<WaveRipples, JsValue> {
        install_panic_hook();
        let config = load_config(config_json).map_err(js_error)?;
        Ok(Self {
            ripples: RippleLoop::new(WaveField::new(config.ripple, width, height)),
        })
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.ripples.effect_mut().resize(width, height);
    }

    pub fn activate(&mut self, bubbles: JsValue) -> Result<Option<f64>, JsValue> {
        let bubbles = parse_bubbles(bubbles)?;
        Ok(token_out(self.ripples.activate(&bubbles)))
    }

    pub fn deactivate(&mut self) -> Option<f64> {
        token_out(self.ripples.deactivate())
    }

    pub fn frame(&mut self, token: f64, now_ms: f64) -> Option<f64> {
        token_out(self.ripples.frame(token_in(token), now_ms))
    }

    pub fn grid_size(&self) -> usize {
        self.ripples.effect().grid_size()
    }

    /// RGBA bytes, `grid_size * grid_size * 4` long while active.
    pub fn pixels(&self) -> Vec<u8> {
        self.ripples.effect().pixels().to_vec()
    }
}

/// Design B ripple: concentric expanding rings per bubble.
#[wasm_bindgen]
pub struct RingRipples {
    ripples: RippleLoop<RippleRings>,
}

#[wasm_bindgen]
impl RingRipples {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<RingRipples, JsValue> {
        install_panic_hook();
        let config = load_config(config_json).map_err(js_error)?;
        Ok(Self {
            ripples: RippleLoop::new(RippleRings::new(config.ripple)),
        })
    }

    pub fn activate(&mut self, bubbles: JsValue) -> Result<Option<f64>, JsValue> {
        let bubbles = parse_bubbles(bubbles)?;
        Ok(token_out(self.ripples.activate(&bubbles)))
    }

    pub fn deactivate(&mut self) -> Option<f64> {
        token_out(self.ripples.deactivate())
    }

    /// `on_complete()` runs once each time every ring has finished, inside
    /// the frame call that finishes them.
    pub fn set_on_complete(&mut self, on_complete: Function) {
        self.ripples
            .effect_mut()
            .on_complete(move || call_host(Some(&on_complete), || JsValue::UNDEFINED));
    }

    /// `None` once the animation has completed.
    pub fn frame(&mut self, token: f64, now_ms: f64) -> Option<f64> {
        token_out(self.ripples.frame(token_in(token), now_ms))
    }

    pub fn is_finished(&self) -> bool {
        self.ripples.effect().is_finished()
    }

    pub fn draw_list(&self) -> JsValue {
        to_js(&self.ripples.effect().draw_list())
    }

    pub fn ripples(&self) -> JsValue {
        to_js(self.ripples.effect().ripples())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(id: &str, group: GroupId) -> Account {
        Account {
            id: id.to_string(),
            name: id.to_string(),
            group,
            balance: dec!(100),
            updated_at: 0,
        }
    }

    #[test]
    fn engine_selection_round_trip_without_host_callbacks() {
        let mut engine = RadialEngine::new(None, true).expect("test: default config");
        engine.grouped = group_accounts(
            &[account("cash", GroupId::Liquid), account("fund", GroupId::Invest)],
            &default_groups(),
        );

        engine.click_segment("invest").expect("test: known group");
        assert_eq!(engine.chart.selection().selected_group_id, Some(GroupId::Invest));

        engine.click_petal("cash").expect("test: known petal");
        assert_eq!(engine.chart.selection().selected_account_id.as_deref(), Some("cash"));
        assert_eq!(engine.chart.selection().selected_group_id, Some(GroupId::Liquid));

        engine.clear_selection();
        assert_eq!(engine.chart.selection(), &SelectionState::default());
    }

    #[test]
    fn ring_callback_is_optional() {
        let mut rings = RingRipples::new(None).expect("test: default config");
        let token = rings
            .ripples
            .activate(&[BubbleSnapshot {
                x: 50.0,
                y: 50.0,
                radius: 20.0,
            }])
            .expect("test: first activation");
        let mut next = Some(token.0 as f64);
        let mut now = 0.0;
        while let Some(token) = next {
            next = rings.frame(token, now);
            now += 100.0;
        }
        assert!(rings.is_finished());
    }
}
