#![forbid(unsafe_code)]

//! `wasm-bindgen` exports. Only compiled on `wasm32` targets.

use js_sys::{Array, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::bridge_core;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn to_js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

#[wasm_bindgen(js_name = getLatinSquareOrder)]
pub fn get_latin_square_order(participant_number: f64) -> Result<Array, JsValue> {
    install_panic_hook();
    let participant = bridge_core::participant_from_f64(participant_number).map_err(to_js_error)?;
    let out = Array::new();
    for name in bridge_core::latin_square_order_names(participant) {
        out.push(&JsValue::from_str(name));
    }
    Ok(out)
}

#[wasm_bindgen(js_name = orderToLabel)]
pub fn order_to_label(order: Array) -> Result<String, JsValue> {
    install_panic_hook();
    let names = order
        .iter()
        .map(|value| {
            value
                .as_string()
                .ok_or_else(|| JsValue::from_str("order entries must be strings"))
        })
        .collect::<Result<Vec<String>, JsValue>>()?;
    bridge_core::order_label(&names).map_err(to_js_error)
}

#[wasm_bindgen(js_name = generateBlockPlan)]
pub fn generate_block_plan(params_json: &str) -> Result<String, JsValue> {
    install_panic_hook();
    bridge_core::block_plan_json(params_json).map_err(to_js_error)
}

#[wasm_bindgen(js_name = generateSessionPlan)]
pub fn generate_session_plan(
    participant_number: f64,
    practice_trials: f64,
    measured_trials: f64,
) -> Result<String, JsValue> {
    install_panic_hook();
    bridge_core::session_plan_json(participant_number, practice_trials, measured_trials)
        .map_err(to_js_error)
}

#[wasm_bindgen(js_name = assertBalancedTargets)]
pub fn assert_balanced_targets(trials_json: &str) -> Result<String, JsValue> {
    install_panic_hook();
    bridge_core::balance_report_json(trials_json).map_err(to_js_error)
}

#[wasm_bindgen(js_name = stimulusCatalog)]
pub fn stimulus_catalog() -> String {
    bridge_core::catalog_value().to_string()
}
