use js_sys::Reflect;
use wasm_bindgen::JsValue;
use web_sys::{Event, Performance};

use kaiten_core::{LaunchParams, NavigationKind, PageShowSignal};

pub(crate) fn launch_params() -> LaunchParams {
    let search = web_sys::window()
        .and_then(|window| window.location().search().ok())
        .unwrap_or_default();
    LaunchParams::from_query(&search)
}

pub(crate) fn navigation_kind() -> NavigationKind {
    let Some(performance) = web_sys::window().and_then(|window| window.performance()) else {
        return NavigationKind::Other;
    };
    let entry = performance.get_entries_by_type("navigation").get(0);
    if !entry.is_undefined() {
        if let Some(kind) = reflect_string(&entry, "type") {
            return NavigationKind::from_entry_type(&kind);
        }
    }
    legacy_navigation_kind(&performance)
}

fn legacy_navigation_kind(performance: &Performance) -> NavigationKind {
    let code = Reflect::get(performance.as_ref(), &JsValue::from_str("navigation"))
        .ok()
        .filter(|navigation| navigation.is_object())
        .and_then(|navigation| Reflect::get(&navigation, &JsValue::from_str("type")).ok())
        .and_then(|value| value.as_f64());
    match code.map(|code| code as u32) {
        Some(0) => NavigationKind::Navigate,
        Some(1) => NavigationKind::Reload,
        Some(2) => NavigationKind::BackForward,
        _ => NavigationKind::Other,
    }
}

pub(crate) fn page_show_signal(event: &Event) -> PageShowSignal {
    let persisted = Reflect::get(event.as_ref(), &JsValue::from_str("persisted"))
        .ok()
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    PageShowSignal::page_show(navigation_kind(), persisted)
}

pub(crate) fn navigate_to(target: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(err) = window.location().assign(target) {
        gloo::console::warn!("router: navigation failed", err);
    }
}

fn reflect_string(target: &JsValue, key: &str) -> Option<String> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|value| value.as_string())
}
