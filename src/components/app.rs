use yew::prelude::*;

use super::sketch_view::SketchView;
use crate::model::{SketchAction, SketchState, ToolPrefs};

const PREFS_KEY: &str = "cq_tool_prefs";

#[function_component(App)]
pub fn app() -> Html {
    let sketch = use_reducer(SketchState::default);
    let latest_snapshot = use_state(|| None::<String>);
    let export_req = use_state(|| 0u64);

    // Load persisted tool preferences.
    {
        let sketch = sketch.clone();
        use_effect_with((), move |_| {
            if let Some(win) = web_sys::window() {
                if let Ok(Some(store)) = win.local_storage() {
                    if let Ok(Some(raw)) = store.get_item(PREFS_KEY) {
                        if let Ok(prefs) = serde_json::from_str::<ToolPrefs>(&raw) {
                            sketch.dispatch(SketchAction::LoadPrefs(prefs));
                        }
                    }
                }
            }
            || ()
        });
    }
    // Persist preference changes.
    {
        let prefs = sketch.prefs();
        use_effect_with(prefs, move |prefs| {
            if let Some(win) = web_sys::window() {
                if let Ok(Some(store)) = win.local_storage() {
                    if let Ok(s) = serde_json::to_string(prefs) {
                        let _ = store.set_item(PREFS_KEY, &s);
                    }
                }
            }
            || ()
        });
    }

    let on_snapshot = {
        let latest_snapshot = latest_snapshot.clone();
        Callback::from(move |data_url: String| latest_snapshot.set(Some(data_url)))
    };
    let on_capture_now = {
        let export_req = export_req.clone();
        Callback::from(move |_| export_req.set(*export_req + 1))
    };

    let count = sketch.element_count();
    let snapshot_ready = latest_snapshot.is_some();

    html! {
        <div style="display:flex; flex-direction:column; height:100vh; background:#0e1116; color:#c9d1d9; font-family:sans-serif;">
            <div id="top-bar" style="display:flex; align-items:center; gap:12px; padding:6px 12px; background:#161b22; border-bottom:1px solid #30363d;">
                <span style="font-weight:bold; color:#58a6ff;">{"Croquis"}</span>
                <span style="font-size:12px; color:#8b949e;">{ format!("{} element{}", count, if count == 1 { "" } else { "s" }) }</span>
                <span style="flex:1;"></span>
                <span style={format!("font-size:11px; color:{};", if snapshot_ready { "#2ea043" } else { "#8b949e" })}>
                    { if snapshot_ready { "snapshot ready" } else { "no snapshot yet" } }
                </span>
                { if let Some(url) = &*latest_snapshot {
                    html! { <a href={url.clone()} download="sketch.png"
                        style="font-size:12px; color:#58a6ff; text-decoration:none; border:1px solid #30363d; border-radius:4px; padding:2px 8px;">
                        {"Download"}</a> }
                } else { html! {} } }
                <button onclick={on_capture_now}
                    style="background:#21262d; color:#c9d1d9; border:1px solid #30363d; border-radius:4px; padding:2px 10px; cursor:pointer;">
                    {"Capture"}</button>
            </div>
            <SketchView sketch={sketch} on_snapshot={on_snapshot} export_req={*export_req} />
        </div>
    }
}
