use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::model::Zone;
use crate::util::format_meters;

/// Editor bounds; the zone itself accepts any positive radius, the UI
/// constrains edits to this range.
const RADIUS_MIN: f64 = 10.0;
const RADIUS_MAX: f64 = 500.0;

#[derive(Properties, PartialEq, Clone)]
pub struct RadiusEditorProps {
    pub zone: Zone,
    pub on_radius: Callback<f64>,
    pub on_close: Callback<()>,
}

/// Inline slider + numeric input bound to the selected zone; both controls
/// stay in sync because they render from the same zone state.
#[function_component]
pub fn RadiusEditor(props: &RadiusEditorProps) -> Html {
    let parse_radius = {
        let on_radius = props.on_radius.clone();
        Callback::from(move |e: InputEvent| {
            let raw = e.target_unchecked_into::<HtmlInputElement>().value();
            if let Ok(v) = raw.parse::<f64>() {
                on_radius.emit(v.clamp(RADIUS_MIN, RADIUS_MAX));
            }
        })
    };
    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };
    let value = format!("{}", props.zone.radius_m.round() as i64);

    html! {<div style="position:absolute; bottom:64px; left:50%; transform:translateX(-50%); background:rgba(22,27,34,0.95); border:1px solid #30363d; border-radius:8px; padding:10px 14px; display:flex; align-items:center; gap:10px; font-size:13px;">
        <span style={format!("display:inline-block; width:10px; height:10px; border-radius:50%; background:{};", props.zone.category.color())}></span>
        <span>{ format!("{} zone, {}", props.zone.category.label(), format_meters(props.zone.radius_m)) }</span>
        <input type="range" min="10" max="500" step="5" value={value.clone()} oninput={parse_radius.clone()} style="width:180px;" />
        <input type="number" min="10" max="500" step="5" value={value} oninput={parse_radius} style="width:64px;" />
        <span style="font-size:11px; opacity:0.7;">{"m"}</span>
        <button onclick={close_cb} style="padding:2px 8px;">{"×"}</button>
    </div>}
}
