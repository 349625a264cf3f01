use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CameraControlsProps {
    pub on_zoom_in: Callback<()>,
    pub on_zoom_out: Callback<()>,
    pub on_pan_left: Callback<()>,
    pub on_pan_right: Callback<()>,
    pub on_pan_up: Callback<()>,
    pub on_pan_down: Callback<()>,
    /// Recenter on the sketch contents (home position when empty).
    pub on_center: Callback<()>,
}

fn nudge(cb: &Callback<()>, glyph: &str, hint: &str) -> Html {
    let onclick = {
        let cb = cb.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };
    html! {
        <button {onclick} title={hint.to_string()}
            style="width:26px; height:26px; padding:0; background:#21262d; color:#c9d1d9; border:1px solid #30363d; border-radius:4px; cursor:pointer;">
            { glyph }
        </button>
    }
}

/// Pointer-free camera nudges, arranged as a d-pad with the zoom pair on
/// the side. Mirrors what the wheel and drag gestures already do.
#[function_component(CameraControls)]
pub fn camera_controls(props: &CameraControlsProps) -> Html {
    let spacer = || html! { <span style="width:26px; height:26px;"></span> };
    html! {<div style="position:absolute; left:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; display:flex; gap:10px; align-items:center;">
        <div style="display:flex; flex-direction:column; gap:3px;">
            { nudge(&props.on_zoom_in, "+", "Zoom in (or scroll up)") }
            { nudge(&props.on_zoom_out, "−", "Zoom out (or scroll down)") }
        </div>
        <div style="display:grid; grid-template-columns:repeat(3, 26px); gap:3px;">
            { spacer() }
            { nudge(&props.on_pan_up, "↑", "Pan north (or drag the map)") }
            { spacer() }
            { nudge(&props.on_pan_left, "←", "Pan west") }
            { nudge(&props.on_center, "⌖", "Recenter on the sketch") }
            { nudge(&props.on_pan_right, "→", "Pan east") }
            { spacer() }
            { nudge(&props.on_pan_down, "↓", "Pan south") }
            { spacer() }
        </div>
    </div>}
}
