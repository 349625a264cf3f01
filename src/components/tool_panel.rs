use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::model::{SketchAction, SketchState, ToolMode, UnitCategory, ZoneCategory};

#[derive(Properties, PartialEq, Clone)]
pub struct ToolPanelProps {
    pub sketch: UseReducerHandle<SketchState>,
}

fn tool_button(
    sketch: &UseReducerHandle<SketchState>,
    current: ToolMode,
    mode: ToolMode,
    label: &str,
    color: Option<&'static str>,
) -> Html {
    let onclick = {
        let sketch = sketch.clone();
        Callback::from(move |_: MouseEvent| {
            // Re-clicking the active tool drops back to idle.
            let next = if sketch.tool == mode { ToolMode::Idle } else { mode };
            sketch.dispatch(SketchAction::SelectTool(next));
        })
    };
    let active = current == mode;
    let border = color.unwrap_or("#30363d");
    let style = format!(
        "border:1px solid {}; border-radius:6px; padding:4px 8px; text-align:left; {}",
        border,
        if active { "background:#1f6feb; color:#fff;" } else { "background:#21262d;" }
    );
    html! { <button {onclick} style={style}>{ label }</button> }
}

#[function_component]
pub fn ToolPanel(props: &ToolPanelProps) -> Html {
    let sketch = &props.sketch;
    let tool = sketch.tool;

    let radius_input = |category: ZoneCategory| -> Html {
        let value = sketch.zone_radius_m[category.index()];
        let oninput = {
            let sketch = sketch.clone();
            Callback::from(move |e: InputEvent| {
                let raw = e.target_unchecked_into::<HtmlInputElement>().value();
                if let Ok(radius_m) = raw.parse::<f64>() {
                    sketch.dispatch(SketchAction::SetToolRadius { category, radius_m });
                }
            })
        };
        html! {
            <div style="display:flex; align-items:center; gap:6px;">
                <span style={format!("display:inline-block; width:10px; height:10px; border-radius:50%; background:{};", category.color())}></span>
                <span style="flex:1; font-size:12px;">{ category.label() }</span>
                <input type="number" min="10" max="500" step="5" value={format!("{}", value)}
                    {oninput} style="width:60px;" />
                <span style="font-size:11px; opacity:0.7;">{"m"}</span>
            </div>
        }
    };

    let unit_label_input = {
        let sketch = sketch.clone();
        Callback::from(move |e: InputEvent| {
            let v = e.target_unchecked_into::<HtmlInputElement>().value();
            sketch.dispatch(SketchAction::SetUnitLabel(v));
        })
    };
    let text_input = {
        let sketch = sketch.clone();
        Callback::from(move |e: InputEvent| {
            let v = e.target_unchecked_into::<HtmlInputElement>().value();
            sketch.dispatch(SketchAction::SetTextInput(v));
        })
    };
    let toggle_vertical = {
        let sketch = sketch.clone();
        let vertical = sketch.text_vertical;
        Callback::from(move |_: MouseEvent| {
            sketch.dispatch(SketchAction::SetTextVertical(!vertical));
        })
    };
    let undo_cb = {
        let sketch = sketch.clone();
        Callback::from(move |_: MouseEvent| sketch.dispatch(SketchAction::Undo))
    };
    let clear_cb = {
        let sketch = sketch.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(win) = web_sys::window() {
                if !win
                    .confirm_with_message("Clear the whole sketch?")
                    .unwrap_or(false)
                {
                    return;
                }
            }
            sketch.dispatch(SketchAction::Clear);
        })
    };

    html! {<div style="position:absolute; top:12px; left:12px; background:rgba(22,27,34,0.92); border:1px solid #30363d; border-radius:8px; padding:10px; min-width:230px; display:flex; flex-direction:column; gap:8px; font-size:13px;">
        <div style="font-weight:600;">{"Tools"}</div>
        { tool_button(sketch, tool, ToolMode::PlacingPoint, "+ Point", None) }
        { for ZoneCategory::ALL.iter().map(|c| tool_button(
            sketch, tool, ToolMode::PlacingZone(*c),
            &format!("+ {} zone", c.label()), Some(c.color()))) }
        { for ZoneCategory::ALL.iter().map(|c| radius_input(*c)) }
        <div style="border-top:1px solid #30363d; margin:2px 0;"></div>
        { tool_button(sketch, tool, ToolMode::PlacingUnit, "+ Unit", None) }
        <div style="display:flex; gap:6px;">
            { for UnitCategory::ALL.iter().map(|c| {
                let onclick = {
                    let sketch = sketch.clone();
                    let c = *c;
                    Callback::from(move |_: MouseEvent| sketch.dispatch(SketchAction::SetUnitCategory(c)))
                };
                let ring = if sketch.unit_category == *c { "2px solid #fff" } else { "2px solid transparent" };
                html! { <button {onclick} title={c.label()} style={format!(
                    "width:24px; height:24px; border-radius:50%; background:{}; border:{}; color:#fff; font-size:11px; padding:0;",
                    c.color(), ring)}>{ c.glyph() }</button> }
            }) }
        </div>
        <input type="text" placeholder="Unit label (required)" value={sketch.unit_label.clone()} oninput={unit_label_input} />
        <div style="border-top:1px solid #30363d; margin:2px 0;"></div>
        { tool_button(sketch, tool, ToolMode::PlacingText, "+ Text", None) }
        <input type="text" placeholder="Label text (required)" value={sketch.text_input.clone()} oninput={text_input} />
        <label style="display:flex; align-items:center; gap:8px; cursor:pointer;">
            <input type="checkbox" checked={sketch.text_vertical} onclick={toggle_vertical} />
            <span>{"Vertical"}</span>
        </label>
        <div style="border-top:1px solid #30363d; margin:2px 0;"></div>
        <div style="display:flex; gap:8px;">
            <button onclick={undo_cb} disabled={sketch.history.is_empty()} style="flex:1;">{"Undo"}</button>
            <button onclick={clear_cb} disabled={sketch.element_count() == 0} style="flex:1;">{"Clear"}</button>
        </div>
    </div>}
}
