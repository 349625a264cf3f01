use yew::prelude::*;

use crate::model::{UnitCategory, ZoneCategory};

#[derive(Properties, PartialEq, Clone)]
struct LegendRowProps {
    pub color: &'static str,
    pub label: &'static str,
}

#[function_component(LegendRow)]
fn legend_row(props: &LegendRowProps) -> Html {
    html! {
        <div style="display:flex; align-items:center; gap:8px; margin:3px 0;">
            <span style={format!("display:inline-block; width:12px; height:12px; background:{}; border:1px solid #30363d; border-radius:50%;", props.color)}></span>
            <span>{ props.label }</span>
        </div>
    }
}

#[function_component]
pub fn LegendPanel() -> Html {
    html! {<div style="position:absolute; right:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:150px; font-size:12px;">
        <div style="font-weight:600; margin-bottom:4px;">{"Units"}</div>
        { for UnitCategory::ALL.iter().map(|c| html!{ <LegendRow color={c.color()} label={c.label()} /> }) }
        <div style="font-weight:600; margin:6px 0 4px;">{"Zones"}</div>
        { for ZoneCategory::ALL.iter().map(|c| html!{ <LegendRow color={c.color()} label={c.label()} /> }) }
    </div>}
}
