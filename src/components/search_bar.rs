use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct SearchBarProps {
    pub on_search: Callback<String>,
    /// Non-blocking notice from the last lookup (no match / failure).
    pub notice: Option<String>,
}

#[function_component]
pub fn SearchBar(props: &SearchBarProps) -> Html {
    let input_ref = use_node_ref();

    let submit = {
        let input_ref = input_ref.clone();
        let on_search = props.on_search.clone();
        Callback::from(move |_| {
            if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                let q = input.value();
                if !q.trim().is_empty() {
                    on_search.emit(q);
                }
            }
        })
    };
    let search_click = {
        let submit = submit.clone();
        Callback::from(move |_: MouseEvent| submit.emit(()))
    };
    let on_keydown = {
        let submit = submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.code() == "Enter" {
                submit.emit(());
            }
        })
    };

    html! {<div style="position:absolute; top:12px; left:50%; transform:translateX(-50%); display:flex; flex-direction:column; align-items:center; gap:6px;">
        <div style="background:rgba(22,27,34,0.92); border:1px solid #30363d; border-radius:8px; padding:6px 8px; display:flex; gap:6px;">
            <input ref={input_ref} type="text" placeholder="Address…" onkeydown={on_keydown} style="width:220px;" />
            <button onclick={search_click}>{"Search"}</button>
        </div>
        { if let Some(n) = &props.notice {
            html! { <div style="font-size:12px; background:#1c2128; border:1px solid #f0883e; color:#f0883e; padding:4px 8px; border-radius:6px;">{ n.clone() }</div> }
        } else { html! {} } }
    </div>}
}
