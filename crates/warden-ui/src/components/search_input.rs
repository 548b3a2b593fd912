//! Search box for collection toolbars.
//!
//! # Design
//! - Purely controlled: the owning view keeps the debounce state and the timer.
//! - Shows a pending hint while typed text has not been committed yet.

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct SearchInputProps {
    pub value: AttrValue,
    #[prop_or_default]
    pub placeholder: Option<AttrValue>,
    #[prop_or_default]
    pub pending: bool,
    #[prop_or_default]
    pub disabled: bool,
    pub on_input: Callback<String>,
    pub on_clear: Callback<()>,
}

#[function_component(SearchInput)]
pub(crate) fn search_input(props: &SearchInputProps) -> Html {
    let oninput = {
        let on_input = props.on_input.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<web_sys::HtmlInputElement>() {
                on_input.emit(input.value());
            }
        })
    };
    let onclear = props.on_clear.reform(|_: MouseEvent| ());
    let has_text = !props.value.is_empty();

    html! {
        <label class={classes!("input", "search", props.pending.then_some("pending"))}>
            <span class="iconify lucide--search size-3.5"></span>
            <input
                type="search"
                placeholder={props.placeholder.clone()}
                aria-label={props.placeholder.clone()}
                value={props.value.clone()}
                disabled={props.disabled}
                {oninput}
            />
            {if has_text {
                html! { <button class="ghost" aria-label="Clear search" onclick={onclear}>{"✕"}</button> }
            } else {
                html! {}
            }}
        </label>
    }
}
