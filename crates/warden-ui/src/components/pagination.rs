//! Numbered pagination with ellipsis gaps.

use crate::core::pagination::PageSlot;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct PaginationProps {
    pub current: u32,
    pub slots: Vec<PageSlot>,
    pub has_prev: bool,
    pub has_next: bool,
    #[prop_or_default]
    pub summary: Option<AttrValue>,
    #[prop_or_default]
    pub disabled: bool,
    pub on_change: Callback<u32>,
}

#[function_component(Pagination)]
pub(crate) fn pagination(props: &PaginationProps) -> Html {
    let current = props.current;
    let go_prev = props
        .on_change
        .reform(move |_: MouseEvent| current.saturating_sub(1).max(1));
    let go_next = props.on_change.reform(move |_: MouseEvent| current + 1);

    html! {
        <nav class="pagination" aria-label="Pagination">
            {props.summary.clone().map(|text| html! { <span class="muted">{text}</span> }).unwrap_or_default()}
            <div class="join">
                <button class="btn join-item" disabled={props.disabled || !props.has_prev} onclick={go_prev}>{"Previous"}</button>
                {for props.slots.iter().map(|slot| match *slot {
                    PageSlot::Page(page) => {
                        let active = page == current;
                        html! {
                            <button
                                class={classes!("btn", "join-item", active.then_some("btn-active"))}
                                aria-current={active.then_some("page")}
                                disabled={props.disabled}
                                onclick={props.on_change.reform(move |_: MouseEvent| page)}
                            >
                                {page}
                            </button>
                        }
                    }
                    PageSlot::Ellipsis => html! { <span class="btn join-item btn-disabled">{"…"}</span> },
                })}
                <button class="btn join-item" disabled={props.disabled || !props.has_next} onclick={go_next}>{"Next"}</button>
            </div>
        </nav>
    }
}
