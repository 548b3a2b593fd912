//! Toast host for mutation and session notices.

use crate::core::store::{NoticeKind, Toast};
use gloo::timers::callback::Timeout;
use yew::prelude::*;

const TOAST_LIFETIME_MS: u32 = 4000;

#[derive(Properties, PartialEq)]
pub(crate) struct ToastHostProps {
    pub toasts: Vec<Toast>,
    pub on_dismiss: Callback<u64>,
    #[prop_or_default]
    pub class: Classes,
}

#[function_component(ToastHost)]
pub(crate) fn toast_host(props: &ToastHostProps) -> Html {
    {
        let toasts = props.toasts.clone();
        let on_dismiss = props.on_dismiss.clone();
        use_effect_with_deps(
            move |list: &Vec<Toast>| {
                let handles: Vec<Timeout> = list
                    .iter()
                    .map(|toast| {
                        let on_dismiss = on_dismiss.clone();
                        let id = toast.id;
                        Timeout::new(TOAST_LIFETIME_MS, move || on_dismiss.emit(id))
                    })
                    .collect();
                move || drop(handles)
            },
            toasts,
        );
    }

    html! {
        <div class={classes!("toast-host", props.class.clone())} aria-live="polite" aria-atomic="true">
            {for props.toasts.iter().map(|toast| render_toast(toast, &props.on_dismiss))}
        </div>
    }
}

fn render_toast(toast: &Toast, on_dismiss: &Callback<u64>) -> Html {
    let (class, role) = match toast.kind {
        NoticeKind::Info => ("info", "status"),
        NoticeKind::Success => ("success", "status"),
        NoticeKind::Error => ("error", "alert"),
    };
    let id = toast.id;
    let on_close = on_dismiss.reform(move |_: MouseEvent| id);

    html! {
        <div class={classes!("toast", class)} {role}>
            <span>{toast.message.clone()}</span>
            <button class="ghost" aria-label="Dismiss" onclick={on_close}>{"✕"}</button>
        </div>
    }
}
