//! Create, edit, ban, unban and delete dialog.

use crate::features::collections::actions::{MutationForm, MutationOp};
use crate::features::collections::catalog::CollectionDef;
use wasm_bindgen::JsCast;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct MutationDialogProps {
    pub form: MutationForm,
    pub def: &'static CollectionDef,
    #[prop_or_default]
    pub error: Option<AttrValue>,
    pub on_change: Callback<MutationForm>,
    pub on_submit: Callback<()>,
    pub on_cancel: Callback<()>,
}

type Setter = fn(&mut MutationForm, String);

fn edit(form: &MutationForm, on_change: &Callback<MutationForm>, set: Setter) -> Callback<Event> {
    let form = form.clone();
    on_change.reform(move |event: Event| {
        let mut next = form.clone();
        let target = event.target();
        let value = target
            .as_ref()
            .and_then(|t| t.dyn_ref::<web_sys::HtmlInputElement>())
            .map(web_sys::HtmlInputElement::value)
            .or_else(|| {
                target
                    .as_ref()
                    .and_then(|t| t.dyn_ref::<web_sys::HtmlSelectElement>())
                    .map(web_sys::HtmlSelectElement::value)
            })
            .or_else(|| {
                target
                    .as_ref()
                    .and_then(|t| t.dyn_ref::<web_sys::HtmlTextAreaElement>())
                    .map(web_sys::HtmlTextAreaElement::value)
            })
            .unwrap_or_default();
        set(&mut next, value);
        next
    })
}

fn text_field(label: &str, kind: &'static str, value: &str, onchange: Callback<Event>) -> Html {
    html! {
        <label class="stack">
            <span>{label.to_string()}</span>
            <input type={kind} value={value.to_string()} {onchange} />
        </label>
    }
}

#[function_component(MutationDialog)]
pub(crate) fn mutation_dialog(props: &MutationDialogProps) -> Html {
    let form = &props.form;
    let def = props.def;
    let target_name = form
        .target
        .as_ref()
        .map(|entity| entity.name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("this {}", def.singular));

    let title = match form.op {
        MutationOp::Create => format!("New {}", def.singular),
        MutationOp::Update => format!("Edit {target_name}"),
        MutationOp::Ban => format!("Ban {target_name}"),
        MutationOp::Unban => format!("Unban {target_name}"),
        MutationOp::Delete => format!("Delete {target_name}"),
    };

    let profile_fields = || {
        html! {
            <>
                {text_field("Name", "text", &form.name, edit(form, &props.on_change, |f, v| f.name = v))}
                {text_field("Email", "email", &form.email, edit(form, &props.on_change, |f, v| f.email = v))}
                {text_field("Phone", "tel", &form.phone, edit(form, &props.on_change, |f, v| f.phone = v))}
                {def.category.map(|category| html! {
                    <label class="stack">
                        <span>{category.label}</span>
                        <select onchange={edit(form, &props.on_change, |f, v| f.category = v)}>
                            <option value="" selected={form.category.is_empty()}>{format!("Select {}", category.label.to_lowercase())}</option>
                            {for category.options.iter().map(|option| html! {
                                <option value={*option} selected={form.category == *option}>{*option}</option>
                            })}
                        </select>
                    </label>
                }).unwrap_or_default()}
            </>
        }
    };

    let body = match form.op {
        MutationOp::Create => html! {
            <>
                {profile_fields()}
                {text_field("Password", "password", &form.password, edit(form, &props.on_change, |f, v| f.password = v))}
            </>
        },
        MutationOp::Update => profile_fields(),
        MutationOp::Ban => html! {
            <label class="stack">
                <span>{"Reason"}</span>
                <textarea
                    placeholder={def.default_ban_reason}
                    value={form.reason.clone()}
                    onchange={edit(form, &props.on_change, |f, v| f.reason = v)}
                />
            </label>
        },
        MutationOp::Unban => html! {
            <p>{format!("{target_name} will be able to sign in again.")}</p>
        },
        MutationOp::Delete => html! {
            <p>{format!("Delete {target_name}? This cannot be undone.")}</p>
        },
    };

    let submit_class = if form.op.is_destructive() { "danger" } else { "solid" };
    let onsubmit = props.on_submit.reform(|event: SubmitEvent| event.prevent_default());
    let oncancel = props.on_cancel.reform(|_: MouseEvent| ());

    html! {
        <div class="modal-backdrop" role="dialog" aria-modal="true">
            <form class="card modal" {onsubmit}>
                <header><h3>{title}</h3></header>
                {body}
                {props.error.clone().map(|message| html! {
                    <p class="error-text" role="alert">{message}</p>
                }).unwrap_or_default()}
                <div class="actions">
                    <button type="button" class="ghost" onclick={oncancel}>{"Cancel"}</button>
                    <button type="submit" class={submit_class}>{form.op.label()}</button>
                </div>
            </form>
        </div>
    }
}
