use crate::app::{ApiCtx, Route, sign_out};
use crate::core::session::SessionContext;
use crate::features::collections::catalog::{CollectionKind, accessible_collections, initials};
use yew::prelude::*;
use yew_router::prelude::Link;

#[derive(Properties, PartialEq)]
pub(crate) struct ShellProps {
    pub children: Children,
    pub session: SessionContext,
    pub active: CollectionKind,
}

#[function_component(AppShell)]
pub(crate) fn app_shell(props: &ShellProps) -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let nav_open = use_state(|| false);
    let toggle_nav = {
        let nav_open = nav_open.clone();
        Callback::from(move |_| nav_open.set(!*nav_open))
    };
    let logout = Callback::from(move |_: MouseEvent| {
        if let Some(ctx) = &api_ctx {
            sign_out(ctx, None);
        }
    });

    let session = &props.session;
    let display_name = if session.name.trim().is_empty() {
        session.role.label().to_string()
    } else {
        session.name.clone()
    };

    html! {
        <div class="app-shell">
            <aside class={classes!("sidebar", if *nav_open { "open" } else { "closed" })}>
                <div class="brand">
                    <button class="ghost mobile-only" onclick={toggle_nav.clone()} aria-label="Close navigation">{"✕"}</button>
                    <strong>{"Warden"}</strong>
                    <span class="muted">{session.role.label()}</span>
                </div>
                <nav>
                    {for accessible_collections(session.role).iter().map(|kind| nav_item(*kind, props.active))}
                </nav>
            </aside>
            <div class="main">
                <header class="topbar">
                    <button class="ghost mobile-only" aria-label="Open navigation" onclick={toggle_nav}>{"☰"}</button>
                    <div class="top-actions">
                        <span class="avatar placeholder" aria-hidden="true">{initials(&display_name)}</span>
                        <span>{display_name}</span>
                        <button class="ghost" onclick={logout}>{"Log out"}</button>
                    </div>
                </header>
                <main>
                    {for props.children.iter()}
                </main>
            </div>
        </div>
    }
}

fn nav_item(kind: CollectionKind, active: CollectionKind) -> Html {
    let classes = classes!("nav-item", (active == kind).then_some("active"));
    html! {
        <Link<Route> to={Route::collection(kind)} {classes}>{kind.def().title}</Link<Route>>
    }
}
