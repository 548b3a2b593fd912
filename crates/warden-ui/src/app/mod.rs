//! Application shell: routing, session guard and shared context.
//!
//! # Design
//! - The persisted session is loaded into the store before the first render so
//!   guarded routes never flash the login screen.
//! - Logout, self-ban teardown and expired tokens all go through `sign_out`.

use crate::components::auth::{ForgotPasswordPage, LoginPage};
use crate::components::empty_state::EmptyState;
use crate::components::shell::AppShell;
use crate::components::toast::ToastHost;
use crate::core::store::{AppStore, Notice};
use crate::features::collections::catalog::{CollectionKind, can_access, landing_collection};
use crate::features::collections::view::CollectionView;
use crate::telemetry;
use gloo_timers::callback::Interval;
use preferences::{clear_session, load_config, load_session};
use std::rc::Rc;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::{Dispatch, use_selector};

pub(crate) use api::ApiCtx;
pub(crate) use preferences::persist_session;
pub(crate) use routes::Route;

mod api;
mod preferences;
mod routes;

const CACHE_SWEEP_MS: u32 = 30_000;

/// Drop the session everywhere it lives and optionally explain why.
pub(crate) fn sign_out(ctx: &ApiCtx, reason: Option<Notice>) {
    clear_session();
    ctx.client.clear_cache();
    Dispatch::<AppStore>::new().reduce_mut(|store| {
        store.end_session();
        if let Some(notice) = reason {
            store.push_notice(notice);
        }
    });
    tracing::info!("session ended");
}

/// Landing route for the signed-in principal, or login.
pub(crate) fn home_route() -> Route {
    Dispatch::<AppStore>::new()
        .get()
        .session
        .as_ref()
        .and_then(|session| landing_collection(session.role))
        .map_or(Route::Login, Route::collection)
}

#[function_component(WardenApp)]
fn warden_app() -> Html {
    let api_ctx = use_memo(|_| ApiCtx::new(load_config()), ());
    let dispatch = Dispatch::<AppStore>::new();
    let toasts = use_selector(|store: &AppStore| store.toasts.clone());

    {
        let client = api_ctx.client.clone();
        use_effect_with_deps(
            move |_| {
                let sweep = Interval::new(CACHE_SWEEP_MS, move || {
                    let evicted = client.evict_expired();
                    if evicted > 0 {
                        tracing::debug!(evicted, "evicted idle cache entries");
                    }
                });
                move || drop(sweep)
            },
            (),
        );
    }

    let dismiss_toast = Callback::from(move |id: u64| dispatch.reduce_mut(|store| store.dismiss(id)));

    html! {
        <ContextProvider<ApiCtx> context={(*api_ctx).clone()}>
            <BrowserRouter>
                <Switch<Route> render={switch} />
                <ToastHost toasts={(*toasts).clone()} on_dismiss={dismiss_toast} />
            </BrowserRouter>
        </ContextProvider<ApiCtx>>
    }
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <Redirect<Route> to={home_route()} /> },
        Route::Login => html! { <LoginPage /> },
        Route::ForgotPassword => html! { <ForgotPasswordPage /> },
        Route::Collection { slug } => html! { <CollectionPage {slug} /> },
        Route::NotFound => html! {
            <EmptyState title="Page not found" description="Use the navigation to return to a managed list.">
                <Link<Route> to={Route::Home} classes="btn">{"Go home"}</Link<Route>>
            </EmptyState>
        },
    }
}

#[derive(Properties, PartialEq)]
struct CollectionPageProps {
    slug: String,
}

#[function_component(CollectionPage)]
fn collection_page(props: &CollectionPageProps) -> Html {
    let session = use_selector(|store: &AppStore| store.session.clone());
    let Some(session) = (*session).clone() else {
        return html! { <Redirect<Route> to={Route::Login} /> };
    };
    let Some(kind) = CollectionKind::from_slug(&props.slug) else {
        return html! { <Redirect<Route> to={Route::NotFound} /> };
    };
    if !can_access(session.role, kind) {
        tracing::warn!(role = session.role.label(), collection = kind.slug(), "route not permitted");
        return html! { <Redirect<Route> to={home_route()} /> };
    }

    html! {
        <AppShell session={session.clone()} active={kind}>
            <CollectionView key={kind.slug()} {kind} session={Rc::new(session)} />
        </AppShell>
    }
}

/// Install logging and mount the console.
pub fn run_app() {
    console_error_panic_hook::set_once();
    let config = load_config();
    if let Err(err) = telemetry::init_logging(config.log_level, telemetry::browser_console) {
        gloo::console::error!(err.to_string());
    }
    let session = load_session();
    Dispatch::<AppStore>::new().reduce_mut(|store| store.session = session);

    if let Some(root) = gloo::utils::document().get_element_by_id("root") {
        yew::Renderer::<WardenApp>::with_root(root).render();
    } else {
        yew::Renderer::<WardenApp>::new().render();
    }
}
