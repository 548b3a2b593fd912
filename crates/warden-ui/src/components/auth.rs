//! Login and forgot-password screens.
//!
//! # Design
//! - Input rules live in `core`; these components only collect text and call
//!   the auth endpoints.
//! - A successful login writes the session to storage and the store; routing
//!   reacts to the store.

use crate::app::{ApiCtx, Route, home_route, persist_session};
use crate::core::password_reset::{PasswordResetFlow, ResetError, ResetStep};
use crate::core::store::AppStore;
use crate::services::auth::AuthApi;
use warden_api_models::MessageResponse;
use yew::platform::spawn_local;
use yew::prelude::*;
use yew_router::prelude::{Link, Redirect};
use yewdux::prelude::{Dispatch, use_selector};

fn bind(target: &UseStateHandle<String>) -> Callback<InputEvent> {
    let target = target.clone();
    Callback::from(move |event: InputEvent| {
        if let Some(input) = event.target_dyn_into::<web_sys::HtmlInputElement>() {
            target.set(input.value());
        }
    })
}

fn error_line(error: &Option<String>) -> Html {
    error.as_ref().map_or_else(
        || html! {},
        |message| html! { <p class="error-text" role="alert">{message.clone()}</p> },
    )
}

#[function_component(LoginPage)]
pub(crate) fn login_page() -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let signed_in = use_selector(|store: &AppStore| store.session.is_some());
    let email = use_state(String::new);
    let password = use_state(String::new);
    let busy = use_state(|| false);
    let error = use_state(|| None as Option<String>);

    if *signed_in {
        return html! { <Redirect<Route> to={home_route()} /> };
    }

    let onsubmit = {
        let email = email.clone();
        let password = password.clone();
        let busy = busy.clone();
        let error = error.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            if *busy {
                return;
            }
            let Some(ctx) = api_ctx.clone() else {
                return;
            };
            busy.set(true);
            error.set(None);
            let email = (*email).clone();
            let password = (*password).clone();
            let busy = busy.clone();
            let error = error.clone();
            spawn_local(async move {
                match AuthApi::new(ctx.client.transport()).login(&email, &password).await {
                    Ok(session) => {
                        persist_session(&session);
                        Dispatch::<AppStore>::new().reduce_mut(|store| store.session = Some(session));
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "login failed");
                        error.set(Some(err.display_message()));
                    }
                }
                busy.set(false);
            });
        })
    };

    html! {
        <div class="auth-page">
            <form class="card" {onsubmit}>
                <header>
                    <h3>{"Sign in"}</h3>
                    <p class="muted">{"Use your admin, super admin or agent account."}</p>
                </header>
                <label class="stack">
                    <span>{"Email"}</span>
                    <input type="email" autocomplete="username" value={(*email).clone()} oninput={bind(&email)} />
                </label>
                <label class="stack">
                    <span>{"Password"}</span>
                    <input type="password" autocomplete="current-password" value={(*password).clone()} oninput={bind(&password)} />
                </label>
                {error_line(&error)}
                <div class="actions">
                    <Link<Route> to={Route::ForgotPassword} classes="ghost">{"Forgot password?"}</Link<Route>>
                    <button class="solid" type="submit" disabled={*busy}>
                        {if *busy { "Signing in…" } else { "Sign in" }}
                    </button>
                </div>
            </form>
        </div>
    }
}

/// Apply a confirmed transition to the stored flow.
fn advance(
    flow: &UseStateHandle<PasswordResetFlow>,
    step: impl FnOnce(&mut PasswordResetFlow) -> Result<(), ResetError>,
) -> Result<(), ResetError> {
    let mut next = (**flow).clone();
    step(&mut next)?;
    flow.set(next);
    Ok(())
}

#[function_component(ForgotPasswordPage)]
pub(crate) fn forgot_password_page() -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let flow = use_state(PasswordResetFlow::new);
    let email = use_state(String::new);
    let otp = use_state(String::new);
    let new_password = use_state(String::new);
    let confirm_password = use_state(String::new);
    let busy = use_state(|| false);
    let error = use_state(|| None as Option<String>);
    let info = use_state(|| None as Option<String>);

    let onsubmit = {
        let flow = flow.clone();
        let busy = busy.clone();
        let error = error.clone();
        let info = info.clone();
        let email = (*email).clone();
        let otp = (*otp).clone();
        let new_password = (*new_password).clone();
        let confirm_password = (*confirm_password).clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            if *busy {
                return;
            }
            let Some(ctx) = api_ctx.clone() else {
                return;
            };
            let flow = flow.clone();
            let busy = busy.clone();
            let error = error.clone();
            let info = info.clone();
            let finish = move |result: Result<MessageResponse, String>| {
                match result {
                    Ok(ack) => {
                        error.set(None);
                        info.set(ack.message);
                    }
                    Err(message) => error.set(Some(message)),
                }
            };

            let step = flow.step().clone();
            match step {
                ResetStep::EnterEmail => match flow.request_otp(&email) {
                    Ok(request) => {
                        busy.set(true);
                        spawn_local(async move {
                            let api = AuthApi::new(ctx.client.transport());
                            let result = match api.forgot_password(&request).await {
                                Ok(ack) => advance(&flow, |next| next.otp_sent(&request))
                                    .map(|()| ack)
                                    .map_err(|err| err.to_string()),
                                Err(err) => Err(err.display_message()),
                            };
                            busy.set(false);
                            finish(result);
                        });
                    }
                    Err(err) => finish(Err(err.to_string())),
                },
                ResetStep::VerifyOtp { .. } => match flow.request_verify(&otp) {
                    Ok(request) => {
                        busy.set(true);
                        spawn_local(async move {
                            let api = AuthApi::new(ctx.client.transport());
                            let result = match api.verify_otp(&request).await {
                                Ok(ack) => advance(&flow, PasswordResetFlow::otp_verified)
                                    .map(|()| ack)
                                    .map_err(|err| err.to_string()),
                                Err(err) => Err(err.display_message()),
                            };
                            busy.set(false);
                            finish(result);
                        });
                    }
                    Err(err) => finish(Err(err.to_string())),
                },
                ResetStep::ResetPassword { .. } => {
                    match flow.request_reset(&new_password, &confirm_password) {
                        Ok(request) => {
                            busy.set(true);
                            spawn_local(async move {
                                let api = AuthApi::new(ctx.client.transport());
                                let result = match api.reset_password(&request).await {
                                    Ok(ack) => advance(&flow, PasswordResetFlow::password_reset)
                                        .map(|()| ack)
                                        .map_err(|err| err.to_string()),
                                    Err(err) => Err(err.display_message()),
                                };
                                busy.set(false);
                                finish(result);
                            });
                        }
                        Err(err) => finish(Err(err.to_string())),
                    }
                }
                ResetStep::Completed => {}
            }
        })
    };

    let restart = {
        let flow = flow.clone();
        let error = error.clone();
        let info = info.clone();
        let otp = otp.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*flow).clone();
            next.restart();
            flow.set(next);
            otp.set(String::new());
            error.set(None);
            info.set(None);
        })
    };

    let (title, fields, submit_label) = match flow.step() {
        ResetStep::EnterEmail => (
            "Forgot password",
            html! {
                <label class="stack">
                    <span>{"Email"}</span>
                    <input type="email" value={(*email).clone()} oninput={bind(&email)} />
                </label>
            },
            "Send code",
        ),
        ResetStep::VerifyOtp { email } => (
            "Enter code",
            html! {
                <>
                    <p class="muted">{format!("We sent a code to {email}.")}</p>
                    <label class="stack">
                        <span>{"Code"}</span>
                        <input inputmode="numeric" autocomplete="one-time-code" value={(*otp).clone()} oninput={bind(&otp)} />
                    </label>
                    <button type="button" class="ghost" onclick={restart.clone()}>{"Use a different email"}</button>
                </>
            },
            "Verify code",
        ),
        ResetStep::ResetPassword { .. } => (
            "Choose a new password",
            html! {
                <>
                    <label class="stack">
                        <span>{"New password"}</span>
                        <input type="password" autocomplete="new-password" value={(*new_password).clone()} oninput={bind(&new_password)} />
                    </label>
                    <label class="stack">
                        <span>{"Confirm password"}</span>
                        <input type="password" autocomplete="new-password" value={(*confirm_password).clone()} oninput={bind(&confirm_password)} />
                    </label>
                </>
            },
            "Reset password",
        ),
        ResetStep::Completed => (
            "Password changed",
            html! { <p class="muted">{"You can now sign in with your new password."}</p> },
            "",
        ),
    };
    let completed = *flow.step() == ResetStep::Completed;

    html! {
        <div class="auth-page">
            <form class="card" {onsubmit}>
                <header><h3>{title}</h3></header>
                {fields}
                {(*info).as_ref().map(|message| html! { <p class="muted" role="status">{message.clone()}</p> }).unwrap_or_default()}
                {error_line(&error)}
                <div class="actions">
                    <Link<Route> to={Route::Login} classes="ghost">{"Back to sign in"}</Link<Route>>
                    {if completed {
                        html! {}
                    } else {
                        html! { <button class="solid" type="submit" disabled={*busy}>{submit_label}</button> }
                    }}
                </div>
            </form>
        </div>
    }
}
