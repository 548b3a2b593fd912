//! Managed collection screen.
//!
//! # Design
//! - `CollectionViewState` lives in a `use_mut_ref`; async work mutates it and
//!   forces a redraw instead of threading snapshots through `use_state`.
//! - Every fetch goes through `Loader::load`, which stamps a request sequence,
//!   serves cached rows first and lets the state machine drop answers that are
//!   no longer the newest.

use crate::app::{ApiCtx, sign_out};
use crate::components::empty_state::{EmptyState, PanelTone};
use crate::components::mutation_dialog::MutationDialog;
use crate::components::pagination::Pagination;
use crate::components::search_input::SearchInput;
use crate::config::ConsoleConfig;
use crate::core::cache::CacheRead;
use crate::core::descriptor::{ALL_FILTER, QueryDescriptor};
use crate::core::session::SessionContext;
use crate::core::store::{AppStore, Notice};
use crate::features::collections::actions::{MutationForm, MutationOp, PendingMutation};
use crate::features::collections::catalog::{
    CollectionDef, CollectionKind, Column, allowed_mutations, initials,
};
use crate::features::collections::dispatch::{dispatch, settle};
use crate::features::collections::state::{
    ApplyOutcome, CollectionViewState, EmptyKind, RequestSeq, ViewPhase,
};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use warden_api_models::{EntityStatus, ManagedEntity};
use yew::platform::spawn_local;
use yew::prelude::*;
use yewdux::prelude::Dispatch;

const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

#[derive(Properties, PartialEq)]
pub(crate) struct CollectionViewProps {
    pub kind: CollectionKind,
    pub session: Rc<SessionContext>,
}

/// Everything async work needs to reach back into the view.
#[derive(Clone)]
struct Loader {
    ctx: ApiCtx,
    session: Rc<SessionContext>,
    state: Rc<RefCell<CollectionViewState>>,
    redraw: UseForceUpdateHandle,
}

impl Loader {
    fn def(&self) -> &'static CollectionDef {
        self.state.borrow().def()
    }

    fn load(&self, descriptor: QueryDescriptor) {
        let def = self.def();
        let seq = self.state.borrow_mut().issue_request();
        match self.ctx.client.read_cached(def, &descriptor) {
            CacheRead::Fresh(page) => {
                let outcome = self.state.borrow_mut().apply_page(&descriptor, seq, page);
                self.redraw.force_update();
                if let ApplyOutcome::Clamped(next) = outcome {
                    self.load(next);
                }
                return;
            }
            CacheRead::Stale(page) => self.state.borrow_mut().show_cached(&descriptor, page, true),
            CacheRead::Miss => {}
        }
        self.redraw.force_update();
        let loader = self.clone();
        spawn_local(async move { loader.fetch(descriptor, seq).await });
    }

    async fn fetch(self, descriptor: QueryDescriptor, seq: RequestSeq) {
        let def = self.def();
        let result = self.ctx.client.refetch(&self.session, def, &descriptor).await;
        let outcome = match result {
            Ok(page) => self.state.borrow_mut().apply_page(&descriptor, seq, page),
            Err(err) if err.is_unauthorized() => {
                sign_out(&self.ctx, Some(Notice::error(SESSION_EXPIRED)));
                return;
            }
            Err(err) => self
                .state
                .borrow_mut()
                .apply_error(&descriptor, seq, &err.display_message()),
        };
        if outcome == ApplyOutcome::Discarded {
            tracing::debug!(collection = def.tag, page = descriptor.page, "discarded stale response");
        }
        self.redraw.force_update();
        if let ApplyOutcome::Clamped(next) = outcome {
            self.load(next);
        }
    }

    fn load_if(&self, descriptor: Option<QueryDescriptor>) {
        match descriptor {
            Some(descriptor) => self.load(descriptor),
            None => self.redraw.force_update(),
        }
    }

    fn run_mutation(&self, mut pending: PendingMutation) {
        let claimed = self
            .state
            .borrow_mut()
            .begin_mutation(pending.op(), pending.target_id());
        if !claimed {
            return;
        }
        self.redraw.force_update();
        let loader = self.clone();
        spawn_local(async move {
            let def = loader.def();
            let report = dispatch(&*loader.ctx.client, &loader.session, def, &mut pending).await;
            let next = settle(&mut loader.state.borrow_mut(), &pending, &report);
            let notice = report.notice.clone();
            Dispatch::<AppStore>::new().reduce_mut(|store| {
                store.push_notice(notice);
            });
            loader.redraw.force_update();
            if report.end_session {
                let ctx = loader.ctx.clone();
                let delay = ctx.config.session_teardown_ms;
                Timeout::new(delay, move || sign_out(&ctx, None)).forget();
                return;
            }
            if let Some(next) = next {
                loader.load(next);
            }
        });
    }
}

fn select_value(event: &Event) -> Option<String> {
    event
        .target_dyn_into::<web_sys::HtmlSelectElement>()
        .map(|select| select.value())
}

#[function_component(CollectionView)]
pub(crate) fn collection_view(props: &CollectionViewProps) -> Html {
    let ctx = use_context::<ApiCtx>();
    let defaults = ConsoleConfig::default();
    let (page_size, debounce_ms) = ctx.as_ref().map_or(
        (defaults.page_size, defaults.search_debounce_ms),
        |ctx| (ctx.config.page_size, ctx.config.search_debounce_ms),
    );
    let state = use_mut_ref(|| CollectionViewState::new(props.kind, page_size, debounce_ms));
    let redraw = use_force_update();
    let search_timer = use_mut_ref(|| None as Option<Timeout>);
    let dialog = use_state(|| None as Option<MutationForm>);
    let dialog_error = use_state(|| None as Option<String>);

    let loader = ctx.map(|ctx| Loader {
        ctx,
        session: props.session.clone(),
        state: state.clone(),
        redraw: redraw.clone(),
    });

    {
        let loader = loader.clone();
        use_effect_with_deps(
            move |_| {
                if let Some(loader) = loader {
                    let descriptor = loader.state.borrow().descriptor();
                    loader.load(descriptor);
                }
                || ()
            },
            (),
        );
    }

    let Some(loader) = loader else {
        return html! {
            <EmptyState
                title="The console is not configured"
                description="The API client is unavailable; reload the page."
                tone={PanelTone::Failed}
            />
        };
    };

    let on_search_input = {
        let loader = loader.clone();
        let search_timer = search_timer.clone();
        Callback::from(move |raw: String| {
            let (ticket, settle_ms) = {
                let mut view = loader.state.borrow_mut();
                (view.search_input(&raw), view.search.settle_ms())
            };
            loader.redraw.force_update();
            let loader = loader.clone();
            *search_timer.borrow_mut() = Some(Timeout::new(settle_ms, move || {
                let next = loader.state.borrow_mut().search_settled(ticket);
                loader.load_if(next);
            }));
        })
    };

    let on_search_clear = {
        let loader = loader.clone();
        let search_timer = search_timer.clone();
        Callback::from(move |()| {
            search_timer.borrow_mut().take();
            let next = loader.state.borrow_mut().clear_search();
            loader.load_if(next);
        })
    };

    let on_status = {
        let loader = loader.clone();
        Callback::from(move |event: Event| {
            if let Some(value) = select_value(&event) {
                let next = loader.state.borrow_mut().set_status_filter(&value);
                loader.load_if(next);
            }
        })
    };

    let on_category = {
        let loader = loader.clone();
        Callback::from(move |event: Event| {
            if let Some(value) = select_value(&event) {
                let next = loader.state.borrow_mut().set_category_filter(&value);
                loader.load_if(next);
            }
        })
    };

    let on_reset = {
        let loader = loader.clone();
        let search_timer = search_timer.clone();
        Callback::from(move |_: MouseEvent| {
            search_timer.borrow_mut().take();
            let next = loader.state.borrow_mut().reset_filters();
            loader.load_if(next);
        })
    };

    let on_page = {
        let loader = loader.clone();
        Callback::from(move |page: u32| {
            let next = loader.state.borrow_mut().set_page(page);
            loader.load_if(next);
        })
    };

    let on_retry = {
        let loader = loader.clone();
        Callback::from(move |_: MouseEvent| {
            let next = loader.state.borrow_mut().retry();
            loader.load(next);
        })
    };

    let open_dialog = {
        let dialog = dialog.clone();
        let dialog_error = dialog_error.clone();
        Callback::from(move |(op, target): (MutationOp, Option<ManagedEntity>)| {
            dialog_error.set(None);
            dialog.set(Some(MutationForm::open(op, target.as_ref())));
        })
    };

    let on_dialog_change = {
        let dialog = dialog.clone();
        Callback::from(move |form: MutationForm| dialog.set(Some(form)))
    };

    let on_dialog_cancel = {
        let dialog = dialog.clone();
        let dialog_error = dialog_error.clone();
        Callback::from(move |()| {
            dialog_error.set(None);
            dialog.set(None);
        })
    };

    let on_dialog_submit = {
        let loader = loader.clone();
        let dialog = dialog.clone();
        let dialog_error = dialog_error.clone();
        Callback::from(move |()| {
            let Some(form) = (*dialog).clone() else {
                return;
            };
            match form.validate(loader.def()) {
                Ok(pending) => {
                    dialog_error.set(None);
                    dialog.set(None);
                    loader.run_mutation(pending);
                }
                Err(err) => dialog_error.set(Some(err.to_string())),
            }
        })
    };

    let view = state.borrow();
    let def = view.def();
    let allowed = allowed_mutations(props.session.role, props.kind);
    let config = loader.ctx.config.clone();

    let toolbar = html! {
        <div class="toolbar">
            <SearchInput
                value={AttrValue::from(view.search.raw().to_string())}
                placeholder={AttrValue::from(format!("Search {}", def.title.to_lowercase()))}
                pending={view.search.is_pending()}
                on_input={on_search_input}
                on_clear={on_search_clear}
            />
            <select aria-label="Status" onchange={on_status}>
                <option value={ALL_FILTER} selected={view.query.status == ALL_FILTER}>{"All statuses"}</option>
                {for def.status_filters.iter().map(|status| html! {
                    <option value={status.as_str()} selected={view.query.status == status.as_str()}>{status.as_str()}</option>
                })}
            </select>
            {def.category.map(|category| html! {
                <select aria-label={category.label} onchange={on_category}>
                    <option value={ALL_FILTER} selected={view.query.category == ALL_FILTER}>{format!("All {}s", category.label.to_lowercase())}</option>
                    {for category.options.iter().map(|option| html! {
                        <option value={*option} selected={view.query.category == *option}>{*option}</option>
                    })}
                </select>
            }).unwrap_or_default()}
            {if view.query.has_search() || view.query.has_filters() {
                html! { <button class="ghost" onclick={on_reset.clone()}>{"Reset filters"}</button> }
            } else {
                html! {}
            }}
            {if allowed.contains(&MutationOp::Create) {
                let open = open_dialog.reform(|_: MouseEvent| (MutationOp::Create, None));
                html! {
                    <button class="solid" disabled={view.is_creating()} onclick={open}>
                        {format!("New {}", def.singular)}
                    </button>
                }
            } else {
                html! {}
            }}
        </div>
    };

    let body = match &view.phase {
        ViewPhase::Loading => html! {
            <div class="loading" role="status">{format!("Loading {}…", def.title.to_lowercase())}</div>
        },
        ViewPhase::Error(message) => html! {
            <EmptyState
                title={format!("Could not load {}", def.items_key)}
                description={message.clone()}
                tone={PanelTone::Failed}
            >
                <button class="solid" onclick={on_retry}>{"Retry"}</button>
            </EmptyState>
        },
        ViewPhase::Ready(page) => match view.empty_kind() {
            Some(kind) => {
                let (title, description) = kind.copy(def, &view.query.search);
                let tone = if kind == EmptyKind::Empty {
                    PanelTone::Neutral
                } else {
                    PanelTone::Filtered
                };
                html! {
                    <EmptyState {title} {description} {tone}>
                        {kind.escape_label().map(|label| html! {
                            <button class="ghost" onclick={on_reset.clone()}>{label}</button>
                        }).unwrap_or_default()}
                    </EmptyState>
                }
            }
            None => {
                let summary = format!(
                    "Showing {}–{} of {}",
                    page.first_row(),
                    page.last_row(),
                    page.total_items
                );
                html! {
                    <>
                        <table class={classes!("table", view.refreshing.then_some("refreshing"))}>
                            <thead>
                                <tr>{for def.columns.iter().map(|column| html! { <th>{column.label()}</th> })}</tr>
                            </thead>
                            <tbody>
                                {for page.items.iter().enumerate().map(|(index, entity)| {
                                    let busy = view.is_busy(&entity.id);
                                    let key = if entity.has_id() {
                                        entity.id.as_str().to_string()
                                    } else {
                                        format!("row-{index}")
                                    };
                                    html! {
                                        <tr key={key} class={classes!(busy.then_some("busy"))}>
                                            {for def.columns.iter().map(|column| {
                                                render_cell(*column, entity, &config, allowed, busy, &open_dialog)
                                            })}
                                        </tr>
                                    }
                                })}
                            </tbody>
                        </table>
                        <Pagination
                            current={view.query.page}
                            slots={view.page_window()}
                            has_prev={page.has_prev}
                            has_next={page.has_next}
                            summary={AttrValue::from(summary)}
                            on_change={on_page}
                        />
                    </>
                }
            }
        },
    };

    let dialog_html = (*dialog).clone().map_or_else(
        || html! {},
        |form| {
            html! {
                <MutationDialog
                    {form}
                    {def}
                    error={(*dialog_error).clone().map(AttrValue::from)}
                    on_change={on_dialog_change}
                    on_submit={on_dialog_submit}
                    on_cancel={on_dialog_cancel}
                />
            }
        },
    );

    html! {
        <section class="collection-view">
            <header class="page-header">
                <h2>{def.title}</h2>
                {if view.refreshing {
                    html! { <span class="muted" role="status">{"Refreshing…"}</span> }
                } else {
                    html! {}
                }}
            </header>
            {toolbar}
            {body}
            {dialog_html}
        </section>
    }
}

fn render_cell(
    column: Column,
    entity: &ManagedEntity,
    config: &ConsoleConfig,
    allowed: &[MutationOp],
    busy: bool,
    open_dialog: &Callback<(MutationOp, Option<ManagedEntity>)>,
) -> Html {
    let dash = || "—".to_string();
    match column {
        Column::Identity => {
            let avatar = entity.profile_image.as_deref().map_or_else(
                || html! { <span class="avatar placeholder" aria-hidden="true">{initials(&entity.name)}</span> },
                |file| html! { <img class="avatar" src={config.upload_url(file)} alt="" /> },
            );
            html! { <td class="identity">{avatar}<span>{entity.name.clone()}</span></td> }
        }
        Column::Email => html! { <td>{entity.email.clone()}</td> },
        Column::Phone => html! { <td>{entity.phone.clone().unwrap_or_else(dash)}</td> },
        Column::Category => html! { <td>{entity.category.clone().unwrap_or_else(dash)}</td> },
        Column::Status => {
            let label = entity.status.as_str();
            html! { <td><span class={classes!("badge", label.to_lowercase())}>{label}</span></td> }
        }
        Column::Joined => html! {
            <td>{entity.created_at.map_or_else(dash, |at| at.format("%b %d, %Y").to_string())}</td>
        },
        Column::Actions => {
            let toggle = if entity.status == EntityStatus::Banned {
                MutationOp::Unban
            } else {
                MutationOp::Ban
            };
            let ops = [MutationOp::Update, toggle, MutationOp::Delete];
            html! {
                <td class="actions">
                    {for ops.into_iter().filter(|op| allowed.contains(op)).map(|op| {
                        let target = entity.clone();
                        let onclick = open_dialog.reform(move |_: MouseEvent| (op, Some(target.clone())));
                        html! {
                            <button
                                class={classes!("ghost", op.is_destructive().then_some("danger"))}
                                disabled={busy || !entity.has_id()}
                                {onclick}
                            >
                                {op.label()}
                            </button>
                        }
                    })}
                </td>
            }
        }
    }
}
