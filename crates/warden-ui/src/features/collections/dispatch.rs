//! Mutation dispatch: send, report, and decide what the view does next.

use crate::core::descriptor::QueryDescriptor;
use crate::core::session::SessionContext;
use crate::core::store::Notice;
use crate::features::collections::actions::{
    MutationOp, MutationOutcome, MutationPhase, PendingMutation, success_message,
};
use crate::features::collections::catalog::CollectionDef;
use crate::features::collections::state::CollectionViewState;
use crate::services::client::CollectionClient;
use crate::services::transport::Transport;

/// What the caller should do after a mutation settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    /// Toast to show.
    pub notice: Notice,
    /// Whether the list should be refetched.
    pub refetch: bool,
    /// Whether the signed-in principal just banned themselves.
    pub end_session: bool,
}

/// Send `pending`, moving it through its lifecycle, and report the outcome.
pub async fn dispatch<T: Transport>(
    client: &CollectionClient<T>,
    session: &SessionContext,
    def: &CollectionDef,
    pending: &mut PendingMutation,
) -> DispatchReport {
    pending.phase = MutationPhase::InFlight;
    let op = pending.op();
    match client.mutate(session, def, &pending.request).await {
        Ok(MutationOutcome::Applied(_)) => {
            pending.phase = MutationPhase::Succeeded;
            let end_session = op == MutationOp::Ban
                && pending.target_id().is_some_and(|id| session.is_self(id));
            if end_session {
                tracing::info!(collection = def.tag, "signed-in account banned itself");
            }
            DispatchReport {
                notice: Notice::success(success_message(def, op, &pending.target_name)),
                refetch: true,
                end_session,
            }
        }
        Ok(MutationOutcome::AlreadyConverged(detail)) => {
            pending.phase = MutationPhase::Succeeded;
            tracing::debug!(collection = def.tag, %detail, "mutation already applied");
            DispatchReport {
                notice: Notice::info(already_applied_message(def, op, &pending.target_name)),
                refetch: true,
                end_session: false,
            }
        }
        Err(err) => {
            pending.phase = MutationPhase::Failed;
            DispatchReport {
                notice: Notice::error(err.display_message()),
                refetch: false,
                end_session: false,
            }
        }
    }
}

/// Release the in-flight slot and pick the descriptor to refetch, if any.
pub fn settle(
    state: &mut CollectionViewState,
    pending: &PendingMutation,
    report: &DispatchReport,
) -> Option<QueryDescriptor> {
    let op = pending.op();
    state.finish_mutation(op, pending.target_id());
    if !report.refetch {
        return None;
    }
    Some(match (op, pending.target_id()) {
        (MutationOp::Delete, Some(id)) => state.after_delete(id),
        _ => state.refresh(),
    })
}

fn already_applied_message(def: &CollectionDef, op: MutationOp, name: &str) -> String {
    let subject = if name.trim().is_empty() {
        format!("This {}", def.singular)
    } else {
        name.trim().to_string()
    };
    match op {
        MutationOp::Delete => format!("{subject} was already deleted"),
        _ => format!("{subject} is already up to date"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::CachePolicy;
    use crate::core::pagination::PageResult;
    use crate::core::store::NoticeKind;
    use crate::features::collections::actions::MutationRequest;
    use crate::features::collections::catalog::CollectionKind;
    use crate::services::transport::fake::FakeTransport;
    use serde_json::json;
    use std::rc::Rc;
    use warden_api_models::{EntityId, ManagedEntity, Role};

    fn client() -> CollectionClient<FakeTransport> {
        CollectionClient::new(FakeTransport::default(), CachePolicy::default())
    }

    fn super_admin() -> SessionContext {
        SessionContext::new(EntityId::from("root"), Role::SuperAdmin, "Root", "tok")
    }

    #[tokio::test(flavor = "current_thread")]
    async fn successful_ban_reports_and_refetches() {
        let client = client();
        client.transport().reply(200, &json!({ "message": "ok" }));
        let def = CollectionKind::Agents.def();
        let mut pending = PendingMutation::new(
            MutationRequest::Ban {
                id: EntityId::from("a1"),
                reason: "spam".into(),
            },
            "Ada",
        );
        let report = dispatch(&client, &super_admin(), def, &mut pending).await;
        assert_eq!(report.notice.kind, NoticeKind::Success);
        assert_eq!(report.notice.message, "Ada has been banned");
        assert!(report.refetch);
        assert!(!report.end_session);
        assert_eq!(pending.phase, MutationPhase::Succeeded);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn banning_yourself_ends_the_session() {
        let client = client();
        client.transport().reply(200, &json!({}));
        let def = CollectionKind::Admins.def();
        let mut pending = PendingMutation::new(
            MutationRequest::Ban {
                id: EntityId::from("root"),
                reason: def.default_ban_reason.into(),
            },
            "Root",
        );
        let report = dispatch(&client, &super_admin(), def, &mut pending).await;
        assert!(report.end_session);
        assert_eq!(report.notice.kind, NoticeKind::Success);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failure_leaves_list_alone() {
        let client = client();
        client
            .transport()
            .reply(500, &json!({ "error": "Database unavailable" }));
        let def = CollectionKind::Agents.def();
        let mut state = CollectionViewState::new(CollectionKind::Agents, 10, 500);
        let id = EntityId::from("a1");
        assert!(state.begin_mutation(MutationOp::Unban, Some(&id)));
        let mut pending =
            PendingMutation::new(MutationRequest::Unban { id: id.clone() }, "Ada");
        let report = dispatch(&client, &super_admin(), def, &mut pending).await;
        assert_eq!(report.notice, Notice::error("Database unavailable"));
        assert_eq!(pending.phase, MutationPhase::Failed);
        assert_eq!(settle(&mut state, &pending, &report), None);
        assert!(!state.is_busy(&id));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn double_delete_is_informational_and_steps_back() {
        let client = client();
        client
            .transport()
            .reply(404, &json!({ "message": "Agent not found" }));
        let def = CollectionKind::Agents.def();

        let mut state = CollectionViewState::new(CollectionKind::Agents, 10, 500);
        let _ = state.set_page(2);
        let descriptor = state.descriptor();
        let row: ManagedEntity = serde_json::from_value(json!({ "_id": "last" })).expect("row");
        let seq = state.issue_request();
        state.apply_page(
            &descriptor,
            seq,
            Rc::new(PageResult {
                items: vec![row],
                page: 2,
                page_size: 10,
                total_items: 11,
                total_pages: 2,
                has_prev: true,
                has_next: false,
            }),
        );

        let id = EntityId::from("last");
        assert!(state.begin_mutation(MutationOp::Delete, Some(&id)));
        let mut pending = PendingMutation::new(MutationRequest::Delete { id: id.clone() }, "Bo");
        let report = dispatch(&client, &super_admin(), def, &mut pending).await;
        assert_eq!(report.notice, Notice::info("Bo was already deleted"));

        let refetch = settle(&mut state, &pending, &report).expect("refetch");
        assert_eq!(refetch.page, 1);
        assert!(!state.is_busy(&id));
    }
}
