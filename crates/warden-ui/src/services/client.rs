//! Remote collection client: cached list reads and cache-invalidating mutations.
//!
//! # Design
//! - One client per app boot; the cache lives behind a `RefCell` and is never
//!   borrowed across an await.
//! - Reads go through the descriptor cache; mutations invalidate the collection tag.

use crate::core::cache::{CacheEntry, CachePolicy, CacheRead, QueryCache};
use crate::core::descriptor::QueryDescriptor;
use crate::core::pagination::PageResult;
use crate::core::session::SessionContext;
use crate::features::collections::actions::{MutationOp, MutationOutcome, MutationRequest};
use crate::features::collections::catalog::CollectionDef;
use crate::services::transport::{ApiError, ApiRequest, HttpMethod, Transport, send_json};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};
use warden_api_models::{BanRequest, DeleteRequest, EntityId, ListEnvelope, ManagedEntity};

/// Time source, swappable in tests.
pub type Clock = Rc<dyn Fn() -> DateTime<Utc>>;

/// Cached client for every managed collection.
pub struct CollectionClient<T> {
    transport: T,
    cache: RefCell<QueryCache>,
    clock: Clock,
}

impl<T: Transport> CollectionClient<T> {
    /// Client using the wall clock.
    #[must_use]
    pub fn new(transport: T, policy: CachePolicy) -> Self {
        let clock: Clock = Rc::new(Utc::now);
        Self::with_clock(transport, policy, clock)
    }

    /// Client with an explicit time source.
    #[must_use]
    pub fn with_clock(transport: T, policy: CachePolicy, clock: Clock) -> Self {
        Self {
            transport,
            cache: RefCell::new(QueryCache::new(policy)),
            clock,
        }
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Classify what the cache holds for `descriptor` without hitting the network.
    #[must_use]
    pub fn read_cached(&self, def: &CollectionDef, descriptor: &QueryDescriptor) -> CacheRead {
        let key = descriptor.cache_key(def.list_path, def.category_param());
        let now = (self.clock)();
        self.cache.borrow_mut().read(&key, now)
    }

    /// Snapshot of the cache entry for `descriptor`.
    #[must_use]
    pub fn cache_entry(&self, def: &CollectionDef, descriptor: &QueryDescriptor) -> Option<CacheEntry> {
        let key = descriptor.cache_key(def.list_path, def.category_param());
        self.cache.borrow().entry(&key).cloned()
    }

    /// Fetch a page, serving fresh cache entries without a request.
    ///
    /// # Errors
    /// Returns [`ApiError`] when a required request fails.
    pub async fn fetch_page(
        &self,
        session: &SessionContext,
        def: &CollectionDef,
        descriptor: &QueryDescriptor,
    ) -> Result<Rc<PageResult>, ApiError> {
        if let CacheRead::Fresh(page) = self.read_cached(def, descriptor) {
            debug!(collection = def.tag, page = descriptor.page, "cache hit");
            return Ok(page);
        }
        self.refetch(session, def, descriptor).await
    }

    /// Always request the page from the server and store the result.
    ///
    /// # Errors
    /// Returns [`ApiError`] for transport, status or decoding failures.
    pub async fn refetch(
        &self,
        session: &SessionContext,
        def: &CollectionDef,
        descriptor: &QueryDescriptor,
    ) -> Result<Rc<PageResult>, ApiError> {
        let key = descriptor.cache_key(def.list_path, def.category_param());
        let ticket = self.cache.borrow_mut().begin(&key, def.tag, (self.clock)());
        debug!(collection = def.tag, %key, "fetching page");

        let request = ApiRequest::new(HttpMethod::Get, def.list_path)
            .with_query(descriptor.query_pairs(def.category_param()))
            .with_session(session);
        let result = send_json(&self.transport, request)
            .await
            .and_then(|body| {
                ListEnvelope::from_value(&body, def.items_key)
                    .map_err(|err| ApiError::Decode(err.to_string()))
            })
            .map(|envelope| Rc::new(PageResult::from_envelope(envelope, descriptor)));

        let now = (self.clock)();
        match &result {
            Ok(page) => {
                let stored = self
                    .cache
                    .borrow_mut()
                    .complete(&key, def.tag, Rc::clone(page), ticket, now);
                if !stored {
                    debug!(collection = def.tag, %key, "superseded page not cached");
                }
            }
            Err(err) => {
                warn!(collection = def.tag, %key, error = %err, "page fetch failed");
                self.cache
                    .borrow_mut()
                    .fail(&key, &err.display_message(), ticket, now);
            }
        }
        result
    }

    /// Send a mutation; on success every entry of the collection is invalidated.
    ///
    /// Deleting something the server no longer has is reported as
    /// [`MutationOutcome::AlreadyConverged`] rather than an error.
    ///
    /// # Errors
    /// Returns [`ApiError`] for transport failures and rejected mutations.
    pub async fn mutate(
        &self,
        session: &SessionContext,
        def: &CollectionDef,
        request: &MutationRequest,
    ) -> Result<MutationOutcome, ApiError> {
        let op = request.op();
        let api_request = mutation_request(def, request)?.with_session(session);
        let response = self.transport.send(api_request).await.inspect_err(|err| {
            warn!(collection = def.tag, op = op.label(), error = %err, "mutation failed");
        })?;

        if response.is_success() {
            let invalidated = self.invalidate(def);
            debug!(collection = def.tag, op = op.label(), invalidated, "mutation applied");
            let echoed = response
                .json()
                .ok()
                .and_then(|body| echoed_entity(&body, def.singular));
            return Ok(MutationOutcome::Applied(echoed));
        }

        let err = ApiError::from_response(&response);
        if op == MutationOp::Delete && already_deleted(&err) {
            let invalidated = self.invalidate(def);
            debug!(collection = def.tag, invalidated, "delete already applied");
            return Ok(MutationOutcome::AlreadyConverged(err.display_message()));
        }
        warn!(collection = def.tag, op = op.label(), status = response.status, "mutation rejected");
        Err(err)
    }

    /// Evict entries nobody has read within the keep-alive window.
    pub fn evict_expired(&self) -> usize {
        let now = (self.clock)();
        self.cache.borrow_mut().evict_expired(now)
    }

    /// Drop every cached page, e.g. on logout.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    fn invalidate(&self, def: &CollectionDef) -> usize {
        self.cache.borrow_mut().invalidate_tag(def.tag)
    }
}

fn item_path(def: &CollectionDef, id: &EntityId) -> String {
    id_path(def.item_path, id)
}

fn id_path(base: &str, id: &EntityId) -> String {
    format!("{base}/{}", urlencoding::encode(id.as_str()))
}

fn mutation_request(def: &CollectionDef, request: &MutationRequest) -> Result<ApiRequest, ApiError> {
    let encode = |value: Result<Value, serde_json::Error>| {
        value.map_err(|err| ApiError::Decode(err.to_string()))
    };
    Ok(match request {
        MutationRequest::Create(draft) => {
            ApiRequest::new(HttpMethod::Post, def.create_path).with_json(draft.to_body(def))
        }
        MutationRequest::Update { id, draft } => {
            ApiRequest::new(HttpMethod::Put, id_path(def.update_path, id)).with_json(draft.to_body(def))
        }
        MutationRequest::Ban { id, reason } => {
            let body = encode(serde_json::to_value(BanRequest {
                reason: reason.clone(),
            }))?;
            ApiRequest::new(HttpMethod::Patch, format!("{}/ban", item_path(def, id))).with_json(body)
        }
        MutationRequest::Unban { id } => {
            ApiRequest::new(HttpMethod::Patch, format!("{}/unban", item_path(def, id)))
        }
        MutationRequest::Delete { id } => {
            let body = encode(serde_json::to_value(DeleteRequest::default()))?;
            ApiRequest::new(HttpMethod::Delete, item_path(def, id)).with_json(body)
        }
    })
}

fn echoed_entity(body: &Value, singular: &str) -> Option<ManagedEntity> {
    [body.get("data"), body.get(singular), Some(body)]
        .into_iter()
        .flatten()
        .find_map(|candidate| serde_json::from_value::<ManagedEntity>(candidate.clone()).ok())
        .filter(ManagedEntity::has_id)
}

fn already_deleted(err: &ApiError) -> bool {
    match err {
        ApiError::Server {
            status: 404 | 410, ..
        } => true,
        ApiError::Server { message, .. } => {
            let lower = message.to_ascii_lowercase();
            lower.contains("already deleted")
                || lower.contains("already been deleted")
                || lower.contains("not found")
        }
        ApiError::Network(_) | ApiError::Decode(_) => false,
    }
}
