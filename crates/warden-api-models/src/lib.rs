#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Shared HTTP DTOs for the Warden admin API.
//!
//! The console talks to a backend whose list endpoints are structurally
//! identical across collections but disagree on field names (`users` vs
//! `agents`, `totalAgents` vs `total`). The envelope helpers here absorb that
//! drift so the UI only ever sees [`ListEnvelope`].
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque identifier assigned by the remote system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle status of a managed account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum EntityStatus {
    /// Account can sign in and act.
    #[serde(alias = "active", alias = "ACTIVE")]
    Active,
    /// Account was banned by an administrator.
    #[serde(alias = "banned", alias = "BANNED")]
    Banned,
    /// Account is dormant; also used for unknown or missing values.
    #[default]
    #[serde(other)]
    Inactive,
}

impl EntityStatus {
    /// Wire label, also used as the status filter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Banned => "Banned",
            Self::Inactive => "Inactive",
        }
    }
}

/// Role attached to a principal or managed account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    /// Platform owner; manages admins and agents.
    #[serde(alias = "superadmin", alias = "super_admin", alias = "superAdmin")]
    SuperAdmin,
    /// Administrator; manages users and agents.
    #[serde(alias = "admin")]
    Admin,
    /// Support agent; browses assigned users.
    #[serde(alias = "agent")]
    Agent,
    /// End user of the platform.
    #[serde(alias = "user")]
    User,
    /// Anything the console does not recognise.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Display label for tables and forms.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SuperAdmin => "SuperAdmin",
            Self::Admin => "Admin",
            Self::Agent => "Agent",
            Self::User => "User",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a role label case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "superadmin" | "super_admin" => Some(Self::SuperAdmin),
            "admin" => Some(Self::Admin),
            "agent" => Some(Self::Agent),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

/// Account snapshot returned by the list and mutation endpoints.
///
/// Decodes from `_id` and/or `id`, preferring `_id`; a record with neither gets
/// an empty [`EntityId`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "EntityWire")]
pub struct ManagedEntity {
    /// Remote identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Role recorded on the account.
    pub role: Option<Role>,
    /// Lifecycle status.
    pub status: EntityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Category or department grouping.
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Uploaded profile image file name.
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Contact phone number.
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Postal address.
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ManagedEntity {
    /// Whether the backend sent an identifier the console can address.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.as_str().is_empty()
    }
}

/// Both identifier spellings, as Mongoose emits them with virtuals on.
#[derive(Deserialize)]
struct WireIds {
    #[serde(default, rename = "_id")]
    mongo: Option<EntityId>,
    #[serde(default)]
    id: Option<EntityId>,
}

impl WireIds {
    fn resolve(self) -> EntityId {
        self.mongo
            .into_iter()
            .chain(self.id)
            .find(|id| !id.as_str().is_empty())
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityWire {
    #[serde(flatten)]
    ids: WireIds,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    status: EntityStatus,
    #[serde(default, alias = "department")]
    category: Option<String>,
    #[serde(default, alias = "profilePic")]
    profile_image: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<EntityWire> for ManagedEntity {
    fn from(wire: EntityWire) -> Self {
        Self {
            id: wire.ids.resolve(),
            name: wire.name,
            email: wire.email,
            role: wire.role,
            status: wire.status,
            category: wire.category,
            profile_image: wire.profile_image,
            phone: wire.phone,
            address: wire.address,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

/// Pagination hints reported by a list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationMeta {
    /// Total pages reported by the server.
    pub total_pages: Option<u32>,
    /// Total matching items reported by the server.
    pub total_items: Option<u64>,
    /// Whether the server reports a previous page.
    pub has_prev: Option<bool>,
    /// Whether the server reports a next page.
    pub has_next: Option<bool>,
}

impl PaginationMeta {
    /// Read pagination hints from a JSON object, tolerating per-collection total keys.
    #[must_use]
    pub fn from_value(raw: &Value, items_key: &str) -> Self {
        let collection_total = format!("total{}", capitalize(items_key));
        let total_items = ["totalItems", collection_total.as_str(), "total", "count"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(Value::as_u64));
        let total_pages = raw
            .get("totalPages")
            .and_then(Value::as_u64)
            .map(|pages| u32::try_from(pages).unwrap_or(u32::MAX));
        Self {
            total_pages,
            total_items,
            has_prev: raw.get("hasPrev").and_then(Value::as_bool),
            has_next: raw.get("hasNext").and_then(Value::as_bool),
        }
    }

    const fn is_empty(&self) -> bool {
        self.total_pages.is_none() && self.total_items.is_none()
    }
}

/// Normalised list response: the items plus whatever pagination the server sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEnvelope {
    /// Entities on the requested page, in server order.
    pub items: Vec<ManagedEntity>,
    /// Pagination hints.
    pub pagination: PaginationMeta,
}

impl ListEnvelope {
    /// Decode a list response.
    ///
    /// Items are looked up under `data.<items_key>`, `data.items`, `data` (when it
    /// is an array), then the same keys at the root.
    ///
    /// # Errors
    /// Returns an error when no item array is present or an item fails to decode.
    pub fn from_value(value: &Value, items_key: &str) -> Result<Self, serde_json::Error> {
        let data = value.get("data");
        if let Some(Value::Array(_)) = data {
            let items = decode_items(data)?;
            let pagination = PaginationMeta::from_value(value, items_key);
            return Ok(Self { items, pagination });
        }

        let scopes: Vec<&Value> = data
            .filter(|inner| inner.is_object())
            .into_iter()
            .chain(std::iter::once(value))
            .collect();

        let items_value = scopes
            .iter()
            .find_map(|scope| scope.get(items_key).or_else(|| scope.get("items")))
            .ok_or_else(|| {
                <serde_json::Error as serde::de::Error>::custom(format!(
                    "list response has no `{items_key}` array"
                ))
            })?;
        let items = decode_items(Some(items_value))?;

        let pagination = scopes
            .iter()
            .find_map(|scope| scope.get("pagination"))
            .map(|raw| PaginationMeta::from_value(raw, items_key))
            .filter(|meta| !meta.is_empty())
            .or_else(|| {
                scopes
                    .iter()
                    .map(|scope| PaginationMeta::from_value(scope, items_key))
                    .find(|meta| !meta.is_empty())
            })
            .unwrap_or_default();

        Ok(Self { items, pagination })
    }
}

fn decode_items(raw: Option<&Value>) -> Result<Vec<ManagedEntity>, serde_json::Error> {
    raw.map_or_else(|| Ok(Vec::new()), |items| Vec::<ManagedEntity>::deserialize(items))
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Error document returned on non-2xx responses.
///
/// The backend mostly sends `{ "message": ... }`; RFC 9457 problem documents
/// (`title`/`detail`) and `{ "error": ... }` bodies are accepted too.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    /// Human-readable message.
    pub message: Option<String>,
    #[serde(default)]
    /// Problem detail.
    pub detail: Option<String>,
    #[serde(default)]
    /// Problem title.
    pub title: Option<String>,
    #[serde(default)]
    /// Error value; only string payloads are surfaced.
    pub error: Option<Value>,
}

impl ApiErrorBody {
    /// Most specific non-blank message in the body.
    #[must_use]
    pub fn best_message(&self) -> Option<String> {
        [
            self.message.as_deref(),
            self.detail.as_deref(),
            self.error.as_ref().and_then(Value::as_str),
            self.title.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
    }
}

/// Body for `PATCH /{collection}/{id}/ban`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BanRequest {
    /// Reason recorded against the ban.
    pub reason: String,
}

/// Body for `DELETE /{collection}/{id}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    /// Explicit confirmation flag required by the backend.
    pub confirm_delete: bool,
}

impl Default for DeleteRequest {
    fn default() -> Self {
        Self {
            confirm_delete: true,
        }
    }
}

/// Credentials for `POST auth/login`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Principal returned alongside a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "SessionUserWire")]
pub struct SessionUser {
    /// Principal identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Raw role label as sent by the backend.
    pub role: String,
}

#[derive(Deserialize)]
struct SessionUserWire {
    #[serde(flatten)]
    ids: WireIds,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    role: String,
}

impl From<SessionUserWire> for SessionUser {
    fn from(wire: SessionUserWire) -> Self {
        Self {
            id: wire.ids.resolve(),
            name: wire.name,
            email: wire.email,
            role: wire.role,
        }
    }
}

/// Response from `POST auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Authenticated principal.
    pub user: SessionUser,
}

/// Body for `POST auth/forgot-password`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ForgotPasswordRequest {
    /// Account email that receives the OTP.
    pub email: String,
}

/// Body for `POST auth/verify-pass-otp`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerifyOtpRequest {
    /// Account email.
    pub email: String,
    /// One-time code delivered by email.
    pub otp: String,
}

/// Body for `POST auth/reset-password`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// Account email.
    pub email: String,
    /// Replacement password.
    pub new_password: String,
    /// Confirmation of the replacement password.
    pub confirm_password: String,
}

/// Generic acknowledgement returned by auth endpoints.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct MessageResponse {
    #[serde(default)]
    /// Optional human-readable acknowledgement.
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_accepts_mongo_ids_and_departments() {
        let entity: ManagedEntity = serde_json::from_value(json!({
            "_id": "a1",
            "name": "Ada",
            "email": "ada@example.com",
            "role": "Agent",
            "status": "Banned",
            "department": "Support",
            "profilePic": "ada.png",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .expect("entity decodes");
        assert_eq!(entity.id.as_str(), "a1");
        assert_eq!(entity.role, Some(Role::Agent));
        assert_eq!(entity.status, EntityStatus::Banned);
        assert_eq!(entity.category.as_deref(), Some("Support"));
        assert_eq!(entity.profile_image.as_deref(), Some("ada.png"));
        assert!(entity.created_at.is_some());
    }

    #[test]
    fn entity_prefers_mongo_id_when_both_are_sent() {
        let entity: ManagedEntity = serde_json::from_value(json!({
            "_id": "665f1c",
            "id": "665f1c-virtual",
            "name": "Ada"
        }))
        .expect("entity decodes");
        assert_eq!(entity.id.as_str(), "665f1c");

        let blank_mongo: ManagedEntity =
            serde_json::from_value(json!({ "_id": "", "id": "u9" })).expect("entity decodes");
        assert_eq!(blank_mongo.id.as_str(), "u9");

        let anonymous: ManagedEntity =
            serde_json::from_value(json!({ "name": "No id" })).expect("entity decodes");
        assert!(!anonymous.has_id());
    }

    #[test]
    fn list_page_with_virtual_ids_decodes() {
        let body = json!({
            "data": {
                "agents": [
                    { "_id": "a1", "id": "a1", "name": "Ada" },
                    { "_id": "a2", "id": "a2", "department": "Billing" },
                    { "name": "Legacy row" }
                ],
                "pagination": { "totalAgents": 3 }
            }
        });
        let envelope = ListEnvelope::from_value(&body, "agents").expect("envelope");
        let ids: Vec<&str> = envelope.items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2", ""]);
        assert_eq!(envelope.items[1].category.as_deref(), Some("Billing"));
    }

    #[test]
    fn login_response_accepts_both_id_spellings() {
        let response: LoginResponse = serde_json::from_value(json!({
            "token": "jwt",
            "user": { "_id": "s1", "id": "s1", "name": "Root", "email": "root@example.com", "role": "superadmin" }
        }))
        .expect("login decodes");
        assert_eq!(response.user.id.as_str(), "s1");
        assert_eq!(response.user.role, "superadmin");

        let plain: LoginResponse = serde_json::from_value(json!({
            "token": "jwt",
            "user": { "id": "s2", "role": "admin" }
        }))
        .expect("login decodes");
        assert_eq!(plain.user.id.as_str(), "s2");
    }

    #[test]
    fn unknown_status_and_role_fall_back() {
        let entity: ManagedEntity = serde_json::from_value(json!({
            "id": "u1",
            "status": "Suspended",
            "role": "moderator"
        }))
        .expect("entity decodes");
        assert_eq!(entity.status, EntityStatus::Inactive);
        assert_eq!(entity.role, Some(Role::Unknown));
        assert!(entity.name.is_empty());
    }

    #[test]
    fn envelope_reads_nested_collection_key() {
        let body = json!({
            "data": {
                "agents": [{ "_id": "a1" }, { "_id": "a2" }],
                "pagination": { "totalPages": 3, "totalAgents": 25, "hasPrev": false, "hasNext": true }
            }
        });
        let envelope = ListEnvelope::from_value(&body, "agents").expect("envelope");
        assert_eq!(envelope.items.len(), 2);
        assert_eq!(envelope.pagination.total_items, Some(25));
        assert_eq!(envelope.pagination.total_pages, Some(3));
        assert_eq!(envelope.pagination.has_next, Some(true));
    }

    #[test]
    fn envelope_falls_back_to_root_items_and_totals() {
        let body = json!({ "users": [{ "id": "u1" }], "total": 1, "totalPages": 1 });
        let envelope = ListEnvelope::from_value(&body, "users").expect("envelope");
        assert_eq!(envelope.items.len(), 1);
        assert_eq!(envelope.pagination.total_items, Some(1));

        let generic = json!({ "data": { "items": [], "pagination": { "totalItems": 0 } } });
        let envelope = ListEnvelope::from_value(&generic, "admins").expect("envelope");
        assert!(envelope.items.is_empty());
        assert_eq!(envelope.pagination.total_items, Some(0));
    }

    #[test]
    fn envelope_without_items_is_an_error() {
        let body = json!({ "data": { "pagination": {} } });
        let err = ListEnvelope::from_value(&body, "users").expect_err("missing items");
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn error_body_prefers_message_then_detail() {
        let body: ApiErrorBody =
            serde_json::from_value(json!({ "title": "Conflict", "detail": "email taken" }))
                .expect("body");
        assert_eq!(body.best_message().as_deref(), Some("email taken"));
        let body: ApiErrorBody =
            serde_json::from_value(json!({ "message": "  ", "error": "Agent not found" }))
                .expect("body");
        assert_eq!(body.best_message().as_deref(), Some("Agent not found"));
        let body: ApiErrorBody =
            serde_json::from_value(json!({ "error": { "code": 7 } })).expect("body");
        assert_eq!(body.best_message(), None);
    }

    #[test]
    fn mutation_bodies_use_backend_field_names() {
        let delete = serde_json::to_value(DeleteRequest::default()).expect("json");
        assert_eq!(delete, json!({ "confirmDelete": true }));
        let reset = serde_json::to_value(ResetPasswordRequest {
            email: "a@b.c".into(),
            new_password: "hunter22".into(),
            confirm_password: "hunter22".into(),
        })
        .expect("json");
        assert_eq!(reset["newPassword"], "hunter22");
        assert_eq!(reset["confirmPassword"], "hunter22");
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("SuperAdmin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse(" agent "), Some(Role::Agent));
        assert_eq!(Role::parse("guest"), None);
    }
}
