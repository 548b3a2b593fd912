//! Row mutations, dialog forms and their notices.

use crate::core::password_reset::looks_like_email;
use crate::features::collections::catalog::CollectionDef;
use serde_json::{Map, Value};
use warden_api_models::{EntityId, ManagedEntity, Role};

/// Mutation kinds offered by management screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationOp {
    /// Create a new account.
    Create,
    /// Edit profile fields.
    Update,
    /// Ban with a reason.
    Ban,
    /// Lift a ban.
    Unban,
    /// Remove permanently.
    Delete,
}

impl MutationOp {
    /// Button and dialog label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Edit",
            Self::Ban => "Ban",
            Self::Unban => "Unban",
            Self::Delete => "Delete",
        }
    }

    /// Whether the op needs an explicit confirmation step.
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(self, Self::Ban | Self::Delete)
    }
}

/// Editable profile fields shared by create and update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityDraft {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number, if given.
    pub phone: Option<String>,
    /// Category value, if the collection has one.
    pub category: Option<String>,
    /// Role for new accounts.
    pub role: Option<Role>,
    /// Initial password for new accounts.
    pub password: Option<String>,
}

impl EntityDraft {
    /// JSON body, writing the category under the collection's field name.
    #[must_use]
    pub fn to_body(&self, def: &CollectionDef) -> Value {
        let mut body = Map::new();
        body.insert("name".into(), Value::from(self.name.clone()));
        body.insert("email".into(), Value::from(self.email.clone()));
        if let Some(phone) = &self.phone {
            body.insert("phone".into(), Value::from(phone.clone()));
        }
        if let (Some(field), Some(category)) = (def.category_param(), &self.category) {
            body.insert(field.into(), Value::from(category.clone()));
        }
        if let Some(role) = self.role {
            body.insert("role".into(), Value::from(role.label().to_ascii_lowercase()));
        }
        if let Some(password) = &self.password {
            body.insert("password".into(), Value::from(password.clone()));
        }
        Value::Object(body)
    }
}

/// Fully validated mutation ready to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRequest {
    /// Create from a draft.
    Create(EntityDraft),
    /// Update an entity.
    Update {
        /// Target.
        id: EntityId,
        /// New field values.
        draft: EntityDraft,
    },
    /// Ban an entity.
    Ban {
        /// Target.
        id: EntityId,
        /// Recorded reason.
        reason: String,
    },
    /// Unban an entity.
    Unban {
        /// Target.
        id: EntityId,
    },
    /// Delete an entity.
    Delete {
        /// Target.
        id: EntityId,
    },
}

impl MutationRequest {
    /// Kind of mutation.
    #[must_use]
    pub const fn op(&self) -> MutationOp {
        match self {
            Self::Create(_) => MutationOp::Create,
            Self::Update { .. } => MutationOp::Update,
            Self::Ban { .. } => MutationOp::Ban,
            Self::Unban { .. } => MutationOp::Unban,
            Self::Delete { .. } => MutationOp::Delete,
        }
    }

    /// Target entity, absent for creates.
    #[must_use]
    pub const fn target_id(&self) -> Option<&EntityId> {
        match self {
            Self::Create(_) => None,
            Self::Update { id, .. }
            | Self::Ban { id, .. }
            | Self::Unban { id }
            | Self::Delete { id } => Some(id),
        }
    }
}

/// Lifecycle of a dispatched mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationPhase {
    /// Validated, not yet sent.
    Created,
    /// Request in flight.
    InFlight,
    /// Applied, or already converged.
    Succeeded,
    /// Rejected or unreachable.
    Failed,
}

/// A mutation plus the context needed to report on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingMutation {
    /// What to send.
    pub request: MutationRequest,
    /// Display name used in notices.
    pub target_name: String,
    /// Where the mutation is in its lifecycle.
    pub phase: MutationPhase,
}

impl PendingMutation {
    /// Wrap a validated request.
    #[must_use]
    pub fn new(request: MutationRequest, target_name: impl Into<String>) -> Self {
        Self {
            request,
            target_name: target_name.into(),
            phase: MutationPhase::Created,
        }
    }

    /// Shorthand for the request's target.
    #[must_use]
    pub const fn target_id(&self) -> Option<&EntityId> {
        self.request.target_id()
    }

    /// Shorthand for the request's op.
    #[must_use]
    pub const fn op(&self) -> MutationOp {
        self.request.op()
    }
}

/// Local validation failures that block submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Row-scoped op opened without a row.
    #[error("No record selected")]
    MissingTarget,
    /// Name left blank.
    #[error("Name is required")]
    NameRequired,
    /// Email blank or malformed.
    #[error("A valid email is required")]
    EmailInvalid,
    /// Password left blank on create.
    #[error("Password is required")]
    PasswordRequired,
    /// Role missing on create.
    #[error("Role is required")]
    RoleRequired,
    /// Category value not offered by the collection.
    #[error("Unknown {0}")]
    UnknownCategory(String),
}

/// Dialog input for any mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationForm {
    /// Which op the dialog is for.
    pub op: MutationOp,
    /// Row the dialog was opened on.
    pub target: Option<ManagedEntity>,
    /// Name input.
    pub name: String,
    /// Email input.
    pub email: String,
    /// Phone input.
    pub phone: String,
    /// Category select.
    pub category: String,
    /// Password input, create only.
    pub password: String,
    /// Ban reason textarea.
    pub reason: String,
}

impl MutationForm {
    /// Blank form, prefilled from `target` where it makes sense.
    #[must_use]
    pub fn open(op: MutationOp, target: Option<&ManagedEntity>) -> Self {
        let prefill = op == MutationOp::Update;
        let field = |pick: fn(&ManagedEntity) -> String| {
            target.filter(|_| prefill).map(pick).unwrap_or_default()
        };
        Self {
            op,
            target: target.cloned(),
            name: field(|entity| entity.name.clone()),
            email: field(|entity| entity.email.clone()),
            phone: field(|entity| entity.phone.clone().unwrap_or_default()),
            category: field(|entity| entity.category.clone().unwrap_or_default()),
            password: String::new(),
            reason: String::new(),
        }
    }

    /// Validate the inputs into a ready-to-send mutation.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, def: &CollectionDef) -> Result<PendingMutation, ValidationError> {
        let request = match self.op {
            MutationOp::Create => return self.validate_create(def),
            MutationOp::Update => MutationRequest::Update {
                id: self.target_id()?,
                draft: self.draft(def)?,
            },
            MutationOp::Ban => {
                let reason = self.reason.trim();
                MutationRequest::Ban {
                    id: self.target_id()?,
                    reason: if reason.is_empty() {
                        def.default_ban_reason.to_string()
                    } else {
                        reason.to_string()
                    },
                }
            }
            MutationOp::Unban => MutationRequest::Unban {
                id: self.target_id()?,
            },
            MutationOp::Delete => MutationRequest::Delete {
                id: self.target_id()?,
            },
        };
        let name = self
            .target
            .as_ref()
            .map(|target| target.name.clone())
            .unwrap_or_default();
        Ok(PendingMutation::new(request, name))
    }

    fn validate_create(&self, def: &CollectionDef) -> Result<PendingMutation, ValidationError> {
        let mut draft = self.draft(def)?;
        if self.password.trim().is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        draft.password = Some(self.password.clone());
        draft.role = Some(def.create_role.ok_or(ValidationError::RoleRequired)?);
        let name = draft.name.clone();
        Ok(PendingMutation::new(MutationRequest::Create(draft), name))
    }

    fn target_id(&self) -> Result<EntityId, ValidationError> {
        self.target
            .as_ref()
            .map(|target| target.id.clone())
            .ok_or(ValidationError::MissingTarget)
    }

    fn draft(&self, def: &CollectionDef) -> Result<EntityDraft, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::NameRequired);
        }
        let email = self.email.trim();
        if !looks_like_email(email) {
            return Err(ValidationError::EmailInvalid);
        }
        let category = match def.category {
            Some(filter) => {
                let value = self.category.trim();
                if value.is_empty() {
                    None
                } else if filter.options.contains(&value) {
                    Some(value.to_string())
                } else {
                    return Err(ValidationError::UnknownCategory(filter.label.to_ascii_lowercase()));
                }
            }
            None => None,
        };
        let phone = self.phone.trim();
        Ok(EntityDraft {
            name: name.to_string(),
            email: email.to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            category,
            role: None,
            password: None,
        })
    }
}

/// Result of a mutation the server did not reject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Applied; carries the updated entity when the server echoed one.
    Applied(Option<ManagedEntity>),
    /// Target was already in the requested state.
    AlreadyConverged(String),
}

/// Toast text for a successful mutation.
#[must_use]
pub fn success_message(def: &CollectionDef, op: MutationOp, name: &str) -> String {
    let noun = def.singular;
    let subject = if name.trim().is_empty() {
        format!("The {noun}")
    } else {
        name.trim().to_string()
    };
    match op {
        MutationOp::Create => format!("{subject} was created"),
        MutationOp::Update => format!("{subject} was updated"),
        MutationOp::Ban => format!("{subject} has been banned"),
        MutationOp::Unban => format!("{subject} has been unbanned"),
        MutationOp::Delete => format!("{subject} was deleted"),
    }
}
