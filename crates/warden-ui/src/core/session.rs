//! Authenticated session primitives.
//!
//! # Design
//! - The session is plain data so it can be persisted and restored verbatim.
//! - Header encoding is left to transports; this only exposes the bearer value.

use serde::{Deserialize, Serialize};
use std::fmt;
use warden_api_models::{EntityId, LoginResponse, Role};

/// Login could not produce a usable session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The backend returned a role the console has no screens for.
    #[error("Unauthorized role: {0}")]
    UnauthorizedRole(String),
    /// The backend returned a blank token.
    #[error("login response did not include a token")]
    MissingToken,
}

/// Identity, role and token of the signed-in principal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Identifier of the principal, used for self-action checks.
    pub principal_id: EntityId,
    /// Role that gates collections and mutations.
    pub role: Role,
    /// Display name for the shell header.
    pub name: String,
    /// Email for the shell header.
    pub email: String,
    token: String,
}

impl SessionContext {
    /// Build a session directly.
    #[must_use]
    pub fn new(principal_id: EntityId, role: Role, name: &str, token: &str) -> Self {
        Self {
            principal_id,
            role,
            name: name.to_string(),
            email: String::new(),
            token: token.to_string(),
        }
    }

    /// Turn a login response into a session, rejecting unsupported roles.
    ///
    /// # Errors
    /// Returns [`SessionError`] for an empty token or an unrecognised role.
    pub fn from_login(response: &LoginResponse) -> Result<Self, SessionError> {
        if response.token.trim().is_empty() {
            return Err(SessionError::MissingToken);
        }
        let role = Role::parse(&response.user.role)
            .filter(|role| matches!(role, Role::SuperAdmin | Role::Admin | Role::Agent))
            .ok_or_else(|| SessionError::UnauthorizedRole(response.user.role.clone()))?;
        Ok(Self {
            principal_id: response.user.id.clone(),
            role,
            name: response.user.name.clone(),
            email: response.user.email.clone(),
            token: response.token.clone(),
        })
    }

    /// Whether the session carries a usable token.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// `Authorization` header value, if a token is present.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.has_credentials()
            .then(|| format!("Bearer {}", self.token.trim()))
    }

    /// Whether `id` names the signed-in principal.
    #[must_use]
    pub fn is_self(&self, id: &EntityId) -> bool {
        &self.principal_id == id
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SessionContext")
            .field("principal_id", &self.principal_id)
            .field("role", &self.role)
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_api_models::SessionUser;

    fn login(role: &str, token: &str) -> LoginResponse {
        LoginResponse {
            token: token.to_string(),
            user: SessionUser {
                id: EntityId::from("p1"),
                name: "Root".to_string(),
                email: "root@example.com".to_string(),
                role: role.to_string(),
            },
        }
    }

    #[test]
    fn login_maps_console_roles() {
        let session = SessionContext::from_login(&login("superadmin", "t0k")).expect("session");
        assert_eq!(session.role, Role::SuperAdmin);
        assert_eq!(session.bearer().as_deref(), Some("Bearer t0k"));
        assert!(session.is_self(&EntityId::from("p1")));
    }

    #[test]
    fn login_rejects_end_users_and_unknown_roles() {
        assert_eq!(
            SessionContext::from_login(&login("user", "t")),
            Err(SessionError::UnauthorizedRole("user".to_string()))
        );
        assert!(matches!(
            SessionContext::from_login(&login("guest", "t")),
            Err(SessionError::UnauthorizedRole(_))
        ));
        assert_eq!(
            SessionContext::from_login(&login("admin", "  ")),
            Err(SessionError::MissingToken)
        );
    }

    #[test]
    fn debug_output_hides_token() {
        let session = SessionContext::new(EntityId::from("a"), Role::Admin, "Ann", "secret");
        assert!(!format!("{session:?}").contains("secret"));
        let blank = SessionContext::new(EntityId::from("a"), Role::Admin, "Ann", " ");
        assert!(!blank.has_credentials());
        assert_eq!(blank.bearer(), None);
    }
}
