//! Authentication endpoints: login and the forgot-password exchange.

use crate::core::session::{SessionContext, SessionError};
use crate::services::transport::{ApiError, ApiRequest, HttpMethod, Transport, send_json};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use warden_api_models::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, ResetPasswordRequest,
    VerifyOtpRequest,
};

/// Login failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// Request failed or credentials were rejected.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Credentials were accepted but the account cannot use the console.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl LoginError {
    /// Message for the login form.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Api(err) => err.display_message(),
            Self::Session(err) => err.to_string(),
        }
    }
}

/// Client for the unauthenticated auth endpoints.
pub struct AuthApi<'a, T: ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> AuthApi<'a, T> {
    /// Borrow a transport.
    #[must_use]
    pub const fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    /// Returns [`LoginError`] when the backend rejects the credentials or the role.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionContext, LoginError> {
        let value = self
            .post(
                "auth/login",
                &LoginRequest {
                    email: email.trim().to_string(),
                    password: password.to_string(),
                },
            )
            .await?;
        let response: LoginResponse = decode(value)?;
        let session = SessionContext::from_login(&response)?;
        tracing::info!(role = session.role.label(), "signed in");
        Ok(session)
    }

    /// Ask the backend to email a one-time code.
    ///
    /// # Errors
    /// Returns [`ApiError`] when the request fails.
    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.post("auth/forgot-password", request).await.and_then(ack)
    }

    /// Check a one-time code.
    ///
    /// # Errors
    /// Returns [`ApiError`] when the code is rejected.
    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<MessageResponse, ApiError> {
        self.post("auth/verify-pass-otp", request).await.and_then(ack)
    }

    /// Set a new password after a verified code.
    ///
    /// # Errors
    /// Returns [`ApiError`] when the reset is rejected.
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.post("auth/reset-password", request).await.and_then(ack)
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        send_json(
            self.transport,
            ApiRequest::new(HttpMethod::Post, path).with_json(body),
        )
        .await
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

fn ack(value: Value) -> Result<MessageResponse, ApiError> {
    if value.is_null() {
        return Ok(MessageResponse::default());
    }
    decode(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::fake::FakeTransport;
    use serde_json::json;
    use warden_api_models::Role;

    #[tokio::test(flavor = "current_thread")]
    async fn login_builds_session_from_response() {
        let transport = FakeTransport::default();
        transport.reply(
            200,
            &json!({ "token": "jwt", "user": { "_id": "p1", "name": "Ann", "email": "a@x.io", "role": "Admin" } }),
        );
        let session = AuthApi::new(&transport)
            .login(" a@x.io ", "pw")
            .await
            .expect("session");
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.bearer().as_deref(), Some("Bearer jwt"));

        let sent = transport.last_request().expect("request");
        assert_eq!(sent.path, "auth/login");
        assert_eq!(sent.body, Some(json!({ "email": "a@x.io", "password": "pw" })));
        assert_eq!(sent.bearer, None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn login_surfaces_rejections() {
        let transport = FakeTransport::default();
        transport.reply(401, &json!({ "message": "Invalid credentials" }));
        transport.reply(
            200,
            &json!({ "token": "jwt", "user": { "_id": "u1", "role": "user" } }),
        );
        let api = AuthApi::new(&transport);

        let err = api.login("a@x.io", "bad").await.expect_err("rejected");
        assert_eq!(err.display_message(), "Invalid credentials");

        let err = api.login("u@x.io", "pw").await.expect_err("end user");
        assert_eq!(err.display_message(), "Unauthorized role: user");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn password_reset_endpoints_post_expected_bodies() {
        let transport = FakeTransport::default();
        transport.reply(200, &json!({ "message": "OTP sent" }));
        transport.reply(200, &json!({}));
        let api = AuthApi::new(&transport);

        let ack = api
            .forgot_password(&ForgotPasswordRequest {
                email: "a@x.io".into(),
            })
            .await
            .expect("sent");
        assert_eq!(ack.message.as_deref(), Some("OTP sent"));

        api.verify_otp(&VerifyOtpRequest {
            email: "a@x.io".into(),
            otp: "1234".into(),
        })
        .await
        .expect("verified");
        let sent = transport.last_request().expect("request");
        assert_eq!(sent.path, "auth/verify-pass-otp");
        assert_eq!(sent.body, Some(json!({ "email": "a@x.io", "otp": "1234" })));
    }
}
