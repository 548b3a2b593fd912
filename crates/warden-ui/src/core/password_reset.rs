//! Forgot-password flow: email, one-time code, new password.
//!
//! # Design
//! - `request_*` methods validate input and build the wire body without moving.
//! - Transition methods advance only after the backend confirmed the step,
//!   and only from the step they belong to.

use warden_api_models::{ForgotPasswordRequest, ResetPasswordRequest, VerifyOtpRequest};

/// Minimum password length accepted by the reset form.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Current step of the flow.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ResetStep {
    /// Asking for the account email.
    #[default]
    EnterEmail,
    /// Code sent; waiting for the user to type it.
    VerifyOtp {
        /// Email the code was sent to.
        email: String,
    },
    /// Code accepted; choosing a new password.
    ResetPassword {
        /// Verified email.
        email: String,
    },
    /// Password changed.
    Completed,
}

/// Input or ordering problems in the flow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResetError {
    /// Email missing or malformed.
    #[error("Please enter a valid email address")]
    InvalidEmail,
    /// Code missing or not numeric.
    #[error("Please enter the code sent to your email")]
    InvalidOtp,
    /// Password shorter than [`MIN_PASSWORD_LEN`].
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    /// Confirmation does not match.
    #[error("Passwords do not match")]
    PasswordMismatch,
    /// Action does not belong to the current step.
    #[error("That step is not available right now")]
    OutOfOrder,
}

/// State machine for the forgot-password screens.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PasswordResetFlow {
    step: ResetStep,
}

impl PasswordResetFlow {
    /// Flow at the email step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> &ResetStep {
        &self.step
    }

    /// Validate the email and build the OTP request.
    ///
    /// # Errors
    /// Fails outside the email step or for a malformed address.
    pub fn request_otp(&self, email: &str) -> Result<ForgotPasswordRequest, ResetError> {
        if self.step != ResetStep::EnterEmail {
            return Err(ResetError::OutOfOrder);
        }
        let email = email.trim();
        if !looks_like_email(email) {
            return Err(ResetError::InvalidEmail);
        }
        Ok(ForgotPasswordRequest {
            email: email.to_string(),
        })
    }

    /// Backend sent the code.
    ///
    /// # Errors
    /// Fails outside the email step.
    pub fn otp_sent(&mut self, request: &ForgotPasswordRequest) -> Result<(), ResetError> {
        if self.step != ResetStep::EnterEmail {
            return Err(ResetError::OutOfOrder);
        }
        self.step = ResetStep::VerifyOtp {
            email: request.email.clone(),
        };
        Ok(())
    }

    /// Validate the code and build the verification request.
    ///
    /// # Errors
    /// Fails outside the code step or for a blank or non-numeric code.
    pub fn request_verify(&self, otp: &str) -> Result<VerifyOtpRequest, ResetError> {
        let ResetStep::VerifyOtp { email } = &self.step else {
            return Err(ResetError::OutOfOrder);
        };
        let otp = otp.trim();
        if otp.is_empty() || !otp.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ResetError::InvalidOtp);
        }
        Ok(VerifyOtpRequest {
            email: email.clone(),
            otp: otp.to_string(),
        })
    }

    /// Backend accepted the code.
    ///
    /// # Errors
    /// Fails outside the code step.
    pub fn otp_verified(&mut self) -> Result<(), ResetError> {
        let ResetStep::VerifyOtp { email } = &self.step else {
            return Err(ResetError::OutOfOrder);
        };
        self.step = ResetStep::ResetPassword {
            email: email.clone(),
        };
        Ok(())
    }

    /// Validate the new password pair and build the reset request.
    ///
    /// # Errors
    /// Fails outside the password step, for short passwords or a mismatch.
    pub fn request_reset(
        &self,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<ResetPasswordRequest, ResetError> {
        let ResetStep::ResetPassword { email } = &self.step else {
            return Err(ResetError::OutOfOrder);
        };
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ResetError::PasswordTooShort);
        }
        if new_password != confirm_password {
            return Err(ResetError::PasswordMismatch);
        }
        Ok(ResetPasswordRequest {
            email: email.clone(),
            new_password: new_password.to_string(),
            confirm_password: confirm_password.to_string(),
        })
    }

    /// Backend changed the password.
    ///
    /// # Errors
    /// Fails outside the password step.
    pub fn password_reset(&mut self) -> Result<(), ResetError> {
        if !matches!(self.step, ResetStep::ResetPassword { .. }) {
            return Err(ResetError::OutOfOrder);
        }
        self.step = ResetStep::Completed;
        Ok(())
    }

    /// Go back to the email step, e.g. to resend a code.
    pub fn restart(&mut self) {
        self.step = ResetStep::EnterEmail;
    }
}

/// Loose shape check: one `@`, non-empty local part, dotted domain.
#[must_use]
pub fn looks_like_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !raw.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
