//! Identity Error Types
//!
//! Identity-specific error variants that integrate with the unified
//! `kernel::error::AppError` response envelope.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::token::TokenError;

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
///
/// Every variant is terminal: nothing in the core retries on any of them.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Login failed. Deliberately says nothing about why.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Presented token is malformed, forged, expired or incomplete
    #[error("Invalid or expired token")]
    TokenInvalid,

    /// No usable bearer token on the request
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Authenticated, but the role is not allowed on this route
    #[error("Insufficient permissions")]
    Forbidden,

    /// An authorize stage ran without authenticate before it
    #[error("Authentication context missing from request")]
    MissingAuthContext,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Email already registered")]
    EmailTaken,

    /// Request body could not be parsed
    #[error("Invalid request body")]
    InvalidBody,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Password validation failed: {0}")]
    PasswordPolicy(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::InvalidCredentials
            | IdentityError::TokenInvalid
            | IdentityError::Unauthorized(_) => ErrorKind::Unauthorized,
            IdentityError::Forbidden => ErrorKind::Forbidden,
            IdentityError::AccountNotFound => ErrorKind::NotFound,
            IdentityError::EmailTaken => ErrorKind::Conflict,
            IdentityError::InvalidBody
            | IdentityError::Validation(_)
            | IdentityError::PasswordPolicy(_) => ErrorKind::BadRequest,
            IdentityError::MissingAuthContext
            | IdentityError::Database(_)
            | IdentityError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Client-facing code; fixed per variant
    pub fn code(&self) -> &'static str {
        match self {
            IdentityError::InvalidCredentials => "ERR_INVALID_CREDENTIALS",
            IdentityError::AccountNotFound => "ERR_USER_NOT_FOUND",
            IdentityError::Validation(_) | IdentityError::PasswordPolicy(_) => "ERR_VALIDATION",
            other => other.kind().code(),
        }
    }

    /// Client-facing message. Server faults never leak their detail.
    pub fn public_message(&self) -> String {
        match self {
            IdentityError::InvalidCredentials => "invalid email or password".to_string(),
            IdentityError::TokenInvalid => "invalid or expired token".to_string(),
            IdentityError::Unauthorized(reason) => (*reason).to_string(),
            IdentityError::Forbidden => "insufficient permissions".to_string(),
            IdentityError::AccountNotFound => "user not found".to_string(),
            IdentityError::EmailTaken => "email already registered".to_string(),
            IdentityError::InvalidBody => "invalid body".to_string(),
            IdentityError::Validation(msg) | IdentityError::PasswordPolicy(msg) => msg.clone(),
            IdentityError::MissingAuthContext
            | IdentityError::Database(_)
            | IdentityError::Internal(_) => "internal error".to_string(),
        }
    }

    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.public_message()).with_code(self.code())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            IdentityError::Database(e) => {
                tracing::error!(error = %e, "Identity database error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::MissingAuthContext => {
                tracing::error!("Authorize stage ran before authenticate; check route wiring");
            }
            IdentityError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            IdentityError::Forbidden => {
                tracing::warn!("Request rejected for insufficient role");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<TokenError> for IdentityError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(msg) => IdentityError::Internal(msg),
            TokenError::MissingSubject => {
                IdentityError::Internal("cannot issue a token without a subject".to_string())
            }
            rejected => {
                tracing::debug!(reason = %rejected, "Token rejected");
                IdentityError::TokenInvalid
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code_mapping() {
        let cases = [
            (IdentityError::InvalidCredentials, 401, "ERR_INVALID_CREDENTIALS"),
            (IdentityError::TokenInvalid, 401, "ERR_UNAUTHORIZED"),
            (IdentityError::Unauthorized("missing authorization header"), 401, "ERR_UNAUTHORIZED"),
            (IdentityError::Forbidden, 403, "ERR_FORBIDDEN"),
            (IdentityError::MissingAuthContext, 500, "ERR_INTERNAL"),
            (IdentityError::AccountNotFound, 404, "ERR_USER_NOT_FOUND"),
            (IdentityError::EmailTaken, 409, "ERR_CONFLICT"),
            (IdentityError::InvalidBody, 400, "ERR_BAD_REQUEST"),
            (IdentityError::Validation("x".into()), 400, "ERR_VALIDATION"),
            (IdentityError::Internal("boom".into()), 500, "ERR_INTERNAL"),
        ];

        for (err, status, code) in cases {
            let app = err.to_app_error();
            assert_eq!(app.status_code(), status, "{err:?}");
            assert_eq!(app.code(), code, "{err:?}");
        }
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let app = IdentityError::Internal("connection string postgres://secret".into())
            .to_app_error();
        assert_eq!(app.message(), "internal error");
    }

    #[test]
    fn test_token_rejections_collapse() {
        for err in [
            TokenError::Malformed,
            TokenError::InvalidSignature,
            TokenError::AlgorithmMismatch,
            TokenError::Expired,
            TokenError::MissingClaim("role"),
            TokenError::UnknownRole,
        ] {
            assert!(matches!(
                IdentityError::from(err),
                IdentityError::TokenInvalid
            ));
        }
    }
}
