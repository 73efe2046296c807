//! Access Tokens
//!
//! The claims carried by a signed access token and the port that issues and
//! verifies them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::value_object::user_role::UserRole;

/// Why a token could not be issued or was rejected.
///
/// Callers at the HTTP boundary collapse every rejection into a single
/// "invalid or expired token" response; the distinction is kept for logs
/// and tests.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a well-formed JWT")]
    Malformed,

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token is not signed with HS256")]
    AlgorithmMismatch,

    #[error("token has expired")]
    Expired,

    #[error("token is missing the `{0}` claim")]
    MissingClaim(&'static str),

    #[error("token carries an unknown role")]
    UnknownRole,

    #[error("cannot issue a token for an empty subject")]
    MissingSubject,

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Verified identity of the caller
///
/// Only a successful [`TokenManager::verify`] produces one, so holding an
/// `AuthClaims` means the token was authentic and unexpired when checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthClaims {
    subject: String,
    role: UserRole,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthClaims {
    pub(crate) fn new(
        subject: String,
        role: UserRole,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject,
            role,
            issued_at,
            expires_at,
        }
    }

    /// Account id of the caller, as a string
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Issues and verifies signed access tokens
///
/// Synchronous: signing is a single HMAC and never blocks.
pub trait TokenManager: Send + Sync + 'static {
    /// Sign a token for `subject` with `role`, valid for the configured TTL.
    fn issue(&self, subject: &str, role: UserRole) -> Result<String, TokenError>;

    /// Check signature, algorithm, expiry and required claims.
    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError>;
}

impl<T: TokenManager> TokenManager for std::sync::Arc<T> {
    fn issue(&self, subject: &str, role: UserRole) -> Result<String, TokenError> {
        (**self).issue(subject, role)
    }

    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError> {
        (**self).verify(token)
    }
}
