//! Auth Gate
//!
//! Two request stages for protected routes:
//! - `authenticate`: bearer token → verified [`AuthClaims`] in the request
//!   extensions
//! - `authorize`: the caller's role must be in the route's [`AllowedRoles`]
//!
//! `authenticate` must wrap `authorize`. Handlers read the claims through the
//! [`CurrentUser`] extractor.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::{BearerError, extract_bearer_token};

use crate::domain::token::{AuthClaims, TokenManager};
use crate::domain::value_object::user_role::UserRole;
use crate::error::IdentityError;

// ============================================================================
// Authenticate
// ============================================================================

/// Turns a bearer token into verified claims
pub struct AuthGate<T: TokenManager> {
    tokens: Arc<T>,
}

impl<T: TokenManager> AuthGate<T> {
    pub fn new(tokens: Arc<T>) -> Self {
        Self { tokens }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthClaims, IdentityError> {
        let token = extract_bearer_token(headers).map_err(|e| {
            IdentityError::Unauthorized(match e {
                BearerError::MissingHeader => "missing authorization header",
                BearerError::InvalidHeader
                | BearerError::InvalidScheme
                | BearerError::EmptyToken => "invalid authorization header",
            })
        })?;

        Ok(self.tokens.verify(token)?)
    }
}

impl<T: TokenManager> Clone for AuthGate<T> {
    fn clone(&self) -> Self {
        Self {
            tokens: Arc::clone(&self.tokens),
        }
    }
}

/// Middleware that requires a valid bearer token
pub async fn authenticate<T: TokenManager>(
    State(gate): State<AuthGate<T>>,
    mut req: Request,
    next: Next,
) -> Result<Response, IdentityError> {
    let claims = gate.authenticate(req.headers())?;

    tracing::debug!(subject = claims.subject(), role = %claims.role(), "Request authenticated");

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// ============================================================================
// Authorize
// ============================================================================

/// Roles admitted to a route. Empty admits any authenticated caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedRoles(Vec<UserRole>);

impl AllowedRoles {
    pub fn new(roles: impl IntoIterator<Item = UserRole>) -> Self {
        Self(roles.into_iter().collect())
    }

    pub fn any_authenticated() -> Self {
        Self::default()
    }

    pub fn admits(&self, role: UserRole) -> bool {
        self.0.is_empty() || self.0.contains(&role)
    }

    /// Check claims left by `authenticate`. Absent claims mean the stages
    /// were wired in the wrong order, which is a server fault.
    pub fn authorize(&self, claims: Option<&AuthClaims>) -> Result<(), IdentityError> {
        let claims = claims.ok_or(IdentityError::MissingAuthContext)?;

        if self.admits(claims.role()) {
            Ok(())
        } else {
            Err(IdentityError::Forbidden)
        }
    }
}

/// Middleware that restricts a route to [`AllowedRoles`]
pub async fn authorize(
    State(allowed): State<AllowedRoles>,
    req: Request,
    next: Next,
) -> Result<Response, IdentityError> {
    allowed.authorize(req.extensions().get::<AuthClaims>())?;
    Ok(next.run(req).await)
}

// ============================================================================
// Extractor
// ============================================================================

/// Verified caller of the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthClaims);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthClaims>()
            .cloned()
            .map(CurrentUser)
            .ok_or(IdentityError::MissingAuthContext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn claims(role: UserRole) -> AuthClaims {
        let now = Utc::now();
        AuthClaims::new("user-1".to_string(), role, now, now)
    }

    #[test]
    fn test_authorize_roles() {
        let admin_only = AllowedRoles::new([UserRole::Admin]);
        assert!(admin_only.authorize(Some(&claims(UserRole::Admin))).is_ok());
        assert!(matches!(
            admin_only.authorize(Some(&claims(UserRole::User))),
            Err(IdentityError::Forbidden)
        ));
    }

    #[test]
    fn test_empty_set_admits_any_authenticated() {
        let any = AllowedRoles::any_authenticated();
        for role in UserRole::ALL {
            assert!(any.authorize(Some(&claims(role))).is_ok());
        }
    }

    #[test]
    fn test_missing_claims_is_server_fault() {
        let any = AllowedRoles::any_authenticated();
        assert!(matches!(
            any.authorize(None),
            Err(IdentityError::MissingAuthContext)
        ));
    }
}
