//! JWT Token Manager
//!
//! HS256 access tokens with `sub`, `role`, `iat` and `exp` claims.
//! Expiry is checked against an injected [`Clock`] rather than inside
//! `jsonwebtoken`, with zero leeway.

use std::fmt;

use chrono::DateTime;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use platform::clock::{Clock, SystemClock};

use crate::application::config::IdentityConfig;
use crate::domain::token::{AuthClaims, TokenError, TokenManager};
use crate::domain::value_object::user_role::UserRole;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Wire form of the claims. Everything is optional on the way in so that a
/// missing claim is reported as such instead of as a parse failure.
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// [`TokenManager`] backed by `jsonwebtoken`
pub struct JwtTokenManager<C: Clock = SystemClock> {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
    clock: C,
}

impl JwtTokenManager<SystemClock> {
    pub fn new(config: &IdentityConfig) -> Result<Self, TokenError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> JwtTokenManager<C> {
    pub fn with_clock(config: &IdentityConfig, clock: C) -> Result<Self, TokenError> {
        if config.token_secret.is_empty() {
            return Err(TokenError::Encoding(
                "token signing secret is empty".to_string(),
            ));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&config.token_secret),
            decoding_key: DecodingKey::from_secret(&config.token_secret),
            validation,
            ttl_secs: i64::try_from(config.token_ttl.as_secs()).unwrap_or(i64::MAX),
            clock,
        })
    }
}

impl<C: Clock> TokenManager for JwtTokenManager<C> {
    fn issue(&self, subject: &str, role: UserRole) -> Result<String, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::MissingSubject);
        }

        let iat = self.clock.now().timestamp();
        let claims = JwtClaims {
            sub: Some(subject.to_string()),
            role: Some(role.code().to_string()),
            iat: Some(iat),
            exp: Some(iat.saturating_add(self.ttl_secs)),
        };

        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
                JwtErrorKind::InvalidAlgorithm => TokenError::AlgorithmMismatch,
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::MissingRequiredClaim(claim) => {
                    TokenError::MissingClaim(if claim == "exp" { "exp" } else { "sub" })
                }
                _ => TokenError::Malformed,
            })?;

        if data.header.alg != ALGORITHM {
            return Err(TokenError::AlgorithmMismatch);
        }

        let claims = data.claims;
        let exp = claims.exp.ok_or(TokenError::MissingClaim("exp"))?;
        let iat = claims.iat.ok_or(TokenError::MissingClaim("iat"))?;

        if self.clock.now().timestamp() >= exp {
            return Err(TokenError::Expired);
        }

        let subject = claims
            .sub
            .filter(|s| !s.trim().is_empty())
            .ok_or(TokenError::MissingClaim("sub"))?;
        let role = claims
            .role
            .filter(|r| !r.is_empty())
            .ok_or(TokenError::MissingClaim("role"))?;
        let role = UserRole::from_code(&role).ok_or(TokenError::UnknownRole)?;

        let issued_at = DateTime::from_timestamp(iat, 0).ok_or(TokenError::Malformed)?;
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(TokenError::Malformed)?;

        Ok(AuthClaims::new(subject, role, issued_at, expires_at))
    }
}

impl<C: Clock> fmt::Debug for JwtTokenManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenManager")
            .field("algorithm", &ALGORITHM)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
