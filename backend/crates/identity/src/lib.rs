//! Identity & Access Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, and the ports the core depends on
//! - `application/` - Use cases (login, account creation, account queries)
//! - `infra/` - JWT signing, PostgreSQL and in-memory stores, event publishers
//! - `presentation/` - HTTP handlers, DTOs, the auth gate, router
//!
//! ## Security Model
//! - Passwords hashed with Argon2id; a failed login looks the same whether the
//!   email is unknown, the password is wrong or the stored hash is corrupt
//! - Stateless HS256 access tokens (`sub`, `role`, `iat`, `exp`), 15 minutes
//!   by default; rotating the signing secret invalidates all of them
//! - Protected routes run `authenticate` then `authorize`; the closed role
//!   set is `user` and `admin`

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use domain::token::{AuthClaims, TokenManager};
pub use domain::value_object::user_role::UserRole;
pub use error::{IdentityError, IdentityResult};
pub use infra::{
    InMemoryUserRepository, JwtTokenManager, LogEventPublisher, NoopEventPublisher,
    PgUserRepository,
};
pub use presentation::handlers::IdentityState;
pub use presentation::router::identity_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
