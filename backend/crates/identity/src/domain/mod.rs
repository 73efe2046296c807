//! Domain Layer
//!
//! Contains entities, value objects, and the ports the core depends on.

pub mod entity;
pub mod event;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::account::Account;
pub use event::{AccountCreated, EventPublisher, PublishError};
pub use repository::UserRepository;
pub use token::{AuthClaims, TokenError, TokenManager};
