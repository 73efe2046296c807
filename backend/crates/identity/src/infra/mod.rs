//! Infrastructure Layer
//!
//! Adapters for the domain ports: token signing, persistence, event bus.

pub mod event;
pub mod jwt;
pub mod memory;
pub mod postgres;

pub use event::{LogEventPublisher, NoopEventPublisher};
pub use jwt::JwtTokenManager;
pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;
