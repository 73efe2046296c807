//! Application Layer
//!
//! Use cases and application services.

pub mod account_query;
pub mod config;
pub mod create_account;
pub mod login;

// Re-exports
pub use account_query::AccountQueryUseCase;
pub use config::IdentityConfig;
pub use create_account::{CreateAccountInput, CreateAccountUseCase};
pub use login::{LoginInput, LoginOutput, LoginUseCase};

use crate::error::{IdentityError, IdentityResult};

/// Run CPU-bound work (Argon2) on the blocking pool.
pub(crate) async fn run_blocking<F, R>(f: F) -> IdentityResult<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| IdentityError::Internal(format!("blocking task failed: {e}")))
}
