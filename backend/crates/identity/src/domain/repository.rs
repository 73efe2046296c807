//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infrastructure
//! layer.

use crate::domain::entity::account::Account;
use crate::domain::value_object::{account_id::AccountId, email::Email};
use crate::error::IdentityResult;

/// User store
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Find an account by its (normalized) email
    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<Account>>;

    /// Find an account by id
    async fn find_by_id(&self, account_id: &AccountId) -> IdentityResult<Option<Account>>;

    /// Persist a new account. Fails with `EmailTaken` if the email is in use.
    async fn create(&self, account: &Account) -> IdentityResult<()>;

    /// All accounts, newest first
    async fn list(&self) -> IdentityResult<Vec<Account>>;
}
