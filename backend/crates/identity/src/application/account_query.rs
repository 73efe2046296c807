//! Account Query Use Case
//!
//! Read-side access to accounts for the current-user and admin endpoints.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::account_id::AccountId;
use crate::error::{IdentityError, IdentityResult};

pub struct AccountQueryUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> AccountQueryUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// All accounts, newest first
    pub async fn list(&self) -> IdentityResult<Vec<Account>> {
        self.user_repo.list().await
    }

    /// Account behind a token subject
    pub async fn get(&self, subject: &str) -> IdentityResult<Account> {
        let account_id: AccountId = subject
            .parse()
            .map_err(|_| IdentityError::AccountNotFound)?;

        self.user_repo
            .find_by_id(&account_id)
            .await?
            .ok_or(IdentityError::AccountNotFound)
    }
}
