//! Create Account Use Case
//!
//! Hashes the password, stores the account and announces it.

use std::sync::Arc;

use platform::password::CredentialVerifier;

use crate::application::run_blocking;
use crate::domain::entity::account::Account;
use crate::domain::event::{AccountCreated, EventPublisher};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{IdentityError, IdentityResult};

/// Maximum display name length in characters
pub const NAME_MAX_LENGTH: usize = 100;

/// Create account input
pub struct CreateAccountInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

/// Create account use case
pub struct CreateAccountUseCase<U, P>
where
    U: UserRepository,
    P: EventPublisher,
{
    user_repo: Arc<U>,
    publisher: Arc<P>,
    verifier: Arc<CredentialVerifier>,
}

impl<U, P> CreateAccountUseCase<U, P>
where
    U: UserRepository,
    P: EventPublisher,
{
    pub fn new(user_repo: Arc<U>, publisher: Arc<P>, verifier: Arc<CredentialVerifier>) -> Self {
        Self {
            user_repo,
            publisher,
            verifier,
        }
    }

    pub async fn execute(&self, input: CreateAccountInput) -> IdentityResult<Account> {
        let email = Email::new(input.email)?;
        let name = validate_name(&input.name)?;
        let raw_password = RawPassword::new(input.password)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailTaken);
        }

        let verifier = Arc::clone(&self.verifier);
        let password_hash =
            run_blocking(move || UserPassword::hash(&verifier, &raw_password)).await??;

        let account = Account::new(email, name, input.role, password_hash);

        // A concurrent registration can still win the race; the store
        // reports it as EmailTaken.
        self.user_repo.create(&account).await?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "Account created"
        );

        self.announce(&account).await;

        Ok(account)
    }

    /// Publish `user.created`. Failures are logged; the account stays.
    async fn announce(&self, account: &Account) {
        let event = AccountCreated::new(account);
        let result = match event.payload() {
            Ok(payload) => self.publisher.publish(AccountCreated::TOPIC, payload).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(
                account_id = %account.account_id,
                topic = AccountCreated::TOPIC,
                error = %e,
                "Failed to publish account event"
            );
        }
    }
}

fn validate_name(name: &str) -> IdentityResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(IdentityError::Validation("name is required".to_string()));
    }
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(IdentityError::Validation(format!(
            "name must be at most {} characters",
            NAME_MAX_LENGTH
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(IdentityError::Validation(
            "name contains invalid characters".to_string(),
        ));
    }
    Ok(name.to_string())
}
