//! Login Use Case
//!
//! Verifies an email/password pair and issues an access token.

use std::sync::Arc;

use platform::password::CredentialVerifier;

use crate::application::run_blocking;
use crate::domain::entity::account::Account;
use crate::domain::repository::UserRepository;
use crate::domain::token::TokenManager;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{IdentityError, IdentityResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub account: Account,
    pub token: String,
}

/// Login use case
pub struct LoginUseCase<U, T>
where
    U: UserRepository,
    T: TokenManager,
{
    user_repo: Arc<U>,
    tokens: Arc<T>,
    verifier: Arc<CredentialVerifier>,
}

impl<U, T> LoginUseCase<U, T>
where
    U: UserRepository,
    T: TokenManager,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<T>, verifier: Arc<CredentialVerifier>) -> Self {
        Self {
            user_repo,
            tokens,
            verifier,
        }
    }

    /// Every failure before token issuance is `InvalidCredentials`, and every
    /// path spends one Argon2 verification.
    pub async fn execute(&self, input: LoginInput) -> IdentityResult<LoginOutput> {
        let password = RawPassword::presented(input.password);

        let account = match Email::new(input.email) {
            Ok(email) => self.user_repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let verifier = Arc::clone(&self.verifier);
        let checked = run_blocking(move || match account {
            Some(account) => {
                let matched = account.password_hash.verify(&verifier, &password);
                matched.then_some(account)
            }
            None => {
                verifier.verify_decoy(password.inner());
                None
            }
        })
        .await?;

        let Some(account) = checked else {
            return Err(IdentityError::InvalidCredentials);
        };

        let token = self.tokens.issue(&account.subject(), account.role)?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "User logged in"
        );

        Ok(LoginOutput { account, token })
    }
}
