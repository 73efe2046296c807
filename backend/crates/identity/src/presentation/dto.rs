//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::account::Account;
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::{IdentityError, IdentityResult};

/// Minimum password length accepted by the login form
pub const LOGIN_PASSWORD_MIN_LENGTH: usize = 6;

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Shape check only; credentials are judged by the login use case.
    pub fn validate(&self) -> IdentityResult<()> {
        let mut problems = Vec::new();

        if self.email.trim().is_empty() {
            problems.push("email is required".to_string());
        } else if Email::new(&self.email).is_err() {
            problems.push("email must be a valid email address".to_string());
        }

        if self.password.is_empty() {
            problems.push("password is required".to_string());
        } else if self.password.chars().count() < LOGIN_PASSWORD_MIN_LENGTH {
            problems.push(format!(
                "password must be at least {} characters",
                LOGIN_PASSWORD_MIN_LENGTH
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(IdentityError::Validation(problems.join("; ")))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

// ============================================================================
// Account creation
// ============================================================================

/// Self-service registration; always creates a `user`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Admin account creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

// ============================================================================
// Accounts
// ============================================================================

/// Public view of an account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.account_id.to_string(),
            email: account.email.as_str().to_string(),
            name: account.name.clone(),
            role: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
