//! Account Entity
//!
//! The credential record owned by the user store. The core reads it at login
//! and builds a fresh one at account creation; it never mutates a stored one.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::AccountId, email::Email, user_password::UserPassword, user_role::UserRole,
};

#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    /// Login identifier (unique, lowercased)
    pub email: Email,
    /// Display name
    pub name: String,
    pub role: UserRole,
    pub password_hash: UserPassword,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(email: Email, name: String, role: UserRole, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            email,
            name,
            role,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Token subject for this account
    pub fn subject(&self) -> String {
        self.account_id.to_string()
    }
}
