//! Domain Events
//!
//! Notifications emitted for other parts of the system. Delivery is best
//! effort: a failed publish never fails the operation that caused it.

use serde::Serialize;
use thiserror::Error;

use crate::domain::entity::account::Account;

#[derive(Debug, Error)]
#[error("event publish failed: {0}")]
pub struct PublishError(pub String);

/// Event bus port
#[trait_variant::make(EventPublisher: Send)]
pub trait LocalEventPublisher {
    /// Publish `payload` (JSON bytes) on `topic`
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError>;
}

/// Emitted after a new account has been stored
#[derive(Debug, Clone, Serialize)]
pub struct AccountCreated {
    #[serde(rename = "type")]
    kind: &'static str,
    id: String,
    email: String,
}

impl AccountCreated {
    pub const TOPIC: &'static str = "user.created";

    pub fn new(account: &Account) -> Self {
        Self {
            kind: "UserCreated",
            id: account.account_id.to_string(),
            email: account.email.as_str().to_string(),
        }
    }

    pub fn payload(&self) -> Result<Vec<u8>, PublishError> {
        serde_json::to_vec(self).map_err(|e| PublishError(e.to_string()))
    }
}
