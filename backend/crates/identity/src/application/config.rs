//! Application Configuration
//!
//! Configuration for the Identity application layer.

use std::time::Duration;

use platform::crypto;
use platform::password::HashCost;

/// Lifetime of an access token unless configured otherwise
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Identity application configuration
#[derive(Clone)]
pub struct IdentityConfig {
    /// HMAC key for signing access tokens
    pub token_secret: Vec<u8>,
    /// Access token lifetime
    pub token_ttl: Duration,
    /// Argon2id cost for new password hashes
    pub hash_cost: HashCost,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_secret: Vec::new(),
            token_ttl: DEFAULT_TOKEN_TTL,
            hash_cost: HashCost::default(),
        }
    }
}

impl IdentityConfig {
    pub fn new(token_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            token_secret: token_secret.into(),
            ..Default::default()
        }
    }

    /// Create config with a random signing key (for development).
    /// Tokens do not survive a restart.
    pub fn development() -> Self {
        Self::new(crypto::random_bytes(32))
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IdentityConfig::development();
        assert_eq!(config.token_secret.len(), 32);
        assert_eq!(config.token_ttl, Duration::from_secs(900));
        assert_ne!(
            IdentityConfig::development().token_secret,
            config.token_secret
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = IdentityConfig::new(b"super-secret-signing-key".to_vec());
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
