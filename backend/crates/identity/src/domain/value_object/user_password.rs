//! User Password Value Objects
//!
//! Domain wrappers over `platform::password`. [`RawPassword`] is what the
//! caller typed; [`UserPassword`] is the digest kept on the account record.

use platform::password::{ClearTextPassword, CredentialVerifier, HashedPassword};
use std::fmt;

use crate::error::IdentityError;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input, zeroized on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Password for a new account; the password policy applies.
    pub fn new(raw: String) -> Result<Self, IdentityError> {
        ClearTextPassword::new(raw)
            .map(Self)
            .map_err(|e| IdentityError::PasswordPolicy(e.to_string()))
    }

    /// Password presented at login; checked against the stored digest only.
    pub fn presented(raw: String) -> Self {
        Self(ClearTextPassword::unchecked(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Stored password digest (Argon2id PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn hash(verifier: &CredentialVerifier, raw: &RawPassword) -> Result<Self, IdentityError> {
        verifier
            .hash(raw.inner())
            .map(Self)
            .map_err(|e| IdentityError::Internal(e.to_string()))
    }

    /// Wrap the value read from storage. Corrupt values are accepted here and
    /// fail at verification time like any wrong password.
    pub fn from_db(phc_string: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored(phc_string))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, verifier: &CredentialVerifier, raw: &RawPassword) -> bool {
        verifier.verify(&self.0, raw.inner())
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::HashCost;

    fn verifier() -> CredentialVerifier {
        CredentialVerifier::new(HashCost {
            iterations: 1,
            memory_kib: 1024,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_new_applies_policy() {
        assert!(RawPassword::new("ValidPass123!".to_string()).is_ok());
        assert!(matches!(
            RawPassword::new("short".to_string()),
            Err(IdentityError::PasswordPolicy(_))
        ));
        assert!(matches!(
            RawPassword::new("password123".to_string()),
            Err(IdentityError::PasswordPolicy(_))
        ));
    }

    #[test]
    fn test_presented_skips_policy() {
        // Short passwords still get compared (and rejected) by hash
        let verifier = verifier();
        let stored =
            UserPassword::hash(&verifier, &RawPassword::new("TestPassword123!".into()).unwrap())
                .unwrap();
        assert!(!stored.verify(&verifier, &RawPassword::presented("short".into())));
    }

    #[test]
    fn test_hash_verify_and_db_roundtrip() {
        let verifier = verifier();
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let stored = UserPassword::hash(&verifier, &raw).unwrap();

        let restored = UserPassword::from_db(stored.as_phc_string().to_string());
        assert!(restored.verify(&verifier, &RawPassword::presented("TestPassword123!".into())));
        assert!(!restored.verify(&verifier, &RawPassword::presented("TestPassword124!".into())));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword123!".to_string()).unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("Secret"));

        let stored = UserPassword::from_db("$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA");
        assert!(!format!("{:?}", stored).contains("argon2id"));
    }
}
