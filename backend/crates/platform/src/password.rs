//! Password Hashing and Verification
//!
//! The credential verifier of the identity core:
//! - Argon2id hashing with a per-call random salt embedded in the PHC string
//! - Cost parameters fixed at construction ([`HashCost`])
//! - Verification that never errors: malformed, empty or foreign-format stored
//!   values simply fail, after the same amount of work as a real check
//! - Zeroization of clear text passwords
//!
//! ## Usage
//! ```rust
//! use platform::password::{ClearTextPassword, CredentialVerifier, HashCost};
//!
//! let verifier = CredentialVerifier::new(HashCost::default())?;
//! let password = ClearTextPassword::new("correct horse battery".to_string())?;
//! let stored = verifier.hash(&password)?;
//! assert!(verifier.verify(&stored, &password));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{self, SaltString},
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto;

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length accepted at account creation
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length accepted at account creation
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("password contains invalid control characters")]
    InvalidCharacter,

    #[error("password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Cost parameters rejected by Argon2
    #[error("invalid hash cost: {0}")]
    InvalidCost(String),

    #[error("password hashing failed: {0}")]
    HashingFailed(String),
}

// ============================================================================
// Hash Cost
// ============================================================================

/// Argon2id cost parameters
///
/// `iterations` is the tunable cost factor. The defaults follow the OWASP
/// recommendation (m=19456 KiB, t=2, p=1), which costs tens of milliseconds
/// per hash on current hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub iterations: u32,
    pub memory_kib: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            iterations: Params::DEFAULT_T_COST,
            memory_kib: Params::DEFAULT_M_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashCost {
    fn params(&self) -> Result<Params, PasswordHashError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidCost(e.to_string()))
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Unicode is NFKC-normalized on construction so the same password typed on
/// different keyboards hashes identically.
///
/// Does not implement `Clone`, and `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a password for a new credential, enforcing the policy:
    /// - between [`MIN_PASSWORD_LENGTH`] and [`MAX_PASSWORD_LENGTH`] code points
    /// - not whitespace only
    /// - no control characters other than space, tab, newline
    /// - not a common password or a sequential / keyboard pattern
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let password = Self::unchecked(raw);
        let normalized = password.0.as_str();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(normalized) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(password)
    }

    /// Normalize without applying the policy.
    ///
    /// Used for login attempts: whatever the caller typed is checked against
    /// the stored hash, policy or not.
    pub fn unchecked(raw: String) -> Self {
        let normalized: String = raw.nfkc().collect();
        let mut raw = raw;
        raw.zeroize();
        Self(normalized)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Stored password digest in PHC string format
///
/// `$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`: algorithm, parameters and
/// salt travel with the digest.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Wrap a value read from storage.
    ///
    /// No validation happens here: a corrupt value must behave exactly like a
    /// wrong password, so the format is only inspected inside
    /// [`CredentialVerifier::verify`].
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Credential Verifier
// ============================================================================

/// How a stored digest was judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Match,
    Mismatch,
    /// Stored value could not be evaluated; the decoy was verified instead
    Unverifiable,
}

/// Hashes new credentials and checks presented ones
///
/// Cheap to clone; meant to be built once from configuration and shared.
/// Both operations are CPU-bound and should run off the async
/// executor (`tokio::task::spawn_blocking`).
#[derive(Clone)]
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
    /// Digest of a random secret, verified against when there is nothing real
    /// to verify so every path costs one Argon2 evaluation.
    decoy: HashedPassword,
}

impl CredentialVerifier {
    pub fn new(cost: HashCost) -> Result<Self, PasswordHashError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, cost.params()?);

        let decoy_secret = ClearTextPassword(crypto::to_base64(&crypto::random_bytes(32)));
        let decoy = hash_with(&argon2, &decoy_secret)?;

        Ok(Self { argon2, decoy })
    }

    /// Hash a password with a fresh 128-bit salt.
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        hash_with(&self.argon2, password)
    }

    /// Check a password against a stored digest.
    ///
    /// Parameters and salt come from the stored value; the final comparison
    /// is constant-time. Returns `false` (never an error) for empty
    /// passwords and for stored values that are empty, malformed, or not
    /// Argon2 (legacy SHA-256 hex, bcrypt).
    pub fn verify(&self, stored: &HashedPassword, password: &ClearTextPassword) -> bool {
        self.check(stored, password) == Check::Match && !password.is_empty()
    }

    /// Every outcome costs one Argon2 evaluation: stored values that cannot
    /// be evaluated are replaced by the decoy.
    fn check(&self, stored: &HashedPassword, password: &ClearTextPassword) -> Check {
        let parsed = match PasswordHash::new(stored.as_phc_string()) {
            Ok(h)
                if Algorithm::try_from(h.algorithm).is_ok()
                    && h.salt.is_some()
                    && h.hash.is_some() =>
            {
                h
            }
            _ => {
                tracing::debug!("Stored password hash is not a valid Argon2 PHC string");
                self.verify_decoy(password);
                return Check::Unverifiable;
            }
        };

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Check::Match,
            Err(password_hash::Error::Password) => Check::Mismatch,
            // Out-of-range parameters or a short salt fail before any work
            Err(e) => {
                tracing::debug!(error = %e, "Stored password hash has unusable parameters");
                self.verify_decoy(password);
                Check::Unverifiable
            }
        }
    }

    /// Spend one verification without a real credential.
    ///
    /// Called when the account does not exist, so that response time does not
    /// reveal whether an email is registered.
    pub fn verify_decoy(&self, password: &ClearTextPassword) {
        if let Ok(parsed) = PasswordHash::new(self.decoy.as_phc_string()) {
            let _ = self.argon2.verify_password(password.as_bytes(), &parsed);
        }
    }
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}

fn hash_with(
    argon2: &Argon2<'static>,
    password: &ClearTextPassword,
) -> Result<HashedPassword, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

    Ok(HashedPassword {
        hash: hash.to_string(),
    })
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check for common weak patterns
fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    // All the same character (e.g. "aaaaaaaa")
    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];
    if KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "abcdefgh",
        "letmein1",
        "welcome1",
        "admin123",
        "iloveyou",
        "sunshine",
        "princess",
        "football",
        "baseball",
        "trustno1",
    ];
    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Whole-string ascending or descending digit runs (e.g. "12345678", "98765432")
fn is_sequential_numbers(s: &str) -> bool {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 4 {
        return false;
    }

    let ascending = digits.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let descending = digits.windows(2).all(|w| w[0] == (w[1] + 1) % 10);

    ascending || descending
}

// ============================================================================
// Tests
// ============================================================================
