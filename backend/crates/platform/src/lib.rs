//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing and verification (Argon2id)
//! - Bearer token extraction from the `Authorization` header
//! - Clock abstraction for expiry checks
//! - Cryptographic utilities (random bytes, Base64)

pub mod bearer;
pub mod clock;
pub mod crypto;
pub mod password;
