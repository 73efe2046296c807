//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of the service vocabulary:
//! - Error classification and the unified error type
//! - The JSON response envelope shared by every endpoint
//! - Typed ID wrappers
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod response;
