//! Presentation Layer
//!
//! HTTP handlers, DTOs, the auth gate and the router.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
