//! Value Object Module

pub mod account_id;
pub mod email;
pub mod user_password;
pub mod user_role;
