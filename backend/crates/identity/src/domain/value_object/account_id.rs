pub use kernel::id::AccountId;
