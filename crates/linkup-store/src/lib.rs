//! Storage contracts for accounts, provider tokens, and session tokens.
//!
//! This crate defines the persistence boundary of the linking core:
//!
//! - [`AccountStore`] - local account lookup and provider-signup creation
//! - [`TokenRecordStore`] - one provider-token record per account, with an
//!   atomic conditional insert-or-update
//! - [`SessionTokenStore`] - application session refresh tokens
//! - [`StoreError`] - storage error taxonomy
//!
//! The in-memory implementations in [`memory`] double as the executable
//! specification of the contracts; a relational backend replaces them in
//! production without the callers changing.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryAccountStore, MemorySessionTokenStore, MemoryTokenRecordStore};
pub use traits::{AccountStore, SessionTokenStore, TokenRecordStore, TokenUpsert};
