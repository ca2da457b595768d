//! Store trait definitions.
//!
//! These traits are the persistence boundary: the lifecycle manager and
//! resolver depend on them, and a backing engine (relational database,
//! in-memory reference implementation) supplies them. Concurrency
//! correctness lives behind this boundary - implementations must enforce
//! the uniqueness constraints atomically with the write that depends on
//! them.

use chrono::{DateTime, Utc};

use linkup_core::{Account, AccountId, BoxFuture, NewAccount, ProviderToken, SessionToken};

use crate::error::StoreResult;

/// Write payload for [`TokenRecordStore::upsert`].
#[derive(Debug, Clone)]
pub struct TokenUpsert {
    /// The owning account.
    pub account_id: AccountId,
    /// The provider email this link is for.
    pub provider_email: String,
    /// The new access token.
    pub access_token: String,
    /// The new refresh token. `None` (or empty) preserves whatever refresh
    /// token is already stored - providers do not reissue one on every
    /// exchange.
    pub refresh_token: Option<String>,
    /// The new absolute expiry, or `None` for never-expiring.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Persistence over local accounts.
///
/// Account creation elsewhere in the application (password signup) is out
/// of this crate's hands; this contract covers what the linking core needs.
pub trait AccountStore: Send + Sync {
    /// Looks up an account by id.
    fn find_by_id(&self, id: AccountId) -> BoxFuture<'_, StoreResult<Option<Account>>>;

    /// Looks up an account by its unique email.
    fn find_by_email<'a>(&'a self, email: &'a str)
    -> BoxFuture<'a, StoreResult<Option<Account>>>;

    /// Creates a new account.
    ///
    /// Fails with [`StoreError::Conflict`](crate::StoreError::Conflict)
    /// when the email is already taken; callers racing on creation convert
    /// the conflict into a lookup of the winner.
    fn create(&self, new: NewAccount) -> BoxFuture<'_, StoreResult<Account>>;

    /// Sets the display name of an account. Idempotent.
    fn update_name<'a>(
        &'a self,
        id: AccountId,
        name: &'a str,
    ) -> BoxFuture<'a, StoreResult<()>>;
}

/// Persistence over provider-token records.
///
/// Implementations enforce two uniqueness constraints atomically: one
/// record per owning account, and one record per provider email.
pub trait TokenRecordStore: Send + Sync {
    /// Looks up the record owned by an account.
    fn find_by_account(
        &self,
        account_id: AccountId,
    ) -> BoxFuture<'_, StoreResult<Option<ProviderToken>>>;

    /// Looks up the record holding a provider email.
    fn find_by_provider_email<'a>(
        &'a self,
        provider_email: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<ProviderToken>>>;

    /// Creates or rewrites the record for an account in one atomic step.
    ///
    /// An existing record keeps its creation timestamp and, when the
    /// payload carries no new refresh token, its stored refresh token.
    /// Fails with [`StoreError::Conflict`](crate::StoreError::Conflict)
    /// when the provider email is already linked to a different account.
    fn upsert(&self, upsert: TokenUpsert) -> BoxFuture<'_, StoreResult<ProviderToken>>;

    /// Rewrites the access token and expiry together after a refresh.
    ///
    /// A single write so no reader can observe a new access token paired
    /// with a stale expiry. Fails with
    /// [`StoreError::NotFound`](crate::StoreError::NotFound) when the
    /// record has meanwhile been deleted.
    fn update_access_token<'a>(
        &'a self,
        account_id: AccountId,
        access_token: &'a str,
        expires_at: Option<DateTime<Utc>>,
    ) -> BoxFuture<'a, StoreResult<ProviderToken>>;

    /// Deletes the record for an account, reporting whether one existed.
    fn delete_by_account(&self, account_id: AccountId) -> BoxFuture<'_, StoreResult<bool>>;
}

/// Persistence over application session refresh tokens.
pub trait SessionTokenStore: Send + Sync {
    /// Stores a newly issued session token.
    fn insert(&self, token: SessionToken) -> BoxFuture<'_, StoreResult<()>>;

    /// Looks up a session token by its unique token string.
    fn find_by_token<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<SessionToken>>>;

    /// Deletes a session token, reporting whether it existed.
    fn delete_by_token<'a>(&'a self, token: &'a str) -> BoxFuture<'a, StoreResult<bool>>;

    /// Deletes all session tokens of an account, returning the count.
    fn delete_by_account(&self, account_id: AccountId) -> BoxFuture<'_, StoreResult<usize>>;

    /// Deletes every session token expired at `now`, returning the count.
    fn delete_expired(&self, now: DateTime<Utc>) -> BoxFuture<'_, StoreResult<usize>>;
}
