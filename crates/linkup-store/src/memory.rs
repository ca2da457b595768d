//! In-memory store implementations.
//!
//! Reference implementations of the store traits, used by tests and as the
//! executable specification of the contracts: every mutation happens under
//! a single write guard, so the uniqueness checks and the writes they
//! protect are atomic. A racing second writer on the same account becomes
//! an update instead of a duplicate record.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::debug;

use linkup_core::{Account, AccountId, BoxFuture, NewAccount, ProviderToken, SessionToken};

use crate::error::{StoreError, StoreResult};
use crate::traits::{AccountStore, SessionTokenStore, TokenRecordStore, TokenUpsert};

/// In-memory [`AccountStore`].
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    inner: RwLock<AccountsInner>,
}

#[derive(Debug, Default)]
struct AccountsInner {
    next_id: i64,
    accounts: HashMap<AccountId, Account>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryAccountStore {
    fn find_by_id(&self, id: AccountId) -> BoxFuture<'_, StoreResult<Option<Account>>> {
        Box::pin(async move {
            let inner = self.inner.read().unwrap();
            Ok(inner.accounts.get(&id).cloned())
        })
    }

    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<Account>>> {
        Box::pin(async move {
            let inner = self.inner.read().unwrap();
            Ok(inner.accounts.values().find(|a| a.email == email).cloned())
        })
    }

    fn create(&self, new: NewAccount) -> BoxFuture<'_, StoreResult<Account>> {
        Box::pin(async move {
            let mut inner = self.inner.write().unwrap();

            if inner.accounts.values().any(|a| a.email == new.email) {
                return Err(StoreError::conflict(format!(
                    "email {} is already taken",
                    new.email
                )));
            }

            inner.next_id += 1;
            let account = Account {
                id: AccountId(inner.next_id),
                email: new.email,
                name: new.name,
                credential: new.credential,
                role: new.role,
                created_at: Utc::now(),
                updated_at: None,
            };
            inner.accounts.insert(account.id, account.clone());
            debug!("created account {} ({})", account.id, account.email);
            Ok(account)
        })
    }

    fn update_name<'a>(&'a self, id: AccountId, name: &'a str) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            let mut inner = self.inner.write().unwrap();
            let account = inner
                .accounts
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found(format!("account {}", id)))?;

            account.name = Some(name.to_string());
            account.updated_at = Some(Utc::now());
            Ok(())
        })
    }
}

/// In-memory [`TokenRecordStore`], keyed by owning account.
#[derive(Debug, Default)]
pub struct MemoryTokenRecordStore {
    records: RwLock<HashMap<AccountId, ProviderToken>>,
}

impl MemoryTokenRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenRecordStore for MemoryTokenRecordStore {
    fn find_by_account(
        &self,
        account_id: AccountId,
    ) -> BoxFuture<'_, StoreResult<Option<ProviderToken>>> {
        Box::pin(async move {
            let records = self.records.read().unwrap();
            Ok(records.get(&account_id).cloned())
        })
    }

    fn find_by_provider_email<'a>(
        &'a self,
        provider_email: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<ProviderToken>>> {
        Box::pin(async move {
            let records = self.records.read().unwrap();
            Ok(records
                .values()
                .find(|r| r.provider_email == provider_email)
                .cloned())
        })
    }

    fn upsert(&self, upsert: TokenUpsert) -> BoxFuture<'_, StoreResult<ProviderToken>> {
        Box::pin(async move {
            let mut records = self.records.write().unwrap();

            // One record per provider email, across all accounts.
            if records
                .values()
                .any(|r| r.provider_email == upsert.provider_email && r.account_id != upsert.account_id)
            {
                return Err(StoreError::conflict(format!(
                    "provider email {} is already linked to another account",
                    upsert.provider_email
                )));
            }

            let new_refresh = upsert.refresh_token.filter(|t| !t.is_empty());

            let record = match records.get_mut(&upsert.account_id) {
                Some(existing) => {
                    existing.provider_email = upsert.provider_email;
                    existing.access_token = upsert.access_token;
                    if let Some(refresh) = new_refresh {
                        existing.refresh_token = Some(refresh);
                    }
                    existing.expires_at = upsert.expires_at;
                    existing.updated_at = Some(Utc::now());
                    existing.clone()
                }
                None => {
                    let record = ProviderToken {
                        account_id: upsert.account_id,
                        provider_email: upsert.provider_email,
                        access_token: upsert.access_token,
                        refresh_token: new_refresh,
                        expires_at: upsert.expires_at,
                        created_at: Utc::now(),
                        updated_at: None,
                    };
                    records.insert(upsert.account_id, record.clone());
                    record
                }
            };

            debug!("stored provider token for account {}", record.account_id);
            Ok(record)
        })
    }

    fn update_access_token<'a>(
        &'a self,
        account_id: AccountId,
        access_token: &'a str,
        expires_at: Option<DateTime<Utc>>,
    ) -> BoxFuture<'a, StoreResult<ProviderToken>> {
        Box::pin(async move {
            let mut records = self.records.write().unwrap();
            let record = records
                .get_mut(&account_id)
                .ok_or_else(|| StoreError::not_found(format!("token record for account {}", account_id)))?;

            record.apply_refresh(access_token, expires_at);
            Ok(record.clone())
        })
    }

    fn delete_by_account(&self, account_id: AccountId) -> BoxFuture<'_, StoreResult<bool>> {
        Box::pin(async move {
            let mut records = self.records.write().unwrap();
            Ok(records.remove(&account_id).is_some())
        })
    }
}

/// In-memory [`SessionTokenStore`], keyed by token string.
#[derive(Debug, Default)]
pub struct MemorySessionTokenStore {
    tokens: RwLock<HashMap<String, SessionToken>>,
}

impl MemorySessionTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionTokenStore for MemorySessionTokenStore {
    fn insert(&self, token: SessionToken) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            let mut tokens = self.tokens.write().unwrap();
            if tokens.contains_key(&token.token) {
                return Err(StoreError::conflict("session token is already stored"));
            }
            tokens.insert(token.token.clone(), token);
            Ok(())
        })
    }

    fn find_by_token<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<SessionToken>>> {
        Box::pin(async move {
            let tokens = self.tokens.read().unwrap();
            Ok(tokens.get(token).cloned())
        })
    }

    fn delete_by_token<'a>(&'a self, token: &'a str) -> BoxFuture<'a, StoreResult<bool>> {
        Box::pin(async move {
            let mut tokens = self.tokens.write().unwrap();
            Ok(tokens.remove(token).is_some())
        })
    }

    fn delete_by_account(&self, account_id: AccountId) -> BoxFuture<'_, StoreResult<usize>> {
        Box::pin(async move {
            let mut tokens = self.tokens.write().unwrap();
            let before = tokens.len();
            tokens.retain(|_, t| t.account_id != account_id);
            Ok(before - tokens.len())
        })
    }

    fn delete_expired(&self, now: DateTime<Utc>) -> BoxFuture<'_, StoreResult<usize>> {
        Box::pin(async move {
            let mut tokens = self.tokens.write().unwrap();
            let before = tokens.len();
            tokens.retain(|_, t| t.expires_at > now);
            let removed = before - tokens.len();
            if removed > 0 {
                debug!("purged {} expired session tokens", removed);
            }
            Ok(removed)
        })
    }
}
