//! Application session issuance and maintenance.
//!
//! The application's own sessions are separate from the provider's tokens:
//! a successful callback ends with the application minting an access token
//! and a long-lived session refresh token. How those tokens are built
//! (JWT claims, signing) belongs to the wider application; the
//! [`SessionIssuer`] trait is the seam, and [`OpaqueSessionIssuer`] is the
//! reference implementation using random opaque tokens.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::Rng as _;
use tracing::{debug, info};

use linkup_core::{Account, AccountId, BoxFuture, SessionToken};
use linkup_store::SessionTokenStore;

use crate::error::ServiceResult;

/// Length of generated session tokens, in bytes before encoding.
const SESSION_TOKEN_LENGTH: usize = 32;

/// An application session minted after a successful callback.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Application access token.
    pub access_token: String,
    /// Application session refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// The full callback result: an issued session plus the identities it
/// connects.
#[derive(Debug, Clone)]
pub struct SessionBundle {
    /// Application access token.
    pub access_token: String,
    /// Application session refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Email of the resolved local account.
    pub email: String,
    /// Email of the provider identity that was linked.
    pub provider_email: String,
}

/// Mints application sessions for resolved accounts.
pub trait SessionIssuer: Send + Sync {
    /// Issues a new session for the account.
    fn issue<'a>(&'a self, account: &'a Account) -> BoxFuture<'a, ServiceResult<IssuedSession>>;
}

/// Session issuer producing random opaque tokens.
///
/// Refresh tokens are persisted through the [`SessionTokenStore`] so they
/// can be validated and revoked later; access tokens are left to the
/// caller's session middleware to track.
pub struct OpaqueSessionIssuer {
    store: Arc<dyn SessionTokenStore>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl OpaqueSessionIssuer {
    /// Default access token lifetime: one hour.
    pub const DEFAULT_ACCESS_TTL_SECS: i64 = 3600;

    /// Default session refresh token lifetime: fourteen days.
    pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 14;

    /// Creates an issuer over the given session store with default TTLs.
    pub fn new(store: Arc<dyn SessionTokenStore>) -> Self {
        Self {
            store,
            access_ttl: Duration::seconds(Self::DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: Duration::days(Self::DEFAULT_REFRESH_TTL_DAYS),
        }
    }

    /// Sets the access token lifetime.
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Sets the session refresh token lifetime.
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

impl SessionIssuer for OpaqueSessionIssuer {
    fn issue<'a>(&'a self, account: &'a Account) -> BoxFuture<'a, ServiceResult<IssuedSession>> {
        Box::pin(async move {
            let access_token = generate_token();
            let refresh_token = generate_token();
            let now = Utc::now();

            self.store
                .insert(SessionToken {
                    token: refresh_token.clone(),
                    account_id: account.id,
                    expires_at: now + self.refresh_ttl,
                    created_at: now,
                })
                .await?;

            debug!("issued session for account {}", account.id);
            Ok(IssuedSession {
                access_token,
                refresh_token,
                expires_in: self.access_ttl.num_seconds(),
            })
        })
    }
}

/// Maintenance operations over stored session refresh tokens.
pub struct Sessions {
    store: Arc<dyn SessionTokenStore>,
}

impl Sessions {
    /// Creates a maintenance handle over the given store.
    pub fn new(store: Arc<dyn SessionTokenStore>) -> Self {
        Self { store }
    }

    /// Looks up a session refresh token, treating an expired one as absent.
    ///
    /// An expired token found in the store is deleted on the way out.
    pub async fn validate(&self, token: &str) -> ServiceResult<Option<SessionToken>> {
        let Some(found) = self.store.find_by_token(token).await? else {
            return Ok(None);
        };
        if found.is_expired() {
            self.store.delete_by_token(token).await?;
            return Ok(None);
        }
        Ok(Some(found))
    }

    /// Revokes one session refresh token. Idempotent.
    pub async fn revoke(&self, token: &str) -> ServiceResult<bool> {
        Ok(self.store.delete_by_token(token).await?)
    }

    /// Revokes every session of an account (e.g. on logout-everywhere),
    /// returning how many were removed.
    pub async fn revoke_account(&self, account_id: AccountId) -> ServiceResult<usize> {
        let removed = self.store.delete_by_account(account_id).await?;
        if removed > 0 {
            info!("revoked {} sessions for account {}", removed, account_id);
        }
        Ok(removed)
    }

    /// Deletes every session token expired by now, returning the count.
    pub async fn purge_expired(&self) -> ServiceResult<usize> {
        self.purge_expired_at(Utc::now()).await
    }

    /// Deletes every session token expired at the given instant.
    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> ServiceResult<usize> {
        Ok(self.store.delete_expired(now).await?)
    }
}

/// Generates a random opaque token from the CSPRNG.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..SESSION_TOKEN_LENGTH).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}
