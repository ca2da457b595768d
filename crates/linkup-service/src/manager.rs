//! Token lifecycle manager.
//!
//! [`LinkService`] composes the provider client, the stores, and the
//! session issuer into the four operations the API surface exposes:
//! callback orchestration, on-demand access tokens with lazy refresh,
//! connection status, and disconnect.
//!
//! Requests are handled independently; there is no shared in-memory state
//! beyond the persisted records, and no background refresh loop. A token
//! is refreshed only at the moment an expired one is asked for.

use std::sync::Arc;

use tracing::{debug, info};

use linkup_core::{Account, AccountId, expires_at_from_now};
use linkup_google::IdentityProvider;
use linkup_store::{AccountStore, StoreError, TokenRecordStore, TokenUpsert};

use crate::error::{ServiceError, ServiceResult};
use crate::resolver::resolve_account;
use crate::session::{SessionBundle, SessionIssuer};

/// Whether an account has a provider connection, and to which identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// True when a provider-token record exists for the account.
    pub connected: bool,
    /// The linked provider email, when connected.
    pub email: Option<String>,
}

/// The account-linking and token-lifecycle service.
pub struct LinkService {
    provider: Arc<dyn IdentityProvider>,
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<dyn TokenRecordStore>,
    issuer: Arc<dyn SessionIssuer>,
}

impl LinkService {
    /// Creates a service over the given collaborators.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<dyn TokenRecordStore>,
        issuer: Arc<dyn SessionIssuer>,
    ) -> Self {
        Self {
            provider,
            accounts,
            tokens,
            issuer,
        }
    }

    /// Returns the provider authorization URL for the user's browser.
    pub fn authorization_url(&self) -> String {
        self.provider.authorization_url()
    }

    /// Drives the provider callback end to end.
    ///
    /// Exchanges the code, fetches the profile, resolves the local account
    /// (creating one on first provider signup), rewrites the account's
    /// provider-token record, and mints an application session.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Provider`] when the exchange or userinfo call
    ///   fails or returns a malformed body.
    /// - [`ServiceError::AlreadyLinked`] when the provider identity is
    ///   linked to a different account than the one that resolved.
    pub async fn handle_callback(
        &self,
        code: &str,
        authenticated: Option<Account>,
    ) -> ServiceResult<SessionBundle> {
        let grant = self.provider.exchange_code(code).await?;
        let profile = self.provider.fetch_user_info(&grant.access_token).await?;

        let resolution = resolve_account(
            self.accounts.as_ref(),
            self.tokens.as_ref(),
            authenticated,
            &profile,
        )
        .await?;
        let account = resolution.account;

        let expires_at = expires_at_from_now(grant.expires_in);
        self.tokens
            .upsert(TokenUpsert {
                account_id: account.id,
                provider_email: profile.email.clone(),
                access_token: grant.access_token,
                refresh_token: grant.refresh_token,
                expires_at,
            })
            .await
            .map_err(|err| match err {
                StoreError::Conflict { .. } => ServiceError::already_linked(profile.email.clone()),
                other => other.into(),
            })?;

        info!(
            "linked {} identity {} to account {}",
            self.provider.name(),
            profile.email,
            account.id
        );

        let session = self.issuer.issue(&account).await?;
        Ok(SessionBundle {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
            email: account.email,
            provider_email: profile.email,
        })
    }

    /// Returns a currently valid provider access token for the account.
    ///
    /// When the stored token has expired it is refreshed through the
    /// provider and the record rewritten before returning; callers never
    /// receive a token known to be expired. Concurrent callers may race
    /// the refresh - last writer wins on the stored fields.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotConnected`] when no record exists, or when the
    /// token has expired and no refresh token is stored (a dead-end left
    /// only by disconnecting and linking again).
    pub async fn get_access_token(&self, account_id: AccountId) -> ServiceResult<String> {
        let record = self
            .tokens
            .find_by_account(account_id)
            .await?
            .ok_or(ServiceError::NotConnected)?;

        if !record.is_expired() {
            return Ok(record.access_token);
        }

        let refresh_token = record.refresh_token.ok_or(ServiceError::NotConnected)?;
        debug!("access token for account {} expired, refreshing", account_id);

        let grant = self.provider.refresh_access_token(&refresh_token).await?;
        let expires_at = expires_at_from_now(grant.expires_in);

        match self
            .tokens
            .update_access_token(account_id, &grant.access_token, expires_at)
            .await
        {
            Ok(updated) => Ok(updated.access_token),
            // Disconnected while the refresh was in flight.
            Err(StoreError::NotFound { .. }) => Err(ServiceError::NotConnected),
            Err(err) => Err(err.into()),
        }
    }

    /// Reports whether the account has a provider connection. No network.
    pub async fn connection_status(&self, account_id: AccountId) -> ServiceResult<ConnectionStatus> {
        let record = self.tokens.find_by_account(account_id).await?;
        Ok(ConnectionStatus {
            connected: record.is_some(),
            email: record.map(|r| r.provider_email),
        })
    }

    /// Removes the account's provider connection. Idempotent.
    pub async fn disconnect(&self, account_id: AccountId) -> ServiceResult<()> {
        let removed = self.tokens.delete_by_account(account_id).await?;
        if removed {
            info!("disconnected provider link for account {}", account_id);
        }
        Ok(())
    }
}
