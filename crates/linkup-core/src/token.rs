//! Provider token records and application session tokens.

use chrono::{DateTime, Duration, Utc};

use crate::account::AccountId;

/// Seconds subtracted when converting a relative `expires_in` into an
/// absolute expiry, so refresh happens slightly before hard expiry.
pub const EXPIRY_LEEWAY_SECS: i64 = 60;

/// Converts a provider-relative `expires_in` (seconds) into an absolute
/// expiry timestamp with the standard leeway applied.
///
/// `None` means the provider did not report a lifetime; the token is
/// treated as never expiring.
pub fn expires_at_from_now(expires_in_secs: Option<i64>) -> Option<DateTime<Utc>> {
    expires_in_secs
        .map(|secs| Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_LEEWAY_SECS))
}

/// Provider-issued tokens linked to a local account.
///
/// Exactly one record exists per account, and a provider email appears in
/// at most one record; the stores enforce both. The record is rewritten in
/// place on re-link and refresh, and removed on disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderToken {
    /// The owning local account.
    pub account_id: AccountId,
    /// The provider-side email this record links to the account.
    pub provider_email: String,
    /// Opaque provider access token.
    pub access_token: String,
    /// Opaque provider refresh token. Absent when the provider did not
    /// issue one; the connection then cannot outlive the access token.
    pub refresh_token: Option<String>,
    /// Absolute access-token expiry. Absent means never-expiring.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
    /// When the record was last rewritten.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProviderToken {
    /// Returns true if the access token has reached its expiry.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }

    /// Returns true if an expired access token can be replaced.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Rewrites the access token and expiry after a successful refresh.
    pub fn apply_refresh(&mut self, access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) {
        self.access_token = access_token.into();
        self.expires_at = expires_at;
        self.updated_at = Some(Utc::now());
    }
}

/// Application-level session refresh token.
///
/// Unrelated to the provider's refresh token: these are minted by the
/// application to extend its own sessions. Many can exist per account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// The token string, unique across all session tokens.
    pub token: String,
    /// The owning account.
    pub account_id: AccountId,
    /// Absolute expiry of this session token.
    pub expires_at: DateTime<Utc>,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl SessionToken {
    /// Returns true once the token's expiry has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
