//! IdentityProvider trait definition.
//!
//! The token lifecycle manager depends on this trait rather than on
//! [`GoogleAuthClient`] directly, so tests can script provider behavior
//! without network access. It is not a pluggability layer: the wire
//! protocol, endpoints, and parameters are Google's.

use linkup_core::BoxFuture;

use crate::client::{GoogleAuthClient, TokenGrant, UserProfile};
use crate::error::ProviderResult;

/// The outbound operations the lifecycle manager needs from the identity
/// provider.
///
/// Implementations must be `Send + Sync`; methods return boxed futures so
/// the trait stays object-safe behind `Arc<dyn IdentityProvider>`.
pub trait IdentityProvider: Send + Sync {
    /// Returns the provider name (e.g. "google").
    fn name(&self) -> &str;

    /// Builds the authorization URL for the user's browser.
    fn authorization_url(&self) -> String;

    /// Exchanges an authorization code for tokens.
    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>>;

    /// Fetches the profile for an access token.
    fn fetch_user_info<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<UserProfile>>;

    /// Obtains a new access token using a refresh token.
    fn refresh_access_token<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<TokenGrant>>;
}

impl IdentityProvider for GoogleAuthClient {
    fn name(&self) -> &str {
        "google"
    }

    fn authorization_url(&self) -> String {
        GoogleAuthClient::authorization_url(self)
    }

    fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>> {
        Box::pin(GoogleAuthClient::exchange_code(self, code))
    }

    fn fetch_user_info<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<UserProfile>> {
        Box::pin(GoogleAuthClient::fetch_user_info(self, access_token))
    }

    fn refresh_access_token<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<TokenGrant>> {
        Box::pin(GoogleAuthClient::refresh_access_token(self, refresh_token))
    }
}
