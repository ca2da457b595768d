//! Google OAuth client: authorization URL, code exchange, userinfo, refresh.
//!
//! This crate speaks the provider's protocol and nothing else: it holds no
//! account state and performs no persistence. The lifecycle manager in
//! `linkup-service` composes it with the stores.
//!
//! - [`GoogleAuthClient`] - the concrete client over Google's endpoints
//! - [`IdentityProvider`] - object-safe abstraction the manager depends on
//! - [`TokenGrant`] / [`UserProfile`] - wire results
//! - [`ProviderError`] - error taxonomy for provider calls

pub mod client;
pub mod config;
pub mod error;
pub mod provider;

pub use client::{GoogleAuthClient, TokenGrant, UserProfile};
pub use config::{GoogleAuthConfig, GoogleCredentialsFile, OAuthCredentials};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::IdentityProvider;
