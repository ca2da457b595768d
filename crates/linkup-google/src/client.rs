//! Google OAuth protocol client.
//!
//! Implements the client side of the server-side authorization-code flow:
//! building the consent URL, exchanging the callback code for tokens,
//! fetching the userinfo profile, and refreshing access tokens.
//!
//! The client performs no retries and holds no state; every failure is
//! surfaced synchronously as a [`ProviderError`].

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::GoogleAuthConfig;
use crate::error::{ProviderError, ProviderResult};

/// Google OAuth endpoints.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Tokens returned by Google's token endpoint.
///
/// `refresh_token` is only present when Google decides to issue one (first
/// consent, or forced re-consent). `expires_in` is relative seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    /// The access token for API requests.
    pub access_token: String,
    /// The refresh token, when one was issued.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds, when reported.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Profile data from the userinfo endpoint.
///
/// Email is the only field this client requires; everything else Google
/// returns is ignored except the best-effort display name.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    /// The Google account's email address.
    pub email: String,
    /// The account's display name, if present.
    #[serde(default)]
    pub name: Option<String>,
}

/// Client for Google's OAuth token and userinfo endpoints.
#[derive(Debug)]
pub struct GoogleAuthClient {
    config: GoogleAuthConfig,
    http_client: reqwest::Client,
}

impl GoogleAuthClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the credentials, redirect URI, or
    /// scopes fail validation.
    pub fn new(config: GoogleAuthConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to create HTTP client");

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Builds the authorization URL the user's browser is sent to.
    ///
    /// Always requests offline access and forced re-consent so Google
    /// issues a refresh token even when the user consented before.
    /// Deterministic; performs no I/O.
    pub fn authorization_url(&self) -> String {
        let scope = self.config.scopes.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.config.credentials.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scope),
        )
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> ProviderResult<TokenGrant> {
        let params = [
            ("client_id", self.config.credentials.client_id.as_str()),
            ("client_secret", self.config.credentials.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let grant = self.token_request(&params, "token exchange").await?;
        info!("exchanged authorization code for tokens");
        Ok(grant)
    }

    /// Obtains a new access token using a refresh token.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> ProviderResult<TokenGrant> {
        let params = [
            ("client_id", self.config.credentials.client_id.as_str()),
            ("client_secret", self.config.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let grant = self.token_request(&params, "token refresh").await?;
        debug!("refreshed access token");
        Ok(grant)
    }

    /// Fetches the userinfo profile for an access token.
    pub async fn fetch_user_info(&self, access_token: &str) -> ProviderResult<UserProfile> {
        let response = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("userinfo request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::authentication(
                "access token expired or invalid",
            ));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::rate_limited("userinfo rate limit exceeded"));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::server(format!(
                "userinfo request failed ({}): {}",
                status, body
            )));
        }

        let profile: UserProfile = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid userinfo response: {}", e))
        })?;

        Ok(profile)
    }

    /// Submits a form-encoded request to the token endpoint.
    async fn token_request(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> ProviderResult<TokenGrant> {
        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(params)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "{} failed ({}): {}",
                what, status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("invalid token response: {}", e)))
    }
}
