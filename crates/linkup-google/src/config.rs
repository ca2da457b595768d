//! Google OAuth client configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// OAuth 2.0 credentials for Google API access.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
}

/// Structure of Google's OAuth credentials JSON file.
///
/// Supports multiple formats:
/// 1. Google Cloud Console format with a "web" or "installed" section
/// 2. Flat format with client_id and client_secret at root level
#[derive(Debug, Deserialize)]
pub struct GoogleCredentialsFile {
    /// Credentials for web applications.
    pub web: Option<NestedCredentials>,
    /// Credentials for installed (desktop) applications.
    pub installed: Option<NestedCredentials>,
    /// Direct client_id (flat format).
    pub client_id: Option<String>,
    /// Direct client_secret (flat format).
    pub client_secret: Option<String>,
}

/// OAuth credentials within a nested section of the credentials JSON file.
#[derive(Debug, Deserialize)]
pub struct NestedCredentials {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads OAuth credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("failed to read credentials file: {}", e))?;
        Self::from_json(&content)
    }

    /// Parses OAuth credentials from a Google credentials JSON string.
    ///
    /// Supports the Cloud Console format (`{"web": {...}}` or
    /// `{"installed": {...}}`) and the flat format with `client_id` and
    /// `client_secret` at the root level.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: GoogleCredentialsFile = serde_json::from_str(json)
            .map_err(|e| format!("failed to parse credentials JSON: {}", e))?;

        if let Some(creds) = file.web.or(file.installed) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err("credentials file must contain a 'web'/'installed' section or 'client_id'/'client_secret' at root level".to_string())
    }

    /// Validates that the credentials appear to be correctly formatted.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for the Google auth client.
#[derive(Debug, Clone)]
pub struct GoogleAuthConfig {
    /// OAuth credentials for API access.
    pub credentials: OAuthCredentials,

    /// The redirect URI registered for this client.
    ///
    /// Google sends the authorization code here; it must match the Cloud
    /// Console registration exactly.
    pub redirect_uri: String,

    /// OAuth scopes to request.
    ///
    /// Defaults to the userinfo email and profile scopes.
    pub scopes: Vec<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,
}

impl GoogleAuthConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default OAuth scopes: enough to read the account's email and name.
    pub const DEFAULT_SCOPES: [&'static str; 2] = [
        "https://www.googleapis.com/auth/userinfo.email",
        "https://www.googleapis.com/auth/userinfo.profile",
    ];

    /// Creates a new configuration with the given credentials and redirect URI.
    pub fn new(credentials: OAuthCredentials, redirect_uri: impl Into<String>) -> Self {
        Self {
            credentials,
            redirect_uri: redirect_uri.into(),
            scopes: Self::DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("linkup/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Adds an OAuth scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        Url::parse(&self.redirect_uri)
            .map_err(|e| format!("invalid redirect_uri: {}", e))?;

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> OAuthCredentials {
        OAuthCredentials::new("test-client.apps.googleusercontent.com", "test-secret")
    }

    fn test_config() -> GoogleAuthConfig {
        GoogleAuthConfig::new(test_credentials(), "https://app.example.com/callback")
    }

    #[test]
    fn credentials_validation() {
        let valid = test_credentials();
        assert!(valid.validate().is_ok());

        let empty_id = OAuthCredentials::new("", "secret");
        assert!(empty_id.validate().is_err());

        let bad_id = OAuthCredentials::new("bad-id", "secret");
        assert!(bad_id.validate().is_err());

        let empty_secret = OAuthCredentials::new("test.apps.googleusercontent.com", "");
        assert!(empty_secret.validate().is_err());
    }

    #[test]
    fn config_defaults() {
        let config = test_config();
        assert_eq!(config.scopes.len(), 2);
        assert!(config.scopes[0].contains("userinfo.email"));
        assert_eq!(
            config.timeout,
            Duration::from_secs(GoogleAuthConfig::DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn config_validation() {
        assert!(test_config().validate().is_ok());

        let bad_uri = GoogleAuthConfig::new(test_credentials(), "not a url");
        assert!(bad_uri.validate().is_err());

        let no_scopes = test_config().with_scopes(vec![]);
        assert!(no_scopes.validate().is_err());
    }

    #[test]
    fn config_builder_methods() {
        let config = test_config()
            .with_scopes(vec!["https://www.googleapis.com/auth/userinfo.email".into()])
            .with_scope("https://www.googleapis.com/auth/calendar.readonly")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("custom/1.0");

        assert_eq!(config.scopes.len(), 2);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "custom/1.0");
    }

    #[test]
    fn credentials_from_json_web() {
        let json = r#"{
            "web": {
                "client_id": "web-id.apps.googleusercontent.com",
                "client_secret": "web-secret"
            }
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "web-secret");
    }

    #[test]
    fn credentials_from_json_installed() {
        let json = r#"{
            "installed": {
                "client_id": "test-id.apps.googleusercontent.com",
                "client_secret": "test-secret"
            }
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-id.apps.googleusercontent.com");
    }

    #[test]
    fn credentials_from_json_flat() {
        let json = r#"{
            "client_id": "flat-id.apps.googleusercontent.com",
            "client_secret": "flat-secret"
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "flat-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "flat-secret");
    }

    #[test]
    fn credentials_from_json_invalid() {
        let json = r#"{ "other": {} }"#;
        let result = OAuthCredentials::from_json(json);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("client_id"));
    }

    #[test]
    fn credentials_from_json_malformed() {
        let json = "not json";
        let result = OAuthCredentials::from_json(json);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("parse"));
    }
}
