//! API surface: request handling and wire types.
//!
//! A framework-agnostic handler layer over [`LinkService`]. The HTTP
//! server mounts these five operations however it routes; authentication
//! middleware supplies the `Account` where one is required. Response
//! bodies serialize camelCase.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use linkup_core::Account;

use crate::error::{ServiceError, ServiceResult};
use crate::manager::{ConnectionStatus, LinkService};
use crate::session::SessionBundle;

/// Response for the authorization-URL operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUrlResponse {
    /// The provider consent URL to open in the user's browser.
    pub url: String,
}

/// Response for the callback operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    /// Application access token.
    pub access_token: String,
    /// Application session refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Email of the local account.
    pub email: String,
    /// Email of the linked provider identity.
    pub provider_email: String,
}

impl From<SessionBundle> for CallbackResponse {
    fn from(bundle: SessionBundle) -> Self {
        Self {
            access_token: bundle.access_token,
            refresh_token: bundle.refresh_token,
            expires_in: bundle.expires_in,
            email: bundle.email,
            provider_email: bundle.provider_email,
        }
    }
}

/// Response for the connection-status operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Whether a provider connection exists.
    pub connected: bool,
    /// The linked provider email, when connected.
    pub email: Option<String>,
}

impl From<ConnectionStatus> for StatusResponse {
    fn from(status: ConnectionStatus) -> Self {
        Self {
            connected: status.connected,
            email: status.email,
        }
    }
}

/// Response for the access-token operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    /// A currently valid provider access token.
    pub access_token: String,
}

/// Wire shape of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code (see [`ServiceError::code`]).
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// The five operations of the linking API.
pub struct Api {
    service: Arc<LinkService>,
}

impl Api {
    /// Creates the API over a service.
    pub fn new(service: Arc<LinkService>) -> Self {
        Self { service }
    }

    /// `GET /authorization-url`
    pub fn authorization_url(&self) -> AuthUrlResponse {
        AuthUrlResponse {
            url: self.service.authorization_url(),
        }
    }

    /// `GET /callback?code=...`, with the authenticated account when the
    /// caller holds a session (linking mode).
    pub async fn callback(
        &self,
        code: &str,
        authenticated: Option<Account>,
    ) -> ServiceResult<CallbackResponse> {
        let bundle = self.service.handle_callback(code, authenticated).await?;
        Ok(bundle.into())
    }

    /// `GET /status` (authenticated)
    pub async fn status(&self, account: &Account) -> ServiceResult<StatusResponse> {
        let status = self.service.connection_status(account.id).await?;
        Ok(status.into())
    }

    /// `GET /token` (authenticated)
    pub async fn token(&self, account: &Account) -> ServiceResult<AccessTokenResponse> {
        let access_token = self.service.get_access_token(account.id).await?;
        Ok(AccessTokenResponse { access_token })
    }

    /// `DELETE /disconnect` (authenticated)
    pub async fn disconnect(&self, account: &Account) -> ServiceResult<()> {
        self.service.disconnect(account.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use linkup_core::BoxFuture;
    use linkup_google::{IdentityProvider, ProviderResult, TokenGrant, UserProfile};
    use linkup_store::{
        AccountStore, MemoryAccountStore, MemorySessionTokenStore, MemoryTokenRecordStore,
    };

    use crate::session::OpaqueSessionIssuer;

    /// Provider returning one fixed identity, enough to drive the
    /// handlers end to end.
    struct StaticProvider;

    impl IdentityProvider for StaticProvider {
        fn name(&self) -> &str {
            "google"
        }

        fn authorization_url(&self) -> String {
            "https://accounts.google.com/o/oauth2/v2/auth?client_id=static".to_string()
        }

        fn exchange_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<TokenGrant>> {
            let grant = TokenGrant {
                access_token: format!("access:{}", code),
                refresh_token: Some("refresh".to_string()),
                expires_in: Some(3600),
            };
            Box::pin(async move { Ok(grant) })
        }

        fn fetch_user_info<'a>(
            &'a self,
            _access_token: &'a str,
        ) -> BoxFuture<'a, ProviderResult<UserProfile>> {
            Box::pin(async move {
                Ok(UserProfile {
                    email: "a@x.com".to_string(),
                    name: Some("Ada".to_string()),
                })
            })
        }

        fn refresh_access_token<'a>(
            &'a self,
            _refresh_token: &'a str,
        ) -> BoxFuture<'a, ProviderResult<TokenGrant>> {
            Box::pin(async move {
                Ok(TokenGrant {
                    access_token: "refreshed".to_string(),
                    refresh_token: None,
                    expires_in: Some(3600),
                })
            })
        }
    }

    fn api() -> (Api, Arc<MemoryAccountStore>) {
        let accounts = Arc::new(MemoryAccountStore::new());
        let service = LinkService::new(
            Arc::new(StaticProvider),
            accounts.clone(),
            Arc::new(MemoryTokenRecordStore::new()),
            Arc::new(OpaqueSessionIssuer::new(Arc::new(
                MemorySessionTokenStore::new(),
            ))),
        );
        (Api::new(Arc::new(service)), accounts)
    }

    #[tokio::test]
    async fn handlers_cover_the_full_surface() {
        let (api, accounts) = api();

        let auth = api.authorization_url();
        assert!(auth.url.contains("client_id=static"));

        let callback = api.callback("code-1", None).await.unwrap();
        assert_eq!(callback.email, "a@x.com");
        assert_eq!(callback.provider_email, "a@x.com");

        let account = accounts.find_by_email("a@x.com").await.unwrap().unwrap();

        let status = api.status(&account).await.unwrap();
        assert_eq!(
            status,
            StatusResponse {
                connected: true,
                email: Some("a@x.com".to_string()),
            }
        );

        let token = api.token(&account).await.unwrap();
        assert_eq!(token.access_token, "access:code-1");

        api.disconnect(&account).await.unwrap();
        let status = api.status(&account).await.unwrap();
        assert!(!status.connected);

        let err = api.token(&account).await.unwrap_err();
        assert_eq!(ErrorResponse::from(&err).code, "not_connected");
    }

    #[test]
    fn callback_response_serializes_camel_case() {
        let response = CallbackResponse {
            access_token: "app-access".into(),
            refresh_token: "app-refresh".into(),
            expires_in: 3600,
            email: "a@x.com".into(),
            provider_email: "a@x.com".into(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "accessToken": "app-access",
                "refreshToken": "app-refresh",
                "expiresIn": 3600,
                "email": "a@x.com",
                "providerEmail": "a@x.com"
            })
        );
    }

    #[test]
    fn status_response_serializes_null_email_when_disconnected() {
        let response = StatusResponse {
            connected: false,
            email: None,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "connected": false, "email": null }));
    }

    #[test]
    fn access_token_response_serializes_camel_case() {
        let response = AccessTokenResponse {
            access_token: "ya29.abc".into(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "accessToken": "ya29.abc" }));
    }

    #[test]
    fn error_response_carries_wire_code() {
        let err = ServiceError::NotConnected;
        let response = ErrorResponse::from(&err);

        assert_eq!(response.code, "not_connected");
        assert!(response.message.contains("no provider connection"));

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["code"], "not_connected");
    }

    #[test]
    fn auth_url_response_round_trips() {
        let response = AuthUrlResponse {
            url: "https://accounts.google.com/o/oauth2/v2/auth?client_id=x".into(),
        };

        let encoded = serde_json::to_string(&response).unwrap();
        let decoded: AuthUrlResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, response);
    }
}
