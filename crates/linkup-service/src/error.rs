//! Service error types.

use thiserror::Error;

use linkup_google::ProviderError;
use linkup_store::StoreError;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the linking service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A provider call failed or returned a malformed response. Surfaced
    /// as a failed request; never retried here.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The account has no usable provider connection. Distinct from a
    /// transient failure: the caller should prompt the user to connect.
    #[error("no provider connection for this account")]
    NotConnected,

    /// The provider identity is already linked to a different account.
    #[error("provider identity {provider_email} is already linked to another account")]
    AlreadyLinked { provider_email: String },

    /// A storage operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Creates an already-linked error.
    pub fn already_linked(provider_email: impl Into<String>) -> Self {
        Self::AlreadyLinked {
            provider_email: provider_email.into(),
        }
    }

    /// Returns the stable wire code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider_error",
            Self::NotConnected => "not_connected",
            Self::AlreadyLinked { .. } => "already_linked",
            Self::Store(e) if e.is_conflict() => "conflict",
            Self::Store(_) => "storage_error",
        }
    }
}
