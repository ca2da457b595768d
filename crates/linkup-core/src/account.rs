//! Local account types.
//!
//! Accounts are owned by the wider application (signup, password
//! authentication, and sessions live elsewhere); this crate only defines
//! the shape the linking core reads and the one creation path it owns,
//! provider-only signup.

use chrono::{DateTime, Utc};

/// Identifier of a local account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub i64);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access role of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    /// Regular account.
    #[default]
    User,
    /// Administrative account.
    Admin,
}

/// How an account authenticates locally.
///
/// Provider-linking is not part of the credential: an account is
/// provider-linked when a [`ProviderToken`](crate::ProviderToken) record
/// exists for it, regardless of variant. An account holding a `Password`
/// credential plus a token record is authenticated both ways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Password login. The hash is opaque to this crate; hashing and
    /// verification are owned by the authentication subsystem.
    Password(String),
    /// Created through provider signup, no usable local password.
    ///
    /// Carries a random placeholder so backends with a non-null password
    /// column still have a value to store. The placeholder must come from
    /// a cryptographically secure generator and never from user input.
    ProviderOnly(String),
}

impl Credential {
    /// Returns true for accounts that can only sign in via the provider.
    pub fn is_provider_only(&self) -> bool {
        matches!(self, Self::ProviderOnly(_))
    }
}

/// A local account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Email address, unique across accounts.
    pub email: String,
    /// Display name, if one was ever supplied.
    pub name: Option<String>,
    /// Local authentication credential.
    pub credential: Credential,
    /// Access role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last modified.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Email address (must be unique).
    pub email: String,
    /// Display name, if known.
    pub name: Option<String>,
    /// Local authentication credential.
    pub credential: Credential,
    /// Access role.
    pub role: Role,
}

impl NewAccount {
    /// Creates a provider-only signup with the given placeholder secret.
    pub fn provider_only(
        email: impl Into<String>,
        name: Option<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name,
            credential: Credential::ProviderOnly(placeholder.into()),
            role: Role::User,
        }
    }

    /// Creates a password signup with the given (already hashed) password.
    pub fn with_password(
        email: impl Into<String>,
        name: Option<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name,
            credential: Credential::Password(password_hash.into()),
            role: Role::User,
        }
    }
}
