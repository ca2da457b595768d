//! Identity resolution.
//!
//! Maps an inbound (optional authenticated account, provider profile) pair
//! to exactly one local account. The branch order is the contract:
//!
//! 1. An authenticated caller is always linking their current account -
//!    no email matching happens in this mode, even when the provider email
//!    equals another account's email. Anything else would let a provider
//!    identity take over an account by email collision.
//! 2. A provider email that was linked before resolves back to the account
//!    it was linked to.
//! 3. A local account whose email equals the provider email is adopted,
//!    so a password signup and a later provider login stay one account.
//! 4. Otherwise a new provider-only account is created.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use tracing::{debug, info, warn};

use linkup_core::{Account, NewAccount};
use linkup_google::UserProfile;
use linkup_store::{AccountStore, StoreError, TokenRecordStore};

use crate::error::ServiceResult;

/// Length of the generated placeholder secret, in bytes before encoding.
const PLACEHOLDER_SECRET_LENGTH: usize = 32;

/// Outcome of identity resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The account the provider identity resolved to.
    pub account: Account,
    /// Whether the account was created by this resolution.
    pub created: bool,
}

/// Resolves a provider profile to a single local account.
///
/// When the resolved account has no display name and the provider supplied
/// one, the name is backfilled best-effort: a failure is logged and never
/// fails the resolution.
pub async fn resolve_account(
    accounts: &dyn AccountStore,
    tokens: &dyn TokenRecordStore,
    authenticated: Option<Account>,
    profile: &UserProfile,
) -> ServiceResult<Resolution> {
    let (account, created) = match authenticated {
        Some(account) => {
            debug!(
                "resolving {} as explicit link to account {}",
                profile.email, account.id
            );
            (account, false)
        }
        None => resolve_unauthenticated(accounts, tokens, profile).await?,
    };

    let account = backfill_name(accounts, account, profile.name.as_deref()).await;
    Ok(Resolution { account, created })
}

/// Login/signup resolution: previously linked identity, then matching
/// local email, then a fresh provider-only account.
async fn resolve_unauthenticated(
    accounts: &dyn AccountStore,
    tokens: &dyn TokenRecordStore,
    profile: &UserProfile,
) -> ServiceResult<(Account, bool)> {
    if let Some(record) = tokens.find_by_provider_email(&profile.email).await? {
        let account = accounts.find_by_id(record.account_id).await?.ok_or_else(|| {
            StoreError::internal(format!(
                "token record for account {} has no owning account",
                record.account_id
            ))
        })?;
        debug!(
            "resolved {} to previously linked account {}",
            profile.email, account.id
        );
        return Ok((account, false));
    }

    if let Some(account) = accounts.find_by_email(&profile.email).await? {
        debug!(
            "resolved {} to existing local account {}",
            profile.email, account.id
        );
        return Ok((account, false));
    }

    create_provider_account(accounts, profile).await
}

/// Creates a provider-only account for a first-time provider login.
///
/// A racing creation for the same email loses to a uniqueness conflict;
/// the loser adopts the winner's account.
async fn create_provider_account(
    accounts: &dyn AccountStore,
    profile: &UserProfile,
) -> ServiceResult<(Account, bool)> {
    let new = NewAccount::provider_only(
        profile.email.clone(),
        profile.name.clone(),
        placeholder_secret(),
    );

    match accounts.create(new).await {
        Ok(account) => {
            info!("created account {} for provider signup", account.id);
            Ok((account, true))
        }
        Err(err) if err.is_conflict() => {
            let account = accounts.find_by_email(&profile.email).await?.ok_or_else(|| {
                StoreError::internal(format!(
                    "account {} conflicted on create but cannot be found",
                    profile.email
                ))
            })?;
            Ok((account, false))
        }
        Err(err) => Err(err.into()),
    }
}

/// Sets the account name from the provider profile when it is missing.
async fn backfill_name(
    accounts: &dyn AccountStore,
    mut account: Account,
    provided: Option<&str>,
) -> Account {
    let Some(name) = provided.filter(|n| !n.is_empty()) else {
        return account;
    };
    if account.name.is_some() {
        return account;
    }

    match accounts.update_name(account.id, name).await {
        Ok(()) => {
            account.name = Some(name.to_string());
            account
        }
        Err(err) => {
            warn!("failed to backfill name for account {}: {}", account.id, err);
            account
        }
    }
}

/// Generates the unusable password placeholder for provider-only accounts.
///
/// Drawn from a CSPRNG, never from user input; long enough that it cannot
/// be guessed or brute-forced through the password login path.
fn placeholder_secret() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..PLACEHOLDER_SECRET_LENGTH).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use linkup_core::{AccountId, Credential};
    use linkup_store::{MemoryAccountStore, MemoryTokenRecordStore, TokenUpsert};

    fn profile(email: &str, name: Option<&str>) -> UserProfile {
        UserProfile {
            email: email.to_string(),
            name: name.map(String::from),
        }
    }

    async fn seed_password_account(accounts: &MemoryAccountStore, email: &str) -> Account {
        accounts
            .create(NewAccount::with_password(email, None, "hash"))
            .await
            .unwrap()
    }

    async fn seed_link(tokens: &MemoryTokenRecordStore, account_id: AccountId, email: &str) {
        tokens
            .upsert(TokenUpsert {
                account_id,
                provider_email: email.to_string(),
                access_token: "access".to_string(),
                refresh_token: Some("refresh".to_string()),
                expires_at: Some(Utc::now() + Duration::hours(1)),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn authenticated_account_short_circuits() {
        let accounts = MemoryAccountStore::new();
        let tokens = MemoryTokenRecordStore::new();

        // Another account already owns this email both locally and as a link.
        let other = seed_password_account(&accounts, "a@x.com").await;
        seed_link(&tokens, other.id, "a@x.com").await;

        let me = seed_password_account(&accounts, "me@y.com").await;
        let resolution =
            resolve_account(&accounts, &tokens, Some(me.clone()), &profile("a@x.com", None))
                .await
                .unwrap();

        // Explicit linking never email-matches.
        assert_eq!(resolution.account.id, me.id);
        assert!(!resolution.created);
    }

    #[tokio::test]
    async fn previously_linked_email_resolves_to_owner() {
        let accounts = MemoryAccountStore::new();
        let tokens = MemoryTokenRecordStore::new();

        let owner = seed_password_account(&accounts, "local@y.com").await;
        seed_link(&tokens, owner.id, "a@x.com").await;

        let resolution = resolve_account(&accounts, &tokens, None, &profile("a@x.com", None))
            .await
            .unwrap();

        assert_eq!(resolution.account.id, owner.id);
        assert!(!resolution.created);
    }

    #[tokio::test]
    async fn link_lookup_precedes_email_match() {
        let accounts = MemoryAccountStore::new();
        let tokens = MemoryTokenRecordStore::new();

        // a@x.com was linked to one account while another account holds it
        // as its local email; the link wins.
        let linked = seed_password_account(&accounts, "linked@y.com").await;
        seed_link(&tokens, linked.id, "a@x.com").await;
        let by_email = seed_password_account(&accounts, "a@x.com").await;

        let resolution = resolve_account(&accounts, &tokens, None, &profile("a@x.com", None))
            .await
            .unwrap();

        assert_eq!(resolution.account.id, linked.id);
        assert_ne!(resolution.account.id, by_email.id);
    }

    #[tokio::test]
    async fn matching_local_email_is_adopted() {
        let accounts = MemoryAccountStore::new();
        let tokens = MemoryTokenRecordStore::new();

        let existing = seed_password_account(&accounts, "a@x.com").await;
        let resolution = resolve_account(&accounts, &tokens, None, &profile("a@x.com", None))
            .await
            .unwrap();

        assert_eq!(resolution.account.id, existing.id);
        assert!(!resolution.created);
        // Adoption does not touch the credential.
        assert_eq!(
            resolution.account.credential,
            Credential::Password("hash".into())
        );
    }

    #[tokio::test]
    async fn unknown_email_creates_provider_only_account() {
        let accounts = MemoryAccountStore::new();
        let tokens = MemoryTokenRecordStore::new();

        let resolution =
            resolve_account(&accounts, &tokens, None, &profile("a@x.com", Some("Ada")))
                .await
                .unwrap();

        assert!(resolution.created);
        assert_eq!(resolution.account.email, "a@x.com");
        assert_eq!(resolution.account.name.as_deref(), Some("Ada"));
        assert!(resolution.account.credential.is_provider_only());

        let stored = accounts.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, resolution.account.id);
    }

    #[tokio::test]
    async fn name_backfill_is_idempotent() {
        let accounts = MemoryAccountStore::new();
        let tokens = MemoryTokenRecordStore::new();

        let existing = seed_password_account(&accounts, "a@x.com").await;
        assert!(existing.name.is_none());

        let first = resolve_account(&accounts, &tokens, None, &profile("a@x.com", Some("Ada")))
            .await
            .unwrap();
        assert_eq!(first.account.name.as_deref(), Some("Ada"));

        // A second callback with the same data changes nothing.
        let second = resolve_account(&accounts, &tokens, None, &profile("a@x.com", Some("Ada")))
            .await
            .unwrap();
        assert_eq!(second.account.name.as_deref(), Some("Ada"));

        let stored = accounts.find_by_id(existing.id).await.unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn name_backfill_never_overwrites() {
        let accounts = MemoryAccountStore::new();
        let tokens = MemoryTokenRecordStore::new();

        let account = accounts
            .create(NewAccount::with_password("a@x.com", Some("Chosen".into()), "hash"))
            .await
            .unwrap();

        let resolution =
            resolve_account(&accounts, &tokens, None, &profile("a@x.com", Some("Other")))
                .await
                .unwrap();

        assert_eq!(resolution.account.id, account.id);
        assert_eq!(resolution.account.name.as_deref(), Some("Chosen"));
    }

    #[tokio::test]
    async fn placeholder_secrets_are_unique_and_long() {
        let a = placeholder_secret();
        let b = placeholder_secret();
        assert_ne!(a, b);
        // 32 bytes base64url without padding.
        assert_eq!(a.len(), 43);
    }
}
