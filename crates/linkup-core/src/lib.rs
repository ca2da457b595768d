//! Core types: accounts, provider tokens, session tokens, tracing

use std::future::Future;
use std::pin::Pin;

pub mod account;
pub mod token;
pub mod tracing;

pub use account::{Account, AccountId, Credential, NewAccount, Role};
pub use token::{ProviderToken, SessionToken, expires_at_from_now};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};

/// A boxed future for async trait methods.
///
/// Store and provider traits return boxed futures instead of using an
/// async-trait macro so they stay object-safe and usable behind `dyn`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
