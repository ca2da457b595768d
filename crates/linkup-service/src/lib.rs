//! Identity resolution, token lifecycle, session issuance, API surface.
//!
//! This crate is the decision core of linkup. It composes the provider
//! client (`linkup-google`) with the stores (`linkup-store`):
//!
//! - [`resolve_account`] - maps a provider identity to one local account
//! - [`LinkService`] - callback orchestration, lazy token refresh,
//!   connection status, disconnect
//! - [`SessionIssuer`] / [`OpaqueSessionIssuer`] - application session
//!   minting behind a trait seam
//! - [`Api`] - framework-agnostic handlers and wire types
//!
//! # Flow
//!
//! ```text
//! caller ──► Api ──► LinkService ──► IdentityProvider (network)
//!                        │
//!                        ├──► resolve_account (pure decision)
//!                        │
//!                        └──► AccountStore / TokenRecordStore /
//!                             SessionTokenStore (persistence)
//! ```

pub mod api;
pub mod error;
pub mod manager;
pub mod resolver;
pub mod session;

pub use api::{
    AccessTokenResponse, Api, AuthUrlResponse, CallbackResponse, ErrorResponse, StatusResponse,
};
pub use error::{ServiceError, ServiceResult};
pub use manager::{ConnectionStatus, LinkService};
pub use resolver::{Resolution, resolve_account};
pub use session::{IssuedSession, OpaqueSessionIssuer, SessionBundle, SessionIssuer, Sessions};
