//! Common domain types used across the authorization and token flows.
//!
//! ## Domain Types
//!
//! - [`Client`] - OAuth 2.0 client registration
//! - [`GrantType`] - Supported OAuth grant types
//! - [`AuthorizationCode`] - Persisted authorization code record
//! - [`User`] - Resource owner record

pub mod client;
pub mod code;
pub mod user;

pub use client::{Client, GrantType};
pub use code::AuthorizationCode;
pub use user::User;
