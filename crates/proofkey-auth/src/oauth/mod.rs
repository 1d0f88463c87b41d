//! OAuth 2.0 authorization code flow with PKCE.
//!
//! ## Components
//!
//! - [`pkce`] - challenge extraction and redemption-time verification
//! - [`client_auth`] - token endpoint client authentication
//! - [`authorize`] - authorization endpoint pipeline
//! - [`grant`] - grant engine extension points and the PKCE decorator
//! - [`request`] - transport-agnostic request/response objects

pub mod authorize;
pub mod client_auth;
pub mod grant;
pub mod pkce;
pub mod request;

pub use authorize::AuthorizeHandler;
pub use client_auth::{ClientAuthenticator, ClientCredentials};
pub use grant::{BaseGrant, CodeIssuance, GrantExtensions, PkceGrant};
pub use pkce::{ChallengeMethod, verify_code_redemption};
pub use request::{OAuthRequest, OAuthResponse};
