//! # proofkey-auth
//!
//! PKCE (Proof Key for Code Exchange, RFC 7636) for the OAuth 2.0
//! authorization code grant.
//!
//! This crate binds a single-use authorization code to a client-chosen
//! cryptographic commitment at issuance time and verifies that commitment
//! against the client-supplied secret at redemption time, letting public
//! clients use the authorization code grant without holding a client
//! secret.
//!
//! The surrounding grant engine is composed with, not modified: its
//! extension points (credential resolution, client lookup, code save,
//! code retrieval) are a capability trait, and the PKCE behavior is a
//! decorator over the stock implementation.
//!
//! ## Modules
//!
//! - [`oauth`] - the code flow: challenge extraction, authorize pipeline,
//!   client authentication, redemption-time verification
//! - [`storage`] - model traits for clients, codes, and users
//! - [`types`] - domain types
//! - [`config`] - handler options
//! - [`error`] - closed OAuth error taxonomy
//! - [`http`] - axum binding for the authorization endpoint
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use proofkey_auth::prelude::*;
//!
//! let model: Arc<dyn Model> = Arc::new(my_model);
//! let options = AuthorizationOptions::default();
//! let engine = Arc::new(PkceGrant::new(Arc::clone(&model), options.clone()));
//! let authorize = AuthorizeHandler::new(model, engine.clone(), options);
//!
//! // Authorization endpoint:
//! let code = authorize.handle(&request, &mut response).await?;
//!
//! // Token endpoint preamble (minting is the engine's job):
//! let (client, code) = engine.validate_token_request(&token_request, &mut response).await?;
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod storage;
pub mod types;

pub use config::AuthorizationOptions;
pub use error::OAuthError;
pub use oauth::{
    AuthorizeHandler, BaseGrant, ChallengeMethod, ClientAuthenticator, ClientCredentials,
    CodeIssuance, GrantExtensions, OAuthRequest, OAuthResponse, PkceGrant,
    verify_code_redemption,
};
pub use storage::{ClientStorage, CodeStorage, Model, UserStorage};
pub use types::{AuthorizationCode, Client, GrantType, User};

/// Type alias for results in the authorization and token flows.
pub type AuthResult<T> = Result<T, OAuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use proofkey_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::AuthorizationOptions;
    pub use crate::error::OAuthError;
    pub use crate::oauth::{
        AuthorizeHandler, BaseGrant, ChallengeMethod, ClientAuthenticator, ClientCredentials,
        CodeIssuance, GrantExtensions, OAuthRequest, OAuthResponse, PkceGrant,
        verify_code_redemption,
    };
    pub use crate::storage::{ClientStorage, CodeStorage, Model, UserStorage};
    pub use crate::types::{AuthorizationCode, Client, GrantType, User};
}
