//! Grant engine extension points and the PKCE integration.
//!
//! The surrounding authorization code grant engine is not modified to
//! learn about PKCE. Instead, the extension points it already exposes
//! (credential resolution, client lookup, code generation, code save,
//! code retrieval) are modeled as the [`GrantExtensions`] capability set,
//! with [`BaseGrant`] providing the stock behavior. [`PkceGrant`]
//! decorates any engine with the PKCE semantics:
//!
//! - the credential hook relaxes the client secret requirement for
//!   verifier-bearing `authorization_code` requests,
//! - the save hook attaches the commitment to the persisted record,
//! - the retrieval hook checks the verifier against the stored commitment
//!   before the engine ever sees the code.
//!
//! Verification failures propagate as ordinary retrieval failures, so a
//! decorated engine aborts the token exchange exactly as it would for an
//! unknown or expired code.

use std::sync::Arc;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};

use crate::AuthResult;
use crate::config::AuthorizationOptions;
use crate::error::OAuthError;
use crate::oauth::client_auth::{
    ClientAuthenticator, ClientCredentials, annotate_authenticate_challenge, lookup_client,
    resolve_standard,
};
use crate::oauth::pkce::{self, ChallengeMethod};
use crate::oauth::request::{OAuthRequest, OAuthResponse};
use crate::storage::{CodeStorage, Model};
use crate::types::{AuthorizationCode, Client, GrantType, User};

// =============================================================================
// Capability Set
// =============================================================================

/// Everything the authorize handler needs from a persisted code issuance.
#[derive(Debug, Clone)]
pub struct CodeIssuance {
    /// The freshly generated code value.
    pub code: String,
    /// Expiry timestamp computed from the engine's code lifetime.
    pub expires_at: OffsetDateTime,
    /// The validated scope to grant.
    pub scope: String,
    /// The resolved client.
    pub client: Client,
    /// The resolved redirect URI.
    pub redirect_uri: String,
    /// The authenticated resource owner.
    pub user: User,
    /// PKCE challenge extracted from the authorization request.
    pub code_challenge: Option<String>,
    /// PKCE challenge method extracted from the authorization request.
    pub code_challenge_method: Option<ChallengeMethod>,
}

/// The grant engine's extension points.
///
/// Implementations are injected into the authorize handler and the token
/// flow; wrapping one implementation in another is how behavior is
/// extended without touching shared state.
#[async_trait]
pub trait GrantExtensions: Send + Sync {
    /// Resolves client credentials from a token request.
    fn resolve_credentials(&self, request: &OAuthRequest) -> AuthResult<ClientCredentials>;

    /// Resolves, validates, and looks up the client for a token request.
    async fn get_client(
        &self,
        request: &OAuthRequest,
        response: &mut OAuthResponse,
    ) -> AuthResult<Client>;

    /// Generates a fresh opaque authorization code value.
    async fn generate_authorization_code(
        &self,
        client: &Client,
        user: &User,
        scope: &str,
    ) -> AuthResult<String>;

    /// Returns the configured authorization code lifetime.
    fn authorization_code_lifetime(&self) -> Duration;

    /// Assembles the persisted record for an issuance and forwards it to
    /// the model.
    async fn save_authorization_code(
        &self,
        issuance: CodeIssuance,
    ) -> AuthResult<AuthorizationCode>;

    /// Loads and validates the code being redeemed by a token request.
    async fn get_authorization_code(
        &self,
        request: &OAuthRequest,
        client: &Client,
    ) -> AuthResult<AuthorizationCode>;

    /// Runs the token-request preamble: authenticates the client, then
    /// retrieves (and thereby validates) the code. Token minting itself
    /// belongs to the surrounding engine, which exchanges the returned
    /// pair for tokens.
    async fn validate_token_request(
        &self,
        request: &OAuthRequest,
        response: &mut OAuthResponse,
    ) -> AuthResult<(Client, AuthorizationCode)> {
        let grant_type = request
            .body_param("grant_type")
            .ok_or_else(|| OAuthError::invalid_request("missing grant_type"))?;
        if grant_type != GrantType::AuthorizationCode.as_str() {
            return Err(OAuthError::unsupported_grant_type(grant_type));
        }

        let client = self.get_client(request, response).await?;
        let code = self.get_authorization_code(request, &client).await?;
        Ok((client, code))
    }
}

// =============================================================================
// Base Grant
// =============================================================================

/// Stock authorization code grant behavior, PKCE-unaware.
///
/// Persisted records never carry commitment fields and retrieval performs
/// only the classic existence, ownership, and expiry checks.
pub struct BaseGrant {
    model: Arc<dyn Model>,
    options: AuthorizationOptions,
}

impl BaseGrant {
    /// Creates the stock engine over a model.
    #[must_use]
    pub fn new(model: Arc<dyn Model>, options: AuthorizationOptions) -> Self {
        Self { model, options }
    }
}

#[async_trait]
impl GrantExtensions for BaseGrant {
    fn resolve_credentials(&self, request: &OAuthRequest) -> AuthResult<ClientCredentials> {
        resolve_standard(request, &self.options)
    }

    async fn get_client(
        &self,
        request: &OAuthRequest,
        response: &mut OAuthResponse,
    ) -> AuthResult<Client> {
        let credentials = self.resolve_credentials(request)?;
        let result = lookup_client(
            self.model.as_ref(),
            &self.options,
            request,
            &credentials,
            false,
        )
        .await;
        annotate_authenticate_challenge(result, request, response)
    }

    async fn generate_authorization_code(
        &self,
        _client: &Client,
        _user: &User,
        _scope: &str,
    ) -> AuthResult<String> {
        Ok(AuthorizationCode::generate())
    }

    fn authorization_code_lifetime(&self) -> Duration {
        self.options.authorization_code_lifetime
    }

    async fn save_authorization_code(
        &self,
        issuance: CodeIssuance,
    ) -> AuthResult<AuthorizationCode> {
        let record = AuthorizationCode {
            code: issuance.code,
            expires_at: issuance.expires_at,
            redirect_uri: issuance.redirect_uri,
            scope: issuance.scope,
            client_id: issuance.client.client_id.clone(),
            user_id: issuance.user.id,
            code_challenge: None,
            code_challenge_method: None,
        };

        self.model
            .save_authorization_code(&record, &issuance.client, &issuance.user)
            .await
    }

    async fn get_authorization_code(
        &self,
        request: &OAuthRequest,
        client: &Client,
    ) -> AuthResult<AuthorizationCode> {
        let code = request
            .body_param("code")
            .ok_or_else(|| OAuthError::invalid_request("missing code"))?;

        let record = self
            .model
            .get_authorization_code(code)
            .await?
            .ok_or_else(|| OAuthError::invalid_grant("authorization code is invalid"))?;

        if record.client_id != client.client_id {
            return Err(OAuthError::invalid_grant("authorization code is invalid"));
        }

        if record.is_expired() {
            return Err(OAuthError::invalid_grant("authorization code has expired"));
        }

        Ok(record)
    }
}

// =============================================================================
// PKCE Grant
// =============================================================================

/// PKCE decoration of a grant engine.
pub struct PkceGrant<E> {
    inner: E,
    model: Arc<dyn Model>,
    authenticator: ClientAuthenticator,
}

impl PkceGrant<BaseGrant> {
    /// Creates a PKCE-enabled engine over the stock grant behavior.
    #[must_use]
    pub fn new(model: Arc<dyn Model>, options: AuthorizationOptions) -> Self {
        Self::wrap(
            BaseGrant::new(Arc::clone(&model), options.clone()),
            model,
            options,
        )
    }
}

impl<E: GrantExtensions> PkceGrant<E> {
    /// Decorates an arbitrary engine with PKCE behavior.
    #[must_use]
    pub fn wrap(inner: E, model: Arc<dyn Model>, options: AuthorizationOptions) -> Self {
        let authenticator = ClientAuthenticator::new(Arc::clone(&model), options);
        Self {
            inner,
            model,
            authenticator,
        }
    }
}

#[async_trait]
impl<E: GrantExtensions> GrantExtensions for PkceGrant<E> {
    fn resolve_credentials(&self, request: &OAuthRequest) -> AuthResult<ClientCredentials> {
        self.authenticator.resolve_credentials(request)
    }

    async fn get_client(
        &self,
        request: &OAuthRequest,
        response: &mut OAuthResponse,
    ) -> AuthResult<Client> {
        self.authenticator.authenticate(request, response).await
    }

    async fn generate_authorization_code(
        &self,
        client: &Client,
        user: &User,
        scope: &str,
    ) -> AuthResult<String> {
        self.inner
            .generate_authorization_code(client, user, scope)
            .await
    }

    fn authorization_code_lifetime(&self) -> Duration {
        self.inner.authorization_code_lifetime()
    }

    async fn save_authorization_code(
        &self,
        issuance: CodeIssuance,
    ) -> AuthResult<AuthorizationCode> {
        // A record is either classic (neither field) or committed (both
        // fields, method defaulting to plain). Empty-string placeholders
        // are never stored.
        let (code_challenge, code_challenge_method) = match issuance.code_challenge.clone() {
            Some(challenge) => {
                let method = issuance
                    .code_challenge_method
                    .unwrap_or(ChallengeMethod::Plain);
                (Some(challenge), Some(method.as_str().to_string()))
            }
            None => (None, None),
        };

        let record = AuthorizationCode {
            code: issuance.code,
            expires_at: issuance.expires_at,
            redirect_uri: issuance.redirect_uri,
            scope: issuance.scope,
            client_id: issuance.client.client_id.clone(),
            user_id: issuance.user.id,
            code_challenge,
            code_challenge_method,
        };

        self.model
            .save_authorization_code(&record, &issuance.client, &issuance.user)
            .await
    }

    async fn get_authorization_code(
        &self,
        request: &OAuthRequest,
        client: &Client,
    ) -> AuthResult<AuthorizationCode> {
        let code = self.inner.get_authorization_code(request, client).await?;
        pkce::verify_code_redemption(&code, request)?;
        Ok(code)
    }
}

// =============================================================================
// Tests
// =============================================================================
