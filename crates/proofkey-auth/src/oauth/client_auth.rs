//! Client authentication for the token endpoint.
//!
//! Credentials are resolved from the HTTP `Authorization: Basic` header
//! first, falling back to `client_id`/`client_secret` body parameters
//! (RFC 6749 sections 2.3.1 and 3.2.1).
//!
//! # Public clients and PKCE
//!
//! A token request that carries no secret is still authenticated when it
//! is a PKCE redemption: grant type `authorization_code`, a
//! `code_verifier` and a `client_id` in the body, and no `client_secret`
//! anywhere. This relaxation is the single mechanism by which public
//! clients may omit a secret; it applies to no other grant type. The
//! actual proof of possession happens later, when the verifier is checked
//! against the stored challenge.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::AuthResult;
use crate::config::AuthorizationOptions;
use crate::error::OAuthError;
use crate::oauth::pkce;
use crate::oauth::request::{OAuthRequest, OAuthResponse};
use crate::storage::{ClientStorage, Model};
use crate::types::{Client, GrantType};

/// Challenge sent alongside a 401 when a header-authenticated client fails
/// (RFC 6749 section 5.2).
const BASIC_CHALLENGE: &str = "Basic realm=\"Service\"";

/// Client credentials extracted from a token request.
///
/// Read-only; derived from the request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// The client identifier.
    pub client_id: String,

    /// The client secret, absent for public clients.
    pub client_secret: Option<String>,
}

impl ClientCredentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }
}

/// Authenticates clients at the token endpoint.
pub struct ClientAuthenticator {
    model: Arc<dyn Model>,
    options: AuthorizationOptions,
}

impl ClientAuthenticator {
    /// Creates an authenticator backed by the given model.
    #[must_use]
    pub fn new(model: Arc<dyn Model>, options: AuthorizationOptions) -> Self {
        Self { model, options }
    }

    /// Resolves client credentials, applying the PKCE relaxation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` when no credentials can be extracted at all.
    pub fn resolve_credentials(&self, request: &OAuthRequest) -> AuthResult<ClientCredentials> {
        let basic = basic_credentials(request);
        let grant_type = request.body_param("grant_type").unwrap_or_default();

        if basic.is_none()
            && non_empty(request.body_param("client_secret")).is_none()
            && pkce::is_pkce_request(request, grant_type)
        {
            if let Some(client_id) = request.body_param("client_id") {
                debug!(client_id, "public PKCE client, secret requirement relaxed");
                return Ok(ClientCredentials::new(client_id, None));
            }
        }

        standard_credentials(request, basic, &self.options)
    }

    /// Resolves credentials, validates them, and looks the client up.
    ///
    /// When the lookup rejects a client that attempted to authenticate via
    /// the `Authorization` header, the response is annotated with a
    /// `WWW-Authenticate: Basic realm="Service"` challenge before the
    /// `InvalidClient` error propagates (RFC 6749 section 5.2).
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for missing or malformed credential
    /// fields, `InvalidClient` when the model knows no such client, and
    /// `ServerError` when the returned registration lacks a grants list.
    pub async fn authenticate(
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
            true,
        )
        .await;

        annotate_authenticate_challenge(result, request, response)
    }
}

/// Standard credential resolution as the stock engine performs it.
pub(crate) fn resolve_standard(
    request: &OAuthRequest,
    options: &AuthorizationOptions,
) -> AuthResult<ClientCredentials> {
    standard_credentials(request, basic_credentials(request), options)
}

/// Standard (non-PKCE) credential resolution: Basic header, then body
/// pair, then bare `client_id` for grants that don't require a secret.
pub(crate) fn standard_credentials(
    request: &OAuthRequest,
    basic: Option<ClientCredentials>,
    options: &AuthorizationOptions,
) -> AuthResult<ClientCredentials> {
    if let Some(credentials) = basic {
        return Ok(credentials);
    }

    if let (Some(client_id), Some(client_secret)) = (
        non_empty(request.body_param("client_id")),
        non_empty(request.body_param("client_secret")),
    ) {
        return Ok(ClientCredentials::new(
            client_id,
            Some(client_secret.to_string()),
        ));
    }

    let grant_type = request
        .body_param("grant_type")
        .and_then(GrantType::parse);
    if !options.client_authentication_required(grant_type) {
        if let Some(client_id) = request.body_param("client_id") {
            return Ok(ClientCredentials::new(client_id, None));
        }
    }

    Err(OAuthError::invalid_client(
        "cannot retrieve client credentials",
    ))
}

/// Validates resolved credentials and looks the client up through the
/// model. `pkce_exception` controls whether a PKCE redemption may skip the
/// secret requirement.
pub(crate) async fn lookup_client(
    model: &dyn Model,
    options: &AuthorizationOptions,
    request: &OAuthRequest,
    credentials: &ClientCredentials,
    pkce_exception: bool,
) -> AuthResult<Client> {
    let grant_type = request.body_param("grant_type").unwrap_or_default();

    if credentials.client_id.is_empty() {
        return Err(OAuthError::invalid_request("missing client_id"));
    }

    if options.client_authentication_required(GrantType::parse(grant_type))
        && credentials.client_secret.is_none()
        && !(pkce_exception && pkce::is_pkce_request(request, grant_type))
    {
        return Err(OAuthError::invalid_request("missing client_secret"));
    }

    if !is_vschar(&credentials.client_id) {
        return Err(OAuthError::invalid_request("invalid client_id"));
    }

    if let Some(secret) = &credentials.client_secret {
        if !is_vschar(secret) {
            return Err(OAuthError::invalid_request("invalid client_secret"));
        }
    }

    let client = model
        .get_client(&credentials.client_id, credentials.client_secret.as_deref())
        .await?
        .ok_or_else(|| OAuthError::invalid_client("client is invalid"))?;

    if client.grant_types.is_empty() {
        return Err(OAuthError::server_error("missing client grants"));
    }

    Ok(client)
}

/// Attaches the Basic challenge when an `InvalidClient` rejection follows
/// an `Authorization`-header authentication attempt.
pub(crate) fn annotate_authenticate_challenge(
    result: AuthResult<Client>,
    request: &OAuthRequest,
    response: &mut OAuthResponse,
) -> AuthResult<Client> {
    match result {
        Err(error @ OAuthError::InvalidClient { .. })
            if request.header("authorization").is_some() =>
        {
            response.set_header("WWW-Authenticate", BASIC_CHALLENGE);
            Err(error)
        }
        other => other,
    }
}

/// Parses `Authorization: Basic <base64(client_id:client_secret)>`.
///
/// Malformed headers yield `None` rather than an error, matching the
/// behavior of treating them as absent credentials. An empty password is
/// treated as no secret, so `Basic id:` still trips the secret
/// requirement check instead of being compared against stored secrets.
fn basic_credentials(request: &OAuthRequest) -> Option<ClientCredentials> {
    let header = request.header("authorization")?.trim();
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (client_id, client_secret) = text.split_once(':')?;
    let client_secret = (!client_secret.is_empty()).then(|| client_secret.to_string());
    Some(ClientCredentials {
        client_id: client_id.to_string(),
        client_secret,
    })
}

/// Filters out empty parameter values.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// RFC 6749 VSCHAR check: non-empty, every byte in `%x20-7E`.
fn is_vschar(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| (0x20..=0x7e).contains(&b))
}
