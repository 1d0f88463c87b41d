//! Authorization endpoint handling.
//!
//! [`AuthorizeHandler`] runs one authorization request end to end: it
//! resolves the client, user, and code expiry concurrently, validates the
//! redirect URI and scope, generates a code, extracts the PKCE commitment,
//! and persists the record through the engine's save hook. On success the
//! response becomes a 302 redirect carrying the code (and the client's
//! `state`); once the redirect URI is known, failures become error
//! redirects carrying `error`, `error_description`, and `state`, and the
//! error is re-surfaced to the caller for logging.
//!
//! # Security
//!
//! - The authorization code value is never logged.
//! - A consent denial (`allowed=false`) is rejected before any redirect
//!   state exists, so it surfaces directly rather than as a redirect.
//! - The redirect URI must exactly match a registered value.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};
use url::Url;

use crate::AuthResult;
use crate::config::AuthorizationOptions;
use crate::error::OAuthError;
use crate::oauth::grant::{CodeIssuance, GrantExtensions};
use crate::oauth::pkce;
use crate::oauth::request::{OAuthRequest, OAuthResponse};
use crate::storage::{ClientStorage, Model, UserStorage};
use crate::types::{AuthorizationCode, Client, GrantType, User};

/// Handles OAuth 2.0 authorization requests.
pub struct AuthorizeHandler {
    model: Arc<dyn Model>,
    engine: Arc<dyn GrantExtensions>,
    options: AuthorizationOptions,
}

impl AuthorizeHandler {
    /// Creates a handler over the given model and grant engine.
    #[must_use]
    pub fn new(
        model: Arc<dyn Model>,
        engine: Arc<dyn GrantExtensions>,
        options: AuthorizationOptions,
    ) -> Self {
        Self {
            model,
            engine,
            options,
        }
    }

    /// Processes one authorization request.
    ///
    /// Mutates `response` exactly once, with either the success or the
    /// error redirect. The exceptions are the early failures (consent
    /// denial, unknown client, unresolvable user, bad redirect URI) where
    /// no redirect target is trustworthy yet; those leave the response
    /// untouched and surface directly.
    ///
    /// # Errors
    ///
    /// Returns the classified error even when it was also reported as an
    /// error redirect, so callers can log it.
    pub async fn handle(
        &self,
        request: &OAuthRequest,
        response: &mut OAuthResponse,
    ) -> AuthResult<AuthorizationCode> {
        if request.query_param("allowed") == Some("false") {
            return Err(OAuthError::access_denied(
                "user denied access to the application",
            ));
        }

        // The three resolutions are independent; join them fail-fast.
        let (expires_at, client, user) = tokio::try_join!(
            self.code_expiry(),
            self.get_client(request),
            self.get_user(request),
        )?;

        let redirect_uri = self.redirect_uri(request, &client)?;
        let state = request.param("state").map(str::to_owned);

        match self
            .issue(request, &client, &user, expires_at, &redirect_uri)
            .await
        {
            Ok(code) => {
                response.redirect(success_redirect(
                    &redirect_uri,
                    &code.code,
                    state.as_deref(),
                ));
                info!(client_id = %client.client_id, "authorization code issued");
                Ok(code)
            }
            Err(error) => {
                warn!(
                    client_id = %client.client_id,
                    error = %error,
                    "authorization request failed"
                );
                response.redirect(error_redirect(&redirect_uri, &error, state.as_deref()));
                Err(error)
            }
        }
    }

    /// The redirect-wrapped tail of the pipeline: everything from scope
    /// validation through persistence.
    async fn issue(
        &self,
        request: &OAuthRequest,
        client: &Client,
        user: &User,
        expires_at: OffsetDateTime,
        redirect_uri: &Url,
    ) -> AuthResult<AuthorizationCode> {
        let state = request.param("state");
        if !self.options.allow_empty_state && state.is_none_or(str::is_empty) {
            return Err(OAuthError::invalid_request("missing state"));
        }

        match request.param("response_type") {
            Some("code") => {}
            Some(other) => return Err(OAuthError::unsupported_response_type(other)),
            None => return Err(OAuthError::invalid_request("missing response_type")),
        }

        let scope = self
            .model
            .validate_scope(user, client, request.param("scope"))
            .await?
            .ok_or_else(|| OAuthError::invalid_scope("requested scope is invalid"))?;

        let code = self
            .engine
            .generate_authorization_code(client, user, &scope)
            .await?;

        // The commitment is extracted after code generation: a malformed
        // commitment must still produce an error redirect, which needs
        // the client and redirect URI already resolved above.
        let code_challenge = pkce::code_challenge_from_request(request)?;
        let code_challenge_method = pkce::challenge_method_from_request(request)?;
        if code_challenge.is_none() && code_challenge_method.is_some() {
            return Err(OAuthError::invalid_request("missing code_challenge"));
        }

        self.engine
            .save_authorization_code(CodeIssuance {
                code,
                expires_at,
                scope,
                client: client.clone(),
                redirect_uri: redirect_uri.to_string(),
                user: user.clone(),
                code_challenge,
                code_challenge_method,
            })
            .await
    }

    /// Computes the expiry timestamp for a code issued now.
    async fn code_expiry(&self) -> AuthResult<OffsetDateTime> {
        Ok(OffsetDateTime::now_utc() + self.engine.authorization_code_lifetime())
    }

    /// Resolves the client making the authorization request.
    async fn get_client(&self, request: &OAuthRequest) -> AuthResult<Client> {
        let client_id = request
            .param("client_id")
            .ok_or_else(|| OAuthError::invalid_request("missing client_id"))?;

        let client = self
            .model
            .get_client(client_id, None)
            .await?
            .ok_or_else(|| OAuthError::invalid_client("client is invalid"))?;

        if client.grant_types.is_empty() {
            return Err(OAuthError::server_error("missing client grants"));
        }

        if !client.is_grant_type_allowed(GrantType::AuthorizationCode) {
            return Err(OAuthError::invalid_client(
                "grant type is not allowed for this client",
            ));
        }

        if client.redirect_uris.is_empty() {
            return Err(OAuthError::invalid_client("missing client redirect_uri"));
        }

        Ok(client)
    }

    /// Resolves the resource owner behind the request.
    async fn get_user(&self, request: &OAuthRequest) -> AuthResult<User> {
        self.model
            .authenticate_user(request)
            .await?
            .ok_or_else(|| OAuthError::server_error("authentication did not return a user"))
    }

    /// Resolves the redirect URI from the request and the client's
    /// registrations.
    fn redirect_uri(&self, request: &OAuthRequest, client: &Client) -> AuthResult<Url> {
        match request.param("redirect_uri") {
            Some(uri) => {
                if !client.is_redirect_uri_allowed(uri) {
                    return Err(OAuthError::invalid_client(
                        "redirect_uri does not match a registered value",
                    ));
                }
                Url::parse(uri)
                    .map_err(|_| OAuthError::invalid_request("invalid redirect_uri"))
            }
            None => {
                let uri = client
                    .redirect_uris
                    .first()
                    .ok_or_else(|| OAuthError::invalid_client("missing client redirect_uri"))?;
                Url::parse(uri).map_err(|_| {
                    OAuthError::server_error("registered redirect_uri is not a valid URL")
                })
            }
        }
    }
}

/// Builds the success redirect target.
fn success_redirect(redirect_uri: &Url, code: &str, state: Option<&str>) -> String {
    let mut url = redirect_uri.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("code", code);
        if let Some(state) = state {
            pairs.append_pair("state", state);
        }
    }
    url.to_string()
}

/// Builds the error redirect target.
fn error_redirect(redirect_uri: &Url, error: &OAuthError, state: Option<&str>) -> String {
    let mut url = redirect_uri.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("error", error.oauth_error_code());
        pairs.append_pair("error_description", &error.to_string());
        if let Some(state) = state {
            pairs.append_pair("state", state);
        }
    }
    url.to_string()
}
