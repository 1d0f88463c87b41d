//! Axum binding for the authorization endpoint.
//!
//! Adapts framework requests into [`OAuthRequest`] parameter maps, runs
//! the authorize pipeline, and renders the resulting [`OAuthResponse`] or
//! error. Server-side failures are rendered with a generic message;
//! internal error detail never reaches a client.
//!
//! Token minting belongs to the surrounding grant engine, so no token
//! route is provided here. A host binding its own token endpoint drives
//! [`GrantExtensions::validate_token_request`] for the redemption
//! preamble and renders failures with [`error_response`].
//!
//! [`GrantExtensions::validate_token_request`]:
//!     crate::oauth::grant::GrantExtensions::validate_token_request

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{RawForm, RawQuery, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::debug;

use crate::error::OAuthError;
use crate::oauth::authorize::AuthorizeHandler;
use crate::oauth::request::{OAuthRequest, OAuthResponse};

/// State for the authorization endpoint.
#[derive(Clone)]
pub struct AuthorizeState {
    /// The authorize pipeline.
    pub handler: Arc<AuthorizeHandler>,
}

impl AuthorizeState {
    /// Creates endpoint state.
    #[must_use]
    pub fn new(handler: Arc<AuthorizeHandler>) -> Self {
        Self { handler }
    }
}

/// Builds a router exposing `GET`/`POST /authorize`.
pub fn routes(state: AuthorizeState) -> Router {
    Router::new()
        .route("/authorize", get(authorize_handler).post(authorize_handler))
        .with_state(state)
}

/// OAuth 2.0 authorization endpoint handler.
///
/// Accepts parameters from the query string and, for non-GET requests,
/// from a `application/x-www-form-urlencoded` body.
pub async fn authorize_handler(
    State(state): State<AuthorizeState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    RawForm(body): RawForm,
) -> Response {
    let query = parse_params(query.as_deref().unwrap_or_default());
    let body = if method == Method::GET {
        // RawForm mirrors the query string for GET; the pipeline reads
        // query parameters itself, so only real bodies are kept.
        HashMap::new()
    } else {
        parse_params(std::str::from_utf8(&body).unwrap_or_default())
    };

    let request = OAuthRequest::from_parts(body, query, header_map(&headers));
    debug!(client_id = ?request.param("client_id"), "processing authorization request");

    let mut oauth_response = OAuthResponse::new();
    match state.handler.handle(&request, &mut oauth_response).await {
        Ok(_) => into_response(&oauth_response),
        Err(_) if oauth_response.is_redirect() => {
            // The pipeline already packed the error into the redirect.
            into_response(&oauth_response)
        }
        Err(error) => error_response(&error, &oauth_response),
    }
}

/// Renders a completed [`OAuthResponse`] as an axum response.
#[must_use]
pub fn into_response(oauth_response: &OAuthResponse) -> Response {
    let status = StatusCode::from_u16(oauth_response.status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response = status.into_response();
    apply_headers(&mut response, oauth_response);
    response
}

/// Renders an error as an RFC 6749 section 5.2 JSON body.
///
/// Any headers the pipeline attached to the response (such as
/// `WWW-Authenticate`) are carried over. Server errors are reported as a
/// plain 500 with a generic description, regardless of their message.
#[must_use]
pub fn error_response(error: &OAuthError, oauth_response: &OAuthResponse) -> Response {
    let (status, code, description) = if error.is_server_error() {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "server_error",
            "Internal Server Error".to_string(),
        )
    } else {
        (
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::BAD_REQUEST),
            error.oauth_error_code(),
            error.to_string(),
        )
    };

    let mut response = (
        status,
        Json(serde_json::json!({
            "error": code,
            "error_description": description,
        })),
    )
        .into_response();
    apply_headers(&mut response, oauth_response);
    response
}

/// Copies accumulated headers onto an axum response.
fn apply_headers(response: &mut Response<Body>, oauth_response: &OAuthResponse) {
    for (name, value) in oauth_response.headers() {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name),
            HeaderValue::try_from(value),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
}

/// Parses `application/x-www-form-urlencoded` parameters.
fn parse_params(raw: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect()
}

/// Flattens an axum header map into the core's string map.
fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}
