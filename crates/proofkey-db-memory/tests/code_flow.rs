//! End-to-end tests of the authorization code flow with PKCE, driven
//! through the in-memory model: authorize, inspect the persisted record,
//! then redeem at the token side.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use time::Duration;
use url::Url;

use proofkey_auth::config::AuthorizationOptions;
use proofkey_auth::error::OAuthError;
use proofkey_auth::oauth::{
    AuthorizeHandler, BaseGrant, ChallengeMethod, GrantExtensions, OAuthRequest, OAuthResponse,
    PkceGrant,
};
use proofkey_auth::storage::{CodeStorage, Model};
use proofkey_auth::types::{Client, User};
use proofkey_db_memory::InMemoryModel;

const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";

struct Flow {
    model: Arc<InMemoryModel>,
    engine: Arc<PkceGrant<BaseGrant>>,
    authorize: AuthorizeHandler,
}

fn flow_with_options(options: AuthorizationOptions) -> Flow {
    let model = Arc::new(InMemoryModel::new());
    model.register_client(Client::public("app", "https://app.example.com/cb"));
    model.add_user(User::new("alice"));

    let engine = Arc::new(PkceGrant::new(
        Arc::clone(&model) as Arc<dyn Model>,
        options.clone(),
    ));
    let authorize = AuthorizeHandler::new(
        Arc::clone(&model) as Arc<dyn Model>,
        Arc::clone(&engine) as Arc<dyn GrantExtensions>,
        options,
    );

    Flow {
        model,
        engine,
        authorize,
    }
}

fn flow() -> Flow {
    flow_with_options(AuthorizationOptions::default())
}

fn authorize_request(challenge: Option<&str>, method: Option<&str>) -> OAuthRequest {
    let mut request = OAuthRequest::new()
        .with_query_param("response_type", "code")
        .with_query_param("client_id", "app")
        .with_query_param("redirect_uri", "https://app.example.com/cb")
        .with_query_param("state", "af0ifjsldkj")
        .with_query_param("user", "alice");
    if let Some(challenge) = challenge {
        request = request.with_query_param("code_challenge", challenge);
    }
    if let Some(method) = method {
        request = request.with_query_param("code_challenge_method", method);
    }
    request
}

fn token_request(code: &str, verifier: Option<&str>) -> OAuthRequest {
    let mut request = OAuthRequest::new()
        .with_body_param("grant_type", "authorization_code")
        .with_body_param("client_id", "app")
        .with_body_param("code", code);
    if let Some(verifier) = verifier {
        request = request.with_body_param("code_verifier", verifier);
    }
    request
}

/// Runs the authorize step and returns the code value from the redirect.
async fn issue_code(flow: &Flow, request: &OAuthRequest) -> String {
    let mut response = OAuthResponse::new();
    flow.authorize.handle(request, &mut response).await.unwrap();

    let location = Url::parse(response.location().unwrap()).unwrap();
    let pairs: HashMap<String, String> = location
        .query_pairs()
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    assert_eq!(pairs.get("state").map(String::as_str), Some("af0ifjsldkj"));
    pairs.get("code").unwrap().clone()
}

#[tokio::test]
async fn s256_issuance_and_redemption() {
    let flow = flow();
    let challenge = ChallengeMethod::S256.transform(VERIFIER);
    let code = issue_code(&flow, &authorize_request(Some(&challenge), Some("S256"))).await;

    // The persisted record carries the literal challenge and method.
    let record = flow
        .model
        .get_authorization_code(&code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.code_challenge.as_deref(), Some(challenge.as_str()));
    assert_eq!(record.code_challenge_method.as_deref(), Some("S256"));

    // The right verifier redeems; the client never sent a secret.
    let (client, redeemed) = flow
        .engine
        .validate_token_request(&token_request(&code, Some(VERIFIER)), &mut OAuthResponse::new())
        .await
        .unwrap();
    assert_eq!(client.client_id, "app");
    assert_eq!(redeemed.code, code);
    assert_eq!(redeemed.scope, record.scope);
}

#[tokio::test]
async fn s256_redemption_rejects_wrong_or_missing_verifier() {
    let flow = flow();
    let challenge = ChallengeMethod::S256.transform(VERIFIER);
    let code = issue_code(&flow, &authorize_request(Some(&challenge), Some("S256"))).await;

    let wrong = "x".repeat(43);
    let err = flow
        .engine
        .validate_token_request(
            &token_request(&code, Some(wrong.as_str())),
            &mut OAuthResponse::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid grant: code verifier is invalid");

    // An empty verifier counts as absent, so this public client cannot
    // even authenticate: the relaxation only fires for a real verifier.
    let err = flow
        .engine
        .validate_token_request(
            &token_request(&code, Some("")),
            &mut OAuthResponse::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OAuthError::InvalidClient { .. }));
}

#[tokio::test]
async fn challenge_without_method_defaults_to_plain() {
    let flow = flow();
    // With the plain transform the verifier IS the challenge.
    let verifier = "plain-challenge-used-directly-as-the-verifier-00";
    let code = issue_code(&flow, &authorize_request(Some(verifier), None)).await;

    let record = flow
        .model
        .get_authorization_code(&code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.code_challenge_method.as_deref(), Some("plain"));

    flow.engine
        .validate_token_request(&token_request(&code, Some(verifier)), &mut OAuthResponse::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn classic_code_round_trip() {
    let flow = flow();
    let code = issue_code(&flow, &authorize_request(None, None)).await;

    // Nothing PKCE-related was persisted, not even placeholders.
    let record = flow
        .model
        .get_authorization_code(&code)
        .await
        .unwrap()
        .unwrap();
    assert!(record.code_challenge.is_none());
    assert!(record.code_challenge_method.is_none());
    let json = serde_json::to_string(&record).unwrap();
    assert!(!json.contains("codeChallenge"));

    // A classic code rejects any verifier.
    let err = flow
        .engine
        .validate_token_request(&token_request(&code, Some(VERIFIER)), &mut OAuthResponse::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid grant: code verifier is invalid");

    // Without a verifier the classic exchange still needs credentials;
    // this public client has none, so resolution fails.
    let err = flow
        .engine
        .validate_token_request(&token_request(&code, None), &mut OAuthResponse::new())
        .await
        .unwrap_err();
    assert!(matches!(err, OAuthError::InvalidClient { .. }));
}

#[tokio::test]
async fn secret_requirement_not_relaxed_for_other_grants() {
    let flow = flow();

    let request = OAuthRequest::new()
        .with_body_param("grant_type", "client_credentials")
        .with_body_param("client_id", "app")
        .with_body_param("code_verifier", VERIFIER);

    let err = flow
        .engine
        .validate_token_request(&request, &mut OAuthResponse::new())
        .await
        .unwrap_err();
    // The verifier does not substitute for a secret outside the
    // authorization_code grant.
    assert!(matches!(err, OAuthError::UnsupportedGrantType { .. }));

    let err = flow
        .engine
        .get_client(&request, &mut OAuthResponse::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid client: cannot retrieve client credentials"
    );
}

#[tokio::test]
async fn failed_basic_authentication_gets_challenge_header() {
    let flow = flow();
    let header = format!("Basic {}", STANDARD.encode("ghost:wrong"));
    let request = OAuthRequest::new()
        .with_header("Authorization", header)
        .with_body_param("grant_type", "authorization_code")
        .with_body_param("code", "whatever");

    let mut response = OAuthResponse::new();
    let err = flow
        .engine
        .validate_token_request(&request, &mut response)
        .await
        .unwrap_err();

    assert!(matches!(err, OAuthError::InvalidClient { .. }));
    assert_eq!(err.status_code(), 401);
    assert_eq!(
        response.header("www-authenticate"),
        Some("Basic realm=\"Service\"")
    );
}

#[tokio::test]
async fn consumed_code_cannot_be_redeemed_twice() {
    let flow = flow();
    let challenge = ChallengeMethod::S256.transform(VERIFIER);
    let code = issue_code(&flow, &authorize_request(Some(&challenge), Some("S256"))).await;

    flow.engine
        .validate_token_request(&token_request(&code, Some(VERIFIER)), &mut OAuthResponse::new())
        .await
        .unwrap();

    // The embedding engine consumes the code after minting tokens.
    assert!(flow.model.consume_authorization_code(&code).is_some());

    let err = flow
        .engine
        .validate_token_request(&token_request(&code, Some(VERIFIER)), &mut OAuthResponse::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid grant: authorization code is invalid");
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let options =
        AuthorizationOptions::default().with_code_lifetime(Duration::seconds(-1));
    let flow = flow_with_options(options);
    let code = issue_code(&flow, &authorize_request(None, None)).await;

    let err = flow
        .engine
        .get_authorization_code(
            &token_request(&code, None),
            &Client::public("app", "https://app.example.com/cb"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid grant: authorization code has expired");
}

#[tokio::test]
async fn denied_consent_never_touches_the_response() {
    let flow = flow();
    let request = authorize_request(None, None).with_query_param("allowed", "false");

    let mut response = OAuthResponse::new();
    let err = flow.authorize.handle(&request, &mut response).await.unwrap_err();
    assert!(matches!(err, OAuthError::AccessDenied { .. }));
    assert!(!response.is_redirect());
    // Nothing was persisted either.
    assert_eq!(flow.model.code_count(), 0);
}
