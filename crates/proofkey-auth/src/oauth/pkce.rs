//! PKCE (Proof Key for Code Exchange) commitment handling.
//!
//! Implements RFC 7636 for the authorization code grant: challenge
//! extraction and validation at authorization time, and verifier checking
//! at token-redemption time. Both the `plain` and `S256` methods are
//! supported; a challenge stored without a method is treated as `plain`
//! (RFC 7636 section 4.3 makes the method optional).
//!
//! # Example
//!
//! ```
//! use proofkey_auth::oauth::pkce::ChallengeMethod;
//!
//! // Client derives the challenge it sends at authorization time.
//! let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
//! let challenge = ChallengeMethod::S256.transform(verifier);
//! assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
//! ```

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::AuthResult;
use crate::error::OAuthError;
use crate::oauth::request::OAuthRequest;
use crate::types::AuthorizationCode;

// =============================================================================
// Challenge Method
// =============================================================================

/// PKCE challenge transformation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeMethod {
    /// Identity transform: the challenge is the verifier itself.
    Plain,
    /// SHA-256 transform: `challenge = BASE64URL(SHA256(ASCII(verifier)))`.
    S256,
}

impl ChallengeMethod {
    /// Parses a `code_challenge_method` value.
    ///
    /// Returns `None` for anything other than `plain` or `S256`; callers
    /// map that to `InvalidRequest` (client input) or `ServerError`
    /// (stored record), depending on where the value came from.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "plain" => Some(Self::Plain),
            "S256" => Some(Self::S256),
            _ => None,
        }
    }

    /// Returns the method as its wire string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        }
    }

    /// Applies the transform to a verifier, producing the value a matching
    /// challenge must equal.
    #[must_use]
    pub fn transform(&self, verifier: &str) -> String {
        match self {
            Self::Plain => verifier.to_string(),
            Self::S256 => {
                let mut hasher = Sha256::new();
                hasher.update(verifier.as_bytes());
                URL_SAFE_NO_PAD.encode(hasher.finalize())
            }
        }
    }
}

impl std::fmt::Display for ChallengeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Challenge Extraction
// =============================================================================

/// Returns `true` if the string is a well-formed code challenge:
/// 43-128 characters from the RFC 3986 unreserved set
/// `[A-Z] / [a-z] / [0-9] / "-" / "." / "_" / "~"` (RFC 7636 section 4.2).
#[must_use]
pub fn is_valid_challenge(value: &str) -> bool {
    (43..=128).contains(&value.len())
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
}

/// Extracts the `code_challenge` parameter from an authorization request.
///
/// Reads the body first, then the query. Returns `Ok(None)` when absent.
///
/// # Errors
///
/// Returns `InvalidRequest` if a challenge is present but violates the
/// RFC 7636 length or charset restrictions.
pub fn code_challenge_from_request(request: &OAuthRequest) -> AuthResult<Option<String>> {
    let Some(challenge) = request.param("code_challenge") else {
        return Ok(None);
    };

    if !is_valid_challenge(challenge) {
        return Err(OAuthError::invalid_request("invalid code_challenge"));
    }

    Ok(Some(challenge.to_string()))
}

/// Extracts the `code_challenge_method` parameter from an authorization
/// request.
///
/// Reads the body first, then the query. Returns `Ok(None)` when absent;
/// the method is optional even when a challenge is present (RFC 7636
/// section 4.3).
///
/// # Errors
///
/// Returns `InvalidRequest` if a method is present but is neither `plain`
/// nor `S256`.
pub fn challenge_method_from_request(request: &OAuthRequest) -> AuthResult<Option<ChallengeMethod>> {
    let Some(method) = request.param("code_challenge_method") else {
        return Ok(None);
    };

    match ChallengeMethod::parse(method) {
        Some(method) => Ok(Some(method)),
        None => Err(OAuthError::invalid_request("invalid code_challenge_method")),
    }
}

/// Returns `true` if a token request is a PKCE redemption: the grant type
/// is `authorization_code` and the body carries a `code_verifier`.
///
/// This predicate gates the client-authentication relaxation for public
/// clients; it must not match any other grant type.
#[must_use]
pub fn is_pkce_request(request: &OAuthRequest, grant_type: &str) -> bool {
    grant_type == "authorization_code"
        && request
            .body_param("code_verifier")
            .is_some_and(|verifier| !verifier.is_empty())
}

// =============================================================================
// Redemption-Time Verification
// =============================================================================

/// Verifies the PKCE commitment of a code being redeemed.
///
/// * A code issued without a challenge must not be redeemed with a
///   verifier: presenting one fails the exchange.
/// * A code issued with a challenge requires a verifier; the verifier is
///   transformed with the stored method (`plain` when the record carries
///   none) and compared against the stored challenge.
///
/// The comparison is length-checked and then constant-time over the byte
/// content; a length mismatch and a content mismatch are reported with the
/// identical error so neither timing nor the error message reveals which
/// one occurred.
///
/// # Errors
///
/// Returns `InvalidGrant` on any verifier mismatch and `ServerError` when
/// the stored record carries a challenge method this crate does not
/// recognize (a storage contract violation, not a client error).
pub fn verify_code_redemption(
    code: &AuthorizationCode,
    request: &OAuthRequest,
) -> AuthResult<()> {
    // An empty verifier parameter counts as absent.
    let verifier = request
        .body_param("code_verifier")
        .filter(|verifier| !verifier.is_empty());

    let Some(challenge) = code.code_challenge.as_deref() else {
        if verifier.is_some() {
            return Err(OAuthError::invalid_grant("code verifier is invalid"));
        }
        return Ok(());
    };

    let Some(verifier) = verifier else {
        return Err(OAuthError::invalid_grant("missing code_verifier"));
    };

    let method = match code.code_challenge_method.as_deref() {
        None => ChallengeMethod::Plain,
        Some(raw) => ChallengeMethod::parse(raw).ok_or_else(|| {
            OAuthError::server_error("storage returned an invalid code challenge method")
        })?,
    };

    let hash = method.transform(verifier);
    if !constant_time_eq(challenge.as_bytes(), hash.as_bytes()) {
        return Err(OAuthError::invalid_grant("code verifier is invalid"));
    }

    Ok(())
}

/// Length-checked constant-time equality.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

// =============================================================================
// Tests
// =============================================================================
