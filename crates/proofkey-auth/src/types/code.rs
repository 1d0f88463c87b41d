//! Authorization code record.
//!
//! The central entity of the code flow. A record is created by the
//! authorize handler, persisted exactly once through the model, and read
//! back at token-redemption time. Marking a code consumed (and deleting
//! expired codes) is the surrounding grant engine's responsibility; this
//! crate only validates what it is handed.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Persisted authorization code.
///
/// A record without a `code_challenge` is a classic (non-PKCE) code and
/// must reject any verifier at redemption; a record with one must demand a
/// verifier. When a challenge was stored without an explicit method, the
/// method is `plain`.
///
/// The challenge method is kept as a string rather than a closed enum:
/// storage backends are outside this crate's control, and a record coming
/// back with an unrecognized method must be detected at redemption time
/// and reported as a storage contract violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCode {
    /// The opaque single-use code value.
    pub code: String,

    /// Expiry timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Redirect URI the code was issued for.
    pub redirect_uri: String,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Resource owner who approved the request.
    pub user_id: Uuid,

    /// PKCE code challenge, present iff the authorization request carried
    /// one. 43-128 characters over `[A-Za-z0-9.\-_~]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    /// PKCE challenge method (`"plain"` or `"S256"`). Only ever present
    /// alongside `code_challenge`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
}

impl AuthorizationCode {
    /// Generates a fresh authorization code value.
    ///
    /// 256 bits from the system CSPRNG, base64url-encoded without padding
    /// (43 characters), exceeding the RFC 6749 recommendation of at least
    /// 128 bits of entropy.
    #[must_use]
    pub fn generate() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the code has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if the code carries a PKCE commitment.
    #[must_use]
    pub fn has_challenge(&self) -> bool {
        self.code_challenge.is_some()
    }
}
