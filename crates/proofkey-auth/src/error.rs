//! OAuth 2.0 protocol error types.
//!
//! Every failure in the authorization and token flows is classified at the
//! point of detection into one of the closed kinds below. Each kind carries
//! the RFC 6749 error code and the HTTP status consumed by the transport
//! binding. Model and engine implementations must map their internal
//! failures to `ServerError`; the transport layer renders 5xx responses
//! with a generic message so internal detail never reaches a client.

/// Errors that can occur while processing authorization and token requests.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The request is missing a required parameter, includes an invalid
    /// parameter value, or is otherwise malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// Client authentication failed or the client is not registered.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The authorization code or PKCE verifier is invalid, expired,
    /// or does not match the stored commitment.
    #[error("Invalid grant: {message}")]
    InvalidGrant {
        /// Description of why the grant is invalid.
        message: String,
    },

    /// The requested scope is invalid, unknown, or malformed.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of why the scope is invalid.
        message: String,
    },

    /// The resource owner denied the authorization request.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Description of why access was denied.
        message: String,
    },

    /// The authorization server does not support the requested response type.
    #[error("Unsupported response type: {response_type}")]
    UnsupportedResponseType {
        /// The unsupported response type.
        response_type: String,
    },

    /// The authorization server does not support the requested grant type.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// A storage or engine contract violation, or any other failure that
    /// is not the client's fault.
    #[error("Server error: {message}")]
    ServerError {
        /// Description of the internal failure.
        message: String,
    },
}

impl OAuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidGrant` error.
    #[must_use]
    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedResponseType` error.
    #[must_use]
    pub fn unsupported_response_type(response_type: impl Into<String>) -> Self {
        Self::UnsupportedResponseType {
            response_type: response_type.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `ServerError` error.
    #[must_use]
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::ServerError {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ServerError { .. })
    }

    /// Returns the RFC 6749 error code for this error.
    ///
    /// This is the value carried in the `error` parameter of error
    /// redirects and JSON error bodies.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidGrant { .. } => "invalid_grant",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::AccessDenied { .. } => "access_denied",
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::ServerError { .. } => "server_error",
        }
    }

    /// Returns the HTTP status code the transport binding should use when
    /// reporting this error directly (i.e. not via an error redirect).
    ///
    /// `InvalidClient` maps to 401 per RFC 6749 section 5.2; the
    /// `WWW-Authenticate` challenge header is attached separately by the
    /// client authenticator when the request carried an `Authorization`
    /// header.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. }
            | Self::InvalidGrant { .. }
            | Self::InvalidScope { .. }
            | Self::UnsupportedResponseType { .. }
            | Self::UnsupportedGrantType { .. } => 400,
            Self::InvalidClient { .. } => 401,
            Self::AccessDenied { .. } => 403,
            Self::ServerError { .. } => 500,
        }
    }
}

impl From<url::ParseError> for OAuthError {
    fn from(err: url::ParseError) -> Self {
        Self::server_error(format!("redirect URI could not be parsed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OAuthError::invalid_request("missing client_id");
        assert_eq!(err.to_string(), "Invalid request: missing client_id");

        let err = OAuthError::invalid_grant("code verifier is invalid");
        assert_eq!(err.to_string(), "Invalid grant: code verifier is invalid");

        let err = OAuthError::unsupported_response_type("token");
        assert_eq!(err.to_string(), "Unsupported response type: token");
    }

    #[test]
    fn test_error_predicates() {
        assert!(OAuthError::invalid_request("x").is_client_error());
        assert!(OAuthError::invalid_client("x").is_client_error());
        assert!(OAuthError::access_denied("x").is_client_error());
        assert!(!OAuthError::invalid_grant("x").is_server_error());

        assert!(OAuthError::server_error("storage down").is_server_error());
        assert!(!OAuthError::server_error("storage down").is_client_error());
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            OAuthError::invalid_request("x").oauth_error_code(),
            "invalid_request"
        );
        assert_eq!(
            OAuthError::invalid_client("x").oauth_error_code(),
            "invalid_client"
        );
        assert_eq!(
            OAuthError::invalid_grant("x").oauth_error_code(),
            "invalid_grant"
        );
        assert_eq!(
            OAuthError::access_denied("x").oauth_error_code(),
            "access_denied"
        );
        assert_eq!(
            OAuthError::server_error("x").oauth_error_code(),
            "server_error"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(OAuthError::invalid_request("x").status_code(), 400);
        assert_eq!(OAuthError::invalid_client("x").status_code(), 401);
        assert_eq!(OAuthError::invalid_grant("x").status_code(), 400);
        assert_eq!(OAuthError::access_denied("x").status_code(), 403);
        assert_eq!(OAuthError::unsupported_grant_type("x").status_code(), 400);
        assert_eq!(OAuthError::server_error("x").status_code(), 500);
    }
}
