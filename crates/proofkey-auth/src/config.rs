//! Authorization server options.
//!
//! Options are plain values injected into the handlers at construction
//! time; there is no global configuration state.

use std::collections::HashMap;

use time::Duration;

use crate::types::GrantType;

/// Options controlling the authorization and token flows.
#[derive(Debug, Clone)]
pub struct AuthorizationOptions {
    /// Authorization code lifetime.
    /// Default: 5 minutes. RFC 6749 recommends a maximum of 10 minutes.
    pub authorization_code_lifetime: Duration,

    /// Whether an authorization request may omit the `state` parameter.
    /// Default: `false` (state is required for CSRF protection).
    pub allow_empty_state: bool,

    /// Per-grant overrides for whether client authentication is required
    /// at the token endpoint. Grants not listed here require a secret.
    client_authentication: HashMap<GrantType, bool>,
}

impl Default for AuthorizationOptions {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::minutes(5),
            allow_empty_state: false,
            client_authentication: HashMap::new(),
        }
    }
}

impl AuthorizationOptions {
    /// Creates options with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom authorization code lifetime.
    #[must_use]
    pub fn with_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.authorization_code_lifetime = lifetime;
        self
    }

    /// Allows authorization requests without a `state` parameter.
    #[must_use]
    pub fn with_allow_empty_state(mut self) -> Self {
        self.allow_empty_state = true;
        self
    }

    /// Disables the client secret requirement for the given grant type.
    ///
    /// Note that PKCE-bearing `authorization_code` token requests never
    /// need this: the client authenticator relaxes the requirement for
    /// them on its own.
    #[must_use]
    pub fn without_client_authentication(mut self, grant_type: GrantType) -> Self {
        self.client_authentication.insert(grant_type, false);
        self
    }

    /// Returns whether client authentication is required for a grant type.
    ///
    /// Unknown grant types and grants without an override require
    /// authentication.
    #[must_use]
    pub fn client_authentication_required(&self, grant_type: Option<GrantType>) -> bool {
        match grant_type {
            Some(grant) => self.client_authentication.get(&grant).copied().unwrap_or(true),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AuthorizationOptions::default();
        assert_eq!(options.authorization_code_lifetime, Duration::minutes(5));
        assert!(!options.allow_empty_state);
        assert!(options.client_authentication_required(Some(GrantType::AuthorizationCode)));
        assert!(options.client_authentication_required(None));
    }

    #[test]
    fn test_builders() {
        let options = AuthorizationOptions::new()
            .with_code_lifetime(Duration::minutes(10))
            .with_allow_empty_state()
            .without_client_authentication(GrantType::AuthorizationCode);

        assert_eq!(options.authorization_code_lifetime, Duration::minutes(10));
        assert!(options.allow_empty_state);
        assert!(!options.client_authentication_required(Some(GrantType::AuthorizationCode)));
        // Overrides are per grant type.
        assert!(options.client_authentication_required(Some(GrantType::ClientCredentials)));
    }
}
