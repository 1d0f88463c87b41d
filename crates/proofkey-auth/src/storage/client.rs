//! Client lookup trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Lookup of OAuth 2.0 client registrations.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Finds a client by id, verifying the secret when one is supplied.
    ///
    /// With `client_secret` of `None` the lookup is by id alone (used by
    /// the authorization endpoint and for public PKCE clients). With a
    /// secret, implementations must return `None` unless it matches the
    /// registration.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the storage operation itself fails.
    async fn get_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> AuthResult<Option<Client>>;
}
