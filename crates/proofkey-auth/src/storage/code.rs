//! Authorization code persistence trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{AuthorizationCode, Client, User};

/// Persistence of authorization code records.
#[async_trait]
pub trait CodeStorage: Send + Sync {
    /// Persists a freshly issued code record.
    ///
    /// The record already carries the PKCE commitment fields when the
    /// authorization request supplied a challenge; classic records carry
    /// neither field. Implementations may enrich the record (for example
    /// with backend-assigned ids) and return what was actually stored.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the storage operation fails.
    async fn save_authorization_code(
        &self,
        code: &AuthorizationCode,
        client: &Client,
        user: &User,
    ) -> AuthResult<AuthorizationCode>;

    /// Loads a code record by its code value.
    ///
    /// Returns `None` for unknown codes. Single-use enforcement is the
    /// implementation's responsibility; a returned record is assumed to
    /// be redeemable.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the storage operation fails.
    async fn get_authorization_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;
}
