//! Resource owner resolution trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::request::OAuthRequest;
use crate::types::{Client, User};

/// Resolution of the resource owner behind an authorization request, and
/// validation of the scopes they may grant.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Resolves the authenticated user for an authorization request.
    ///
    /// How authentication happens (session cookie, login form, upstream
    /// identity provider) is entirely the implementation's concern.
    /// Returning `None` means the environment failed to establish a user
    /// and is reported as a server error by the authorize handler.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` or `ServerError` depending on the failure.
    async fn authenticate_user(&self, request: &OAuthRequest) -> AuthResult<Option<User>>;

    /// Validates the requested scope for a user/client pair.
    ///
    /// Returns the (possibly narrowed) scope to grant, or `None` when the
    /// request asks for something this user or client may not have.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the storage operation fails.
    async fn validate_scope(
        &self,
        user: &User,
        client: &Client,
        scope: Option<&str>,
    ) -> AuthResult<Option<String>>;
}
