//! In-memory model backend for proofkey.
//!
//! Implements the `proofkey-auth` storage traits over papaya lock-free
//! maps. Intended for tests, demos, and embedded setups; real deployments
//! should back the model with durable storage that enforces single-use
//! codes transactionally.
//!
//! # Example
//!
//! ```
//! use proofkey_db_memory::InMemoryModel;
//! use proofkey_auth::types::{Client, User};
//!
//! let model = InMemoryModel::new();
//! model.register_client(Client::public("app", "https://app.example.com/cb"));
//! model.add_user(User::new("alice"));
//! ```
//!
//! # User resolution
//!
//! Authorization requests are mapped to a resource owner through the
//! `user` parameter: `authenticate_user` looks the value up among the
//! users added with [`InMemoryModel::add_user`]. Production models
//! replace this with real session authentication.

use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;

use proofkey_auth::AuthResult;
use proofkey_auth::oauth::OAuthRequest;
use proofkey_auth::storage::{ClientStorage, CodeStorage, UserStorage};
use proofkey_auth::types::{AuthorizationCode, Client, User};

/// Lock-free in-memory model.
#[derive(Default)]
pub struct InMemoryModel {
    clients: PapayaHashMap<String, Client>,
    codes: PapayaHashMap<String, AuthorizationCode>,
    /// Users keyed by username.
    users: PapayaHashMap<String, User>,
}

impl InMemoryModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client.
    pub fn register_client(&self, client: Client) {
        self.clients.pin().insert(client.client_id.clone(), client);
    }

    /// Adds a user resolvable through the `user` request parameter.
    pub fn add_user(&self, user: User) {
        self.users.pin().insert(user.username.clone(), user);
    }

    /// Removes and returns a code record, enforcing single use.
    ///
    /// This is the engine-side consumption step: a grant engine embedding
    /// this model calls it after a successful exchange so the code cannot
    /// be redeemed twice.
    pub fn consume_authorization_code(&self, code: &str) -> Option<AuthorizationCode> {
        self.codes.pin().remove(code).cloned()
    }

    /// Returns the number of stored code records.
    #[must_use]
    pub fn code_count(&self) -> usize {
        self.codes.pin().len()
    }
}

#[async_trait]
impl ClientStorage for InMemoryModel {
    async fn get_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> AuthResult<Option<Client>> {
        let clients = self.clients.pin();
        Ok(clients.get(client_id).cloned().filter(|client| {
            match client_secret {
                // Lookup by id alone.
                None => true,
                Some(secret) => client.client_secret.as_deref() == Some(secret),
            }
        }))
    }
}

#[async_trait]
impl CodeStorage for InMemoryModel {
    async fn save_authorization_code(
        &self,
        code: &AuthorizationCode,
        _client: &Client,
        _user: &User,
    ) -> AuthResult<AuthorizationCode> {
        self.codes.pin().insert(code.code.clone(), code.clone());
        Ok(code.clone())
    }

    async fn get_authorization_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.pin().get(code).cloned())
    }
}

#[async_trait]
impl UserStorage for InMemoryModel {
    async fn authenticate_user(&self, request: &OAuthRequest) -> AuthResult<Option<User>> {
        let Some(username) = request.param("user") else {
            return Ok(None);
        };
        Ok(self.users.pin().get(username).cloned())
    }

    async fn validate_scope(
        &self,
        _user: &User,
        client: &Client,
        scope: Option<&str>,
    ) -> AuthResult<Option<String>> {
        let requested = scope.unwrap_or_default();
        if client.scopes.is_empty() {
            return Ok(Some(requested.to_string()));
        }

        let all_allowed = requested
            .split_whitespace()
            .all(|scope| client.scopes.iter().any(|allowed| allowed == scope));
        Ok(all_allowed.then(|| requested.to_string()))
    }
}
