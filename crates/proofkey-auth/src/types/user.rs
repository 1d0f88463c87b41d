//! Resource owner record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The resource owner on whose behalf an authorization code is issued.
///
/// How a user is authenticated is entirely the model's concern; the code
/// flow only needs a stable identity to stamp onto the persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier.
    pub id: Uuid,

    /// Login name, used by demo backends to resolve the user.
    pub username: String,
}

impl User {
    /// Creates a user with a fresh identifier.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
        }
    }
}
