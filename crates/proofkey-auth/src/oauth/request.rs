//! Transport-agnostic request and response objects.
//!
//! The transport binding adapts its framework's request into an
//! [`OAuthRequest`] (read-only body/query/header parameter maps) and hands
//! the handlers an [`OAuthResponse`] to fill. The handlers mutate the
//! response at most once, with either a success or an error redirect; the
//! binding then emits it over the wire.

use std::collections::{BTreeMap, HashMap};

/// Read-only view of an incoming authorization or token request.
#[derive(Debug, Clone, Default)]
pub struct OAuthRequest {
    body: HashMap<String, String>,
    query: HashMap<String, String>,
    /// Header names are stored lowercased.
    headers: HashMap<String, String>,
}

impl OAuthRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request from already-parsed parameter maps.
    ///
    /// Header names are lowercased on the way in so lookups are
    /// case-insensitive.
    #[must_use]
    pub fn from_parts(
        body: HashMap<String, String>,
        query: HashMap<String, String>,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            body,
            query,
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
        }
    }

    /// Adds a body parameter.
    #[must_use]
    pub fn with_body_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.insert(name.into(), value.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Looks up a body parameter.
    #[must_use]
    pub fn body_param(&self, name: &str) -> Option<&str> {
        self.body.get(name).map(String::as_str)
    }

    /// Looks up a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Looks up a parameter in the body, falling back to the query.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.body_param(name).or_else(|| self.query_param(name))
    }

    /// Looks up a header, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Outgoing response under construction.
///
/// Headers are kept in a sorted map so emission order is deterministic.
#[derive(Debug, Clone)]
pub struct OAuthResponse {
    status: u16,
    headers: BTreeMap<String, String>,
}

impl Default for OAuthResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
        }
    }
}

impl OAuthResponse {
    /// Creates an empty 200 response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns the response into a 302 redirect to `location`.
    pub fn redirect(&mut self, location: impl Into<String>) {
        self.status = 302;
        self.headers.insert("location".to_string(), location.into());
    }

    /// Sets a header. Names are lowercased.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
    }

    /// Returns the response status.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Looks up a header, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Iterates over all headers.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns `true` if the response is a redirect.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        self.status == 302 && self.headers.contains_key("location")
    }

    /// Returns the redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }
}
