//! Authorization header providers.

use base64::{engine::general_purpose::STANDARD, Engine};

/// Produces the `Authorization` header value attached to every request.
pub trait AuthProvider: Send + Sync {
    /// Returns the full header value, scheme included.
    fn auth_header(&self) -> String;
}

/// HTTP basic authentication.
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    /// Creates basic credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Username the header is built from.
    pub fn username(&self) -> &str {
        &self.username
    }
}

// Keeps the password out of debug logs.
impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

impl AuthProvider for BasicAuth {
    fn auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}
