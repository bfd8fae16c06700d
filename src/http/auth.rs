//! HTTP authentication header values

use base64::Engine;

/// Authentication helper
pub struct Auth;

impl Auth {
    /// Create basic auth header value
    pub fn basic(username: &str, password: Option<&str>) -> String {
        let credentials = format!("{}:{}", username, password.unwrap_or_default());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {}", encoded)
    }

    /// Create bearer token header value
    pub fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }
}
