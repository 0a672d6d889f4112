//! OAuth authentication helpers for Twitter/X API integration.
//!
//! Search uses application-only authentication: the consumer token and secret
//! are exchanged for a bearer token once, and every search request carries that
//! bearer token.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Builds the Authorization header for OAuth 2.0 Bearer Token authentication.
///
/// # Example
///
/// ```rust
/// use tweetsearch::build_bearer_auth_header;
///
/// let header = build_bearer_auth_header("your_bearer_token");
/// assert_eq!(header, "Bearer your_bearer_token");
/// ```
pub fn build_bearer_auth_header(bearer_token: &str) -> String {
    format!("Bearer {}", bearer_token)
}

/// Builds the Basic Authorization header used to request an app-only bearer token.
///
/// The consumer token and secret are each URL-encoded, joined with `:` and
/// base64-encoded.
///
/// # Example
///
/// ```rust
/// use tweetsearch::build_basic_auth_header;
///
/// let header = build_basic_auth_header("key", "secret");
/// assert_eq!(header, "Basic a2V5OnNlY3JldA==");
/// ```
pub fn build_basic_auth_header(consumer_token: &str, consumer_secret: &str) -> String {
    let credentials = format!(
        "{}:{}",
        urlencoding::encode(consumer_token),
        urlencoding::encode(consumer_secret)
    );
    format!("Basic {}", STANDARD.encode(credentials))
}
