//! Core Twitter API utilities.
//!
//! Low-level helpers for sending authenticated requests, mapping HTTP status
//! codes onto [`ProviderError`], and obtaining the app-only bearer token.

use log::{debug, error, info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::Credentials;
use crate::error::ProviderError;
use crate::oauth::build_basic_auth_header;

/// Twitter's legacy "Enhance Your Calm" status, still sent by some v1.1 endpoints.
const STATUS_ENHANCE_YOUR_CALM: u16 = 420;

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// - Newlines, carriage returns and tabs become spaces
/// - Other control characters become `?`
/// - Text longer than `max_len` characters is truncated
pub(crate) fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_len {
        let truncated: String = sanitized.chars().take(max_len).collect();
        format!(
            "{}... [truncated, {} total bytes]",
            truncated,
            text.len()
        )
    } else {
        sanitized
    }
}

/// True for the status codes Twitter uses to signal rate limiting.
pub(crate) fn is_rate_limit_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == STATUS_ENHANCE_YOUR_CALM
}

/// Sends a request and returns the response body on success.
///
/// # Returns
///
/// - `Ok(String)`: The response body for a 2xx status
/// - `Err(ProviderError::RateLimited)`: For 429 and 420 responses
/// - `Err(ProviderError::Api)`: For any other non-success status
/// - `Err(ProviderError::Http)`: If the request could not be sent
pub(crate) async fn send_api_request(
    request_builder: reqwest::RequestBuilder,
    operation_name: &str,
) -> Result<String, ProviderError> {
    debug!("Sending request for operation: {}", operation_name);

    let response = request_builder.send().await?;
    let status = response.status();
    debug!(
        "Received response with status: {} for operation: {}",
        status, operation_name
    );

    if status.is_success() {
        let response_text = response.text().await?;
        debug!(
            "Response summary for '{}': {} bytes received",
            operation_name,
            response_text.len()
        );
        return Ok(response_text);
    }

    if is_rate_limit_status(status) {
        warn!(
            "Operation '{}' was rate limited (status {})",
            operation_name, status
        );
        return Err(ProviderError::RateLimited);
    }

    let error_text = response.text().await.unwrap_or_default();
    error!("Operation '{}' failed - Status: {}", operation_name, status);
    debug!(
        "Error response for '{}': {}",
        operation_name,
        sanitize_for_logging(&error_text, 200)
    );
    Err(ProviderError::Api {
        status: status.as_u16(),
        body: error_text,
    })
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token_type: String,
    access_token: String,
}

/// Exchanges the consumer token and secret for an app-only bearer token.
///
/// # Parameters
///
/// - `client`: HTTP client to send the request with
/// - `api_base`: API base URL, without a trailing slash
/// - `credentials`: Credentials holding the consumer token and secret
///
/// # Errors
///
/// Returns `ProviderError::Auth` if Twitter rejects the credentials or the
/// response does not carry a bearer token.
pub async fn obtain_bearer_token(
    client: &Client,
    api_base: &str,
    credentials: &Credentials,
) -> Result<String, ProviderError> {
    info!("Requesting app-only bearer token");

    let url = format!("{}/oauth2/token", api_base);
    let request_builder = client
        .post(&url)
        .header(
            "Authorization",
            build_basic_auth_header(&credentials.consumer_token, &credentials.consumer_secret),
        )
        .form(&[("grant_type", "client_credentials")]);

    let response_text = match send_api_request(request_builder, "obtain_bearer_token").await {
        Ok(text) => text,
        Err(ProviderError::Api { status, .. }) => {
            return Err(ProviderError::Auth(format!(
                "token endpoint returned status {}",
                status
            )));
        }
        Err(e) => return Err(e),
    };

    let token: TokenResponse = serde_json::from_str(&response_text)?;
    if !token.token_type.eq_ignore_ascii_case("bearer") {
        return Err(ProviderError::Auth(format!(
            "unexpected token type '{}'",
            token.token_type
        )));
    }
    if token.access_token.is_empty() {
        return Err(ProviderError::Auth("empty bearer token".to_string()));
    }

    info!("Obtained bearer token");
    Ok(token.access_token)
}
