// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
///
/// When the environment variable named by `cookie_env` is set, its value is
/// sent as the `Cookie` header on every request.
pub fn create_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = std::env::var(&config.cookie_env) {
        if !cookie.trim().is_empty() {
            let value = HeaderValue::from_str(cookie.trim())
                .map_err(|e| AppError::config(format!("{}: {}", config.cookie_env, e)))?;
            headers.insert(COOKIE, value);
        }
    }

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Fetch a URL and return the response body as text.
///
/// Non-success status codes are errors.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}
