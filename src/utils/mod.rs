//! Utility functions and helpers.

pub mod html;
pub mod http;
pub mod retry;

pub use retry::Retry;

use url::Url;

/// Append `segment` to the path of `base` as a single percent-encoded segment.
///
/// A trailing slash on `base` does not produce an empty segment.
pub fn append_path_segment(base: &str, segment: &str) -> crate::error::Result<String> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| crate::error::AppError::config(format!("URL cannot be a base: {base}")))?
        .pop_if_empty()
        .push(segment);
    Ok(url.to_string())
}

/// Extract the domain from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}
