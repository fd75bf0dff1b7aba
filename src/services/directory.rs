// src/services/directory.rs

//! Faculty directory API client.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::{DirectoryConfig, DirectoryResponse, lookup_name};
use crate::utils::append_path_segment;

/// Name-based contact lookup.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// Look up a faculty member. Transport errors are returned, not retried.
    async fn fetch(&self, first_name: &str, last_name: &str) -> Result<DirectoryResponse>;
}

/// HTTP client for the faculty directory.
pub struct DirectoryClient {
    base_url: String,
    client: Client,
}

impl DirectoryClient {
    pub fn new(config: &DirectoryConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.clone(),
            client,
        }
    }

    /// Lookup URL for a name; blank name parts are omitted.
    pub fn lookup_url(&self, first_name: &str, last_name: &str) -> Result<String> {
        append_path_segment(&self.base_url, &lookup_name(first_name, last_name))
    }
}

#[async_trait]
impl DirectoryApi for DirectoryClient {
    async fn fetch(&self, first_name: &str, last_name: &str) -> Result<DirectoryResponse> {
        log::info!("Getting data from directory for {}, {}", first_name, last_name);
        let url = self.lookup_url(first_name, last_name)?;

        log::debug!("Directory request: {}", url);
        let body = self.client.get(&url).send().await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::AppError;

    fn client() -> DirectoryClient {
        DirectoryClient::new(&DirectoryConfig::default(), Client::new())
    }

    #[test]
    fn test_lookup_url_full_name() {
        assert_eq!(
            client().lookup_url("CAROL", "ZANDER").unwrap(),
            "http://www.uwfaculty-lmao.tk/faculty/api/v1/CAROL%20ZANDER"
        );
    }

    #[test]
    fn test_lookup_url_last_name_only() {
        assert_eq!(
            client().lookup_url("", "STAFF").unwrap(),
            "http://www.uwfaculty-lmao.tk/faculty/api/v1/STAFF"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_transient_error() {
        let config = DirectoryConfig {
            base_url: "http://127.0.0.1:1/faculty/api/v1/".to_string(),
        };
        let directory = DirectoryClient::new(&config, Client::new());

        let err = directory.fetch("CAROL", "ZANDER").await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_lookup_url_first_name_only() {
        assert_eq!(
            client().lookup_url("CAROL", "").unwrap(),
            "http://www.uwfaculty-lmao.tk/faculty/api/v1/CAROL"
        );
    }
}
