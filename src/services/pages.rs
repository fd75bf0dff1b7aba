// src/services/pages.rs

//! Sources of rendered course pages.

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{BatchEntry, ScheduleConfig};
use crate::utils::{get_domain, http::fetch_text};

/// Something that can produce the HTML of a course page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, entry: &BatchEntry) -> Result<String>;
}

/// Fetches pages from the schedule site over HTTP.
pub struct HttpPageSource {
    client: Client,
    schedule: ScheduleConfig,
}

impl HttpPageSource {
    pub fn new(client: Client, schedule: ScheduleConfig) -> Self {
        Self { client, schedule }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, entry: &BatchEntry) -> Result<String> {
        let url = entry.page_url(&self.schedule);
        log::debug!(
            "Fetching SLN {} from {}",
            entry.sln,
            get_domain(&url).unwrap_or_else(|| url.clone())
        );
        fetch_text(&self.client, &url).await
    }
}

/// Reads previously saved pages named `{sln}.html` from a directory.
pub struct FilePageSource {
    dir: PathBuf,
}

impl FilePageSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, entry: &BatchEntry) -> PathBuf {
        self.dir.join(format!("{}.html", entry.sln.trim()))
    }
}

#[async_trait]
impl PageSource for FilePageSource {
    async fn fetch_page(&self, entry: &BatchEntry) -> Result<String> {
        let path = self.path(entry);
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => Ok(html),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::config(format!(
                "No saved page for SLN {} at {}",
                entry.sln,
                path.display()
            ))),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
