//! Batch input entries.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::ScheduleConfig;

/// One course page to fetch and parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchEntry {
    pub sln: String,
    pub quarter: String,
    pub year: String,

    /// Page URL; built from the schedule template when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl BatchEntry {
    /// Resolve the page URL for this entry.
    pub fn page_url(&self, schedule: &ScheduleConfig) -> String {
        match &self.url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => schedule.page_url(&self.quarter, &self.year, &self.sln),
        }
    }

    /// Parse a JSON Lines document, skipping blank lines.
    pub fn parse_lines(content: &str) -> Result<Vec<Self>> {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|e| {
                    AppError::validation(format!("batch line {}: {}", idx + 1, e))
                })
            })
            .collect()
    }

    /// Load entries from a JSON Lines file.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let content = fs::read_to_string(path)?;
        Self::parse_lines(&content)
    }
}
