//! Faculty directory API payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name used for directory lookups and cache keys.
///
/// Blank parts are dropped, so a missing first or last name leaves no stray
/// space.
pub fn lookup_name(first_name: &str, last_name: &str) -> String {
    [first_name.trim(), last_name.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Contact entry for a matched faculty member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Fields the directory returns that we do not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body returned by the directory lookup endpoint.
///
/// Unknown fields are preserved so a cached copy round-trips unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DirectoryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<Vec<Contact>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,

    /// Whether this response was served from the cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DirectoryResponse {
    /// Whether the response carries a non-empty teacher list.
    pub fn is_usable(&self) -> bool {
        self.teacher.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// First contact entry, if the lookup succeeded without an error.
    pub fn primary_contact(&self) -> Option<&Contact> {
        if self.error.is_some() {
            return None;
        }
        self.teacher.as_ref()?.first()
    }

    /// Whether this response came from the cache.
    pub fn from_cache(&self) -> bool {
        self.cache.unwrap_or(false)
    }
}
