//! Listing entries returned by the remote store (read-only).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a folder listing.
///
/// Folder placeholders come back without metadata, so size and creation
/// time are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ListingEntry {
    pub fn file(name: impl Into<String>, size_bytes: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            size_bytes: Some(size_bytes),
            created_at: Some(created_at),
        }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes: None,
            created_at: None,
        }
    }
}

impl fmt::Display for ListingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.name)?;
        match self.size_bytes {
            Some(size) => write!(f, "{size} bytes, ")?,
            None => f.write_str("- bytes, ")?,
        }
        match self.created_at {
            Some(at) => write!(f, "{})", at.to_rfc3339()),
            None => f.write_str("-)"),
        }
    }
}
