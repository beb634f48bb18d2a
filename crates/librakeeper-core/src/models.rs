use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cover path the aggregator serves when a shop has no picture of the book.
pub const PLACEHOLDER_COVER_PATH: &str = "/images/camera.png";

/// Lifecycle status of an ISBN search request.
///
/// `Pending` is the only non-terminal state. A request moves to `Success` or
/// `Failed` exactly once and is never re-opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Success,
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Success => "success",
            RequestStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Success | RequestStatus::Failed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "success" => Ok(RequestStatus::Success),
            "failed" => Ok(RequestStatus::Failed),
            _ => Err(format!("Unknown request status: {}", s)),
        }
    }
}

/// One shop's offering of a book, as scraped from the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookListing {
    pub title: String,
    pub author: String,
    /// Publisher or imprint label as printed by the shop.
    pub publisher: String,
    /// Cover image URL; empty when the shop has no picture.
    pub cover_url: String,
    pub shop_name: String,
}

impl BookListing {
    /// Replace the aggregator's "no image" placeholder with an empty cover URL.
    pub fn normalize_cover(mut self) -> Self {
        if self.cover_url == PLACEHOLDER_COVER_PATH {
            self.cover_url.clear();
        }
        self
    }
}

/// Persisted record tracking the lifecycle of one ISBN search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Store-assigned identifier (opaque to everything but the store).
    pub id: String,
    pub isbn: String,
    pub status: RequestStatus,
    pub listings: Vec<BookListing>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SearchRequest {
    /// A freshly created request: pending, no listings yet.
    pub fn pending(id: impl Into<String>, isbn: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            isbn: isbn.into(),
            status: RequestStatus::Pending,
            listings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
