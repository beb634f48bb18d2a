use serde::{Deserialize, Serialize};

use librakeeper_core::models::BookListing;
use librakeeper_searcher::SearchOutcome;

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// ISBN to look up, as printed (dashes allowed)
    pub isbn: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SearchResponse {
    /// `pending` until the scrape finishes, then `success` or `failed`
    #[schema(example = "pending")]
    pub status: &'static str,
    pub books: Vec<BookResponse>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BookResponse {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publishing: String,
    pub cover_image: String,
    pub shop_name: String,
}

impl SearchResponse {
    pub fn new(isbn: &str, outcome: SearchOutcome) -> Self {
        Self {
            status: outcome.status.as_str(),
            books: outcome
                .listings
                .into_iter()
                .map(|listing| BookResponse::new(isbn, listing))
                .collect(),
        }
    }
}

impl BookResponse {
    fn new(isbn: &str, listing: BookListing) -> Self {
        Self {
            isbn: isbn.to_string(),
            title: listing.title,
            author: listing.author,
            publishing: listing.publisher,
            cover_image: listing.cover_url,
            shop_name: listing.shop_name,
        }
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub searcher: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
