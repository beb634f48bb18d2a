//! Mapping between domain types and the wire messages.

use librakeeper_core::error::AppError;
use librakeeper_core::models::{BookListing, RequestStatus, SearchRequest};

use crate::proto::search_by_isbn_response::Status as WireStatus;
use crate::proto::{Book, SearchByIsbnResponse};

impl From<RequestStatus> for WireStatus {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => WireStatus::Pending,
            RequestStatus::Success => WireStatus::Success,
            RequestStatus::Failed => WireStatus::Failed,
        }
    }
}

impl From<WireStatus> for RequestStatus {
    fn from(status: WireStatus) -> Self {
        match status {
            WireStatus::Pending => RequestStatus::Pending,
            WireStatus::Success => RequestStatus::Success,
            WireStatus::Failed => RequestStatus::Failed,
        }
    }
}

impl From<BookListing> for Book {
    fn from(listing: BookListing) -> Self {
        Self {
            title: listing.title,
            author: listing.author,
            publishing: listing.publisher,
            img_url: listing.cover_url,
            shop_name: listing.shop_name,
        }
    }
}

impl From<Book> for BookListing {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author,
            publisher: book.publishing,
            cover_url: book.img_url,
            shop_name: book.shop_name,
        }
    }
}

impl From<SearchRequest> for SearchByIsbnResponse {
    fn from(request: SearchRequest) -> Self {
        let mut response = SearchByIsbnResponse {
            status: 0,
            books: request.listings.into_iter().map(Book::from).collect(),
        };
        response.set_status(request.status.into());
        response
    }
}

/// Map a service error onto a gRPC status: caller mistakes are
/// `INVALID_ARGUMENT`, everything else is `INTERNAL`.
pub fn to_status(error: AppError) -> tonic::Status {
    if error.is_client_error() {
        tonic::Status::invalid_argument(error.to_string())
    } else {
        tonic::Status::internal(error.to_string())
    }
}
