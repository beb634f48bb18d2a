use chrono::{DateTime, Utc};
use librakeeper_core::error::AppError;
use librakeeper_core::models::{BookListing, RequestStatus, SearchRequest};
use librakeeper_core::traits::SearchRequestStore;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, IndexModel};
use serde::{Deserialize, Serialize};

const DUPLICATE_KEY: i32 = 11000;

/// Repository for ISBN search requests in MongoDB.
///
/// One document per ISBN; the unique index on `isbn` backs the atomic
/// find-or-create.
#[derive(Clone)]
pub struct SearchRequestRepository {
    collection: Collection<SearchRequestDocument>,
}

impl SearchRequestRepository {
    pub fn new(collection: Collection<SearchRequestDocument>) -> Self {
        Self { collection }
    }

    /// Create the unique `isbn` index if it does not exist yet.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        let index = IndexModel::builder()
            .keys(doc! { "isbn": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("isbn_unique".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_index(index)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create isbn index: {e}")))?;
        Ok(())
    }

    async fn upsert_pending(
        &self,
        isbn: &str,
        candidate_id: ObjectId,
    ) -> mongodb::error::Result<Option<SearchRequestDocument>> {
        let now = bson::DateTime::now();
        self.collection
            .find_one_and_update(
                doc! { "isbn": isbn },
                doc! {
                    "$setOnInsert": {
                        "_id": candidate_id,
                        "status": RequestStatus::Pending.as_str(),
                        "books": [],
                        "created_at": now,
                        "updated_at": now,
                    }
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
    }

    async fn set_fields(&self, isbn: &str, fields: bson::Document) -> Result<(), AppError> {
        let mut set = fields;
        set.insert("updated_at", bson::DateTime::now());

        let result = self
            .collection
            .update_one(doc! { "isbn": isbn }, doc! { "$set": set })
            .await
            .map_err(db_error)?;

        if result.matched_count == 0 {
            tracing::warn!(%isbn, "No search request to update");
        }
        Ok(())
    }
}

impl SearchRequestStore for SearchRequestRepository {
    async fn find_or_create(&self, isbn: &str) -> Result<(SearchRequest, bool), AppError> {
        let candidate_id = ObjectId::new();

        let document = match self.upsert_pending(isbn, candidate_id).await {
            Ok(document) => document,
            // Lost an upsert race against a concurrent insert of the same ISBN.
            Err(e) if is_duplicate_key(&e) => {
                tracing::debug!(%isbn, "Concurrent insert detected, reading the winner");
                let existing = self.get_request(isbn).await?.ok_or_else(|| {
                    AppError::DatabaseError(format!("Search request for {isbn} vanished"))
                })?;
                return Ok((existing, false));
            }
            Err(e) => return Err(db_error(e)),
        };

        let document = document.ok_or_else(|| {
            AppError::DatabaseError(format!("Upsert returned no document for isbn {isbn}"))
        })?;
        let created = document.id == candidate_id;
        Ok((document.try_into()?, created))
    }

    async fn complete_request(&self, isbn: &str, listings: &[BookListing]) -> Result<(), AppError> {
        let books: Vec<BookDocument> = listings.iter().map(BookDocument::from).collect();
        let books = bson::to_bson(&books)
            .map_err(|e| AppError::DatabaseError(format!("Failed to encode listings: {e}")))?;

        self.set_fields(
            isbn,
            doc! { "status": RequestStatus::Success.as_str(), "books": books },
        )
        .await
    }

    async fn reject_request(&self, isbn: &str) -> Result<(), AppError> {
        self.set_fields(isbn, doc! { "status": RequestStatus::Failed.as_str() })
            .await
    }

    async fn get_request(&self, isbn: &str) -> Result<Option<SearchRequest>, AppError> {
        let document = self
            .collection
            .find_one(doc! { "isbn": isbn })
            .await
            .map_err(db_error)?;

        document.map(SearchRequest::try_from).transpose()
    }
}

fn db_error(e: mongodb::error::Error) -> AppError {
    AppError::DatabaseError(e.to_string())
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY,
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY,
        _ => false,
    }
}

// -- Stored document shape --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequestDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    isbn: String,
    status: StoredStatus,
    #[serde(default)]
    books: Vec<BookDocument>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

/// Status as stored: our string form, or the integer code (0 pending,
/// 1 success, 2 failed) found in older documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredStatus {
    Name(String),
    Code(i64),
}

impl TryFrom<&StoredStatus> for RequestStatus {
    type Error = AppError;

    fn try_from(stored: &StoredStatus) -> Result<Self, AppError> {
        match stored {
            StoredStatus::Name(name) => name
                .parse()
                .map_err(|e| AppError::DatabaseError(format!("Corrupt search request: {e}"))),
            StoredStatus::Code(0) => Ok(RequestStatus::Pending),
            StoredStatus::Code(1) => Ok(RequestStatus::Success),
            StoredStatus::Code(2) => Ok(RequestStatus::Failed),
            StoredStatus::Code(code) => Err(AppError::DatabaseError(format!(
                "Corrupt search request: unknown status code {code}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookDocument {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    publishing: String,
    #[serde(default)]
    img_url: String,
    #[serde(default)]
    shop_name: String,
}

impl From<&BookListing> for BookDocument {
    fn from(listing: &BookListing) -> Self {
        Self {
            title: listing.title.clone(),
            author: listing.author.clone(),
            publishing: listing.publisher.clone(),
            img_url: listing.cover_url.clone(),
            shop_name: listing.shop_name.clone(),
        }
    }
}

impl From<BookDocument> for BookListing {
    fn from(book: BookDocument) -> Self {
        Self {
            title: book.title,
            author: book.author,
            publisher: book.publishing,
            cover_url: book.img_url,
            shop_name: book.shop_name,
        }
    }
}

impl TryFrom<SearchRequestDocument> for SearchRequest {
    type Error = AppError;

    fn try_from(document: SearchRequestDocument) -> Result<Self, AppError> {
        let status = RequestStatus::try_from(&document.status).inspect_err(|e| {
            tracing::error!(isbn = %document.isbn, error = %e, "Unreadable search request status");
        })?;

        Ok(Self {
            id: document.id.to_hex(),
            isbn: document.isbn,
            status,
            listings: document.books.into_iter().map(Into::into).collect(),
            created_at: to_chrono(document.created_at),
            updated_at: to_chrono(document.updated_at),
        })
    }
}

fn to_chrono(value: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}
