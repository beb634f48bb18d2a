use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use librakeeper_core::AppError;

use crate::dto::{HealthResponse, SearchQuery, SearchResponse};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/search", get(search))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/v1/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Current state of the search", body = SearchResponse),
        (status = 400, description = "Missing or empty ISBN", body = crate::dto::ErrorResponse),
        (status = 502, description = "Searcher unreachable or failing", body = crate::dto::ErrorResponse),
        (status = 504, description = "Searcher did not answer in time", body = crate::dto::ErrorResponse),
    ),
    tag = "search"
)]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let isbn = query.isbn.unwrap_or_default();
    if isbn.is_empty() {
        return Err(AppError::InvalidArgument("isbn query parameter is required".to_string()).into());
    }

    let outcome = state.searcher.search(&isbn).await?;
    tracing::debug!(%isbn, status = %outcome.status, "Search forwarded");

    Ok(axum::Json(SearchResponse::new(&isbn, outcome)))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Searcher is unreachable", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let searcher_status = match state.searcher.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Searcher health check failed");
            "error"
        }
    };

    let (status, label) = if searcher_status == "ok" {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status: label,
        searcher: searcher_status,
    };

    (status, axum::Json(response))
}
