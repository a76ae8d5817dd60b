//! v1 Search handler.
//!
//! Implements `GET /api/v1/search` (also mounted at the unversioned
//! `/search`): hybrid ticket search with optional filters, exact ticket
//! lookup and precision/recall scoring against supplied ground truth.

use std::time::Instant;

use axum::extract::State;

use crate::api::extractors::AppQuery;
use crate::api::v1::dto::{SearchQuery, SearchResponse};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;
use crate::models::SearchParams;

/// `GET /api/v1/search`
#[utoipa::path(
    get,
    path = "/api/v1/search",
    tag = "search",
    operation_id = "search.search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Deduplicated search results", body = SearchResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 502, description = "Embedding service or vector store failed", body = ApiError),
    )
)]
pub async fn search(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> ApiResponse<SearchResponse> {
    let start = Instant::now();
    let params = SearchParams::from(query);

    match state.search.search(&params).await {
        Ok(outcome) => {
            let timing_ms = start.elapsed().as_millis() as u64;
            ApiResponse::success(SearchResponse::from_outcome(outcome, timing_ms))
        }
        Err(e) => e.into(),
    }
}
