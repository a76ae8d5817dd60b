use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TicketLens API",
        version = "1.0.0",
        description = "Hybrid sparse+dense search over support tickets stored in Qdrant.",
    ),
    paths(handlers::health::health_check, handlers::search::search),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Search
        dto::search::SearchResponse,
        dto::search::SearchHitResponse,
        dto::search::MetricsResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::VectorStoreStatus,
        handlers::health::ModelStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "search", description = "Hybrid ticket search and offline evaluation"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
