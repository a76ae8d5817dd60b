use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    /// `ok` when the vector store is reachable, `degraded` otherwise.
    pub status: String,
    pub version: String,
    pub vector_store: VectorStoreStatus,
    pub embeddings: ModelStatus,
    pub sparse: ModelStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct VectorStoreStatus {
    pub status: String,
    pub collection: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ModelStatus {
    pub model: String,
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthData),
        (status = 503, description = "Vector store unreachable", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let store = state.search.store();

    let reachable = match store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Vector store health check failed");
            false
        }
    };

    let data = HealthData {
        status: if reachable { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        vector_store: VectorStoreStatus {
            status: if reachable { "ok" } else { "error" }.to_string(),
            collection: store.collection().to_string(),
        },
        embeddings: ModelStatus {
            model: state.search.dense().model().to_string(),
        },
        sparse: ModelStatus {
            model: state.search.sparse().model().to_string(),
        },
    };

    if reachable {
        ApiResponse::success(data)
    } else {
        ApiResponse::with_status(data, StatusCode::SERVICE_UNAVAILABLE)
    }
}
