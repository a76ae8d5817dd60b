//! # V1 API Response Envelope & Error Contract
//!
//! Every v1 endpoint returns an [`ApiResponse<T>`] envelope:
//!
//! ```json
//! {
//!   "data": { ... },       // present on success, absent on error
//!   "error": { "code": "invalid_request", "message": "..." }  // present on error
//! }
//! ```
//!
//! Failures of the embedding service or the vector store surface as
//! `502 upstream_error`; their bodies are logged and never echoed to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::TicketLensError;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire (e.g. `"invalid_request"`).
/// Each variant maps to a fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed query string or invalid parameter value. HTTP 400.
    InvalidRequest,
    /// Unexpected server-side error. HTTP 500.
    InternalError,
    /// The embedding service or the vector store failed. HTTP 502.
    UpstreamError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::InternalError => write!(f, "internal_error"),
            Self::UpstreamError => write!(f, "upstream_error"),
        }
    }
}

/// Structured error payload within the API envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Human-readable description, safe to show to end users.
    pub message: String,
}

/// Canonical v1 API response envelope.
///
/// On success `data` is present and `error` is absent; on error the reverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Success payload served with a non-200 status (e.g. a degraded health report).
    pub fn with_status(data: T, status: StatusCode) -> Self {
        Self {
            data: Some(data),
            error: None,
            status,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<TicketLensError> for ApiResponse<T> {
    /// Convert a [`TicketLensError`] into a v1 [`ApiResponse`].
    ///
    /// Upstream and internal details are logged via `tracing::error!` and
    /// replaced with a generic message.
    fn from(err: TicketLensError) -> Self {
        match err {
            TicketLensError::Validation(ref msg) => {
                ApiResponse::error(ErrorCode::InvalidRequest, msg.clone())
            }

            ref upstream @ (TicketLensError::Embedding(_) | TicketLensError::ApiAuth(_)) => {
                tracing::error!(error = %upstream, "Embedding service failure");
                ApiResponse::error(ErrorCode::UpstreamError, "Embedding service request failed")
            }

            TicketLensError::ApiRateLimit { retry_after } => {
                tracing::error!(?retry_after, "Embedding service rate limited");
                let msg = match retry_after {
                    Some(secs) => {
                        format!("Embedding service rate limited, retry after {secs} seconds")
                    }
                    None => "Embedding service rate limited".to_string(),
                };
                ApiResponse::error(ErrorCode::UpstreamError, msg)
            }

            ref upstream @ (TicketLensError::VectorStore(_)
            | TicketLensError::VectorStoreStatus { .. }
            | TicketLensError::Http(_)) => {
                tracing::error!(error = %upstream, "Vector store failure");
                ApiResponse::error(ErrorCode::UpstreamError, "Vector store request failed")
            }

            ref internal @ (TicketLensError::UrlParse(_) | TicketLensError::Internal(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_response_serializes_without_error() {
        let resp = ApiResponse::success("hello");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["data"], "hello");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_response_serializes_without_data() {
        let resp = ApiResponse::<()>::error(ErrorCode::InvalidRequest, "bad date");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "invalid_request");
        assert_eq!(json["error"]["message"], "bad date");
    }

    #[test]
    fn error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::InternalError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ErrorCode::UpstreamError.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn error_code_serializes_snake_case() {
        let json = serde_json::to_value(&ErrorCode::UpstreamError).expect("serialize");
        assert_eq!(json, "upstream_error");
        assert_eq!(ErrorCode::UpstreamError.to_string(), "upstream_error");
    }

    #[test]
    fn validation_maps_to_invalid_request() {
        let resp: ApiResponse<()> = TicketLensError::Validation("q is required".into()).into();
        let err = resp.error.as_ref().expect("error");
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(err.message, "q is required");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn vector_store_status_maps_to_upstream_without_leaking_body() {
        let resp: ApiResponse<()> = TicketLensError::VectorStoreStatus {
            status: 404,
            body: "collection tickets_secret not found".into(),
        }
        .into();
        let err = resp.error.as_ref().expect("error");
        assert_eq!(err.code, ErrorCode::UpstreamError);
        assert!(!err.message.contains("tickets_secret"));
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn embedding_auth_maps_to_upstream() {
        let resp: ApiResponse<()> = TicketLensError::ApiAuth("401".into()).into();
        assert_eq!(
            resp.error.as_ref().expect("error").code,
            ErrorCode::UpstreamError
        );
    }

    #[test]
    fn rate_limit_mentions_retry_after() {
        let resp: ApiResponse<()> = TicketLensError::ApiRateLimit {
            retry_after: Some(30),
        }
        .into();
        let err = resp.error.as_ref().expect("error");
        assert_eq!(err.code, ErrorCode::UpstreamError);
        assert!(err.message.contains("30"));
    }

    #[test]
    fn internal_does_not_leak() {
        let resp: ApiResponse<()> = TicketLensError::Internal("secret debug info".into()).into();
        let err = resp.error.as_ref().expect("error");
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, "An internal error occurred");
    }
}
