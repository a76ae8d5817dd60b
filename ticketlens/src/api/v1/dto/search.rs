//! Search request/response DTOs for the v1 API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{EvaluationMetrics, SearchHit, SearchOutcome, SearchParams};

/// Query-string parameters of `GET /api/v1/search`.
///
/// Everything arrives as text; values are validated while the filter is
/// built so bad input yields `400 invalid_request` with a readable message.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free-text query. Required unless `ticket_id` is given.
    pub q: Option<String>,
    /// Exact request type; `all` or empty disables the filter.
    pub request_type: Option<String>,
    /// `true` restricts to tickets with attachments; `false` or empty means no filter.
    pub attachments: Option<String>,
    /// `true` restricts to internal tickets; `false` or empty means no filter.
    pub is_internal: Option<String>,
    /// Inclusive lower bound, RFC 3339 or `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Inclusive upper bound; a bare date covers the whole day.
    pub date_to: Option<String>,
    /// Exact ticket lookup.
    pub ticket_id: Option<String>,
    /// Ground-truth ticket ids, comma and/or whitespace delimited.
    pub relevant_ids: Option<String>,
}

impl From<SearchQuery> for SearchParams {
    fn from(query: SearchQuery) -> Self {
        Self {
            q: query.q,
            request_type: query.request_type,
            attachments: query.attachments,
            is_internal: query.is_internal,
            date_from: query.date_from,
            date_to: query.date_to,
            ticket_id: query.ticket_id,
            relevant_ids: query.relevant_ids,
        }
    }
}

/// One deduplicated hit.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchHitResponse {
    /// Point id in the vector store (integer or UUID).
    #[schema(value_type = Object)]
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    /// Ranking score; `null` for exact ticket lookups.
    pub score: Option<f32>,
    /// Stored payload, passed through untouched.
    #[schema(value_type = Object)]
    pub payload: Value,
}

impl From<SearchHit> for SearchHitResponse {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: serde_json::to_value(&hit.id).unwrap_or(Value::Null),
            ticket_id: hit.ticket_id,
            score: hit.score,
            payload: hit.payload,
        }
    }
}

/// Offline evaluation against `relevant_ids`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    /// Two-decimal string, e.g. `"0.30"`.
    #[serde(rename = "precisionAt10")]
    pub precision_at_10: String,
    /// Two-decimal string, e.g. `"0.50"`.
    #[serde(rename = "recallAt10")]
    pub recall_at_10: String,
    /// Distinct relevant tickets found in the top 10.
    pub matched: usize,
    /// Size of the parsed ground truth.
    pub relevant: usize,
}

impl From<EvaluationMetrics> for MetricsResponse {
    fn from(metrics: EvaluationMetrics) -> Self {
        Self {
            precision_at_10: metrics.precision_label(),
            recall_at_10: metrics.recall_label(),
            matched: metrics.matched,
            relevant: metrics.relevant,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchHitResponse>,
    pub total: usize,
    pub timing_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsResponse>,
}

impl SearchResponse {
    pub fn from_outcome(outcome: SearchOutcome, timing_ms: u64) -> Self {
        let results: Vec<SearchHitResponse> =
            outcome.hits.into_iter().map(SearchHitResponse::from).collect();
        Self {
            total: results.len(),
            results,
            timing_ms,
            metrics: outcome.metrics.map(MetricsResponse::from),
        }
    }
}
