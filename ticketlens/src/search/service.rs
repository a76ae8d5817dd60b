use std::sync::Arc;
use std::time::Instant;

use crate::config::SearchConfig;
use crate::embeddings::{DenseEmbeddingClient, SparseEncoder};
use crate::error::{Result, TicketLensError};
use crate::models::{SearchMode, SearchOutcome, SearchParams};
use crate::vector::{Filter, ScoredPoint, ScrollRequest, VectorStore};

use super::dedup::dedup_by_ticket;
use super::evaluation::{evaluate, parse_ground_truth, EVALUATION_DEPTH};
use super::filters::build_filter;
use super::query::build_query_request;

#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn VectorStore>,
    dense: DenseEmbeddingClient,
    sparse: SparseEncoder,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        dense: DenseEmbeddingClient,
        sparse: SparseEncoder,
        config: SearchConfig,
    ) -> Self {
        Self {
            store,
            dense,
            sparse,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn dense(&self) -> &DenseEmbeddingClient {
        &self.dense
    }

    pub fn sparse(&self) -> &SparseEncoder {
        &self.sparse
    }

    /// Hybrid search, or an exact ticket lookup when only `ticket_id` is given.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchOutcome> {
        let start = Instant::now();

        let query = params.query();
        if query.is_none() && params.ticket_id().is_none() {
            return Err(TicketLensError::Validation(
                "Query parameter `q` is required unless `ticket_id` is given".to_string(),
            ));
        }

        let ground_truth = params
            .relevant_ids
            .as_deref()
            .map(parse_ground_truth)
            .unwrap_or_default();

        let filter = build_filter(params, &self.config.ticket_id_field)?;
        tracing::debug!(filter = ?filter, "Built search filter");

        let (mode, points) = match query {
            Some(q) => (SearchMode::Hybrid, self.hybrid_query(q, filter).await?),
            None => (SearchMode::TicketLookup, self.ticket_lookup(filter).await?),
        };

        let fetched = points.len();
        let hits = dedup_by_ticket(points, &self.config.ticket_id_field, self.config.result_limit);
        let metrics = evaluate(&hits, &ground_truth, EVALUATION_DEPTH);

        tracing::info!(
            mode = ?mode,
            fetched,
            returned = hits.len(),
            precision = metrics.as_ref().map(|m| m.precision),
            recall = metrics.as_ref().map(|m| m.recall),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search completed"
        );

        Ok(SearchOutcome {
            mode,
            hits,
            metrics,
            fetched,
        })
    }

    async fn hybrid_query(&self, q: &str, filter: Option<Filter>) -> Result<Vec<ScoredPoint>> {
        let (dense, sparse) =
            tokio::try_join!(self.dense.embed_query(q), self.sparse.encode_query(q))?;

        tracing::debug!(
            dense_dimensions = dense.len(),
            sparse_terms = sparse.len(),
            "Encoded query"
        );

        let request = build_query_request(&self.config, dense, sparse, filter);
        self.store.query(&request).await
    }

    async fn ticket_lookup(&self, filter: Option<Filter>) -> Result<Vec<ScoredPoint>> {
        let request = ScrollRequest {
            filter,
            limit: self.config.fetch_limit,
            with_payload: true,
        };
        self.store.scroll(&request).await
    }
}
