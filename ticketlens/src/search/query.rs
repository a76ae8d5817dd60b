use crate::config::{RankingStrategy, SearchConfig};
use crate::vector::{Filter, Fusion, Prefetch, Query, QueryRequest, SparseVector};

/// Candidates taken from the per-chunk sparse vector.
pub const MULTI_SPARSE_PREFETCH_LIMIT: usize = 100;
/// Candidates taken from the whole-ticket sparse vector.
pub const SPARSE_PREFETCH_LIMIT: usize = 50;
/// Candidates taken from the per-chunk dense vector.
pub const MULTI_DENSE_PREFETCH_LIMIT: usize = 50;

/// Assemble the hybrid query: sparse and dense prefetch stages followed by the
/// configured ranking stage. The filter is applied by Qdrant to every stage.
pub fn build_query_request(
    config: &SearchConfig,
    dense: Vec<f32>,
    sparse: SparseVector,
    filter: Option<Filter>,
) -> QueryRequest {
    let mut prefetch = Vec::with_capacity(3);

    // An empty sparse query (e.g. only stopwords) can't match anything.
    if !sparse.is_empty() {
        prefetch.push(Prefetch {
            query: Query::Sparse(sparse.clone()),
            using: config.multi_sparse_vector.clone(),
            limit: MULTI_SPARSE_PREFETCH_LIMIT,
        });
        prefetch.push(Prefetch {
            query: Query::Sparse(sparse),
            using: config.sparse_vector.clone(),
            limit: SPARSE_PREFETCH_LIMIT,
        });
    }

    prefetch.push(Prefetch {
        query: Query::Dense(dense.clone()),
        using: config.multi_dense_vector.clone(),
        limit: MULTI_DENSE_PREFETCH_LIMIT,
    });

    let (query, using) = match config.ranking {
        RankingStrategy::Rrf => (Query::Fusion { fusion: Fusion::Rrf }, None),
        RankingStrategy::Dbsf => (Query::Fusion { fusion: Fusion::Dbsf }, None),
        RankingStrategy::Dense => (Query::Dense(dense), Some(config.dense_vector.clone())),
    };

    QueryRequest {
        prefetch,
        query,
        using,
        filter,
        limit: config.fetch_limit,
        with_payload: true,
    }
}
