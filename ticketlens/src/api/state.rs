use std::sync::Arc;

use crate::config::Config;
use crate::embeddings::{DenseEmbeddingClient, SparseEncoder};
use crate::search::SearchService;
use crate::vector::VectorStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub search: SearchService,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn VectorStore>,
        dense: DenseEmbeddingClient,
        sparse: SparseEncoder,
    ) -> Self {
        let config = Arc::new(config);
        let search = SearchService::new(store, dense, sparse, config.search.clone());

        Self { config, search }
    }
}
