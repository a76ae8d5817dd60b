use fastembed::{SparseInitOptions, SparseModel, SparseTextEmbedding};
use std::sync::{Arc, Mutex};

use super::bm25::Bm25Encoder;
use crate::config::SparseConfig;
use crate::error::{Result, TicketLensError};
use crate::vector::SparseVector;

enum SparseBackend {
    Bm25(Bm25Encoder),
    Splade(Arc<Mutex<SparseTextEmbedding>>),
}

/// Local sparse (term-weight) query encoder.
pub struct SparseEncoder {
    backend: SparseBackend,
    model: String,
}

impl SparseEncoder {
    pub fn new(config: &SparseConfig) -> Result<Self> {
        let backend = match config.model.as_str() {
            "Qdrant/bm25" | "bm25" => SparseBackend::Bm25(Bm25Encoder::new()),
            "prithivida/Splade_PP_en_v1" | "splade" => {
                let model = SparseTextEmbedding::try_new(
                    SparseInitOptions::new(SparseModel::SPLADEPPV1)
                        .with_show_download_progress(true),
                )
                .map_err(|e| TicketLensError::Embedding(e.to_string()))?;
                SparseBackend::Splade(Arc::new(Mutex::new(model)))
            }
            other => {
                return Err(TicketLensError::Embedding(format!(
                    "Unsupported sparse model: {other}. Use Qdrant/bm25 or prithivida/Splade_PP_en_v1."
                )))
            }
        };

        Ok(Self {
            backend,
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn encode_query(&self, query: &str) -> Result<SparseVector> {
        match &self.backend {
            SparseBackend::Bm25(encoder) => encoder.encode_query(query),
            SparseBackend::Splade(model) => {
                if query.trim().is_empty() {
                    return Ok(SparseVector::default());
                }

                let model = Arc::clone(model);
                let text = query.to_string();
                let mut embeddings = tokio::task::spawn_blocking(move || {
                    let mut model = model.lock().map_err(|e| {
                        TicketLensError::Embedding(format!("Sparse model lock poisoned: {e}"))
                    })?;
                    model
                        .embed(vec![text], None)
                        .map_err(|e| TicketLensError::Embedding(e.to_string()))
                })
                .await
                .map_err(|e| TicketLensError::Embedding(format!("Sparse embedding worker failed: {e}")))??;

                let embedding = embeddings.pop().ok_or_else(|| {
                    TicketLensError::Embedding("No sparse embedding generated".to_string())
                })?;

                let mut pairs: Vec<(u32, f32)> = embedding
                    .indices
                    .into_iter()
                    .zip(embedding.values)
                    .map(|(index, value)| (index as u32, value))
                    .collect();
                pairs.sort_by_key(|(index, _)| *index);

                Ok(SparseVector {
                    indices: pairs.iter().map(|(index, _)| *index).collect(),
                    values: pairs.iter().map(|(_, value)| *value).collect(),
                })
            }
        }
    }
}

impl Clone for SparseEncoder {
    fn clone(&self) -> Self {
        let backend = match &self.backend {
            SparseBackend::Bm25(encoder) => SparseBackend::Bm25(*encoder),
            SparseBackend::Splade(model) => SparseBackend::Splade(Arc::clone(model)),
        };
        Self {
            backend,
            model: self.model.clone(),
        }
    }
}
