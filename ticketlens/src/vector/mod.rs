//! Vector store access.
//!
//! The search path only ever talks to a [`VectorStore`]; the production
//! implementation is [`QdrantStore`], which speaks the Qdrant REST API.

mod qdrant;
mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use qdrant::QdrantStore;
pub use types::*;

/// Read-only operations the search service needs from a vector database.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Run a (possibly multi-stage) query and return points in ranked order.
    async fn query(&self, request: &QueryRequest) -> Result<Vec<ScoredPoint>>;

    /// Page through points matching a filter without any vector scoring.
    async fn scroll(&self, request: &ScrollRequest) -> Result<Vec<ScoredPoint>>;

    /// Succeeds when the configured collection is reachable.
    async fn health_check(&self) -> Result<()>;

    fn collection(&self) -> &str;
}
