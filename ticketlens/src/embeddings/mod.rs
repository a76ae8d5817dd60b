mod api;
mod bm25;
mod sparse;


pub use api::DenseEmbeddingClient;
pub use bm25::Bm25Encoder;
pub use sparse::SparseEncoder;
