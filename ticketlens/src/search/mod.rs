//! Hybrid ticket search: filter construction, query assembly, ticket-level
//! deduplication and precision/recall scoring.

pub mod dedup;
pub mod evaluation;
pub mod filters;
pub mod query;
mod service;

pub use dedup::dedup_by_ticket;
pub use evaluation::{evaluate, parse_ground_truth, EVALUATION_DEPTH};
pub use filters::build_filter;
pub use query::build_query_request;
pub use service::SearchService;

#[cfg(test)]
pub(crate) use service::tests as test_support;
