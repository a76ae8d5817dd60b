//! TicketLens: hybrid sparse+dense search over support tickets stored in
//! Qdrant, with ticket-level deduplication and offline precision/recall
//! scoring.

pub mod api;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod models;
pub mod search;
pub mod vector;
