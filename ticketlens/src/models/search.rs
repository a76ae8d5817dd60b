use serde_json::Value;

use crate::vector::PointId;

/// Raw search parameters as received from the query string.
///
/// Everything is kept as text here; validation happens while the filter is
/// built so that every parse failure turns into one validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub q: Option<String>,
    pub request_type: Option<String>,
    pub attachments: Option<String>,
    pub is_internal: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub ticket_id: Option<String>,
    pub relevant_ids: Option<String>,
}

impl SearchParams {
    pub fn query(&self) -> Option<&str> {
        non_blank(self.q.as_deref())
    }

    pub fn ticket_id(&self) -> Option<&str> {
        non_blank(self.ticket_id.as_deref())
    }
}

/// Trimmed value, or `None` for missing and whitespace-only input.
pub fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// Which path produced the hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Sparse + dense prefetch with a ranking stage.
    Hybrid,
    /// Filter-only exact ticket lookup, no scoring.
    TicketLookup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: PointId,
    pub ticket_id: Option<String>,
    pub score: Option<f32>,
    pub payload: Value,
}

impl SearchHit {
    /// Identifier used when comparing against ground truth.
    pub fn evaluation_key(&self) -> String {
        self.ticket_id
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    pub matched: usize,
    pub relevant: usize,
    pub precision: f64,
    pub recall: f64,
}

impl EvaluationMetrics {
    pub fn precision_label(&self) -> String {
        format!("{:.2}", self.precision)
    }

    pub fn recall_label(&self) -> String {
        format!("{:.2}", self.recall)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub mode: SearchMode,
    pub hits: Vec<SearchHit>,
    pub metrics: Option<EvaluationMetrics>,
    pub fetched: usize,
}
