//! Offline relevance scoring against a caller-supplied ground truth.

use std::collections::HashSet;

use crate::models::{EvaluationMetrics, SearchHit};

/// Depth at which precision and recall are reported.
pub const EVALUATION_DEPTH: usize = 10;

/// Split a comma and/or whitespace delimited id list, dropping empties and
/// duplicates while keeping first-seen order.
pub fn parse_ground_truth(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

/// precision@k = matched / k, recall@k = matched / |ground truth|.
///
/// Returns `None` for an empty ground truth; there is nothing to score and
/// recall would be undefined.
pub fn evaluate(hits: &[SearchHit], ground_truth: &[String], k: usize) -> Option<EvaluationMetrics> {
    if ground_truth.is_empty() || k == 0 {
        return None;
    }

    let relevant: HashSet<&str> = ground_truth.iter().map(String::as_str).collect();
    let matched = hits
        .iter()
        .take(k)
        .map(SearchHit::evaluation_key)
        .collect::<HashSet<_>>()
        .iter()
        .filter(|key| relevant.contains(key.as_str()))
        .count();

    Some(EvaluationMetrics {
        matched,
        relevant: relevant.len(),
        precision: matched as f64 / k as f64,
        recall: matched as f64 / relevant.len() as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::PointId;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn hit(point: u64, ticket: Option<&str>) -> SearchHit {
        SearchHit {
            id: PointId::Num(point),
            ticket_id: ticket.map(str::to_string),
            score: Some(1.0),
            payload: Value::Null,
        }
    }

    #[test]
    fn parse_mixed_delimiters() {
        assert_eq!(
            parse_ground_truth(" 101, 102  103,,\n104 , 101"),
            vec!["101", "102", "103", "104"]
        );
    }

    #[test]
    fn parse_only_delimiters_is_empty() {
        assert!(parse_ground_truth(" , ,, ").is_empty());
        assert!(parse_ground_truth("").is_empty());
    }

    #[test]
    fn recall_is_matched_over_ground_truth_size() {
        let hits = vec![
            hit(1, Some("101")),
            hit(2, Some("999")),
            hit(3, Some("103")),
        ];
        let truth = parse_ground_truth("101,102,103,104");

        let metrics = evaluate(&hits, &truth, EVALUATION_DEPTH).unwrap();
        assert_eq!(metrics.matched, 2);
        assert_eq!(metrics.relevant, 4);
        assert_eq!(metrics.recall, 0.5);
        assert_eq!(metrics.precision, 0.2);
        assert_eq!(metrics.recall_label(), "0.50");
        assert_eq!(metrics.precision_label(), "0.20");
    }

    #[test]
    fn only_top_k_hits_count() {
        let hits: Vec<SearchHit> = (1..=12)
            .map(|i| hit(i, Some(&i.to_string())))
            .collect();
        let truth = vec!["11".to_string(), "12".to_string(), "1".to_string()];

        let metrics = evaluate(&hits, &truth, 10).unwrap();
        assert_eq!(metrics.matched, 1);
        assert_eq!(metrics.precision_label(), "0.10");
        assert_eq!(metrics.recall_label(), "0.33");
    }

    #[test]
    fn hits_without_ticket_id_match_on_point_id() {
        let hits = vec![hit(55, None)];
        let metrics = evaluate(&hits, &["55".to_string()], 10).unwrap();
        assert_eq!(metrics.matched, 1);
        assert_eq!(metrics.recall, 1.0);
    }

    #[test]
    fn duplicate_hits_are_counted_once() {
        let hits = vec![hit(1, Some("7")), hit(2, Some("7"))];
        let metrics = evaluate(&hits, &["7".to_string()], 10).unwrap();
        assert_eq!(metrics.matched, 1);
    }

    #[test]
    fn empty_ground_truth_reports_nothing() {
        let hits = vec![hit(1, Some("1"))];
        assert!(evaluate(&hits, &[], 10).is_none());
    }

    #[test]
    fn no_hits_scores_zero() {
        let metrics = evaluate(&[], &["1".to_string()], 10).unwrap();
        assert_eq!(metrics.precision_label(), "0.00");
        assert_eq!(metrics.recall_label(), "0.00");
    }
}
