use std::collections::HashSet;

use serde_json::Value;

use crate::models::SearchHit;
use crate::vector::{PointId, ScoredPoint};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    Ticket(String),
    Point(PointId),
}

/// Ticket id of a point as text. Numbers and strings are accepted; anything
/// else (missing, null, blank, nested values) counts as "no ticket id".
pub fn ticket_id_of(point: &ScoredPoint, field: &str) -> Option<String> {
    match point.payload.as_ref()?.get(field)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Keep the first (best ranked) point per ticket, preserving order, up to `cap` hits.
///
/// A ticket is usually indexed as several points (one per chunk or message),
/// so a raw result page repeats tickets. Points without a ticket id are unique
/// by point id.
pub fn dedup_by_ticket(points: Vec<ScoredPoint>, field: &str, cap: usize) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    let mut hits = Vec::with_capacity(cap.min(points.len()));

    for point in points {
        if hits.len() >= cap {
            break;
        }

        let ticket_id = ticket_id_of(&point, field);
        let key = match &ticket_id {
            Some(id) => DedupKey::Ticket(id.clone()),
            None => DedupKey::Point(point.id.clone()),
        };

        if !seen.insert(key) {
            continue;
        }

        hits.push(SearchHit {
            id: point.id,
            ticket_id,
            score: point.score,
            payload: point.payload.map(Value::Object).unwrap_or(Value::Null),
        });
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn point(id: u64, score: f32, payload: Value) -> ScoredPoint {
        serde_json::from_value(json!({"id": id, "score": score, "payload": payload})).unwrap()
    }

    fn ids(hits: &[SearchHit]) -> Vec<String> {
        hits.iter().map(|h| h.id.to_string()).collect()
    }

    #[test]
    fn keeps_first_point_per_ticket() {
        let points = vec![
            point(1, 0.9, json!({"ticket_id": 100})),
            point(2, 0.8, json!({"ticket_id": 200})),
            point(3, 0.7, json!({"ticket_id": 100})),
            point(4, 0.6, json!({"ticket_id": "200"})),
            point(5, 0.5, json!({"ticket_id": 300})),
        ];

        let hits = dedup_by_ticket(points, "ticket_id", 10);
        assert_eq!(ids(&hits), vec!["1", "2", "5"]);
        assert_eq!(hits[0].score, Some(0.9));
        assert_eq!(hits[0].ticket_id.as_deref(), Some("100"));
    }

    #[test]
    fn cap_applies_after_dedup() {
        let points = vec![
            point(1, 0.9, json!({"ticket_id": 1})),
            point(2, 0.8, json!({"ticket_id": 1})),
            point(3, 0.7, json!({"ticket_id": 2})),
            point(4, 0.6, json!({"ticket_id": 3})),
        ];

        let hits = dedup_by_ticket(points, "ticket_id", 2);
        assert_eq!(ids(&hits), vec!["1", "3"]);
    }

    #[test]
    fn points_without_ticket_id_fall_back_to_point_id() {
        let points = vec![
            point(1, 0.9, json!({"subject": "a"})),
            point(2, 0.8, json!({"ticket_id": null})),
            point(3, 0.7, json!({"ticket_id": "  "})),
        ];

        let hits = dedup_by_ticket(points, "ticket_id", 10);
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.ticket_id.is_none()));
    }

    #[test]
    fn point_id_fallback_does_not_collide_with_ticket_ids() {
        let points = vec![
            point(7, 0.9, json!({"ticket_id": "7"})),
            point(7, 0.8, json!({})),
        ];
        let hits = dedup_by_ticket(points, "ticket_id", 10);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn missing_payload_becomes_null() {
        let points: Vec<ScoredPoint> =
            vec![serde_json::from_value(json!({"id": 9, "score": 0.1})).unwrap()];
        let hits = dedup_by_ticket(points, "ticket_id", 10);
        assert_eq!(hits[0].payload, Value::Null);
    }

    #[test]
    fn empty_input_and_zero_cap() {
        assert!(dedup_by_ticket(vec![], "ticket_id", 10).is_empty());
        let points = vec![point(1, 0.9, json!({"ticket_id": 1}))];
        assert!(dedup_by_ticket(points, "ticket_id", 0).is_empty());
    }
}
