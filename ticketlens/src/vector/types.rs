//! Wire types for the Qdrant query, scroll and filter APIs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Term-weight vector. `indices` and `values` are parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

/// Qdrant point identifiers are either unsigned integers or UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(Uuid),
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

/// Boolean combination of conditions. Empty clauses are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Condition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Condition>,
}

impl Filter {
    pub fn must(conditions: Vec<Condition>) -> Self {
        Self {
            must: conditions,
            ..Default::default()
        }
    }

    pub fn should(conditions: Vec<Condition>) -> Self {
        Self {
            should: conditions,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Condition {
    Field(FieldCondition),
    Nested(Filter),
}

impl Condition {
    /// Exact match of a payload key against a keyword, integer or boolean.
    pub fn matches(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Field(FieldCondition {
            key: key.into(),
            r#match: Some(MatchValue {
                value: value.into(),
            }),
            range: None,
        })
    }

    pub fn datetime_range(key: impl Into<String>, range: DatetimeRange) -> Self {
        Self::Field(FieldCondition {
            key: key.into(),
            r#match: None,
            range: Some(range),
        })
    }

    pub fn nested(filter: Filter) -> Self {
        Self::Nested(filter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCondition {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#match: Option<MatchValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DatetimeRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchValue {
    pub value: Value,
}

/// RFC 3339 bounds; Qdrant parses them server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatetimeRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fusion {
    Rrf,
    Dbsf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Query {
    Dense(Vec<f32>),
    Sparse(SparseVector),
    Fusion { fusion: Fusion },
}

/// A candidate-generation stage evaluated before the main query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prefetch {
    pub query: Query,
    pub using: String,
    pub limit: usize,
}

/// Body of `POST /collections/{name}/points/query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefetch: Vec<Prefetch>,
    pub query: Query,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    pub limit: usize,
    pub with_payload: bool,
}

/// Body of `POST /collections/{name}/points/scroll`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    pub limit: usize,
    pub with_payload: bool,
}

/// A point returned by query (scored) or scroll (unscored).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredPoint {
    pub id: PointId,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_filter_clauses_are_omitted() {
        let filter = Filter::must(vec![Condition::matches("attachments", true)]);
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"must": [{"key": "attachments", "match": {"value": true}}]})
        );
    }

    #[test]
    fn datetime_range_serializes_only_set_bounds() {
        let condition = Condition::datetime_range(
            "date",
            DatetimeRange {
                gte: Some("2024-01-01T00:00:00Z".to_string()),
                lte: None,
            },
        );
        assert_eq!(
            serde_json::to_value(&condition).unwrap(),
            json!({"key": "date", "range": {"gte": "2024-01-01T00:00:00Z"}})
        );
    }

    #[test]
    fn query_variants_match_qdrant_shapes() {
        assert_eq!(
            serde_json::to_value(Query::Dense(vec![0.5, 0.25])).unwrap(),
            json!([0.5, 0.25])
        );
        assert_eq!(
            serde_json::to_value(Query::Sparse(SparseVector {
                indices: vec![3, 7],
                values: vec![1.0, 1.0],
            }))
            .unwrap(),
            json!({"indices": [3, 7], "values": [1.0, 1.0]})
        );
        assert_eq!(
            serde_json::to_value(Query::Fusion {
                fusion: Fusion::Rrf
            })
            .unwrap(),
            json!({"fusion": "rrf"})
        );
    }

    #[test]
    fn point_ids_deserialize_from_numbers_and_uuids() {
        let num: PointId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(num, PointId::Num(42));
        assert_eq!(num.to_string(), "42");

        let uuid: PointId =
            serde_json::from_value(json!("5c56c793-69f3-4fbf-87e6-c4bf54c28c26")).unwrap();
        assert_eq!(uuid.to_string(), "5c56c793-69f3-4fbf-87e6-c4bf54c28c26");
    }

    #[test]
    fn scroll_records_have_no_score() {
        let point: ScoredPoint =
            serde_json::from_value(json!({"id": 1, "payload": {"ticket_id": 9}})).unwrap();
        assert!(point.score.is_none());
        assert_eq!(point.payload.unwrap()["ticket_id"], json!(9));
    }
}
