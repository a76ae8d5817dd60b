use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{QueryRequest, ScoredPoint, ScrollRequest, VectorStore};
use crate::config::QdrantConfig;
use crate::error::{Result, TicketLensError};

#[derive(Debug, Deserialize)]
struct QdrantEnvelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct PointsResult {
    points: Vec<ScoredPoint>,
}

/// Qdrant HTTP API client bound to one collection.
#[derive(Clone)]
pub struct QdrantStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
}

impl QdrantStore {
    pub fn new(config: &QdrantConfig) -> Result<Self> {
        url::Url::parse(&config.url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TicketLensError::VectorStore(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            collection: config.collection.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(key) = &self.api_key {
            req = req.header("api-key", key);
        }
        req
    }

    fn points_path(&self, operation: &str) -> String {
        format!("/collections/{}/points/{operation}", self.collection)
    }

    async fn send<T: DeserializeOwned>(&self, operation: &str, req: RequestBuilder) -> Result<T> {
        let start = Instant::now();
        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                operation,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Qdrant request failed"
            );
            return Err(TicketLensError::VectorStoreStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: QdrantEnvelope<T> = resp.json().await.map_err(|e| {
            TicketLensError::VectorStore(format!("Failed to parse {operation} response: {e}"))
        })?;

        tracing::debug!(
            operation,
            duration_ms = start.elapsed().as_millis() as u64,
            "Qdrant request completed"
        );

        Ok(body.result)
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn query(&self, request: &QueryRequest) -> Result<Vec<ScoredPoint>> {
        let req = self
            .request(Method::POST, &self.points_path("query"))
            .json(request);
        let result: PointsResult = self.send("query", req).await?;
        Ok(result.points)
    }

    async fn scroll(&self, request: &ScrollRequest) -> Result<Vec<ScoredPoint>> {
        let req = self
            .request(Method::POST, &self.points_path("scroll"))
            .json(request);
        let result: PointsResult = self.send("scroll", req).await?;
        Ok(result.points)
    }

    async fn health_check(&self) -> Result<()> {
        let req = self.request(Method::GET, &format!("/collections/{}", self.collection));
        let _: serde_json::Value = self.send("collection_info", req).await?;
        Ok(())
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{Condition, Filter, PointId, Query};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(url: &str) -> QdrantConfig {
        QdrantConfig {
            url: url.to_string(),
            api_key: Some("qdrant-secret".to_string()),
            collection: "tickets".to_string(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn query_posts_body_and_parses_points() {
        let server = MockServer::start().await;

        let request = QueryRequest {
            prefetch: vec![],
            query: Query::Dense(vec![0.5, 0.5]),
            using: Some("e5".to_string()),
            filter: Some(Filter::must(vec![Condition::matches("is_internal", true)])),
            limit: 3,
            with_payload: true,
        };

        Mock::given(method("POST"))
            .and(path("/collections/tickets/points/query"))
            .and(header("api-key", "qdrant-secret"))
            .and(body_json(json!({
                "query": [0.5, 0.5],
                "using": "e5",
                "filter": {"must": [{"key": "is_internal", "match": {"value": true}}]},
                "limit": 3,
                "with_payload": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"points": [
                    {"id": 7, "version": 1, "score": 0.91, "payload": {"ticket_id": 1001}},
                    {"id": "5c56c793-69f3-4fbf-87e6-c4bf54c28c26", "version": 1, "score": 0.5, "payload": null}
                ]},
                "status": "ok",
                "time": 0.002
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = QdrantStore::new(&test_config(&server.uri())).unwrap();
        let points = store.query(&request).await.unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, PointId::Num(7));
        assert_eq!(points[0].score, Some(0.91));
        assert!(points[1].payload.is_none());
    }

    #[tokio::test]
    async fn scroll_uses_scroll_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collections/tickets/points/scroll"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "points": [{"id": 3, "payload": {"ticket_id": "T-3"}}],
                    "next_page_offset": null
                },
                "status": "ok"
            })))
            .mount(&server)
            .await;

        let store = QdrantStore::new(&test_config(&server.uri())).unwrap();
        let points = store
            .scroll(&ScrollRequest {
                filter: None,
                limit: 10,
                with_payload: true,
            })
            .await
            .unwrap();

        assert_eq!(points.len(), 1);
        assert!(points[0].score.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collections/tickets/points/query"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Collection not found"))
            .mount(&server)
            .await;

        let store = QdrantStore::new(&test_config(&server.uri())).unwrap();
        let err = store
            .query(&QueryRequest {
                prefetch: vec![],
                query: Query::Dense(vec![1.0]),
                using: None,
                filter: None,
                limit: 1,
                with_payload: true,
            })
            .await
            .unwrap_err();

        match err {
            TicketLensError::VectorStoreStatus { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn health_check_reads_collection_info() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collections/tickets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"status": "green", "points_count": 12},
                "status": "ok"
            })))
            .mount(&server)
            .await;

        let store = QdrantStore::new(&test_config(&server.uri())).unwrap();
        assert!(store.health_check().await.is_ok());
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = QdrantStore::new(&test_config("not a url"));
        assert!(matches!(result, Err(TicketLensError::UrlParse(_))));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let store = QdrantStore::new(&test_config("http://localhost:6333/")).unwrap();
        assert_eq!(store.base_url, "http://localhost:6333");
        assert_eq!(store.collection(), "tickets");
    }
}
