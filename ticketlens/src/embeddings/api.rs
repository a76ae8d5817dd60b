use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER},
    Client, StatusCode,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingsConfig;
use crate::error::{Result, TicketLensError};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Outcome of a single request to the embedding endpoint.
enum Attempt {
    Done(Vec<Vec<f32>>),
    Retryable {
        error: TicketLensError,
        retry_after: Option<Duration>,
    },
    Fatal(TicketLensError),
}

/// Client for an OpenAI-compatible `/embeddings` endpoint producing dense vectors.
#[derive(Clone)]
pub struct DenseEmbeddingClient {
    client: Client,
    config: EmbeddingsConfig,
}

impl DenseEmbeddingClient {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TicketLensError::Embedding(format!("Failed to create HTTP client: {e}")))?;

        let mut config = config.clone();
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Embed `texts`, retrying on 429, 5xx and transport errors.
    ///
    /// Between attempts the client waits for the exponential backoff or the
    /// server's `Retry-After`, whichever is longer, never more than the
    /// request timeout.
    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let headers = self.headers()?;
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts.to_vec(),
        };

        let mut attempt = 0;
        loop {
            let (error, retry_after) = match self.send_once(&headers, &request).await {
                Attempt::Done(embeddings) => return Ok(embeddings),
                Attempt::Fatal(error) => return Err(error),
                Attempt::Retryable { error, retry_after } => (error, retry_after),
            };

            if attempt >= self.config.max_retries {
                return Err(error);
            }
            attempt += 1;

            let delay = self.retry_delay(attempt, retry_after);
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying embedding request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(api_key) = self.config.api_key.as_deref() {
            let value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| TicketLensError::Embedding(format!("Invalid API key header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    fn retry_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = Duration::from_millis(100 * 2_u64.pow(attempt.saturating_sub(1).min(16)));
        let wait = retry_after.map_or(backoff, |requested| requested.max(backoff));
        wait.min(Duration::from_secs(self.config.timeout_secs))
    }

    async fn send_once(&self, headers: &HeaderMap, request: &EmbeddingRequest<'_>) -> Attempt {
        let url = format!("{}/embeddings", self.config.base_url);
        let resp = match self
            .client
            .post(&url)
            .headers(headers.clone())
            .json(request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                return Attempt::Retryable {
                    error: TicketLensError::Embedding(format!("Request failed: {e}")),
                    retry_after: None,
                }
            }
        };

        let status = resp.status();
        if status.is_success() {
            return match resp.json::<EmbeddingResponse>().await {
                Ok(body) => Attempt::Done(body.data.into_iter().map(|d| d.embedding).collect()),
                Err(e) => Attempt::Fatal(TicketLensError::Embedding(format!(
                    "Failed to parse response: {e}"
                ))),
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Attempt::Retryable {
                error: TicketLensError::ApiRateLimit { retry_after },
                retry_after: retry_after.map(Duration::from_secs),
            };
        }

        let body = resp.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Attempt::Fatal(TicketLensError::ApiAuth(body))
            }
            s if s.is_server_error() => Attempt::Retryable {
                error: TicketLensError::Embedding(format!("Server error {s}: {body}")),
                retry_after: None,
            },
            s => Attempt::Fatal(TicketLensError::Embedding(format!("API error {s}: {body}"))),
        }
    }

    /// Embed a single query string.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed(&[query]).await?;
        let embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| TicketLensError::Embedding("No embedding returned".to_string()))?;

        if embedding.is_empty() {
            return Err(TicketLensError::Embedding(
                "Embedding service returned an empty vector".to_string(),
            ));
        }

        Ok(embedding)
    }
}
