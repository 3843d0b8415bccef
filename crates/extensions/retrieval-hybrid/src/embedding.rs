//! Client for OpenAI-compatible `/embeddings` endpoints.
//!
//! Works against the hosted API and against local servers that mimic it
//! (Ollama, LM Studio, vLLM). Vectors are returned as the server sent
//! them; normalization happens in the vector store.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use starsearch_protocols::{Embedding, EmbeddingError, EmbeddingProvider};

const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_DIMENSION: usize = 1536;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for an embedding endpoint.
#[derive(Debug, Clone)]
pub struct OpenAIEmbeddingConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL up to and excluding `/embeddings`.
    pub base_url: String,
    /// Expected vector width. Responses of any other width are rejected.
    pub dimension: usize,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl OpenAIEmbeddingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            dimension: DEFAULT_DIMENSION,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Embedding provider backed by an OpenAI-compatible HTTP API.
pub struct OpenAIEmbedding {
    client: reqwest::Client,
    config: OpenAIEmbeddingConfig,
}

impl OpenAIEmbedding {
    pub fn new(config: OpenAIEmbeddingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_api_key(api_key: impl Into<String>) -> Self {
        Self::new(OpenAIEmbeddingConfig::new(api_key))
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{}/embeddings", base)
    }

    async fn request(&self, input: &[&str]) -> Result<Vec<EmbeddingItem>, EmbeddingError> {
        let body = EmbeddingsRequest {
            model: &self.config.model,
            input,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingError::Failed(format!("request to {} failed: {}", self.endpoint(), e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Failed(format!(
                "embedding API returned {}: {}",
                status,
                error_message(&text)
            )));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Failed(format!("malformed embedding response: {}", e)))?;
        Ok(parsed.data)
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pull `error.message` out of an OpenAI-style error body, else the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.is_empty() => "no response body".to_string(),
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }
        let mut batch = self.embed_batch(&[text]).await?;
        batch
            .pop()
            .ok_or_else(|| EmbeddingError::Failed("embedding API returned no vectors".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut items = self.request(texts).await?;
        if items.len() != texts.len() {
            return Err(EmbeddingError::Failed(format!(
                "sent {} texts but received {} vectors",
                texts.len(),
                items.len()
            )));
        }

        // Items may arrive out of order; `index` is authoritative.
        items.sort_by_key(|item| item.index);

        let mut vectors = Vec::with_capacity(items.len());
        for item in items {
            if item.embedding.len() != self.config.dimension {
                return Err(EmbeddingError::Failed(format!(
                    "model {} returned width {} for input {}, expected {}",
                    self.config.model,
                    item.embedding.len(),
                    item.index,
                    self.config.dimension
                )));
            }
            vectors.push(Embedding::new(item.embedding));
        }

        debug!("Embedded {} texts with {}", vectors.len(), self.config.model);
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

#[cfg(test)]
#[path = "embedding_tests.rs"]
mod tests;
