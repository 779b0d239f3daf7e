//! OpenAI embeddings implementation.
//!
//! Batches requests, retries rate-limited calls with exponential backoff,
//! and spaces batches out with a fixed delay. Permanent failures (bad
//! credentials, exhausted retries) surface as errors to the caller.

use super::Embedder;
use crate::error::{KanalError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Maximum inputs per embedding request.
const BATCH_SIZE: usize = 100;
/// Maximum attempts per request when rate-limited.
const MAX_RETRIES: u32 = 3;
/// Initial retry delay; doubles per attempt.
const RETRY_DELAY_MS: u64 = 1000;
/// Fixed pause between consecutive batches.
const BATCH_DELAY_MS: u64 = 100;
/// Timeout for embedding API requests.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder with default settings.
    pub fn new() -> Self {
        Self::with_config("text-embedding-3-small", 1536)
    }

    /// Create a new OpenAI embedder with custom model and dimensions.
    pub fn with_config(model: &str, dimensions: usize) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        let client = Client::with_config(OpenAIConfig::default()).with_http_client(http_client);

        Self {
            client,
            model: model.to_string(),
            dimensions,
        }
    }

    /// Issue one embedding request for up to [`BATCH_SIZE`] texts.
    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::StringArray(texts.to_vec()))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| KanalError::Embedding(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| KanalError::OpenAI(format!("Embedding API error: {}", e)))?;

        // Sort by index to ensure correct order
        let mut embeddings: Vec<_> = response.data.into_iter().collect();
        embeddings.sort_by_key(|e| e.index);

        Ok(embeddings.into_iter().map(|e| e.embedding).collect())
    }

    /// Retry a request on rate-limit-shaped failures with exponential backoff.
    async fn request_with_retry(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 0u32;
        loop {
            match self.request(texts).await {
                Ok(embeddings) => return Ok(embeddings),
                Err(e) if attempt + 1 < MAX_RETRIES && is_rate_limited(&e) => {
                    let delay = RETRY_DELAY_MS * 2u64.pow(attempt);
                    warn!("Rate limited, retrying in {}ms: {}", delay, e);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for OpenAIEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

/// Heuristic rate-limit detection from the provider's error message.
fn is_rate_limited(error: &KanalError) -> bool {
    let message = error.to_string().to_lowercase();
    message.contains("rate") || message.contains("quota") || message.contains("429")
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| KanalError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for (batch_idx, batch) in texts.chunks(BATCH_SIZE).enumerate() {
            if batch_idx > 0 {
                tokio::time::sleep(Duration::from_millis(BATCH_DELAY_MS)).await;
            }

            let embeddings = self.request_with_retry(batch).await?;
            all_embeddings.extend(embeddings);
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = OpenAIEmbedder::new();
        assert_eq!(embedder.dimensions(), 1536);

        let embedder = OpenAIEmbedder::with_config("text-embedding-3-large", 3072);
        assert_eq!(embedder.dimensions(), 3072);
    }

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limited(&KanalError::OpenAI(
            "429 Too Many Requests".to_string()
        )));
        assert!(is_rate_limited(&KanalError::OpenAI(
            "You exceeded your current quota".to_string()
        )));
        assert!(!is_rate_limited(&KanalError::OpenAI(
            "Incorrect API key provided".to_string()
        )));
    }
}
