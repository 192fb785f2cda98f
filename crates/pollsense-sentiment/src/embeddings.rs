//! Remote embedding client (OpenAI-compatible or Azure OpenAI).

use std::time::Duration;

use async_trait::async_trait;
use pollsense_core::{AppConfig, ConfigError, EmbeddingProvider};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::EmbedError;

/// Longest provider error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Turns text into a vector.
///
/// Implementations must signal rate limiting with
/// [`EmbedError::RateLimited`] so callers can retry or halt on it.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Connection settings for [`HttpEmbedder`].
#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub base_url: String,
    pub provider: EmbeddingProvider,
    /// Model name (OpenAI) or deployment name (Azure).
    pub model: String,
    pub api_version: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl EmbeddingSettings {
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when no embedding URL is
    /// configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: config.require_embedding_url()?.to_string(),
            provider: config.embedding_provider,
            model: config.embedding_model.clone(),
            api_version: config.embedding_api_version.clone(),
            api_key: config.embedding_api_key.clone(),
            timeout_secs: config.embedding_timeout_secs,
        })
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Single-shot HTTP embedder. Performs exactly one request per call; wrap it
/// in [`crate::retry::RetryingEmbedder`] for rate-limit retries.
pub struct HttpEmbedder {
    client: Client,
    endpoint: Url,
    provider: EmbeddingProvider,
    model: String,
    api_key: Option<String>,
}

impl HttpEmbedder {
    /// # Errors
    ///
    /// Returns [`EmbedError::InvalidEndpoint`] if the base URL does not parse,
    /// or [`EmbedError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &EmbeddingSettings) -> Result<Self, EmbedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pollsense/0.1 (survey-analysis)")
            .build()?;

        Ok(Self {
            client,
            endpoint: build_endpoint(settings)?,
            provider: settings.provider,
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Resolve the embeddings URL for the configured provider.
fn build_endpoint(settings: &EmbeddingSettings) -> Result<Url, EmbedError> {
    let base = settings.base_url.trim_end_matches('/');
    let raw = match settings.provider {
        EmbeddingProvider::OpenAi => format!("{base}/embeddings"),
        EmbeddingProvider::Azure => format!(
            "{base}/openai/deployments/{}/embeddings",
            settings.model
        ),
    };

    let mut url = Url::parse(&raw).map_err(|e| EmbedError::InvalidEndpoint {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    if settings.provider == EmbeddingProvider::Azure {
        url.query_pairs_mut()
            .append_pair("api-version", &settings.api_version);
    }
    Ok(url)
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.trim().is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let mut request = self.client.post(self.endpoint.clone()).json(&EmbedRequest {
            model: &self.model,
            input: text,
        });
        if let Some(key) = &self.api_key {
            request = match self.provider {
                EmbeddingProvider::OpenAi => request.bearer_auth(key),
                EmbeddingProvider::Azure => request.header("api-key", key),
            };
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(EmbedError::RateLimited {
                message: truncate(&body),
            });
        }
        if !status.is_success() {
            return Err(EmbedError::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let parsed: EmbedResponse = serde_json::from_str(&body)
            .map_err(|e| EmbedError::InvalidResponse(format!("unparsable body: {e}")))?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbedError::InvalidResponse("response contained no data".into()))?;

        if embedding.is_empty() {
            return Err(EmbedError::InvalidResponse(
                "provider returned an empty embedding".into(),
            ));
        }

        Ok(embedding)
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
