use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which embeddings API dialect the remote endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// `POST {base}/embeddings` with a bearer token.
    OpenAi,
    /// `POST {base}/openai/deployments/{model}/embeddings?api-version=...`
    /// with an `api-key` header.
    Azure,
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::OpenAi => write!(f, "openai"),
            EmbeddingProvider::Azure => write!(f, "azure"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Only commands that embed text need this.
    pub embedding_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_provider: EmbeddingProvider,
    pub embedding_model: String,
    pub embedding_api_version: String,
    pub embedding_timeout_secs: u64,
    pub embedding_max_attempts: u32,
    pub embedding_backoff_base_ms: u64,
    pub ingest_row_delay_ms: u64,
    pub analysis_limit: i64,
    pub search_candidate_limit: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("embedding_url", &self.embedding_url)
            .field(
                "embedding_api_key",
                &self.embedding_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("embedding_provider", &self.embedding_provider)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_api_version", &self.embedding_api_version)
            .field("embedding_timeout_secs", &self.embedding_timeout_secs)
            .field("embedding_max_attempts", &self.embedding_max_attempts)
            .field("embedding_backoff_base_ms", &self.embedding_backoff_base_ms)
            .field("ingest_row_delay_ms", &self.ingest_row_delay_ms)
            .field("analysis_limit", &self.analysis_limit)
            .field("search_candidate_limit", &self.search_candidate_limit)
            .finish()
    }
}

impl AppConfig {
    /// The embedding provider base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `POLLSENSE_EMBEDDING_URL`
    /// was not set.
    pub fn require_embedding_url(&self) -> Result<&str, ConfigError> {
        self.embedding_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("POLLSENSE_EMBEDDING_URL".to_string()))
    }
}
