//! Shared configuration, domain types and the store capability used by every
//! pollsense crate.

pub mod app_config;
pub mod config;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, EmbeddingProvider, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use store::{
    validate_limit, DocumentStore, DocumentSummary, DocumentTable, NewDocument, RankQuery,
    RankedResponse, RespondentScore, ResponseOrder, ResponseStore, Scope, SeedResponse,
    SentimentTotals, StoreError, StoredDocument, DEFAULT_DOCUMENT_TABLE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
