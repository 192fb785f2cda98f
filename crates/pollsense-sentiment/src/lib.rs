//! Embedding, sentiment scoring, ingestion and analysis for pollsense.
//!
//! Turns survey answers and spreadsheet rows into vectors (via a remote
//! embedding provider) and lexicon sentiment scores, writes them through the
//! `pollsense-core` store traits, and answers similarity and sentiment queries
//! over what was stored.

pub mod analysis;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod labels;
pub mod ranking;
pub mod retry;
pub mod scorer;
pub mod similarity;
pub mod types;
pub mod workbook;

mod lexicon;

pub use analysis::{
    AnalysisLimits, AnalysisRequest, Analyzer, ClusterOutcome, OverallSentiment,
    ResponseAnalysis, SearchHit, SimilarResponses,
};
pub use embeddings::{Embedder, EmbeddingSettings, HttpEmbedder};
pub use error::{AnalysisError, EmbedError, IngestError, SimilarityError};
pub use ingest::{IngestOptions, Ingestor};
pub use labels::{to_percentage, Labeled, SentimentBadge, SentimentLabel};
pub use ranking::{Criteria, RankingPlan};
pub use retry::{retry_on_rate_limit, BackoffPolicy, RetryingEmbedder};
pub use scorer::{SentimentAnalyzer, SentimentResult};
pub use similarity::{cosine_distance, cosine_similarity, rank_by_similarity, Scored};
pub use types::{BatchReport, RowOutcome, SourceRow};
pub use workbook::read_workbook;
