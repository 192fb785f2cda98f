use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pollsense_core::{AppConfig, DEFAULT_DOCUMENT_TABLE};
use pollsense_db::PgStore;
use pollsense_sentiment::{
    AnalysisLimits, Analyzer, BackoffPolicy, EmbeddingSettings, HttpEmbedder, RetryingEmbedder,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod documents;
mod responses;

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(name = "pollsense")]
#[command(about = "Survey response embedding and sentiment analysis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database connectivity and schema
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Embed, score and store every row of a spreadsheet's first sheet
    Ingest {
        /// Path to an .xlsx, .xls or .ods workbook
        workbook: PathBuf,

        /// Destination document table
        #[arg(long, default_value = DEFAULT_DOCUMENT_TABLE)]
        table: String,
    },
    /// Semantic search over stored documents
    Search {
        query: String,

        /// Number of results to return
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, default_value = DEFAULT_DOCUMENT_TABLE)]
        table: String,
    },
    /// List the most recently stored documents
    Documents {
        #[arg(long)]
        limit: Option<i64>,

        #[arg(long, default_value = DEFAULT_DOCUMENT_TABLE)]
        table: String,
    },
    /// Similarity and sentiment analysis over survey responses
    Responses {
        #[command(subcommand)]
        command: ResponseCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check connectivity and the pgvector extension
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[derive(Debug, Clone, Copy, Args)]
struct ScopeArgs {
    /// Event id
    #[arg(long)]
    event: i64,

    /// Poll id
    #[arg(long)]
    poll: i64,
}

#[derive(Debug, Subcommand)]
enum ResponseCommands {
    /// Cluster the scope around a randomly chosen response
    Cluster {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Responses most similar to one respondent's answer
    Similar {
        #[command(flatten)]
        scope: ScopeArgs,

        #[arg(long)]
        respondent: i64,

        #[arg(long)]
        limit: Option<i64>,
    },
    /// Rank responses around a respondent by the given criteria
    Analyze {
        #[command(flatten)]
        scope: ScopeArgs,

        #[arg(long)]
        respondent: i64,

        /// similarity, sentiment_similarity or thematic_clustering
        #[arg(long)]
        criteria: String,

        /// Free text to re-anchor thematic clustering
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        limit: Option<i64>,
    },
    /// Mean sentiment, percentage and label for the scope
    Sentiment {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Per-respondent sentiment scores
    Scores {
        #[command(flatten)]
        scope: ScopeArgs,

        #[arg(long)]
        limit: Option<i64>,
    },
}

type LiveAnalyzer = Analyzer<PgStore, RetryingEmbedder<HttpEmbedder>>;

fn build_embedder(config: &AppConfig) -> anyhow::Result<RetryingEmbedder<HttpEmbedder>> {
    let http = HttpEmbedder::new(&EmbeddingSettings::from_app_config(config)?)?;
    let policy = BackoffPolicy::from_app_config(config);
    tracing::debug!(
        endpoint = %http.endpoint(),
        provider = %config.embedding_provider,
        model = %config.embedding_model,
        max_attempts = policy.max_attempts,
        "embedding client configured"
    );
    Ok(RetryingEmbedder::new(http, policy))
}

fn build_analyzer(config: &AppConfig, store: PgStore) -> anyhow::Result<LiveAnalyzer> {
    Ok(Analyzer::new(
        store,
        build_embedder(config)?,
        AnalysisLimits::from_app_config(config),
    ))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("pollsense: no command given; run with --help for usage");
        return Ok(());
    };

    let config = pollsense_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, ?command, "starting command");
    let pool = pollsense_db::connect_pool_from_config(&config).await?;
    let store = PgStore::new(pool.clone());

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                let has_vector = pollsense_db::health_check(&pool).await?;
                println!("database reachable; pgvector installed: {has_vector}");
            }
            DbCommands::Migrate => {
                let applied = pollsense_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
        Commands::Ingest { workbook, table } => {
            documents::run_ingest(&config, store, &workbook, &table).await?;
        }
        Commands::Search {
            query,
            limit,
            table,
        } => {
            let analyzer = build_analyzer(&config, store)?;
            documents::run_search(&analyzer, &table, &query, limit).await?;
        }
        Commands::Documents { limit, table } => {
            let analyzer = build_analyzer(&config, store)?;
            documents::run_list(&analyzer, &table, limit).await?;
        }
        Commands::Responses { command } => {
            let analyzer = build_analyzer(&config, store)?;
            responses::run(&analyzer, command).await?;
        }
    }

    Ok(())
}
