use crate::app_config::{AppConfig, EmbeddingProvider, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_limit = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let value = or_default(var, default)
            .parse::<i64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value <= 0 {
            return Err(invalid(var, format!("must be positive, got {value}")));
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;
    let embedding_url = lookup("POLLSENSE_EMBEDDING_URL")
        .ok()
        .filter(|url| !url.trim().is_empty());

    let env = parse_environment(&or_default("POLLSENSE_ENV", "development"));
    let log_level = or_default("POLLSENSE_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("POLLSENSE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("POLLSENSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("POLLSENSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let embedding_api_key = lookup("POLLSENSE_EMBEDDING_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let embedding_provider = parse_provider(&or_default("POLLSENSE_EMBEDDING_PROVIDER", "openai"))?;
    let embedding_model = or_default("POLLSENSE_EMBEDDING_MODEL", "text-embedding-ada-002");
    let embedding_api_version = or_default("POLLSENSE_EMBEDDING_API_VERSION", "2024-08-01-preview");
    let embedding_timeout_secs = parse_u64("POLLSENSE_EMBEDDING_TIMEOUT_SECS", "30")?;
    let embedding_max_attempts = parse_u32("POLLSENSE_EMBEDDING_MAX_ATTEMPTS", "3")?;
    if embedding_max_attempts == 0 {
        return Err(invalid(
            "POLLSENSE_EMBEDDING_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let embedding_backoff_base_ms = parse_u64("POLLSENSE_EMBEDDING_BACKOFF_BASE_MS", "1000")?;

    let ingest_row_delay_ms = parse_u64("POLLSENSE_INGEST_ROW_DELAY_MS", "500")?;
    let analysis_limit = parse_limit("POLLSENSE_ANALYSIS_LIMIT", "5000")?;
    let search_candidate_limit = parse_limit("POLLSENSE_SEARCH_CANDIDATE_LIMIT", "1000")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        embedding_url,
        embedding_api_key,
        embedding_provider,
        embedding_model,
        embedding_api_version,
        embedding_timeout_secs,
        embedding_max_attempts,
        embedding_backoff_base_ms,
        ingest_row_delay_ms,
        analysis_limit,
        search_candidate_limit,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_provider(s: &str) -> Result<EmbeddingProvider, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "openai" => Ok(EmbeddingProvider::OpenAi),
        "azure" => Ok(EmbeddingProvider::Azure),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POLLSENSE_EMBEDDING_PROVIDER".to_string(),
            reason: format!("expected `openai` or `azure`, got `{other}`"),
        }),
    }
}
