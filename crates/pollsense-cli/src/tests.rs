use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["pollsense", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["pollsense", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["pollsense"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn ingest_defaults_to_document_embeddings() {
    let cli = Cli::try_parse_from(["pollsense", "ingest", "feedback.xlsx"]).unwrap();
    let Some(Commands::Ingest { workbook, table }) = cli.command else {
        panic!("expected ingest command");
    };
    assert_eq!(workbook, PathBuf::from("feedback.xlsx"));
    assert_eq!(table, "document_embeddings");
}

#[test]
fn ingest_accepts_custom_table() {
    let cli = Cli::try_parse_from([
        "pollsense",
        "ingest",
        "feedback.xlsx",
        "--table",
        "feedback_2024",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Ingest { ref table, .. }) if table == "feedback_2024"
    ));
}

#[test]
fn search_takes_query_and_limit() {
    let cli =
        Cli::try_parse_from(["pollsense", "search", "audio quality", "--limit", "5"]).unwrap();
    let Some(Commands::Search {
        query,
        limit,
        table,
    }) = cli.command
    else {
        panic!("expected search command");
    };
    assert_eq!(query, "audio quality");
    assert_eq!(limit, Some(5));
    assert_eq!(table, "document_embeddings");
}

#[test]
fn search_requires_a_query() {
    assert!(Cli::try_parse_from(["pollsense", "search"]).is_err());
}

#[test]
fn documents_limit_is_optional() {
    let cli = Cli::try_parse_from(["pollsense", "documents"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Documents { limit: None, .. })
    ));
}

#[test]
fn responses_cluster_parses_scope() {
    let cli = Cli::try_parse_from([
        "pollsense",
        "responses",
        "cluster",
        "--event",
        "12",
        "--poll",
        "3",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Responses {
            command: ResponseCommands::Cluster {
                scope: ScopeArgs { event: 12, poll: 3 }
            }
        })
    ));
}

#[test]
fn responses_cluster_requires_scope() {
    assert!(Cli::try_parse_from(["pollsense", "responses", "cluster", "--event", "12"]).is_err());
}

#[test]
fn responses_analyze_parses_all_options() {
    let cli = Cli::try_parse_from([
        "pollsense",
        "responses",
        "analyze",
        "--event",
        "1",
        "--poll",
        "2",
        "--respondent",
        "40",
        "--criteria",
        "thematic_clustering",
        "--search",
        "parking",
        "--limit",
        "50",
    ])
    .unwrap();
    let Some(Commands::Responses {
        command:
            ResponseCommands::Analyze {
                scope,
                respondent,
                criteria,
                search,
                limit,
            },
    }) = cli.command
    else {
        panic!("expected responses analyze command");
    };
    assert_eq!(pollsense_core::Scope::from(scope), pollsense_core::Scope::new(1, 2));
    assert_eq!(respondent, 40);
    assert_eq!(criteria, "thematic_clustering");
    assert_eq!(search.as_deref(), Some("parking"));
    assert_eq!(limit, Some(50));
}

#[test]
fn responses_analyze_leaves_criteria_validation_to_analysis() {
    // Unknown criteria parse here and are rejected by the analyzer.
    let cli = Cli::try_parse_from([
        "pollsense",
        "responses",
        "analyze",
        "--event",
        "1",
        "--poll",
        "2",
        "--respondent",
        "40",
        "--criteria",
        "vibes",
    ])
    .unwrap();
    assert!(cli.command.is_some());
}

#[test]
fn responses_scores_parses_limit() {
    let cli = Cli::try_parse_from([
        "pollsense",
        "responses",
        "scores",
        "--event",
        "1",
        "--poll",
        "2",
        "--limit",
        "10",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Responses {
            command: ResponseCommands::Scores {
                limit: Some(10),
                ..
            }
        })
    ));
}

fn app_config(embedding_url: Option<&str>) -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: pollsense_core::Environment::Test,
        log_level: "info".to_string(),
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 10,
        embedding_url: embedding_url.map(str::to_string),
        embedding_api_key: None,
        embedding_provider: pollsense_core::EmbeddingProvider::Azure,
        embedding_model: "ada-deployment".to_string(),
        embedding_api_version: "2024-08-01-preview".to_string(),
        embedding_timeout_secs: 30,
        embedding_max_attempts: 4,
        embedding_backoff_base_ms: 250,
        ingest_row_delay_ms: 500,
        analysis_limit: 5000,
        search_candidate_limit: 1000,
    }
}

#[test]
fn embedder_requires_embedding_url() {
    let Err(err) = build_embedder(&app_config(None)) else {
        panic!("expected missing embedding url to fail");
    };
    assert!(err.to_string().contains("POLLSENSE_EMBEDDING_URL"));
}

#[test]
fn embedder_uses_configured_retry_policy() {
    let embedder =
        build_embedder(&app_config(Some("https://contoso.openai.azure.com"))).expect("embedder");
    assert_eq!(embedder.policy().max_attempts, 4);
    assert_eq!(
        embedder.policy().base_delay,
        std::time::Duration::from_millis(250)
    );
    assert!(embedder.policy().jitter);
}
