//! Live integration tests for pollsense-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The server must have the pgvector extension available.
//! The `migrations` path is relative to the crate root (`crates/pollsense-db/`),
//! so `"../../migrations"` resolves to the workspace migration directory.

use pollsense_core::{
    DocumentStore, DocumentTable, NewDocument, RankQuery, ResponseOrder, ResponseStore, Scope,
};
use pollsense_db::{create_document_table, health_check, ping, PgStore};
use serde_json::json;

const SCOPE: Scope = Scope {
    event_id: 100,
    poll_id: 7,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_response(
    pool: &sqlx::PgPool,
    scope: Scope,
    respondent_id: i64,
    text: &str,
    vector: &str,
    score: f64,
) {
    sqlx::query(
        "INSERT INTO text_survey_responses \
             (event_id, poll_id, respondent_id, response_text, response_vector, sentiment_score) \
         VALUES ($1, $2, $3, $4, $5::text::vector, $6)",
    )
    .bind(scope.event_id)
    .bind(scope.poll_id)
    .bind(respondent_id)
    .bind(text)
    .bind(vector)
    .bind(score)
    .execute(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_response failed for respondent {respondent_id}: {e}"));
}

async fn seed_survey(pool: &sqlx::PgPool) {
    insert_response(pool, SCOPE, 1, "great talk", "[1,0]", 2.0).await;
    insert_response(pool, SCOPE, 2, "pretty good", "[0.9,0.1]", 2.0).await;
    insert_response(pool, SCOPE, 3, "it was fine", "[1,0.05]", 0.0).await;
    insert_response(pool, SCOPE, 4, "loved it", "[0,1]", 3.0).await;
    insert_response(pool, SCOPE, 5, "awful audio", "[-1,0.2]", -3.0).await;
    insert_response(pool, Scope::new(100, 8), 1, "other poll", "[1,0]", 5.0).await;
}

fn document(content: &str, embedding: Vec<f32>, score: f64) -> NewDocument {
    NewDocument {
        content: content.to_string(),
        embedding,
        sentiment_score: score,
        row_data: json!({ "comment": content }),
    }
}

// ---------------------------------------------------------------------------
// Section 1: Connectivity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn ping_and_health_check_succeed(pool: sqlx::PgPool) {
    ping(&pool).await.expect("ping failed");
    assert!(health_check(&pool).await.expect("health_check failed"));
}

// ---------------------------------------------------------------------------
// Section 2: Survey responses
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn find_seed_returns_vector_and_score(pool: sqlx::PgPool) {
    seed_survey(&pool).await;
    let store = PgStore::new(pool);

    let seed = store
        .find_seed(SCOPE, 2)
        .await
        .expect("find_seed failed")
        .expect("respondent 2 should exist");

    assert_eq!(seed.response_text, "pretty good");
    assert_eq!(seed.response_vector, vec![0.9, 0.1]);
    assert!((seed.sentiment_score - 2.0).abs() < f64::EPSILON);

    assert!(store.find_seed(SCOPE, 99).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn random_seed_stays_in_scope(pool: sqlx::PgPool) {
    seed_survey(&pool).await;
    let store = PgStore::new(pool);

    let seed = store.random_seed(SCOPE).await.unwrap().unwrap();
    assert!((1..=5).contains(&seed.respondent_id));
    assert!(store.random_seed(Scope::new(1, 1)).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn rank_by_distance_excludes_seed(pool: sqlx::PgPool) {
    seed_survey(&pool).await;
    let store = PgStore::new(pool);

    let rows = store
        .rank_responses(&RankQuery {
            scope: SCOPE,
            anchor: vec![1.0, 0.0],
            exclude_respondent: Some(1),
            order: ResponseOrder::Distance,
            limit: 10,
        })
        .await
        .expect("rank_responses failed");

    let ids: Vec<i64> = rows.iter().map(|r| r.respondent_id).collect();
    assert_eq!(ids, vec![3, 2, 4, 5]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn rank_by_sentiment_then_distance(pool: sqlx::PgPool) {
    seed_survey(&pool).await;
    let store = PgStore::new(pool);

    let rows = store
        .rank_responses(&RankQuery {
            scope: SCOPE,
            anchor: vec![1.0, 0.0],
            exclude_respondent: None,
            order: ResponseOrder::SentimentThenDistance { descending: true },
            limit: 10,
        })
        .await
        .unwrap();

    let ids: Vec<i64> = rows.iter().map(|r| r.respondent_id).collect();
    // 3.0 first, then the two 2.0 rows closest-first, then 0.0, then -3.0.
    assert_eq!(ids, vec![4, 1, 2, 3, 5]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn rank_respects_limit(pool: sqlx::PgPool) {
    seed_survey(&pool).await;
    let store = PgStore::new(pool);

    let rows = store
        .rank_responses(&RankQuery {
            scope: SCOPE,
            anchor: vec![0.0, 1.0],
            exclude_respondent: None,
            order: ResponseOrder::Distance,
            limit: 2,
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].respondent_id, 4);
}

#[sqlx::test(migrations = "../../migrations")]
async fn sentiment_totals_and_scores(pool: sqlx::PgPool) {
    seed_survey(&pool).await;
    let store = PgStore::new(pool);

    let totals = store.sentiment_totals(SCOPE).await.unwrap();
    assert_eq!(totals.count, 5);
    assert!((totals.mean.unwrap() - 0.8).abs() < 1e-9);

    let empty = store.sentiment_totals(Scope::new(0, 0)).await.unwrap();
    assert_eq!(empty.count, 0);
    assert!(empty.mean.is_none());

    let scores = store.respondent_scores(SCOPE, 3).await.unwrap();
    let ids: Vec<i64> = scores.iter().map(|s| s.respondent_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_respondent_in_scope_is_rejected(pool: sqlx::PgPool) {
    insert_response(&pool, SCOPE, 1, "first", "[1,0]", 0.0).await;
    let result = sqlx::query(
        "INSERT INTO text_survey_responses \
             (event_id, poll_id, respondent_id, response_text, response_vector) \
         VALUES ($1, $2, 1, 'again', '[0,1]'::vector)",
    )
    .bind(SCOPE.event_id)
    .bind(SCOPE.poll_id)
    .execute(&pool)
    .await;

    assert!(result.is_err(), "unique (event, poll, respondent) must hold");
}

// ---------------------------------------------------------------------------
// Section 3: Documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn insert_and_read_back_documents(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let table = DocumentTable::default();

    let first = store
        .insert_document(&table, &document("Great keynote", vec![0.5, -1.0], 3.0))
        .await
        .expect("insert_document failed");
    let second = store
        .insert_document(&table, &document("Long queues", vec![0.0, 1.0], -1.234_56))
        .await
        .unwrap();
    assert!(second > first, "ids are monotonic");

    let candidates = store.candidate_documents(&table, 1000).await.unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].embedding_vector, json!([0.5, -1.0]));
    assert_eq!(candidates[0].row_data, json!({"comment": "Great keynote"}));
    assert!((candidates[1].sentiment_score + 1.2346).abs() < 1e-9);

    let recent = store.recent_documents(&table, 1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, second);
}

#[sqlx::test(migrations = "../../migrations")]
async fn custom_destination_table_is_created_on_demand(pool: sqlx::PgPool) {
    let table = DocumentTable::new("feedback_2024").unwrap();
    create_document_table(&pool, &table).await.expect("create failed");
    // Idempotent.
    create_document_table(&pool, &table).await.expect("second create failed");

    let store = PgStore::new(pool);
    store
        .insert_document(&table, &document("fine", vec![1.0], 2.0))
        .await
        .unwrap();

    assert_eq!(store.recent_documents(&table, 10).await.unwrap().len(), 1);
    assert!(store
        .recent_documents(&DocumentTable::default(), 10)
        .await
        .unwrap()
        .is_empty());
}
