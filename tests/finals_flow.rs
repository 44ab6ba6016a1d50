use ladder_lib::database::bracket_repo;
use ladder_lib::database::models::ReasonColumns;
use ladder_lib::services::bracket::load::load_bracket;
use ladder_lib::services::bracket::reason_codec::{decode, FinishReason};
use ladder_lib::services::bracket::record::{record_result, ResultSubmission};
use ladder_lib::services::bracket::seeding::{advance_winners, seed_round};
use ladder_lib::services::bracket::series::SeriesMode;
use ladder_lib::services::config::{ConfigService, DatabaseConfig};
mod common;
use tempfile::TempDir;

async fn setup_pool() -> sqlx::SqlitePool {
    let ctx = common::init_test_db().await;
    ctx.pool
}

async fn new_bracket(pool: &sqlx::SqlitePool, players: &[&str]) -> String {
    let bracket = bracket_repo::create_bracket(pool, "Club Finals").await.unwrap();
    let slots: Vec<Option<String>> = players.iter().map(|p| Some(p.to_string())).collect();
    seed_round(pool, &bracket.id, 1, &slots).await.unwrap();
    bracket.id
}

fn submit(bracket_id: &str, round: u32, match_index: u32, winner: &str) -> ResultSubmission {
    ResultSubmission {
        bracket_id: bracket_id.to_string(),
        round,
        match_index,
        winner_id: winner.to_string(),
        mode: SeriesMode::TwoZero,
        finish_reason: FinishReason::Normal,
        advantage_holder: None,
    }
}

async fn stored_reason(pool: &sqlx::SqlitePool, bracket_id: &str, column: &str) -> String {
    let sql = format!("SELECT {column} FROM bracket_matches WHERE bracket_id = ?");
    let row: (String,) = sqlx::query_as(&sql)
        .bind(bracket_id)
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

#[tokio::test]
async fn test_scenario_plain_two_zero() {
    let pool = setup_pool().await;
    let bracket_id = new_bracket(&pool, &["A", "B"]).await;

    let recorded = record_result(&pool, &submit(&bracket_id, 1, 1, "A"), &ReasonColumns::default())
        .await
        .unwrap();

    assert_eq!(recorded.write.winner_id.as_deref(), Some("A"));
    assert_eq!(recorded.write.loser_id.as_deref(), Some("B"));
    assert_eq!(recorded.write.winner_score, Some(2));
    assert_eq!(recorded.write.loser_score, Some(0));
    assert_eq!(stored_reason(&pool, &bracket_id, "finish_reason").await, "normal");
}

#[tokio::test]
async fn test_scenario_advantage_forces_two_one() {
    let pool = setup_pool().await;
    let bracket_id = new_bracket(&pool, &["A", "B"]).await;

    for mode in [SeriesMode::TwoZero, SeriesMode::TwoOne] {
        let mut sub = submit(&bracket_id, 1, 1, "A");
        sub.advantage_holder = Some("B".into());
        sub.mode = mode;
        let recorded = record_result(&pool, &sub, &ReasonColumns::default())
            .await
            .unwrap();
        assert_eq!((recorded.write.winner_score, recorded.write.loser_score), (Some(2), Some(1)));

        let reason = decode(&stored_reason(&pool, &bracket_id, "finish_reason").await);
        assert_eq!(reason.base, FinishReason::Normal);
        assert_eq!(reason.advantage_holder.as_deref(), Some("B"));
    }
}

#[tokio::test]
async fn test_scenario_legacy_token_loads() {
    let pool = setup_pool().await;
    let bracket_id = new_bracket(&pool, &["A", "B"]).await;
    sqlx::query(
        "INSERT INTO bracket_matches (bracket_id, round, match_index, winner_id, loser_id, winner_score, loser_score, finish_reason)
         VALUES (?, 1, 1, 'A', 'B', 2, 0, 'time_limit')",
    )
    .bind(&bracket_id)
    .execute(&pool)
    .await
    .unwrap();

    let view = load_bracket(&pool, &bracket_id, &ReasonColumns::default())
        .await
        .unwrap();
    let m = &view.rounds[0].matches[0];
    assert_eq!(m.finish_reason, FinishReason::TimeLimit);
    assert_eq!(m.advantage_holder, None);
    assert_eq!(m.mode, SeriesMode::TwoZero);
}

#[tokio::test]
async fn test_scenario_legacy_reason_column() {
    let pool = setup_pool().await;
    let bracket_id = new_bracket(&pool, &["A", "B"]).await;
    sqlx::query("ALTER TABLE bracket_matches RENAME COLUMN finish_reason TO reason")
        .execute(&pool)
        .await
        .unwrap();

    let mut sub = submit(&bracket_id, 1, 1, "B");
    sub.advantage_holder = Some("B".into());
    sub.mode = SeriesMode::TwoOne;
    sub.finish_reason = FinishReason::Forfeit;
    let recorded = record_result(&pool, &sub, &ReasonColumns::default())
        .await
        .expect("write should fall back to the legacy column");
    assert_eq!(recorded.report.column, "reason");
    assert_eq!(stored_reason(&pool, &bracket_id, "reason").await, "def:B|forfeit");

    let view = load_bracket(&pool, &bracket_id, &ReasonColumns::default())
        .await
        .unwrap();
    let m = &view.rounds[0].matches[0];
    assert_eq!(m.advantage_holder.as_deref(), Some("B"));
    assert_eq!(m.finish_reason, FinishReason::Forfeit);
    assert_eq!(m.mode, SeriesMode::TwoOne);
}

#[tokio::test]
async fn test_full_bracket_to_final() {
    let pool = setup_pool().await;
    let bracket_id = new_bracket(&pool, &["A", "B", "C", "D"]).await;
    let columns = ReasonColumns::default();

    record_result(&pool, &submit(&bracket_id, 1, 1, "A"), &columns).await.unwrap();
    let mut semi = submit(&bracket_id, 1, 2, "D");
    semi.advantage_holder = Some("C".into());
    record_result(&pool, &semi, &columns).await.unwrap();

    let final_pair = advance_winners(&pool, &bracket_id, 1).await.unwrap();
    assert_eq!(final_pair, vec![Some("A".to_string()), Some("D".to_string())]);

    let mut final_sub = submit(&bracket_id, 2, 1, "D");
    final_sub.mode = SeriesMode::TwoOne;
    record_result(&pool, &final_sub, &columns).await.unwrap();

    let view = load_bracket(&pool, &bracket_id, &columns).await.unwrap();
    assert_eq!(view.rounds.len(), 2);
    let semi_view = &view.rounds[0].matches[1];
    assert_eq!(semi_view.mode, SeriesMode::TwoOne);
    assert_eq!(semi_view.advantage_holder.as_deref(), Some("C"));
    let final_view = &view.rounds[1].matches[0];
    assert_eq!(final_view.winner_id.as_deref(), Some("D"));
    assert!(final_view.series.is_some());
}

#[tokio::test]
async fn test_file_backed_database_with_configured_columns() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("ladder.db");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", db_path.to_string_lossy()),
        max_connections: 2,
    };

    let pool = ladder_lib::init_pool(&config).await.unwrap();
    assert!(db_path.exists());

    let service = ConfigService::init(pool.clone()).await;
    service
        .set_reason_columns(vec!["finish_reason".into()])
        .await
        .unwrap();

    let bracket_id = new_bracket(&pool, &["A", "B"]).await;
    let recorded = record_result(&pool, &submit(&bracket_id, 1, 1, "A"), &service.reason_columns())
        .await
        .unwrap();
    assert_eq!(recorded.report.column, "finish_reason");
    pool.close().await;

    // Re-open: migrations are idempotent and settings survive
    let pool = ladder_lib::init_pool(&config).await.unwrap();
    let service = ConfigService::init(pool.clone()).await;
    assert_eq!(
        service.reason_columns().iter().collect::<Vec<_>>(),
        vec!["finish_reason"]
    );
    let view = load_bracket(&pool, &bracket_id, &service.reason_columns())
        .await
        .unwrap();
    assert!(view.rounds[0].matches[0].complete);
}
