//! Runs against a real Postgres when `TEST_DATABASE_URL` is set; each run
//! works in its own schema and drops it afterwards.

use chrono::NaiveDate;
use clubmanager::{
    db::{PgSeasonStore, SeasonStore},
    errors::AppError,
};
use sqlx::{Executor, PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

async fn scratch_pool() -> Option<(PgPool, String)> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let schema = format!("clubmanager_test_{}", Uuid::new_v4().simple());

    let admin = PgPool::connect(&url).await.unwrap();
    admin
        .execute(format!("CREATE SCHEMA {schema}").as_str())
        .await
        .unwrap();

    let search_path = format!("SET search_path TO {schema}, public");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .after_connect(move |conn, _| {
            let search_path = search_path.clone();
            Box::pin(async move {
                conn.execute(search_path.as_str()).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .unwrap();

    Some((pool, schema))
}

async fn drop_schema(pool: &PgPool, schema: &str) {
    pool.execute(format!("DROP SCHEMA {schema} CASCADE").as_str())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_concurrent_overlapping_inserts_keep_one_season() {
    let Some((pool, schema)) = scratch_pool().await else {
        return;
    };
    let store = PgSeasonStore::new(pool.clone());
    store.init().await.unwrap();

    let (first, second) = tokio::join!(
        store.insert_season(d(2024, 7, 1), d(2025, 6, 30)),
        store.insert_season(d(2025, 1, 1), d(2025, 12, 31)),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(AppError::BadRequest(_))))
    );
    assert_eq!(store.list_seasons().await.unwrap().len(), 1);

    drop_schema(&pool, &schema).await;
}

#[tokio::test]
async fn test_adjacent_seasons_are_accepted() {
    let Some((pool, schema)) = scratch_pool().await else {
        return;
    };
    let store = PgSeasonStore::new(pool.clone());
    store.init().await.unwrap();
    // A second init finds the constraint already in place.
    store.init().await.unwrap();

    store
        .insert_season(d(2024, 7, 1), d(2025, 6, 30))
        .await
        .unwrap();
    store
        .insert_season(d(2025, 7, 1), d(2026, 6, 30))
        .await
        .unwrap();

    let err = store
        .insert_season(d(2025, 6, 30), d(2025, 6, 30))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    drop_schema(&pool, &schema).await;
}
