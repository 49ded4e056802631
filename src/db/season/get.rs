use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{errors::AppError, models::Season};

pub async fn get_seasons_containing(
    date: NaiveDate,
    postgres: PgPool,
) -> Result<Vec<Season>, AppError> {
    let seasons = sqlx::query_as::<_, Season>(
        "SELECT id, start_date, end_date, created_at
			FROM seasons
			WHERE start_date <= $1 AND end_date >= $1
			ORDER BY start_date
			LIMIT 2",
    )
    .bind(date)
    .fetch_all(&postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to fetch season for {date}: {}", e)))?;

    Ok(seasons)
}

pub async fn get_season(id: i32, postgres: PgPool) -> Result<Season, AppError> {
    sqlx::query_as::<_, Season>(
        "SELECT id, start_date, end_date, created_at FROM seasons WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to fetch season {id}: {}", e)))?
    .ok_or_else(|| AppError::NotFound(format!("Season with ID {id} not found")))
}

pub async fn get_latest_season(postgres: PgPool) -> Result<Option<Season>, AppError> {
    let season = sqlx::query_as::<_, Season>(
        "SELECT id, start_date, end_date, created_at
			FROM seasons
			ORDER BY end_date DESC
			LIMIT 1",
    )
    .fetch_optional(&postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to fetch latest season: {}", e)))?;

    Ok(season)
}

pub async fn get_all_seasons(postgres: PgPool) -> Result<Vec<Season>, AppError> {
    let seasons = sqlx::query_as::<_, Season>(
        "SELECT id, start_date, end_date, created_at FROM seasons ORDER BY start_date",
    )
    .fetch_all(&postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to fetch seasons: {}", e)))?;

    Ok(seasons)
}
