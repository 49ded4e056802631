use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{errors::AppError, models::Season};

/// SQLSTATE for an exclusion constraint violation.
const EXCLUSION_VIOLATION: &str = "23P01";

pub async fn create_seasons_table(postgres: PgPool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS seasons (
			id SERIAL PRIMARY KEY,
			start_date DATE NOT NULL,
			end_date DATE NOT NULL,
			created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
			CHECK (end_date >= start_date)
		)",
    )
    .execute(&postgres)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to create seasons table: {}", e)))?;

    // Tables created before the constraint existed get it added here.
    sqlx::query(
        "DO $$
		BEGIN
			IF NOT EXISTS (
				SELECT 1 FROM pg_constraint
				WHERE conname = 'seasons_no_overlap' AND conrelid = 'seasons'::regclass
			) THEN
				ALTER TABLE seasons ADD CONSTRAINT seasons_no_overlap
					EXCLUDE USING gist (daterange(start_date, end_date, '[]') WITH &&);
			END IF;
		END $$",
    )
    .execute(&postgres)
    .await
    .map_err(|e| {
        AppError::DatabaseError(format!("Failed to add season overlap constraint: {}", e))
    })?;

    Ok(())
}

pub async fn add_season(
    start_date: NaiveDate,
    end_date: NaiveDate,
    postgres: PgPool,
) -> Result<Season, AppError> {
    if end_date < start_date {
        return Err(AppError::BadRequest(
            "End date must not be before start date".into(),
        ));
    }

    // seasons_no_overlap rejects concurrent overlapping inserts too.
    let season = sqlx::query_as::<_, Season>(
        "INSERT INTO seasons (start_date, end_date)
        VALUES ($1, $2)
        RETURNING id, start_date, end_date, created_at",
    )
    .bind(start_date)
    .bind(end_date)
    .fetch_one(&postgres)
    .await
    .map_err(|e| insert_error(e, start_date, end_date))?;

    tracing::info!("Created new season: {} (ID: {})", season.label(), season.id);

    Ok(season)
}

fn insert_error(err: sqlx::Error, start_date: NaiveDate, end_date: NaiveDate) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some(EXCLUSION_VIOLATION) => {
            AppError::BadRequest(format!(
                "Season {start_date} - {end_date} overlaps an existing season"
            ))
        }
        err => err.into(),
    }
}
