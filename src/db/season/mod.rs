pub mod get;
pub mod post;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{db::SeasonStore, errors::AppError, models::Season};

#[derive(Clone)]
pub struct PgSeasonStore {
    postgres: PgPool,
}

impl PgSeasonStore {
    pub fn new(postgres: PgPool) -> Self {
        Self { postgres }
    }

    pub async fn init(&self) -> Result<(), AppError> {
        post::create_seasons_table(self.postgres.clone()).await
    }
}

#[async_trait]
impl SeasonStore for PgSeasonStore {
    async fn seasons_containing(&self, date: NaiveDate) -> Result<Vec<Season>, AppError> {
        get::get_seasons_containing(date, self.postgres.clone()).await
    }

    async fn get_season_by_id(&self, id: i32) -> Result<Season, AppError> {
        get::get_season(id, self.postgres.clone()).await
    }

    async fn latest_season(&self) -> Result<Option<Season>, AppError> {
        get::get_latest_season(self.postgres.clone()).await
    }

    async fn list_seasons(&self) -> Result<Vec<Season>, AppError> {
        get::get_all_seasons(self.postgres.clone()).await
    }

    async fn insert_season(&self, start: NaiveDate, end: NaiveDate) -> Result<Season, AppError> {
        post::add_season(start, end, self.postgres.clone()).await
    }
}
