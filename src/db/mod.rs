pub mod game;
pub mod memory;
pub mod season;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{Game, GamePatch, Season},
};

pub use game::RedisGameStore;
pub use memory::MemoryStore;
pub use season::PgSeasonStore;

#[async_trait]
pub trait SeasonStore: Send + Sync {
    /// Seasons whose interval contains `date`, ordered by start date. Stores may
    /// stop after two rows since anything beyond one is already ambiguous.
    async fn seasons_containing(&self, date: NaiveDate) -> Result<Vec<Season>, AppError>;

    async fn get_season_by_id(&self, id: i32) -> Result<Season, AppError>;

    /// The season with the latest end date.
    async fn latest_season(&self) -> Result<Option<Season>, AppError>;

    async fn list_seasons(&self) -> Result<Vec<Season>, AppError>;

    /// Inserts `[start, end]`, failing with `BadRequest` if it overlaps an
    /// existing season.
    async fn insert_season(&self, start: NaiveDate, end: NaiveDate) -> Result<Season, AppError>;
}

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn get_game(&self, id: Uuid) -> Result<Game, AppError>;

    async fn list_games(&self) -> Result<Vec<Game>, AppError>;

    /// Writes every field of the game.
    async fn save_game(&self, game: &Game) -> Result<(), AppError>;

    /// Writes only the fields present in `patch`; other fields are untouched.
    async fn patch_game(&self, id: Uuid, patch: &GamePatch) -> Result<(), AppError>;

    async fn delete_game(&self, id: Uuid) -> Result<(), AppError>;
}
