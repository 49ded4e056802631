use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::{GameStore, SeasonStore},
    errors::AppError,
    models::{Game, GamePatch, Season},
};

/// In-process store backing both traits. Used by the test-suite and anywhere
/// the service runs without Postgres and Redis.
#[derive(Clone, Default)]
pub struct MemoryStore {
    seasons: Arc<Mutex<Vec<Season>>>,
    games: Arc<Mutex<HashMap<Uuid, Game>>>,
    patches: Arc<Mutex<Vec<(Uuid, GamePatch)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every patch written so far, in order.
    pub async fn patch_log(&self) -> Vec<(Uuid, GamePatch)> {
        self.patches.lock().await.clone()
    }
}

#[async_trait]
impl SeasonStore for MemoryStore {
    async fn seasons_containing(&self, date: NaiveDate) -> Result<Vec<Season>, AppError> {
        let seasons = self.seasons.lock().await;
        let mut matching: Vec<Season> = seasons
            .iter()
            .filter(|s| s.contains(date))
            .cloned()
            .collect();
        matching.sort_by_key(|s| s.start_date);
        matching.truncate(2);
        Ok(matching)
    }

    async fn get_season_by_id(&self, id: i32) -> Result<Season, AppError> {
        self.seasons
            .lock()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Season with ID {id} not found")))
    }

    async fn latest_season(&self) -> Result<Option<Season>, AppError> {
        Ok(self
            .seasons
            .lock()
            .await
            .iter()
            .max_by_key(|s| s.end_date)
            .cloned())
    }

    async fn list_seasons(&self) -> Result<Vec<Season>, AppError> {
        let mut seasons = self.seasons.lock().await.clone();
        seasons.sort_by_key(|s| s.start_date);
        Ok(seasons)
    }

    async fn insert_season(&self, start: NaiveDate, end: NaiveDate) -> Result<Season, AppError> {
        if end < start {
            return Err(AppError::BadRequest(
                "End date must not be before start date".into(),
            ));
        }

        let mut seasons = self.seasons.lock().await;
        if seasons.iter().any(|s| s.overlaps(start, end)) {
            return Err(AppError::BadRequest(format!(
                "Season {start} - {end} overlaps an existing season"
            )));
        }

        let season = Season {
            id: seasons.iter().map(|s| s.id).max().unwrap_or(0) + 1,
            start_date: start,
            end_date: end,
            created_at: Utc::now(),
        };
        seasons.push(season.clone());
        Ok(season)
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn get_game(&self, id: Uuid) -> Result<Game, AppError> {
        self.games
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Game with ID {id} not found")))
    }

    async fn list_games(&self) -> Result<Vec<Game>, AppError> {
        let mut games: Vec<Game> = self.games.lock().await.values().cloned().collect();
        games.sort_by_key(|g| g.date);
        Ok(games)
    }

    async fn save_game(&self, game: &Game) -> Result<(), AppError> {
        self.games.lock().await.insert(game.id, game.clone());
        Ok(())
    }

    async fn patch_game(&self, id: Uuid, patch: &GamePatch) -> Result<(), AppError> {
        let mut games = self.games.lock().await;
        let game = games
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Game {id} not found")))?;
        patch.apply_to(game);
        self.patches.lock().await.push((id, patch.clone()));
        Ok(())
    }

    async fn delete_game(&self, id: Uuid) -> Result<(), AppError> {
        self.games
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Game {id} not found")))
    }
}
