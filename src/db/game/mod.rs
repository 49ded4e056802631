pub mod delete;
pub mod get;
pub mod patch;
pub mod post;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::GameStore,
    errors::AppError,
    models::{Game, GamePatch},
    state::RedisClient,
};

#[derive(Clone)]
pub struct RedisGameStore {
    redis: RedisClient,
}

impl RedisGameStore {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl GameStore for RedisGameStore {
    async fn get_game(&self, id: Uuid) -> Result<Game, AppError> {
        get::get_game(id, self.redis.clone()).await
    }

    async fn list_games(&self) -> Result<Vec<Game>, AppError> {
        get::get_all_games(self.redis.clone()).await
    }

    async fn save_game(&self, game: &Game) -> Result<(), AppError> {
        post::save_game(game, self.redis.clone()).await
    }

    async fn patch_game(&self, id: Uuid, patch: &GamePatch) -> Result<(), AppError> {
        patch::patch_game_score(id, patch, self.redis.clone()).await
    }

    async fn delete_game(&self, id: Uuid) -> Result<(), AppError> {
        delete::delete_game(id, self.redis.clone()).await
    }
}
