use redis::AsyncCommands;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{Game, redis::RedisKey},
    state::RedisClient,
};

pub async fn get_game(game_id: Uuid, redis: RedisClient) -> Result<Game, AppError> {
    let mut conn = redis.get().await?;

    let key = RedisKey::game(game_id);
    let map: HashMap<String, String> = conn
        .hgetall(&key)
        .await
        .map_err(AppError::RedisCommandError)?;

    if map.is_empty() {
        return Err(AppError::NotFound(format!(
            "Game with ID {} not found",
            game_id
        )));
    }

    Game::from_redis_hash(&map)
}

pub async fn get_all_games(redis: RedisClient) -> Result<Vec<Game>, AppError> {
    let mut conn = redis.get().await?;

    let ids: Vec<String> = conn
        .smembers(RedisKey::games())
        .await
        .map_err(AppError::RedisCommandError)?;

    let game_ids: Vec<Uuid> = ids
        .iter()
        .filter_map(|id| match Uuid::parse_str(id) {
            Ok(game_id) => Some(game_id),
            Err(_) => {
                tracing::warn!("Skipping malformed game id in index: {id}");
                None
            }
        })
        .collect();

    if game_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut pipe = redis::pipe();
    for game_id in &game_ids {
        pipe.hgetall(RedisKey::game(*game_id));
    }

    let maps: Vec<HashMap<String, String>> = pipe
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    let mut games = maps
        .iter()
        .filter(|map| !map.is_empty())
        .map(Game::from_redis_hash)
        .collect::<Result<Vec<_>, _>>()?;

    games.sort_by_key(|g| g.date);
    Ok(games)
}
