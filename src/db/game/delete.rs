use uuid::Uuid;

use crate::{errors::AppError, models::redis::RedisKey, state::RedisClient};

pub async fn delete_game(game_id: Uuid, redis: RedisClient) -> Result<(), AppError> {
    let mut conn = redis.get().await?;

    let (removed, _): (i64, i64) = redis::pipe()
        .atomic()
        .del(RedisKey::game(game_id))
        .srem(RedisKey::games(), game_id.to_string())
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    if removed == 0 {
        return Err(AppError::NotFound(format!("Game {} not found", game_id)));
    }

    tracing::info!("Deleted game {}", game_id);
    Ok(())
}
