use crate::{
    errors::AppError,
    models::{Game, redis::RedisKey},
    state::RedisClient,
};

/// Replaces the whole hash so fields cleared on the game are removed too.
pub async fn save_game(game: &Game, redis: RedisClient) -> Result<(), AppError> {
    let mut conn = redis.get().await?;

    let key = RedisKey::game(game.id);
    let fields: Vec<(String, String)> = game.to_redis_hash().into_iter().collect();

    let _: () = redis::pipe()
        .atomic()
        .del(&key)
        .ignore()
        .hset_multiple(&key, &fields)
        .ignore()
        .sadd(RedisKey::games(), game.id.to_string())
        .ignore()
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    tracing::debug!("Saved game {} ({})", game.id, game);
    Ok(())
}
