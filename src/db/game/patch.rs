use redis::Script;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{GamePatch, redis::RedisKey},
    state::RedisClient,
};

/// Writes the fields only while the hash exists, so a patch racing a delete
/// cannot leave a partial `game:<id>` behind.
const PATCH_IF_EXISTS: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
";

pub async fn patch_game_score(
    game_id: Uuid,
    patch: &GamePatch,
    redis: RedisClient,
) -> Result<(), AppError> {
    let fields = patch.to_redis_fields();
    if fields.is_empty() {
        return Ok(());
    }

    let mut conn = redis.get().await?;

    let script = Script::new(PATCH_IF_EXISTS);
    let mut invocation = script.key(RedisKey::game(game_id));
    for (field, value) in &fields {
        invocation.arg(*field).arg(value);
    }

    let patched: i64 = invocation
        .invoke_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    if patched == 0 {
        return Err(AppError::NotFound(format!("Game {} not found", game_id)));
    }

    Ok(())
}
