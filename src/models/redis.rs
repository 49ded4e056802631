use uuid::Uuid;

pub struct RedisKey;

impl RedisKey {
    pub fn game(id: Uuid) -> String {
        format!("game:{id}")
    }

    /// Set holding every stored game id.
    pub fn games() -> String {
        "games".to_string()
    }
}
