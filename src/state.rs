use std::sync::Arc;

use bb8::Pool;
use bb8_redis::RedisConnectionManager;

use crate::{
    competition::SyncEngine,
    config::{HomeVenue, SyncSettings},
    db::{GameStore, SeasonStore},
    errors::AppError,
};

pub type RedisClient = Pool<RedisConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub seasons: Arc<dyn SeasonStore>,
    pub games: Arc<dyn GameStore>,
    pub engine: Arc<SyncEngine>,
    pub venue: HomeVenue,
    pub sync: SyncSettings,
}

impl AppState {
    pub fn new(
        seasons: Arc<dyn SeasonStore>,
        games: Arc<dyn GameStore>,
        venue: HomeVenue,
        sync: SyncSettings,
    ) -> Result<Self, AppError> {
        let engine = SyncEngine::new(&sync, venue.clone(), seasons.clone(), games.clone())?;

        Ok(Self {
            seasons,
            games,
            engine: Arc::new(engine),
            venue,
            sync,
        })
    }
}
