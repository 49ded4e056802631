use std::sync::Arc;

use reqwest::Client;
use uuid::Uuid;

use super::{
    Competition, CompetitionAdapter, ScoreRequest, SyncError, SyncOutcome, cehl::Cehl,
    rbihf::Rbihf,
};
use crate::{
    config::{CompetitionEndpoints, HomeVenue, SyncSettings},
    db::{GameStore, SeasonStore},
    errors::AppError,
    models::{Game, Season},
    seasons,
};

pub struct SyncEngine {
    client: Client,
    endpoints: CompetitionEndpoints,
    venue: HomeVenue,
    seasons: Arc<dyn SeasonStore>,
    games: Arc<dyn GameStore>,
}

impl SyncEngine {
    pub fn new(
        settings: &SyncSettings,
        venue: HomeVenue,
        seasons: Arc<dyn SeasonStore>,
        games: Arc<dyn GameStore>,
    ) -> Result<Self, AppError> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client,
            endpoints: settings.endpoints.clone(),
            venue,
            seasons,
            games,
        })
    }

    pub fn games(&self) -> &dyn GameStore {
        self.games.as_ref()
    }

    pub fn adapter(&self, competition: Competition) -> Box<dyn CompetitionAdapter> {
        match competition {
            Competition::Rbihf => Box::new(Rbihf::new(
                self.client.clone(),
                self.endpoints.rbihf_url.clone(),
            )),
            Competition::Cehl => Box::new(Cehl::new(
                self.client.clone(),
                self.endpoints.cehl_url.clone(),
            )),
        }
    }

    /// Refreshes live state and score of one game from its competition feed.
    ///
    /// Nothing is fetched or written for games without a competition, with an
    /// unregistered competition, or without an external game ID. On success
    /// the store receives a single patch with the fetched fields.
    pub async fn sync(&self, game: &Game) -> Result<SyncOutcome, SyncError> {
        let Some(ref key) = game.competition else {
            tracing::debug!("Game {} has no competition, skipping", game.id);
            return Ok(SyncOutcome::Skipped);
        };

        let competition: Competition = key.parse()?;
        let game_id = game
            .game_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or(SyncError::MissingGameId(competition))?;

        let season = self.season_for(game).await.map_err(SyncError::Season)?;
        let request = ScoreRequest {
            game_id,
            season_code: season.competition_code(),
        };

        let fetched = self.adapter(competition).fetch(&request).await?;
        let patch = fetched.into_patch(game.is_home_game(&self.venue));

        if !patch.is_empty() {
            self.games
                .patch_game(game.id, &patch)
                .await
                .map_err(SyncError::Store)?;
        }

        tracing::info!(
            "Updated {} from {} game {}: {:?}",
            game,
            competition,
            request.game_id,
            patch
        );
        Ok(SyncOutcome::Updated(patch))
    }

    /// Loads the game, syncs it, and returns the stored state afterwards.
    pub async fn sync_by_id(
        &self,
        id: Uuid,
    ) -> Result<(Game, Result<SyncOutcome, SyncError>), AppError> {
        let game = self.games.get_game(id).await?;
        let result = self.sync(&game).await;
        let game = match result {
            Ok(SyncOutcome::Updated(_)) => self.games.get_game(id).await?,
            _ => game,
        };
        Ok((game, result))
    }

    async fn season_for(&self, game: &Game) -> Result<Season, AppError> {
        match game.season_id {
            Some(id) => self.seasons.get_season_by_id(id).await,
            None => seasons::get_season(self.seasons.as_ref(), Some(game.date.date_naive())).await,
        }
    }
}
