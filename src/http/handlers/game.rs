use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    competition::{Competition, MessageLevel, SyncLineView, SyncOutcome, update_scores},
    errors::AppError,
    games::{self, AdminGameFilter, PublicGameQuery},
    models::{Game, GameView},
    seasons,
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePayload {
    pub team: String,
    pub opponent: Option<String>,
    pub game_type: String,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub competition: Option<String>,
    pub game_id: Option<String>,
    pub live: Option<bool>,
    pub score_team: Option<i32>,
    pub score_opponent: Option<i32>,
}

impl GamePayload {
    fn apply_to(self, game: &mut Game) -> Result<(), AppError> {
        let competition = self.competition.filter(|c| !c.trim().is_empty());
        if let Some(ref key) = competition {
            key.parse::<Competition>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
        }

        game.team = self.team;
        game.opponent = self.opponent.filter(|o| !o.trim().is_empty());
        game.game_type = self.game_type;
        game.date = self.date;
        game.location = self.location.unwrap_or_default();
        game.competition = competition;
        game.game_id = self.game_id.filter(|id| !id.trim().is_empty());
        if let Some(live) = self.live {
            game.live = live;
        }
        if self.score_team.is_some() {
            game.score_team = self.score_team;
        }
        if self.score_opponent.is_some() {
            game.score_opponent = self.score_opponent;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncQuery {
    pub hours: Option<i64>,
}

pub async fn get_public_games_handler(
    Query(query): Query<PublicGameQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<GameView>>, (StatusCode, String)> {
    let now = Utc::now();
    let season = seasons::get_season(state.seasons.as_ref(), None)
        .await
        .map_err(|e| {
            tracing::error!("Error resolving current season: {}", e);
            e.to_response()
        })?;

    let all_games = state.games.list_games().await.map_err(|e| {
        tracing::error!("Error retrieving games: {}", e);
        e.to_response()
    })?;

    let views: Vec<GameView> =
        games::select_public_games(all_games, season.id, &query, &state.venue, now)
            .into_iter()
            .map(|g| GameView::new(g, &state.venue, now))
            .collect();

    tracing::info!("Retrieved {} public games", views.len());
    Ok(Json(views))
}

pub async fn get_all_games_handler(
    Query(mut filter): Query<AdminGameFilter>,
    State(state): State<AppState>,
) -> Result<Json<Vec<GameView>>, (StatusCode, String)> {
    let unfiltered = filter.team.is_none()
        && filter.season.is_none()
        && filter.opponent.is_none()
        && filter.competition.is_none()
        && filter.date.is_none();

    // Without filters the list defaults to the current season.
    if unfiltered {
        match seasons::get_season_id(state.seasons.as_ref(), None).await {
            Ok(id) => filter.season = Some(id),
            Err(e) => tracing::warn!("No current season to default to: {}", e),
        }
    }

    let now = Utc::now();
    let all_games = state.games.list_games().await.map_err(|e| {
        tracing::error!("Error retrieving all games: {}", e);
        e.to_response()
    })?;

    let views: Vec<GameView> = all_games
        .into_iter()
        .filter(|g| filter.matches(g))
        .map(|g| GameView::new(g, &state.venue, now))
        .collect();

    tracing::info!("Success retrieving {} games", views.len());
    Ok(Json(views))
}

pub async fn get_game_handler(
    Path(game_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<GameView>, (StatusCode, String)> {
    let game = state.games.get_game(game_id).await.map_err(|e| {
        tracing::error!("Error retrieving {} game: {}", game_id, e);
        e.to_response()
    })?;

    Ok(Json(GameView::new(game, &state.venue, Utc::now())))
}

pub async fn add_game_handler(
    State(state): State<AppState>,
    Json(payload): Json<GamePayload>,
) -> Result<(StatusCode, Json<Game>), (StatusCode, String)> {
    let mut game = Game::new(payload.team.clone(), payload.game_type.clone(), payload.date);
    payload.apply_to(&mut game).map_err(|e| e.to_response())?;

    let game = games::save_game(
        state.seasons.as_ref(),
        state.games.as_ref(),
        &state.venue,
        game,
    )
    .await
    .map_err(|e| {
        tracing::error!("Error adding new game: {}", e);
        e.to_response()
    })?;

    tracing::info!("Success adding game {}", game.id);
    Ok((StatusCode::CREATED, Json(game)))
}

pub async fn update_game_handler(
    Path(game_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<GamePayload>,
) -> Result<Json<Game>, (StatusCode, String)> {
    let mut game = state.games.get_game(game_id).await.map_err(|e| {
        tracing::error!("Error retrieving {} game: {}", game_id, e);
        e.to_response()
    })?;
    payload.apply_to(&mut game).map_err(|e| e.to_response())?;

    let game = games::save_game(
        state.seasons.as_ref(),
        state.games.as_ref(),
        &state.venue,
        game,
    )
    .await
    .map_err(|e| {
        tracing::error!("Error updating game {}: {}", game_id, e);
        e.to_response()
    })?;

    tracing::info!("Success updating game {}", game.id);
    Ok(Json(game))
}

pub async fn delete_game_handler(
    Path(game_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.games.delete_game(game_id).await.map_err(|e| {
        tracing::error!("Error deleting game {}: {}", game_id, e);
        e.to_response()
    })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn refresh_game_handler(
    Path(game_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<FlashMessage>, (StatusCode, String)> {
    let (game, result) = state.engine.sync_by_id(game_id).await.map_err(|e| {
        tracing::error!("Error refreshing game {}: {}", game_id, e);
        e.to_response()
    })?;

    let title = format!(
        "Game {} vs. {} ({})",
        game.team,
        game.opponent.as_deref().unwrap_or("TBD"),
        game.date.format("%d %b %Y %H:%M")
    );

    let flash = match result {
        Ok(SyncOutcome::Updated(_)) => FlashMessage {
            level: MessageLevel::Success,
            message: format!("{title} - new information fetched"),
        },
        Ok(SyncOutcome::Skipped) => FlashMessage {
            level: MessageLevel::Info,
            message: format!("{title} has no competition set"),
        },
        Err(e) => {
            tracing::warn!("Refresh of game {} failed: {}", game_id, e);
            FlashMessage {
                level: MessageLevel::Warning,
                message: format!("{title} - could not fetch new information: {e}"),
            }
        }
    };

    Ok(Json(flash))
}

pub async fn sync_games_handler(
    Query(query): Query<SyncQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SyncLineView>>, (StatusCode, String)> {
    let hours = query.hours.unwrap_or(state.sync.hours);
    let report = update_scores(&state.engine, hours, Utc::now(), state.sync.concurrency)
        .await
        .map_err(|e| {
            tracing::error!("Error running score refresh: {}", e);
            e.to_response()
        })?;

    Ok(Json(report.views()))
}
