use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    models::Season,
    seasons::{self, DurationUnit},
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSeasonPayload {
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default = "default_unit")]
    pub unit: DurationUnit,
}

fn default_duration() -> u32 {
    1
}

fn default_unit() -> DurationUnit {
    DurationUnit::Year
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonView {
    #[serde(flatten)]
    pub season: Season,
    pub label: String,
    pub is_current: bool,
}

impl From<Season> for SeasonView {
    fn from(season: Season) -> Self {
        Self {
            label: season.label(),
            is_current: season.is_current(Utc::now().date_naive()),
            season,
        }
    }
}

pub async fn get_seasons_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<SeasonView>>, (StatusCode, String)> {
    let seasons = state.seasons.list_seasons().await.map_err(|e| {
        tracing::error!("Error retrieving seasons: {}", e);
        e.to_response()
    })?;

    Ok(Json(seasons.into_iter().map(SeasonView::from).collect()))
}

pub async fn get_current_season_handler(
    State(state): State<AppState>,
) -> Result<Json<SeasonView>, (StatusCode, String)> {
    let season = seasons::get_season(state.seasons.as_ref(), None)
        .await
        .map_err(|e| {
            tracing::error!("Error resolving current season: {}", e);
            e.to_response()
        })?;

    Ok(Json(season.into()))
}

pub async fn add_season_handler(
    State(state): State<AppState>,
    Json(payload): Json<NextSeasonPayload>,
) -> Result<(StatusCode, Json<SeasonView>), (StatusCode, String)> {
    match seasons::create_next_season(state.seasons.as_ref(), payload.duration, payload.unit)
        .await
    {
        Ok(season) => {
            tracing::info!("Season created: {} (ID: {})", season.label(), season.id);
            Ok((StatusCode::CREATED, Json(season.into())))
        }
        Err(err) => {
            tracing::error!("Error creating season: {}", err);
            Err(err.to_response())
        }
    }
}
